// TRS trace set reader/writer

use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::debug;

use crate::core::constants::Encoding;
use crate::core::error::{Result, TrsError};
use crate::core::metadata::MetaData;
use crate::core::tags::Tag;
use crate::core::trace::Trace;

// Span of the buffered read window over the file
const DEFAULT_WINDOW: u64 = 16 * 1024 * 1024;

enum Mode {
    Read {
        file: File,
        file_size: u64,
        metadata_size: u64,
        buffer: Vec<u8>,
        buffer_start: u64,
        window_cap: u64,
    },
    Write {
        file: File,
        first_trace: bool,
    },
    Closed,
}

/// An open TRS file, either readable or writable, never both.
///
/// In write mode the header layout is fixed by the first added trace and
/// patched with the final trace count on close. A writer that is dropped
/// without `close` leaves the placeholder header behind.
pub struct TraceSet {
    metadata: MetaData,
    mode: Mode,
}

impl TraceSet {
    /// Open an existing TRS file for reading.
    pub fn open_read<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_read_windowed(path, DEFAULT_WINDOW)
    }

    fn open_read_windowed<P: AsRef<Path>>(path: P, window_cap: u64) -> Result<Self> {
        let mut file = File::open(path)?;
        let file_size = file.metadata()?.len();
        let buffer = read_window(&mut file, 0, window_cap, file_size)?;
        let mut cursor = Cursor::new(buffer.as_slice());
        let metadata = MetaData::read_from(&mut cursor)?;
        let metadata_size = cursor.position();
        debug!(file_size, metadata_size, "opened trace set for reading");
        Ok(Self {
            metadata,
            mode: Mode::Read {
                file,
                file_size,
                metadata_size,
                buffer,
                buffer_start: 0,
                window_cap,
            },
        })
    }

    /// Create a new TRS file with default metadata. The header layout is
    /// defined by the first added trace.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::create_with(path, MetaData::new())
    }

    /// Create a new TRS file. Caller-supplied metadata is leading; the
    /// first added trace only fills in the fields left unset.
    pub fn create_with<P: AsRef<Path>>(path: P, metadata: MetaData) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            metadata,
            mode: Mode::Write {
                file,
                first_trace: true,
            },
        })
    }

    pub fn metadata(&self) -> &MetaData {
        &self.metadata
    }

    fn size_of(&self, tag: Tag) -> Result<u64> {
        Ok(self.metadata.get_int(tag)?.max(0) as u64)
    }

    fn trace_size(&self) -> Result<u64> {
        let coding = Encoding::from_value(self.metadata.get_int(Tag::SampleCoding)?)?;
        let sample_space = self.size_of(Tag::NumberOfSamples)? * coding.size() as u64;
        Ok(sample_space + self.size_of(Tag::DataLength)? + self.size_of(Tag::TitleSpace)?)
    }

    /// Read the trace at the given index.
    pub fn get(&mut self, index: usize) -> Result<Trace> {
        match self.mode {
            Mode::Closed => return Err(TrsError::NotOpen),
            Mode::Write { .. } => {
                return Err(TrsError::WrongMode {
                    needed: "read",
                    actual: "write",
                })
            }
            Mode::Read { .. } => {}
        }

        let trace_size = self.trace_size()?;
        let count = self.metadata.get_int(Tag::NumberOfTraces)?.max(0) as usize;
        let title_space = self.size_of(Tag::TitleSpace)? as usize;
        let data_length = self.size_of(Tag::DataLength)? as usize;
        let num_samples = self.size_of(Tag::NumberOfSamples)? as usize;
        let coding = Encoding::from_value(self.metadata.get_int(Tag::SampleCoding)?)?;
        let global_title = self.metadata.get_string(Tag::GlobalTitle)?;
        let scale_x = self.metadata.get_float(Tag::ScaleX)?;

        let Mode::Read {
            file,
            file_size,
            metadata_size,
            buffer,
            buffer_start,
            window_cap,
        } = &mut self.mode
        else {
            unreachable!()
        };

        if index >= count {
            return Err(TrsError::IndexOutOfBounds { index, count });
        }
        let expected_size = *metadata_size + trace_size * count as u64;
        if *file_size != expected_size {
            return Err(TrsError::Corrupted(format!(
                "file size ({}) != meta data ({}) + trace size ({}) * nr of traces ({})",
                file_size, metadata_size, trace_size, count
            )));
        }

        let start = *metadata_size + index as u64 * trace_size;
        let end = start + trace_size;
        if start < *buffer_start || end > *buffer_start + buffer.len() as u64 {
            *buffer = read_window(file, start, (*window_cap).max(trace_size), *file_size)?;
            *buffer_start = start;
            debug!(start, len = buffer.len(), "moved read window");
        }

        let offset = (start - *buffer_start) as usize;
        let record = &buffer[offset..offset + trace_size as usize];
        let (title_raw, rest) = record.split_at(title_space);
        let (data, sample_raw) = rest.split_at(data_length);

        let mut title = String::from_utf8(title_raw.to_vec())?
            .trim_end_matches(|c: char| c == '\0' || c.is_whitespace())
            .to_string();
        if title.trim().is_empty() {
            title = format!("{} {}", global_title, index);
        }
        let samples = coding.decode_samples(sample_raw, num_samples)?;
        Ok(Trace::new(title, data.to_vec(), samples, 1.0 / scale_x))
    }

    /// Append a trace. The first trace fixes the set's layout; every later
    /// trace must match it.
    pub fn add(&mut self, trace: &Trace) -> Result<()> {
        match self.mode {
            Mode::Closed => return Err(TrsError::NotOpen),
            Mode::Read { .. } => {
                return Err(TrsError::WrongMode {
                    needed: "write",
                    actual: "read",
                })
            }
            Mode::Write { .. } => {}
        }

        if let Mode::Write {
            first_trace: true, ..
        } = self.mode
        {
            self.metadata
                .put_if_absent(Tag::NumberOfSamples, trace.num_samples() as i32)?;
            self.metadata
                .put_if_absent(Tag::DataLength, trace.data.len() as i32)?;
            self.metadata
                .put_if_absent(Tag::TitleSpace, trace.title.len() as i32)?;
            self.metadata
                .put_if_absent(Tag::ScaleX, 1.0 / trace.sample_frequency)?;
            self.metadata
                .put_if_absent(Tag::SampleCoding, trace.preferred_coding().value())?;

            let Mode::Write { file, first_trace } = &mut self.mode else {
                unreachable!()
            };
            self.metadata.write_to(file)?;
            *first_trace = false;
            debug!("wrote placeholder header");
        }

        let num_samples = self.size_of(Tag::NumberOfSamples)? as usize;
        let data_length = self.size_of(Tag::DataLength)? as usize;
        let title_space = self.size_of(Tag::TitleSpace)? as usize;
        let frequency = 1.0 / self.metadata.get_float(Tag::ScaleX)?;
        let coding = Encoding::from_value(self.metadata.get_int(Tag::SampleCoding)?)?;

        if trace.num_samples() != num_samples {
            return Err(TrsError::ShapeMismatch {
                field: "NUMBER_OF_SAMPLES",
                got: trace.num_samples() as f64,
                expected: num_samples as f64,
            });
        }
        if trace.data.len() != data_length {
            return Err(TrsError::ShapeMismatch {
                field: "DATA_LENGTH",
                got: trace.data.len() as f64,
                expected: data_length as f64,
            });
        }
        if trace.sample_frequency != frequency {
            return Err(TrsError::ShapeMismatch {
                field: "SAMPLE_FREQUENCY",
                got: trace.sample_frequency as f64,
                expected: frequency as f64,
            });
        }

        let encoded = coding.encode_samples(&trace.samples)?;
        let mut title_bytes = trace.title.clone().into_bytes();
        title_bytes.resize(title_space, 0x00);

        let Mode::Write { file, .. } = &mut self.mode else {
            unreachable!()
        };
        file.write_all(&title_bytes)?;
        file.write_all(&trace.data)?;
        file.write_all(&encoded)?;

        let count = self.metadata.get_int(Tag::NumberOfTraces)?;
        self.metadata.put(Tag::NumberOfTraces, count + 1)?;
        Ok(())
    }

    /// Close the set, releasing the file handle. A writer patches the
    /// header with the final trace count first. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.mode, Mode::Closed) {
            Mode::Closed => Ok(()),
            Mode::Read { .. } => Ok(()),
            Mode::Write { mut file, .. } => {
                file.seek(SeekFrom::Start(0))?;
                self.metadata.write_to(&mut file)?;
                file.flush()?;
                Ok(())
            }
        }
    }
}

/// One-shot creation of a TRS file from a list of traces.
pub fn save<P: AsRef<Path>>(path: P, traces: &[Trace]) -> Result<()> {
    save_with(path, traces, MetaData::new())
}

/// One-shot creation with caller-supplied metadata.
pub fn save_with<P: AsRef<Path>>(path: P, traces: &[Trace], metadata: MetaData) -> Result<()> {
    let mut set = TraceSet::create_with(path, metadata)?;
    for trace in traces {
        set.add(trace)?;
    }
    set.close()
}

fn read_window(file: &mut File, start: u64, len: u64, file_size: u64) -> Result<Vec<u8>> {
    let len = len.min(file_size.saturating_sub(start));
    file.seek(SeekFrom::Start(start))?;
    let mut buffer = vec![0u8; len as usize];
    file.read_exact(&mut buffer)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(samples: &[f32]) -> Trace {
        Trace::new("t", vec![0xAA, 0xBB], samples.to_vec(), 1.0)
    }

    #[test]
    fn test_write_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("basic.trs");

        let mut set = TraceSet::create(&path).unwrap();
        set.add(&trace(&[1.0, 2.0, 3.0])).unwrap();
        set.add(&trace(&[4.0, 5.0, 6.0])).unwrap();
        set.close().unwrap();

        let mut set = TraceSet::open_read(&path).unwrap();
        assert_eq!(set.metadata().get_int(Tag::NumberOfTraces).unwrap(), 2);
        let first = set.get(0).unwrap();
        assert_eq!(first.samples, [1.0, 2.0, 3.0]);
        assert_eq!(first.data, [0xAA, 0xBB]);
        assert_eq!(first.title, "t");
        assert_eq!(set.get(1).unwrap().samples, [4.0, 5.0, 6.0]);
        set.close().unwrap();
    }

    #[test]
    fn test_repeated_get_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stable.trs");
        save(&path, &[trace(&[9.0, -9.0])]).unwrap();

        let mut set = TraceSet::open_read(&path).unwrap();
        assert_eq!(set.get(0).unwrap(), set.get(0).unwrap());
    }

    #[test]
    fn test_second_trace_shape_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shape.trs");

        let mut set = TraceSet::create(&path).unwrap();
        set.add(&trace(&[1.0, 2.0, 3.0])).unwrap();
        let err = set.add(&trace(&[1.0, 2.0])).unwrap_err();
        match err {
            TrsError::ShapeMismatch {
                field,
                got,
                expected,
            } => {
                assert_eq!(field, "NUMBER_OF_SAMPLES");
                assert_eq!(got, 2.0);
                assert_eq!(expected, 3.0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_index_out_of_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bounds.trs");
        save(&path, &[trace(&[1.0])]).unwrap();

        let mut set = TraceSet::open_read(&path).unwrap();
        assert!(matches!(
            set.get(1),
            Err(TrsError::IndexOutOfBounds { index: 1, count: 1 })
        ));
    }

    #[test]
    fn test_wrong_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mode.trs");

        let mut writer = TraceSet::create(&path).unwrap();
        assert!(matches!(writer.get(0), Err(TrsError::WrongMode { .. })));
        writer.add(&trace(&[1.0])).unwrap();
        writer.close().unwrap();

        let mut reader = TraceSet::open_read(&path).unwrap();
        assert!(matches!(
            reader.add(&trace(&[1.0])),
            Err(TrsError::WrongMode { .. })
        ));
    }

    #[test]
    fn test_closed_set_rejects_operations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("closed.trs");
        save(&path, &[trace(&[1.0])]).unwrap();

        let mut set = TraceSet::open_read(&path).unwrap();
        set.close().unwrap();
        assert!(matches!(set.get(0), Err(TrsError::NotOpen)));
        // double close is a no-op
        set.close().unwrap();
    }

    #[test]
    fn test_trace_count_tracks_adds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("count.trs");

        let mut set = TraceSet::create(&path).unwrap();
        for _ in 0..5 {
            set.add(&trace(&[1.0, 2.0])).unwrap();
        }
        assert_eq!(set.metadata().get_int(Tag::NumberOfTraces).unwrap(), 5);
        set.close().unwrap();
    }

    #[test]
    fn test_file_size_matches_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("size.trs");
        save(&path, &[trace(&[1.0, 2.0]), trace(&[3.0, 4.0])]).unwrap();

        let set = TraceSet::open_read(&path).unwrap();
        let trace_size = set.trace_size().unwrap();
        let Mode::Read {
            file_size,
            metadata_size,
            ..
        } = &set.mode
        else {
            panic!("reader expected")
        };
        assert_eq!(*file_size, *metadata_size + 2 * trace_size);
    }

    #[test]
    fn test_window_slides_once_for_far_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("window.trs");

        let traces: Vec<Trace> = (0..64)
            .map(|i| Trace::new(format!("trace {i}"), Vec::new(), vec![i as f32; 32], 1.0))
            .collect();
        save(&path, &traces).unwrap();

        // window big enough for the header plus a handful of traces
        let mut set = TraceSet::open_read_windowed(&path, 256).unwrap();
        let first = set.get(0).unwrap();
        assert_eq!(first.samples, vec![0.0f32; 32]);
        let Mode::Read { buffer_start, .. } = &set.mode else {
            panic!("reader expected")
        };
        assert_eq!(*buffer_start, 0);

        let last = set.get(63).unwrap();
        assert_eq!(last.samples, vec![63.0f32; 32]);
        let trace_size = set.trace_size().unwrap();
        let Mode::Read {
            buffer_start,
            metadata_size,
            ..
        } = &set.mode
        else {
            panic!("reader expected")
        };
        assert_eq!(*buffer_start, *metadata_size + 63 * trace_size);
    }

    #[test]
    fn test_abandoned_writer_leaves_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abandoned.trs");

        let mut set = TraceSet::create(&path).unwrap();
        set.add(&trace(&[1.0])).unwrap();
        set.add(&trace(&[2.0])).unwrap();
        drop(set);

        // the header still carries the placeholder count of zero
        let mut set = TraceSet::open_read(&path).unwrap();
        assert_eq!(set.metadata().get_int(Tag::NumberOfTraces).unwrap(), 0);
        assert!(matches!(
            set.get(0),
            Err(TrsError::IndexOutOfBounds { .. })
        ));
    }
}
