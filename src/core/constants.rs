// Sample encoding registry for the TRS format

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, TrsError};

// Sample coding codes as stored under the SAMPLE_CODING header tag
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Encoding {
    Illegal = 0x00,
    Byte = 0x01,
    Short = 0x02,
    Int = 0x04,
    Float = 0x14,
}

impl Encoding {
    pub fn from_value(value: i32) -> Result<Self> {
        match value {
            0x00 => Ok(Encoding::Illegal),
            0x01 => Ok(Encoding::Byte),
            0x02 => Ok(Encoding::Short),
            0x04 => Ok(Encoding::Int),
            0x14 => Ok(Encoding::Float),
            other => Err(TrsError::UnknownEncoding(other)),
        }
    }

    pub fn value(self) -> i32 {
        self as i32
    }

    /// Number of bytes taken by a single sample.
    pub fn size(self) -> usize {
        match self {
            Encoding::Illegal => 0,
            Encoding::Byte => 1,
            Encoding::Short => 2,
            Encoding::Int | Encoding::Float => 4,
        }
    }

    /// Inclusive numeric range of the integer encodings.
    pub fn range(self) -> Option<(f32, f32)> {
        match self {
            Encoding::Byte => Some((i8::MIN as f32, i8::MAX as f32)),
            Encoding::Short => Some((i16::MIN as f32, i16::MAX as f32)),
            Encoding::Int => Some((i32::MIN as f32, i32::MAX as f32)),
            Encoding::Illegal | Encoding::Float => None,
        }
    }

    fn check_range(self, value: f32) -> Result<()> {
        if let Some((min, max)) = self.range() {
            if value < min || value > max {
                return Err(TrsError::SampleOutOfRange {
                    value,
                    coding: self,
                });
            }
        }
        Ok(())
    }

    /// Encode samples little-endian as they appear on disk.
    pub fn encode_samples(self, samples: &[f32]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(samples.len() * self.size());
        match self {
            Encoding::Illegal => {
                return Err(TrsError::Corrupted("illegal sample encoding".to_string()))
            }
            Encoding::Byte => {
                for &s in samples {
                    self.check_range(s)?;
                    out.push((s as i8) as u8);
                }
            }
            Encoding::Short => {
                for &s in samples {
                    self.check_range(s)?;
                    out.extend_from_slice(&(s as i16).to_le_bytes());
                }
            }
            Encoding::Int => {
                for &s in samples {
                    self.check_range(s)?;
                    out.extend_from_slice(&(s as i32).to_le_bytes());
                }
            }
            Encoding::Float => {
                for &s in samples {
                    out.extend_from_slice(&s.to_le_bytes());
                }
            }
        }
        Ok(out)
    }

    /// Decode `count` samples from raw little-endian bytes, widening to f32.
    pub fn decode_samples(self, bytes: &[u8], count: usize) -> Result<Vec<f32>> {
        if bytes.len() < count * self.size() {
            return Err(TrsError::Corrupted(format!(
                "sample block is {} bytes, expected {}",
                bytes.len(),
                count * self.size()
            )));
        }
        let samples = match self {
            Encoding::Illegal => {
                return Err(TrsError::Corrupted("illegal sample encoding".to_string()))
            }
            Encoding::Byte => bytes[..count].iter().map(|&b| (b as i8) as f32).collect(),
            Encoding::Short => bytes
                .chunks_exact(2)
                .take(count)
                .map(|c| i16::from_le_bytes(c.try_into().unwrap()) as f32)
                .collect(),
            Encoding::Int => bytes
                .chunks_exact(4)
                .take(count)
                .map(|c| i32::from_le_bytes(c.try_into().unwrap()) as f32)
                .collect(),
            Encoding::Float => bytes
                .chunks_exact(4)
                .take(count)
                .map(|c| f32::from_le_bytes(c.try_into().unwrap()))
                .collect(),
        };
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_value() {
        assert_eq!(Encoding::from_value(0x01).unwrap(), Encoding::Byte);
        assert_eq!(Encoding::from_value(0x14).unwrap(), Encoding::Float);
        assert!(matches!(
            Encoding::from_value(0x03),
            Err(TrsError::UnknownEncoding(0x03))
        ));
    }

    #[test]
    fn test_sizes() {
        assert_eq!(Encoding::Byte.size(), 1);
        assert_eq!(Encoding::Short.size(), 2);
        assert_eq!(Encoding::Int.size(), 4);
        assert_eq!(Encoding::Float.size(), 4);
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        for coding in [Encoding::Byte, Encoding::Short, Encoding::Int] {
            let samples = [1.0f32, -2.0, 100.0];
            let bytes = coding.encode_samples(&samples).unwrap();
            assert_eq!(bytes.len(), samples.len() * coding.size());
            let back = coding.decode_samples(&bytes, samples.len()).unwrap();
            assert_eq!(back, samples);
        }
    }

    #[test]
    fn test_float_encoding_exact() {
        let samples = [0.5f32, -1.25, 3.75];
        let bytes = Encoding::Float.encode_samples(&samples).unwrap();
        let back = Encoding::Float.decode_samples(&bytes, samples.len()).unwrap();
        assert_eq!(back, samples);
    }

    #[test]
    fn test_byte_range_rejected() {
        let err = Encoding::Byte.encode_samples(&[128.0]).unwrap_err();
        assert!(matches!(
            err,
            TrsError::SampleOutOfRange {
                coding: Encoding::Byte,
                ..
            }
        ));
        assert!(Encoding::Byte.encode_samples(&[127.0, -128.0]).is_ok());
    }

    #[test]
    fn test_short_range_rejected() {
        assert!(Encoding::Short.encode_samples(&[32768.0]).is_err());
        assert!(Encoding::Short.encode_samples(&[32767.0]).is_ok());
    }

    #[test]
    fn test_decode_truncated_block() {
        assert!(Encoding::Int.decode_samples(&[0u8; 7], 2).is_err());
    }
}
