// Trace parameter definition map: the layout schema of per-trace
// parameter blobs, stored under the TRACE_PARAMETER_DEFINITIONS tag.

use std::io::{Cursor, Read};

use indexmap::IndexMap;

use crate::core::error::{Result, TrsError};
use crate::params::map::TraceParameterMap;
use crate::params::types::ParameterType;

/// Layout of one parameter inside a per-trace parameter blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterDefinition {
    pub kind: ParameterType,
    pub length: usize,
    pub offset: usize,
}

impl ParameterDefinition {
    pub fn byte_size(&self) -> usize {
        self.length * self.kind.element_size()
    }
}

/// Ordered mapping from parameter name to its blob layout. Offsets
/// increase monotonically and exactly tile the blob.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceParameterDefinitionMap {
    entries: IndexMap<String, ParameterDefinition>,
}

impl TraceParameterDefinitionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive the definitions from a parameter map, walking insertion order
    /// and accumulating offsets.
    pub fn from_parameters(map: &TraceParameterMap) -> Self {
        let mut defs = Self::new();
        for (name, value) in map.iter() {
            defs.insert(name.clone(), value.kind(), value.length());
        }
        defs
    }

    /// Append a definition; its offset continues where the previous entry ends.
    pub fn insert(&mut self, name: impl Into<String>, kind: ParameterType, length: usize) {
        let offset = self.total_size();
        self.entries.insert(
            name.into(),
            ParameterDefinition {
                kind,
                length,
                offset,
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&ParameterDefinition> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParameterDefinition)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total byte size of the blob described by these definitions.
    pub fn total_size(&self) -> usize {
        self.entries.values().map(|d| d.byte_size()).sum()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        write_u16(&mut out, self.entries.len())?;
        for (name, def) in &self.entries {
            write_u16(&mut out, name.len())?;
            out.extend_from_slice(name.as_bytes());
            out.push(def.kind.value());
            write_u16(&mut out, def.length)?;
            write_u16(&mut out, def.offset)?;
        }
        Ok(out)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);
        let count = read_u16(&mut cursor)?;
        let mut entries = IndexMap::new();
        let mut expected_offset = 0usize;
        for _ in 0..count {
            let name_len = read_u16(&mut cursor)?;
            let mut name_raw = vec![0u8; name_len];
            cursor.read_exact(&mut name_raw)?;
            let name = String::from_utf8(name_raw)?;
            let kind = ParameterType::from_value(read_u8(&mut cursor)?)?;
            let length = read_u16(&mut cursor)?;
            let offset = read_u16(&mut cursor)?;
            if offset != expected_offset {
                return Err(TrsError::Corrupted(format!(
                    "parameter {name} starts at offset {offset}, expected {expected_offset}"
                )));
            }
            let def = ParameterDefinition {
                kind,
                length,
                offset,
            };
            expected_offset += def.byte_size();
            entries.insert(name, def);
        }
        Ok(Self { entries })
    }
}

fn write_u16(out: &mut Vec<u8>, value: usize) -> Result<()> {
    let value = u16::try_from(value).map_err(|_| {
        TrsError::Corrupted(format!("value {value} does not fit in a 16-bit field"))
    })?;
    out.extend_from_slice(&value.to_le_bytes());
    Ok(())
}

fn read_u16<R: Read>(reader: &mut R) -> Result<usize> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf) as usize)
}

fn read_u8<R: Read>(reader: &mut R) -> Result<u8> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_defs() -> TraceParameterDefinitionMap {
        let mut defs = TraceParameterDefinitionMap::new();
        defs.insert("iv", ParameterType::Byte, 16);
        defs.insert("counter", ParameterType::Int, 1);
        defs.insert("label", ParameterType::String, 5);
        defs
    }

    #[test]
    fn test_offsets_tile_the_blob() {
        let defs = sample_defs();
        assert_eq!(defs.get("iv").unwrap().offset, 0);
        assert_eq!(defs.get("counter").unwrap().offset, 16);
        assert_eq!(defs.get("label").unwrap().offset, 20);
        assert_eq!(defs.total_size(), 25);
    }

    #[test]
    fn test_bytes_roundtrip() {
        let defs = sample_defs();
        let bytes = defs.to_bytes().unwrap();
        let back = TraceParameterDefinitionMap::from_bytes(&bytes).unwrap();
        assert_eq!(back, defs);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let defs = sample_defs();
        let names: Vec<&String> = defs.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["iv", "counter", "label"]);
    }

    #[test]
    fn test_bad_offset_rejected() {
        let mut defs = TraceParameterDefinitionMap::new();
        defs.insert("a", ParameterType::Byte, 4);
        let mut bytes = defs.to_bytes().unwrap();
        // patch the offset field of the only entry
        let len = bytes.len();
        bytes[len - 2] = 9;
        assert!(TraceParameterDefinitionMap::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_empty_map() {
        let defs = TraceParameterDefinitionMap::new();
        assert_eq!(defs.total_size(), 0);
        let back = TraceParameterDefinitionMap::from_bytes(&defs.to_bytes().unwrap()).unwrap();
        assert!(back.is_empty());
    }
}
