// Trace parameter map codec

use std::io::Cursor;
use std::ops::Deref;

use indexmap::IndexMap;

use crate::core::error::{Result, TrsError};
use crate::params::defs::TraceParameterDefinitionMap;
use crate::params::types::ParameterValue;

/// Ordered, typed, named parameter bundle carried inside each trace's
/// data blob. Serialization order is insertion order; the framing lives
/// in the separate definition map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceParameterMap {
    entries: IndexMap<String, ParameterValue>,
}

impl TraceParameterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parameter. Scalars and arrays both convert via `Into`:
    /// `map.put("iv", vec![0xDEu8, 0xAD])`, `map.put("round", 10i32)`.
    pub fn put(&mut self, name: impl Into<String>, value: impl Into<ParameterValue>) {
        self.entries.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Result<&ParameterValue> {
        self.entries
            .get(name)
            .ok_or_else(|| TrsError::KeyNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParameterValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Concatenate all parameter values, in insertion order, no framing.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        for value in self.entries.values() {
            value.serialize(&mut out)?;
        }
        Ok(out)
    }

    /// Decode a parameter blob, layout driven by the definition map.
    pub fn from_bytes(
        bytes: &[u8],
        definitions: &TraceParameterDefinitionMap,
    ) -> Result<FrozenParameterMap> {
        let expected = definitions.total_size();
        if bytes.is_empty() {
            if expected != 0 {
                return Err(TrsError::ParameterLengthMismatch {
                    actual: 0,
                    expected,
                });
            }
            return Ok(FrozenParameterMap(TraceParameterMap::new()));
        }
        if bytes.len() != expected {
            return Err(TrsError::ParameterLengthMismatch {
                actual: bytes.len(),
                expected,
            });
        }
        let mut cursor = Cursor::new(bytes);
        let mut map = TraceParameterMap::new();
        for (name, def) in definitions.iter() {
            let value = ParameterValue::deserialize(def.kind, def.length, &mut cursor)?;
            map.entries.insert(name.clone(), value);
        }
        Ok(FrozenParameterMap(map))
    }

    fn mismatch(&self, name: &str, requested: &'static str, actual: &ParameterValue) -> TrsError {
        TrsError::TypeMismatch {
            key: name.to_string(),
            requested,
            actual: actual.type_name(),
        }
    }

    pub fn get_byte(&self, name: &str) -> Result<u8> {
        match self.get(name)? {
            ParameterValue::Byte(v) if v.len() == 1 => Ok(v[0]),
            other => Err(self.mismatch(name, "byte", other)),
        }
    }

    pub fn get_byte_array(&self, name: &str) -> Result<&[u8]> {
        match self.get(name)? {
            ParameterValue::Byte(v) => Ok(v),
            other => Err(self.mismatch(name, "byte array", other)),
        }
    }

    pub fn get_short(&self, name: &str) -> Result<i16> {
        match self.get(name)? {
            ParameterValue::Short(v) if v.len() == 1 => Ok(v[0]),
            other => Err(self.mismatch(name, "short", other)),
        }
    }

    pub fn get_short_array(&self, name: &str) -> Result<&[i16]> {
        match self.get(name)? {
            ParameterValue::Short(v) => Ok(v),
            other => Err(self.mismatch(name, "short array", other)),
        }
    }

    pub fn get_int(&self, name: &str) -> Result<i32> {
        match self.get(name)? {
            ParameterValue::Int(v) if v.len() == 1 => Ok(v[0]),
            other => Err(self.mismatch(name, "int", other)),
        }
    }

    pub fn get_int_array(&self, name: &str) -> Result<&[i32]> {
        match self.get(name)? {
            ParameterValue::Int(v) => Ok(v),
            other => Err(self.mismatch(name, "int array", other)),
        }
    }

    pub fn get_long(&self, name: &str) -> Result<i64> {
        match self.get(name)? {
            ParameterValue::Long(v) if v.len() == 1 => Ok(v[0]),
            other => Err(self.mismatch(name, "long", other)),
        }
    }

    pub fn get_long_array(&self, name: &str) -> Result<&[i64]> {
        match self.get(name)? {
            ParameterValue::Long(v) => Ok(v),
            other => Err(self.mismatch(name, "long array", other)),
        }
    }

    pub fn get_float(&self, name: &str) -> Result<f32> {
        match self.get(name)? {
            ParameterValue::Float(v) if v.len() == 1 => Ok(v[0]),
            other => Err(self.mismatch(name, "float", other)),
        }
    }

    pub fn get_float_array(&self, name: &str) -> Result<&[f32]> {
        match self.get(name)? {
            ParameterValue::Float(v) => Ok(v),
            other => Err(self.mismatch(name, "float array", other)),
        }
    }

    pub fn get_double(&self, name: &str) -> Result<f64> {
        match self.get(name)? {
            ParameterValue::Double(v) if v.len() == 1 => Ok(v[0]),
            other => Err(self.mismatch(name, "double", other)),
        }
    }

    pub fn get_double_array(&self, name: &str) -> Result<&[f64]> {
        match self.get(name)? {
            ParameterValue::Double(v) => Ok(v),
            other => Err(self.mismatch(name, "double array", other)),
        }
    }

    pub fn get_string(&self, name: &str) -> Result<&str> {
        match self.get(name)? {
            ParameterValue::String(v) => Ok(v),
            other => Err(self.mismatch(name, "string", other)),
        }
    }

    pub fn get_bool(&self, name: &str) -> Result<bool> {
        match self.get(name)? {
            ParameterValue::Bool(v) if v.len() == 1 => Ok(v[0]),
            other => Err(self.mismatch(name, "bool", other)),
        }
    }

    pub fn get_bool_array(&self, name: &str) -> Result<&[bool]> {
        match self.get(name)? {
            ParameterValue::Bool(v) => Ok(v),
            other => Err(self.mismatch(name, "bool array", other)),
        }
    }
}

/// Read-only view over a deserialized parameter map. Only lookups are
/// reachable through it, so the decoded map cannot drift from the
/// definitions it was decoded with.
#[derive(Debug, Clone, PartialEq)]
pub struct FrozenParameterMap(TraceParameterMap);

impl Deref for FrozenParameterMap {
    type Target = TraceParameterMap;

    fn deref(&self) -> &TraceParameterMap {
        &self.0
    }
}

impl PartialEq<TraceParameterMap> for FrozenParameterMap {
    fn eq(&self, other: &TraceParameterMap) -> bool {
        &self.0 == other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::types::ParameterType;

    fn sample_map() -> TraceParameterMap {
        let mut map = TraceParameterMap::new();
        map.put("iv", vec![0xDEu8, 0xAD]);
        map.put("ct", vec![1i32, 2, 3]);
        map
    }

    #[test]
    fn test_serialize_concatenates_in_order() {
        let bytes = sample_map().to_bytes().unwrap();
        assert_eq!(
            bytes,
            [0xDE, 0xAD, 0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_roundtrip_with_definitions() {
        let map = sample_map();
        let defs = TraceParameterDefinitionMap::from_parameters(&map);
        let restored = TraceParameterMap::from_bytes(&map.to_bytes().unwrap(), &defs).unwrap();
        assert!(restored == map);
        assert_eq!(restored.get_byte_array("iv").unwrap(), [0xDE, 0xAD]);
        assert_eq!(restored.get_int_array("ct").unwrap(), [1, 2, 3]);
    }

    #[test]
    fn test_empty_blob_nonempty_definitions() {
        let defs = TraceParameterDefinitionMap::from_parameters(&sample_map());
        let err = TraceParameterMap::from_bytes(&[], &defs).unwrap_err();
        assert!(matches!(
            err,
            TrsError::ParameterLengthMismatch {
                actual: 0,
                expected: 14
            }
        ));
    }

    #[test]
    fn test_length_mismatch() {
        let defs = TraceParameterDefinitionMap::from_parameters(&sample_map());
        let err = TraceParameterMap::from_bytes(&[0u8; 5], &defs).unwrap_err();
        assert!(matches!(
            err,
            TrsError::ParameterLengthMismatch {
                actual: 5,
                expected: 14
            }
        ));
    }

    #[test]
    fn test_empty_blob_empty_definitions() {
        let restored =
            TraceParameterMap::from_bytes(&[], &TraceParameterDefinitionMap::new()).unwrap();
        assert!(restored.is_empty());
    }

    #[test]
    fn test_scalar_sugar() {
        let mut map = TraceParameterMap::new();
        map.put("round", 10i32);
        map.put("key", "aes");
        map.put("masked", true);
        assert_eq!(map.get_int("round").unwrap(), 10);
        assert_eq!(map.get_string("key").unwrap(), "aes");
        assert!(map.get_bool("masked").unwrap());
    }

    #[test]
    fn test_type_mismatch() {
        let map = sample_map();
        let err = map.get_int("iv").unwrap_err();
        assert!(matches!(
            err,
            TrsError::TypeMismatch {
                requested: "int",
                actual: "byte array",
                ..
            }
        ));
    }

    #[test]
    fn test_scalar_getter_rejects_array() {
        let map = sample_map();
        assert!(map.get_byte("iv").is_err());
        // a length-1 array is a scalar
        let mut single = TraceParameterMap::new();
        single.put("b", vec![7u8]);
        assert_eq!(single.get_byte("b").unwrap(), 7);
    }

    #[test]
    fn test_key_not_found() {
        let err = sample_map().get("missing").unwrap_err();
        assert!(matches!(err, TrsError::KeyNotFound(_)));
    }

    #[test]
    fn test_definitions_describe_map() {
        let map = sample_map();
        let defs = TraceParameterDefinitionMap::from_parameters(&map);
        assert_eq!(defs.get("iv").unwrap().kind, ParameterType::Byte);
        assert_eq!(defs.get("ct").unwrap().offset, 2);
        assert_eq!(defs.total_size(), map.to_bytes().unwrap().len());
    }
}
