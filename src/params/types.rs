// Typed trace parameter values

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, TrsError};

/// Wire code of a trace parameter value.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterType {
    Byte = 0x01,
    Short = 0x02,
    Int = 0x04,
    Long = 0x08,
    Float = 0x14,
    Double = 0x18,
    String = 0x20,
    Bool = 0x31,
}

impl ParameterType {
    pub fn from_value(value: u8) -> Result<Self> {
        match value {
            0x01 => Ok(ParameterType::Byte),
            0x02 => Ok(ParameterType::Short),
            0x04 => Ok(ParameterType::Int),
            0x08 => Ok(ParameterType::Long),
            0x14 => Ok(ParameterType::Float),
            0x18 => Ok(ParameterType::Double),
            0x20 => Ok(ParameterType::String),
            0x31 => Ok(ParameterType::Bool),
            other => Err(TrsError::UnknownParameterType(other)),
        }
    }

    pub fn value(self) -> u8 {
        self as u8
    }

    /// Bytes per element; strings count one byte per UTF-8 code unit.
    pub fn element_size(self) -> usize {
        match self {
            ParameterType::Byte | ParameterType::String | ParameterType::Bool => 1,
            ParameterType::Short => 2,
            ParameterType::Int | ParameterType::Float => 4,
            ParameterType::Long | ParameterType::Double => 8,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ParameterType::Byte => "byte",
            ParameterType::Short => "short",
            ParameterType::Int => "int",
            ParameterType::Long => "long",
            ParameterType::Float => "float",
            ParameterType::Double => "double",
            ParameterType::String => "string",
            ParameterType::Bool => "bool",
        }
    }
}

/// A homogeneous parameter value. Scalars are the length-1 case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterValue {
    Byte(Vec<u8>),
    Short(Vec<i16>),
    Int(Vec<i32>),
    Long(Vec<i64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    String(String),
    Bool(Vec<bool>),
}

impl ParameterValue {
    pub fn kind(&self) -> ParameterType {
        match self {
            ParameterValue::Byte(_) => ParameterType::Byte,
            ParameterValue::Short(_) => ParameterType::Short,
            ParameterValue::Int(_) => ParameterType::Int,
            ParameterValue::Long(_) => ParameterType::Long,
            ParameterValue::Float(_) => ParameterType::Float,
            ParameterValue::Double(_) => ParameterType::Double,
            ParameterValue::String(_) => ParameterType::String,
            ParameterValue::Bool(_) => ParameterType::Bool,
        }
    }

    /// Element count; the byte length for strings.
    pub fn length(&self) -> usize {
        match self {
            ParameterValue::Byte(v) => v.len(),
            ParameterValue::Short(v) => v.len(),
            ParameterValue::Int(v) => v.len(),
            ParameterValue::Long(v) => v.len(),
            ParameterValue::Float(v) => v.len(),
            ParameterValue::Double(v) => v.len(),
            ParameterValue::String(v) => v.len(),
            ParameterValue::Bool(v) => v.len(),
        }
    }

    pub fn byte_size(&self) -> usize {
        self.length() * self.kind().element_size()
    }

    /// Display name that distinguishes the scalar and array shapes.
    pub fn type_name(&self) -> &'static str {
        match (self.kind(), self.length()) {
            (ParameterType::String, _) => "string",
            (kind, 1) => kind.name(),
            (ParameterType::Byte, _) => "byte array",
            (ParameterType::Short, _) => "short array",
            (ParameterType::Int, _) => "int array",
            (ParameterType::Long, _) => "long array",
            (ParameterType::Float, _) => "float array",
            (ParameterType::Double, _) => "double array",
            (ParameterType::Bool, _) => "bool array",
        }
    }

    /// Write exactly `length * element_size` little-endian bytes.
    pub fn serialize<W: Write>(&self, writer: &mut W) -> Result<()> {
        match self {
            ParameterValue::Byte(v) => writer.write_all(v)?,
            ParameterValue::Short(v) => {
                for &x in v {
                    writer.write_all(&x.to_le_bytes())?;
                }
            }
            ParameterValue::Int(v) => {
                for &x in v {
                    writer.write_all(&x.to_le_bytes())?;
                }
            }
            ParameterValue::Long(v) => {
                for &x in v {
                    writer.write_all(&x.to_le_bytes())?;
                }
            }
            ParameterValue::Float(v) => {
                for &x in v {
                    writer.write_all(&x.to_le_bytes())?;
                }
            }
            ParameterValue::Double(v) => {
                for &x in v {
                    writer.write_all(&x.to_le_bytes())?;
                }
            }
            ParameterValue::String(v) => writer.write_all(v.as_bytes())?,
            ParameterValue::Bool(v) => {
                for &b in v {
                    writer.write_all(&[b as u8])?;
                }
            }
        }
        Ok(())
    }

    pub fn deserialize<R: Read>(kind: ParameterType, length: usize, reader: &mut R) -> Result<Self> {
        let mut raw = vec![0u8; length * kind.element_size()];
        reader.read_exact(&mut raw)?;
        let value = match kind {
            ParameterType::Byte => ParameterValue::Byte(raw),
            ParameterType::Short => ParameterValue::Short(
                raw.chunks_exact(2)
                    .map(|c| i16::from_le_bytes(c.try_into().unwrap()))
                    .collect(),
            ),
            ParameterType::Int => ParameterValue::Int(
                raw.chunks_exact(4)
                    .map(|c| i32::from_le_bytes(c.try_into().unwrap()))
                    .collect(),
            ),
            ParameterType::Long => ParameterValue::Long(
                raw.chunks_exact(8)
                    .map(|c| i64::from_le_bytes(c.try_into().unwrap()))
                    .collect(),
            ),
            ParameterType::Float => ParameterValue::Float(
                raw.chunks_exact(4)
                    .map(|c| f32::from_le_bytes(c.try_into().unwrap()))
                    .collect(),
            ),
            ParameterType::Double => ParameterValue::Double(
                raw.chunks_exact(8)
                    .map(|c| f64::from_le_bytes(c.try_into().unwrap()))
                    .collect(),
            ),
            ParameterType::String => ParameterValue::String(String::from_utf8(raw)?),
            ParameterType::Bool => ParameterValue::Bool(raw.iter().map(|&b| b != 0).collect()),
        };
        Ok(value)
    }
}

impl From<u8> for ParameterValue {
    fn from(value: u8) -> Self {
        ParameterValue::Byte(vec![value])
    }
}

impl From<Vec<u8>> for ParameterValue {
    fn from(value: Vec<u8>) -> Self {
        ParameterValue::Byte(value)
    }
}

impl From<i16> for ParameterValue {
    fn from(value: i16) -> Self {
        ParameterValue::Short(vec![value])
    }
}

impl From<Vec<i16>> for ParameterValue {
    fn from(value: Vec<i16>) -> Self {
        ParameterValue::Short(value)
    }
}

impl From<i32> for ParameterValue {
    fn from(value: i32) -> Self {
        ParameterValue::Int(vec![value])
    }
}

impl From<Vec<i32>> for ParameterValue {
    fn from(value: Vec<i32>) -> Self {
        ParameterValue::Int(value)
    }
}

impl From<i64> for ParameterValue {
    fn from(value: i64) -> Self {
        ParameterValue::Long(vec![value])
    }
}

impl From<Vec<i64>> for ParameterValue {
    fn from(value: Vec<i64>) -> Self {
        ParameterValue::Long(value)
    }
}

impl From<f32> for ParameterValue {
    fn from(value: f32) -> Self {
        ParameterValue::Float(vec![value])
    }
}

impl From<Vec<f32>> for ParameterValue {
    fn from(value: Vec<f32>) -> Self {
        ParameterValue::Float(value)
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        ParameterValue::Double(vec![value])
    }
}

impl From<Vec<f64>> for ParameterValue {
    fn from(value: Vec<f64>) -> Self {
        ParameterValue::Double(value)
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        ParameterValue::String(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        ParameterValue::String(value)
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        ParameterValue::Bool(vec![value])
    }
}

impl From<Vec<bool>> for ParameterValue {
    fn from(value: Vec<bool>) -> Self {
        ParameterValue::Bool(value)
    }
}
