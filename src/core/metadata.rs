// TLV header codec for TRS trace sets

use std::io::{Read, Write};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::constants::Encoding;
use crate::core::error::{Result, TrsError};
use crate::core::tags::{Tag, TagKind};
use crate::params::defs::TraceParameterDefinitionMap;

/// Value of a single header tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TagValue {
    Int(i32),
    Float(f32),
    String(String),
    Bool(bool),
    Bytes(Vec<u8>),
}

impl TagValue {
    pub fn kind(&self) -> TagKind {
        match self {
            TagValue::Int(_) => TagKind::Int,
            TagValue::Float(_) => TagKind::Float,
            TagValue::String(_) => TagKind::String,
            TagValue::Bool(_) => TagKind::Bool,
            TagValue::Bytes(_) => TagKind::Bytes,
        }
    }
}

impl From<i32> for TagValue {
    fn from(value: i32) -> Self {
        TagValue::Int(value)
    }
}

impl From<f32> for TagValue {
    fn from(value: f32) -> Self {
        TagValue::Float(value)
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        TagValue::String(value.to_string())
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        TagValue::String(value)
    }
}

impl From<bool> for TagValue {
    fn from(value: bool) -> Self {
        TagValue::Bool(value)
    }
}

impl From<Vec<u8>> for TagValue {
    fn from(value: Vec<u8>) -> Self {
        TagValue::Bytes(value)
    }
}

/// The header of a trace set: a tag to value mapping.
///
/// Tags that were never set explicitly answer with their registry default,
/// and only explicitly set non-default values are written out (required
/// tags are always written).
#[derive(Debug, Clone, Default)]
pub struct MetaData {
    values: IndexMap<Tag, TagValue>,
}

impl MetaData {
    pub fn new() -> Self {
        Self::default()
    }

    fn effective(&self, tag: Tag) -> TagValue {
        self.values
            .get(&tag)
            .cloned()
            .unwrap_or_else(|| tag.default_value())
    }

    fn type_mismatch(tag: Tag, requested: TagKind, actual: &TagValue) -> TrsError {
        TrsError::TypeMismatch {
            key: tag.name().to_string(),
            requested: requested.name(),
            actual: actual.kind().name(),
        }
    }

    pub fn get_int(&self, tag: Tag) -> Result<i32> {
        match self.effective(tag) {
            TagValue::Int(v) => Ok(v),
            other => Err(Self::type_mismatch(tag, TagKind::Int, &other)),
        }
    }

    pub fn get_float(&self, tag: Tag) -> Result<f32> {
        match self.effective(tag) {
            TagValue::Float(v) => Ok(v),
            other => Err(Self::type_mismatch(tag, TagKind::Float, &other)),
        }
    }

    pub fn get_string(&self, tag: Tag) -> Result<String> {
        match self.effective(tag) {
            TagValue::String(v) => Ok(v),
            other => Err(Self::type_mismatch(tag, TagKind::String, &other)),
        }
    }

    pub fn get_bool(&self, tag: Tag) -> Result<bool> {
        match self.effective(tag) {
            TagValue::Bool(v) => Ok(v),
            other => Err(Self::type_mismatch(tag, TagKind::Bool, &other)),
        }
    }

    pub fn get_bytes(&self, tag: Tag) -> Result<Vec<u8>> {
        match self.effective(tag) {
            TagValue::Bytes(v) => Ok(v),
            other => Err(Self::type_mismatch(tag, TagKind::Bytes, &other)),
        }
    }

    /// Set a tag. The value kind must match the tag's registered kind.
    pub fn put(&mut self, tag: Tag, value: impl Into<TagValue>) -> Result<()> {
        let value = value.into();
        if value.kind() != tag.kind() {
            return Err(Self::type_mismatch(tag, tag.kind(), &value));
        }
        self.values.insert(tag, value);
        Ok(())
    }

    /// Set a tag unless the caller already supplied a value for it.
    pub(crate) fn put_if_absent(&mut self, tag: Tag, value: impl Into<TagValue>) -> Result<()> {
        if self.values.contains_key(&tag) {
            return Ok(());
        }
        self.put(tag, value)
    }

    /// Decode the definition map stored under TRACE_PARAMETER_DEFINITIONS.
    pub fn parameter_definitions(&self) -> Result<TraceParameterDefinitionMap> {
        let bytes = self.get_bytes(Tag::TraceParameterDefinitions)?;
        if bytes.is_empty() {
            return Ok(TraceParameterDefinitionMap::new());
        }
        TraceParameterDefinitionMap::from_bytes(&bytes)
    }

    pub fn set_parameter_definitions(
        &mut self,
        definitions: &TraceParameterDefinitionMap,
    ) -> Result<()> {
        self.put(Tag::TraceParameterDefinitions, definitions.to_bytes()?)
    }

    /// Parse a TLV header. Reading stops at the TRACE_BLOCK tag.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<MetaData> {
        let mut meta = MetaData::new();
        loop {
            let id = read_u8(reader)?;
            let tag = Tag::from_id(id)?;
            let length = read_length(reader)?;
            if tag == Tag::TraceBlock {
                break;
            }
            let mut raw = vec![0u8; length];
            reader.read_exact(&mut raw)?;
            let value = decode_value(tag.kind(), &raw)?;
            meta.values.insert(tag, value);
        }
        for tag in Tag::ALL {
            if tag.required() && !meta.values.contains_key(&tag) {
                return Err(TrsError::MissingRequiredTag(tag.name()));
            }
        }
        debug!(tags = meta.values.len(), "parsed TRS header");
        Ok(meta)
    }

    /// Emit the TLV header, terminated by a zero-length TRACE_BLOCK record.
    ///
    /// Int values are always written as 4 bytes, so re-emitting a header
    /// whose values only changed in place produces the same byte length.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let scale_x = self.get_float(Tag::ScaleX)?;
        if scale_x <= 0.0 {
            return Err(TrsError::Corrupted(format!(
                "SCALE_X must be positive, got {scale_x}"
            )));
        }
        let coding = Encoding::from_value(self.get_int(Tag::SampleCoding)?)?;
        if coding == Encoding::Illegal {
            return Err(TrsError::Corrupted("illegal sample encoding".to_string()));
        }

        for tag in Tag::ALL {
            if tag == Tag::TraceBlock {
                continue;
            }
            let value = self.effective(tag);
            if !tag.required() && value == tag.default_value() {
                continue;
            }
            let encoded = encode_value(&value);
            writer.write_all(&[tag.id()])?;
            write_length(writer, encoded.len())?;
            writer.write_all(&encoded)?;
        }
        writer.write_all(&[Tag::TraceBlock.id(), 0x00])?;
        Ok(())
    }
}

// Effective values decide equality, so a parsed header compares equal to
// the header it was emitted from even when defaults were elided.
impl PartialEq for MetaData {
    fn eq(&self, other: &Self) -> bool {
        Tag::ALL
            .iter()
            .all(|&tag| self.effective(tag) == other.effective(tag))
    }
}

fn decode_value(kind: TagKind, raw: &[u8]) -> Result<TagValue> {
    match kind {
        TagKind::Int => {
            if raw.is_empty() || raw.len() > 4 {
                return Err(TrsError::Corrupted(format!(
                    "int tag value is {} bytes",
                    raw.len()
                )));
            }
            let mut v: u32 = 0;
            for (i, &b) in raw.iter().enumerate() {
                v |= (b as u32) << (8 * i);
            }
            Ok(TagValue::Int(v as i32))
        }
        TagKind::Float => {
            let bytes: [u8; 4] = raw.try_into().map_err(|_| {
                TrsError::Corrupted(format!("float tag value is {} bytes", raw.len()))
            })?;
            Ok(TagValue::Float(f32::from_le_bytes(bytes)))
        }
        TagKind::String => Ok(TagValue::String(String::from_utf8(raw.to_vec())?)),
        TagKind::Bool => match raw.first() {
            Some(&b) => Ok(TagValue::Bool(b != 0)),
            None => Err(TrsError::Corrupted("empty bool tag value".to_string())),
        },
        TagKind::Bytes => Ok(TagValue::Bytes(raw.to_vec())),
    }
}

fn encode_value(value: &TagValue) -> Vec<u8> {
    match value {
        TagValue::Int(v) => v.to_le_bytes().to_vec(),
        TagValue::Float(v) => v.to_le_bytes().to_vec(),
        TagValue::String(v) => v.as_bytes().to_vec(),
        TagValue::Bool(v) => vec![*v as u8],
        TagValue::Bytes(v) => v.clone(),
    }
}

fn read_u8<R: Read>(reader: &mut R) -> Result<u8> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

/// Read a header length: one byte if < 0x80, otherwise the low 7 bits give
/// the number of little-endian length bytes that follow.
fn read_length<R: Read>(reader: &mut R) -> Result<usize> {
    let first = read_u8(reader)?;
    if first & 0x80 == 0 {
        return Ok(first as usize);
    }
    let n = (first & 0x7F) as usize;
    if n == 0 || n > 8 {
        return Err(TrsError::Corrupted(format!(
            "invalid length prefix 0x{first:02x}"
        )));
    }
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf[..n])?;
    let value = u64::from_le_bytes(buf);
    usize::try_from(value)
        .map_err(|_| TrsError::Corrupted(format!("length {value} does not fit in memory")))
}

fn write_length<W: Write>(writer: &mut W, length: usize) -> Result<()> {
    if length < 0x80 {
        writer.write_all(&[length as u8])?;
    } else {
        let bytes = (length as u64).to_le_bytes();
        let n = bytes.iter().rposition(|&b| b != 0).map_or(1, |i| i + 1);
        writer.write_all(&[0x80 | n as u8])?;
        writer.write_all(&bytes[..n])?;
    }
    Ok(())
}
