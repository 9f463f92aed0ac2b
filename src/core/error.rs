// Error handling for TRS trace sets

use thiserror::Error;

use crate::core::constants::Encoding;

pub type Result<T> = std::result::Result<T, TrsError>;

#[derive(Error, Debug)]
pub enum TrsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown header tag 0x{0:02x}")]
    UnknownTag(u8),

    #[error("unknown sample coding '{0}'")]
    UnknownEncoding(i32),

    #[error("unknown trace parameter type 0x{0:02x}")]
    UnknownParameterType(u8),

    #[error("required header tag {0} is missing")]
    MissingRequiredTag(&'static str),

    #[error("trace set has not been opened or has been closed")]
    NotOpen,

    #[error("trace set is open in {actual} mode, but the operation needs {needed} mode")]
    WrongMode {
        needed: &'static str,
        actual: &'static str,
    },

    #[error("requested trace index ({index}) is larger than the total number of available traces ({count})")]
    IndexOutOfBounds { index: usize, count: usize },

    #[error("trace {field} ({got}) differs from the previous trace(s) ({expected})")]
    ShapeMismatch {
        field: &'static str,
        got: f64,
        expected: f64,
    },

    #[error("sample value {value} does not fit the {coding:?} encoding")]
    SampleOutOfRange { value: f32, coding: Encoding },

    #[error("parameter data is {actual} bytes, but the definitions describe {expected} bytes")]
    ParameterLengthMismatch { actual: usize, expected: usize },

    #[error("parameter {key} holds a {actual}, not a {requested}")]
    TypeMismatch {
        key: String,
        requested: &'static str,
        actual: &'static str,
    },

    #[error("parameter {0} was not found in the trace set")]
    KeyNotFound(String),

    #[error("invalid UTF-8 string")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("corrupted trace set: {0}")]
    Corrupted(String),
}
