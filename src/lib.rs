// TRS trace set reader/writer
// Main library entry point

pub mod core;
pub mod params;

// Re-export main types
pub use crate::core::constants::Encoding;
pub use crate::core::error::{Result, TrsError};
pub use crate::core::metadata::{MetaData, TagValue};
pub use crate::core::tags::{Tag, TagKind};
pub use crate::core::trace::Trace;
pub use crate::core::traceset::{save, save_with, TraceSet};
pub use crate::params::defs::{ParameterDefinition, TraceParameterDefinitionMap};
pub use crate::params::map::{FrozenParameterMap, TraceParameterMap};
pub use crate::params::types::{ParameterType, ParameterValue};

#[cfg(test)]
mod tests {
    #[test]
    fn test_wire_codes() {
        use crate::{Encoding, Tag};
        assert_eq!(Encoding::Float.value(), 0x14);
        assert_eq!(Tag::TraceBlock.id(), 0x5F);
    }
}
