// TRS header tag registry

use crate::core::constants::Encoding;
use crate::core::error::{Result, TrsError};
use crate::core::metadata::TagValue;

/// Kind of value carried by a header tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Int,
    Float,
    String,
    Bool,
    Bytes,
}

impl TagKind {
    pub fn name(self) -> &'static str {
        match self {
            TagKind::Int => "int",
            TagKind::Float => "float",
            TagKind::String => "string",
            TagKind::Bool => "bool",
            TagKind::Bytes => "bytes",
        }
    }
}

/// The known TRS header tags. TRACE_BLOCK terminates the header and marks
/// the start of the trace data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    NumberOfTraces,
    NumberOfSamples,
    SampleCoding,
    DataLength,
    TitleSpace,
    GlobalTitle,
    Description,
    OffsetX,
    LabelX,
    LabelY,
    ScaleX,
    ScaleY,
    TraceOffset,
    LogarithmicScale,
    TrsVersion,
    AcquisitionRangeOfScope,
    AcquisitionCouplingOfScope,
    AcquisitionOffsetOfScope,
    AcquisitionInputImpedance,
    AcquisitionDeviceId,
    AcquisitionTypeFilter,
    AcquisitionFrequencyFilter,
    AcquisitionRangeFilter,
    TraceBlock,
    ExternalClockUsed,
    ExternalClockThreshold,
    ExternalClockMultiplier,
    ExternalClockPhaseShift,
    ExternalClockResamplerMask,
    ExternalClockResamplerEnabled,
    ExternalClockFrequency,
    ExternalClockBase,
    NumberView,
    TraceOverlap,
    GoLastTrace,
    InputOffset,
    OutputOffset,
    KeyOffset,
    InputLength,
    OutputLength,
    KeyLength,
    NumberOfEnabledChannels,
    NumberOfUsedOscilloscopes,
    XyScanWidth,
    XyScanHeight,
    XyMeasurementsPerSpot,
    TraceSetParameters,
    TraceParameterDefinitions,
}

impl Tag {
    /// Every known tag, in identifier order. Serialization walks this list.
    pub const ALL: [Tag; 48] = [
        Tag::NumberOfTraces,
        Tag::NumberOfSamples,
        Tag::SampleCoding,
        Tag::DataLength,
        Tag::TitleSpace,
        Tag::GlobalTitle,
        Tag::Description,
        Tag::OffsetX,
        Tag::LabelX,
        Tag::LabelY,
        Tag::ScaleX,
        Tag::ScaleY,
        Tag::TraceOffset,
        Tag::LogarithmicScale,
        Tag::TrsVersion,
        Tag::AcquisitionRangeOfScope,
        Tag::AcquisitionCouplingOfScope,
        Tag::AcquisitionOffsetOfScope,
        Tag::AcquisitionInputImpedance,
        Tag::AcquisitionDeviceId,
        Tag::AcquisitionTypeFilter,
        Tag::AcquisitionFrequencyFilter,
        Tag::AcquisitionRangeFilter,
        Tag::TraceBlock,
        Tag::ExternalClockUsed,
        Tag::ExternalClockThreshold,
        Tag::ExternalClockMultiplier,
        Tag::ExternalClockPhaseShift,
        Tag::ExternalClockResamplerMask,
        Tag::ExternalClockResamplerEnabled,
        Tag::ExternalClockFrequency,
        Tag::ExternalClockBase,
        Tag::NumberView,
        Tag::TraceOverlap,
        Tag::GoLastTrace,
        Tag::InputOffset,
        Tag::OutputOffset,
        Tag::KeyOffset,
        Tag::InputLength,
        Tag::OutputLength,
        Tag::KeyLength,
        Tag::NumberOfEnabledChannels,
        Tag::NumberOfUsedOscilloscopes,
        Tag::XyScanWidth,
        Tag::XyScanHeight,
        Tag::XyMeasurementsPerSpot,
        Tag::TraceSetParameters,
        Tag::TraceParameterDefinitions,
    ];

    fn info(self) -> (u8, &'static str, TagKind, bool) {
        match self {
            Tag::NumberOfTraces => (0x41, "NUMBER_OF_TRACES", TagKind::Int, true),
            Tag::NumberOfSamples => (0x42, "NUMBER_OF_SAMPLES", TagKind::Int, true),
            Tag::SampleCoding => (0x43, "SAMPLE_CODING", TagKind::Int, true),
            Tag::DataLength => (0x44, "DATA_LENGTH", TagKind::Int, false),
            Tag::TitleSpace => (0x45, "TITLE_SPACE", TagKind::Int, false),
            Tag::GlobalTitle => (0x46, "GLOBAL_TITLE", TagKind::String, false),
            Tag::Description => (0x47, "DESCRIPTION", TagKind::String, false),
            Tag::OffsetX => (0x48, "OFFSET_X", TagKind::Int, false),
            Tag::LabelX => (0x49, "LABEL_X", TagKind::String, false),
            Tag::LabelY => (0x4A, "LABEL_Y", TagKind::String, false),
            Tag::ScaleX => (0x4B, "SCALE_X", TagKind::Float, false),
            Tag::ScaleY => (0x4C, "SCALE_Y", TagKind::Float, false),
            Tag::TraceOffset => (0x4D, "TRACE_OFFSET", TagKind::Int, false),
            Tag::LogarithmicScale => (0x4E, "LOGARITHMIC_SCALE", TagKind::Bool, false),
            Tag::TrsVersion => (0x4F, "TRS_VERSION", TagKind::Int, false),
            Tag::AcquisitionRangeOfScope => (0x55, "ACQUISITION_RANGE_OF_SCOPE", TagKind::Float, false),
            Tag::AcquisitionCouplingOfScope => (0x56, "ACQUISITION_COUPLING_OF_SCOPE", TagKind::Int, false),
            Tag::AcquisitionOffsetOfScope => (0x57, "ACQUISITION_OFFSET_OF_SCOPE", TagKind::Float, false),
            Tag::AcquisitionInputImpedance => (0x58, "ACQUISITION_INPUT_IMPEDANCE", TagKind::Float, false),
            Tag::AcquisitionDeviceId => (0x59, "ACQUISITION_DEVICE_ID", TagKind::String, false),
            Tag::AcquisitionTypeFilter => (0x5A, "ACQUISITION_TYPE_FILTER", TagKind::Int, false),
            Tag::AcquisitionFrequencyFilter => (0x5B, "ACQUISITION_FREQUENCY_FILTER", TagKind::Float, false),
            Tag::AcquisitionRangeFilter => (0x5C, "ACQUISITION_RANGE_FILTER", TagKind::Float, false),
            Tag::TraceBlock => (0x5F, "TRACE_BLOCK", TagKind::Bytes, false),
            Tag::ExternalClockUsed => (0x60, "EXTERNAL_CLOCK_USED", TagKind::Bool, false),
            Tag::ExternalClockThreshold => (0x61, "EXTERNAL_CLOCK_THRESHOLD", TagKind::Float, false),
            Tag::ExternalClockMultiplier => (0x62, "EXTERNAL_CLOCK_MULTIPLIER", TagKind::Int, false),
            Tag::ExternalClockPhaseShift => (0x63, "EXTERNAL_CLOCK_PHASE_SHIFT", TagKind::Int, false),
            Tag::ExternalClockResamplerMask => (0x64, "EXTERNAL_CLOCK_RESAMPLER_MASK", TagKind::Int, false),
            Tag::ExternalClockResamplerEnabled => (0x65, "EXTERNAL_CLOCK_RESAMPLER_ENABLED", TagKind::Bool, false),
            Tag::ExternalClockFrequency => (0x66, "EXTERNAL_CLOCK_FREQUENCY", TagKind::Float, false),
            Tag::ExternalClockBase => (0x67, "EXTERNAL_CLOCK_BASE", TagKind::Int, false),
            Tag::NumberView => (0x68, "NUMBER_VIEW", TagKind::Int, false),
            Tag::TraceOverlap => (0x69, "TRACE_OVERLAP", TagKind::Bool, false),
            Tag::GoLastTrace => (0x6A, "GO_LAST_TRACE", TagKind::Bool, false),
            Tag::InputOffset => (0x6B, "INPUT_OFFSET", TagKind::Int, false),
            Tag::OutputOffset => (0x6C, "OUTPUT_OFFSET", TagKind::Int, false),
            Tag::KeyOffset => (0x6D, "KEY_OFFSET", TagKind::Int, false),
            Tag::InputLength => (0x6E, "INPUT_LENGTH", TagKind::Int, false),
            Tag::OutputLength => (0x6F, "OUTPUT_LENGTH", TagKind::Int, false),
            Tag::KeyLength => (0x70, "KEY_LENGTH", TagKind::Int, false),
            Tag::NumberOfEnabledChannels => (0x71, "NUMBER_OF_ENABLED_CHANNELS", TagKind::Int, false),
            Tag::NumberOfUsedOscilloscopes => (0x72, "NUMBER_OF_USED_OSCILLOSCOPES", TagKind::Int, false),
            Tag::XyScanWidth => (0x73, "XY_SCAN_WIDTH", TagKind::Int, false),
            Tag::XyScanHeight => (0x74, "XY_SCAN_HEIGHT", TagKind::Int, false),
            Tag::XyMeasurementsPerSpot => (0x75, "XY_MEASUREMENTS_PER_SPOT", TagKind::Int, false),
            Tag::TraceSetParameters => (0x76, "TRACE_SET_PARAMETERS", TagKind::Bytes, false),
            Tag::TraceParameterDefinitions => (0x77, "TRACE_PARAMETER_DEFINITIONS", TagKind::Bytes, false),
        }
    }

    pub fn from_id(id: u8) -> Result<Self> {
        Tag::ALL
            .iter()
            .copied()
            .find(|tag| tag.id() == id)
            .ok_or(TrsError::UnknownTag(id))
    }

    pub fn by_name(name: &str) -> Option<Self> {
        Tag::ALL.iter().copied().find(|tag| tag.name() == name)
    }

    /// Single-byte identifier as written to the file.
    pub fn id(self) -> u8 {
        self.info().0
    }

    pub fn name(self) -> &'static str {
        self.info().1
    }

    pub fn kind(self) -> TagKind {
        self.info().2
    }

    /// Whether the tag must be present in every valid header.
    pub fn required(self) -> bool {
        self.info().3
    }

    pub fn default_value(self) -> TagValue {
        match self {
            Tag::SampleCoding => TagValue::Int(Encoding::Byte.value()),
            Tag::TitleSpace => TagValue::Int(255),
            Tag::GlobalTitle => TagValue::String("trace".to_string()),
            Tag::ScaleX | Tag::ScaleY => TagValue::Float(1.0),
            _ => match self.kind() {
                TagKind::Int => TagValue::Int(0),
                TagKind::Float => TagValue::Float(0.0),
                TagKind::String => TagValue::String(String::new()),
                TagKind::Bool => TagValue::Bool(false),
                TagKind::Bytes => TagValue::Bytes(Vec::new()),
            },
        }
    }
}
