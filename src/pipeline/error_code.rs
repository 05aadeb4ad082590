//! Stable error codes for configuration diagnostics.

use serde::{Deserialize, Serialize};

/// Machine-readable code attached to every [`PipelineSpecError`].
///
/// [`PipelineSpecError`]: super::errors::PipelineSpecError
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The pipeline string has no stages.
    EmptyPipeline,
    /// One or more stage names are outside the stage vocabulary.
    UnknownStage,
    /// Bifid alphabet is not a usable Polybius square.
    InvalidAlphabet,
    /// Bifid fractionation period is not positive.
    InvalidPeriod,
    /// A runtime limit is out of its allowed range.
    LimitExceeded,
    /// Score threshold can never (or always) be met.
    ThresholdOutOfRange,
    /// The parameter space does not fit the index type.
    SpaceOverflow,
    /// A field the schema does not know.
    UnknownField,
    /// Generic failure raised by custom rules.
    ValidationFailed,
}

impl ErrorCode {
    /// Returns the snake_case name used in JSON and console output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyPipeline => "empty_pipeline",
            Self::UnknownStage => "unknown_stage",
            Self::InvalidAlphabet => "invalid_alphabet",
            Self::InvalidPeriod => "invalid_period",
            Self::LimitExceeded => "limit_exceeded",
            Self::ThresholdOutOfRange => "threshold_out_of_range",
            Self::SpaceOverflow => "space_overflow",
            Self::UnknownField => "unknown_field",
            Self::ValidationFailed => "validation_failed",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
