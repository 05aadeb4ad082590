//! Configuration errors.
//!
//! Every problem found before a search starts is a [`PipelineSpecError`]:
//! a stable [`ErrorCode`], a JSON-pointer path into the spec, a message and
//! an optional hint. [`InvalidSpec`] carries all errors of one validation
//! pass so they can be reported together.

use std::fmt;

use serde::Serialize;

use super::error_code::ErrorCode;

/// A single configuration problem.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineSpecError {
    pub code: ErrorCode,
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl PipelineSpecError {
    pub fn new(code: ErrorCode, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            path: path.into(),
            message: message.into(),
            hint: None,
        }
    }

    /// Attach a remediation hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl fmt::Display for PipelineSpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if !self.path.is_empty() {
            write!(f, " (at {})", self.path)?;
        }
        if let Some(hint) = &self.hint {
            write!(f, "; hint: {hint}")?;
        }
        Ok(())
    }
}

impl std::error::Error for PipelineSpecError {}

/// All errors found while turning a spec into a runnable search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvalidSpec {
    pub errors: Vec<PipelineSpecError>,
}

impl InvalidSpec {
    /// Returns the first error's code, if any.
    pub fn first_code(&self) -> Option<ErrorCode> {
        self.errors.first().map(|e| e.code)
    }
}

impl From<PipelineSpecError> for InvalidSpec {
    fn from(err: PipelineSpecError) -> Self {
        Self { errors: vec![err] }
    }
}

impl fmt::Display for InvalidSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid search spec: {} error(s)", self.errors.len())?;
        for err in &self.errors {
            write!(f, "\n  {err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for InvalidSpec {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_path_and_hint() {
        let err = PipelineSpecError::new(ErrorCode::InvalidPeriod, "/bifid/period", "period must be > 0")
            .with_hint("Use null for whole-message blocks");
        assert_eq!(
            err.to_string(),
            "[invalid_period] period must be > 0 (at /bifid/period); hint: Use null for whole-message blocks"
        );
    }

    #[test]
    fn test_display_without_path() {
        let err = PipelineSpecError::new(ErrorCode::ValidationFailed, "", "boom");
        assert_eq!(err.to_string(), "[validation_failed] boom");
    }

    #[test]
    fn test_invalid_spec_lists_every_error() {
        let spec = InvalidSpec {
            errors: vec![
                PipelineSpecError::new(ErrorCode::EmptyPipeline, "/pipeline", "empty"),
                PipelineSpecError::new(ErrorCode::LimitExceeded, "/runtime/chunk_size", "zero"),
            ],
        };
        let text = spec.to_string();
        assert!(text.starts_with("invalid search spec: 2 error(s)"));
        assert!(text.contains("[empty_pipeline] empty"));
        assert!(text.contains("[limit_exceeded] zero"));
        assert_eq!(spec.first_code(), Some(ErrorCode::EmptyPipeline));
    }

    #[test]
    fn test_serializes_without_null_hint() {
        let err = PipelineSpecError::new(ErrorCode::UnknownStage, "/pipeline", "bad");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "unknown_stage");
        assert!(json.get("hint").is_none());
    }
}
