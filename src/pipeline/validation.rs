//! Validation engine for search specifications.
//!
//! The engine runs all registered [`ValidationRule`]s against a
//! [`SearchSpec`] and collects every diagnostic into a [`ValidationReport`].
//! It never stops at the first error, so users see all problems at once.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use rapid_decipher::pipeline::validation::ValidationEngine;
//!
//! let engine = ValidationEngine::with_defaults();
//! let report = engine.validate(&spec);
//! if report.has_errors() {
//!     for err in report.errors() {
//!         eprintln!("{err}");
//!     }
//! }
//! ```

use std::collections::HashMap;

use serde::Serialize;

use super::error_code::ErrorCode;
use super::errors::{InvalidSpec, PipelineSpecError};
use super::spec::{parse_pipeline, SearchSpec};

/// Highest score [`crate::scoring::combined_score`] can produce.
const MAX_SCORE: f64 = 2.0;

// ─── Severity ───────────────────────────────────────────────────────────────

/// Whether a diagnostic is a hard error or a soft warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

// ─── Diagnostic ─────────────────────────────────────────────────────────────

/// A single validation finding wrapping a [`PipelineSpecError`].
#[derive(Debug, Clone, Serialize)]
pub struct ValidationDiagnostic {
    pub severity: Severity,
    #[serde(flatten)]
    pub error: PipelineSpecError,
}

impl ValidationDiagnostic {
    pub fn error(err: PipelineSpecError) -> Self {
        Self {
            severity: Severity::Error,
            error: err,
        }
    }

    pub fn warning(err: PipelineSpecError) -> Self {
        Self {
            severity: Severity::Warning,
            error: err,
        }
    }
}

// ─── Report ─────────────────────────────────────────────────────────────────

/// Collected diagnostics from running all validation rules.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    /// Iterate over error-severity diagnostics.
    pub fn errors(&self) -> impl Iterator<Item = &PipelineSpecError> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .map(|d| &d.error)
    }

    /// Iterate over warning-severity diagnostics.
    pub fn warnings(&self) -> impl Iterator<Item = &PipelineSpecError> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .map(|d| &d.error)
    }

    /// Returns `true` if any diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Returns `true` if there are no errors (warnings are acceptable).
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Convert into `Err(InvalidSpec)` when any error is present.
    pub fn into_result(self) -> Result<Vec<PipelineSpecError>, InvalidSpec> {
        if self.has_errors() {
            Err(InvalidSpec {
                errors: self.errors().cloned().collect(),
            })
        } else {
            Ok(self.warnings().cloned().collect())
        }
    }
}

// ─── Rule trait ─────────────────────────────────────────────────────────────

/// A single validation rule that inspects a [`SearchSpec`] and returns zero
/// or more diagnostics.
///
/// Rules are stateless and must be `Send + Sync` so one engine can be shared
/// across threads.
pub trait ValidationRule: Send + Sync {
    /// Short, stable identifier for this rule (e.g., `"bifid_period"`).
    fn name(&self) -> &str;

    /// Inspect `spec` and return any findings.
    fn validate(&self, spec: &SearchSpec) -> Vec<ValidationDiagnostic>;
}

// ─── Engine ─────────────────────────────────────────────────────────────────

/// Runs a set of [`ValidationRule`]s against a [`SearchSpec`].
pub struct ValidationEngine {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl ValidationEngine {
    /// Create an empty engine with no rules.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Create an engine pre-loaded with the default rule set.
    pub fn with_defaults() -> Self {
        let mut engine = Self::new();
        engine.add_rule(Box::new(VersionRule));
        engine.add_rule(Box::new(PipelineStagesRule));
        engine.add_rule(Box::new(BifidAlphabetRule));
        engine.add_rule(Box::new(BifidPeriodRule));
        engine.add_rule(Box::new(ThresholdRangeRule));
        engine.add_rule(Box::new(RuntimeLimitsRule));
        engine.add_rule(Box::new(UnknownFieldsRule));
        engine
    }

    /// Register an additional rule.
    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    /// Names of the registered rules, in run order.
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Run all rules against `spec` and return the collected report.
    pub fn validate(&self, spec: &SearchSpec) -> ValidationReport {
        let mut report = ValidationReport::default();
        for rule in &self.rules {
            report.diagnostics.extend(rule.validate(spec));
        }
        report
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Concrete rules
// ═══════════════════════════════════════════════════════════════════════════

// ─── 1. Spec version ────────────────────────────────────────────────────────

struct VersionRule;

impl ValidationRule for VersionRule {
    fn name(&self) -> &str {
        "version"
    }

    fn validate(&self, spec: &SearchSpec) -> Vec<ValidationDiagnostic> {
        if spec.v == 1 {
            return vec![];
        }
        vec![ValidationDiagnostic::error(
            PipelineSpecError::new(
                ErrorCode::ValidationFailed,
                "/v",
                format!("unsupported spec version {}", spec.v),
            )
            .with_hint("Set \"v\": 1"),
        )]
    }
}

// ─── 2. Pipeline must parse and be non-empty ────────────────────────────────

struct PipelineStagesRule;

impl ValidationRule for PipelineStagesRule {
    fn name(&self) -> &str {
        "pipeline_stages"
    }

    fn validate(&self, spec: &SearchSpec) -> Vec<ValidationDiagnostic> {
        match parse_pipeline(&spec.pipeline) {
            Err(err) => vec![ValidationDiagnostic::error(err)],
            Ok(stages) if stages.is_empty() => vec![ValidationDiagnostic::error(
                PipelineSpecError::new(
                    ErrorCode::EmptyPipeline,
                    "/pipeline",
                    "pipeline has no stages",
                )
                .with_hint("Use stage names joined by '>', e.g. \"caesar>xor\""),
            )],
            Ok(_) => vec![],
        }
    }
}

// ─── 3. Bifid alphabet must form a square ───────────────────────────────────

struct BifidAlphabetRule;

impl ValidationRule for BifidAlphabetRule {
    fn name(&self) -> &str {
        "bifid_alphabet"
    }

    fn validate(&self, spec: &SearchSpec) -> Vec<ValidationDiagnostic> {
        match spec.bifid.alphabet.side() {
            Ok(_) => vec![],
            Err(err) => vec![ValidationDiagnostic::error(
                PipelineSpecError::new(ErrorCode::InvalidAlphabet, "/bifid/alphabet", err.to_string())
                    .with_hint("Use \"standard\", \"base64\", or a custom alphabet of 4, 9, 16, 25, ... unique ASCII characters"),
            )],
        }
    }
}

// ─── 4. Bifid period must be positive when set ──────────────────────────────

struct BifidPeriodRule;

impl ValidationRule for BifidPeriodRule {
    fn name(&self) -> &str {
        "bifid_period"
    }

    fn validate(&self, spec: &SearchSpec) -> Vec<ValidationDiagnostic> {
        if spec.bifid.period == Some(0) {
            vec![ValidationDiagnostic::error(
                PipelineSpecError::new(ErrorCode::InvalidPeriod, "/bifid/period", "period must be > 0")
                    .with_hint("Remove period to fractionate the whole payload as one block"),
            )]
        } else {
            vec![]
        }
    }
}

// ─── 5. Threshold inside the score range ────────────────────────────────────

struct ThresholdRangeRule;

impl ValidationRule for ThresholdRangeRule {
    fn name(&self) -> &str {
        "threshold_range"
    }

    fn validate(&self, spec: &SearchSpec) -> Vec<ValidationDiagnostic> {
        let t = spec.threshold;
        if t.is_nan() {
            return vec![ValidationDiagnostic::error(PipelineSpecError::new(
                ErrorCode::ThresholdOutOfRange,
                "/threshold",
                "threshold is NaN",
            ))];
        }
        if (0.0..=MAX_SCORE).contains(&t) {
            return vec![];
        }
        let effect = if t < 0.0 {
            "every attempt will be a hit"
        } else {
            "no attempt can be a hit"
        };
        vec![ValidationDiagnostic::warning(
            PipelineSpecError::new(
                ErrorCode::ThresholdOutOfRange,
                "/threshold",
                format!("threshold {t} is outside [0, {MAX_SCORE}]; {effect}"),
            )
            .with_hint("Scores below 1.0 are printable ratios; 1.0 to 2.0 are printable text"),
        )]
    }
}

// ─── 6. Runtime limits must be positive ─────────────────────────────────────

struct RuntimeLimitsRule;

impl ValidationRule for RuntimeLimitsRule {
    fn name(&self) -> &str {
        "runtime_limits"
    }

    fn validate(&self, spec: &SearchSpec) -> Vec<ValidationDiagnostic> {
        let mut out = Vec::new();

        if spec.runtime.chunk_size == 0 {
            out.push(ValidationDiagnostic::error(
                PipelineSpecError::new(
                    ErrorCode::LimitExceeded,
                    "/runtime/chunk_size",
                    "chunk_size must be greater than 0",
                )
                .with_hint("The default is 10000"),
            ));
        }

        if spec.runtime.stop_after_hits == Some(0) {
            out.push(ValidationDiagnostic::error(
                PipelineSpecError::new(
                    ErrorCode::LimitExceeded,
                    "/runtime/stop_after_hits",
                    "stop_after_hits must be greater than 0",
                )
                .with_hint("Remove stop_after_hits to search the whole space"),
            ));
        }

        out
    }
}

// ─── 7. Unknown fields (strict → error, non-strict → warning) ──────────────

struct UnknownFieldsRule;

impl UnknownFieldsRule {
    /// Diagnostics for the extra fields captured at JSON pointer `path`,
    /// sorted by key.
    fn check_unknowns(
        path: &str,
        unknowns: &HashMap<String, serde_json::Value>,
        strict: bool,
    ) -> Vec<ValidationDiagnostic> {
        let mut keys: Vec<_> = unknowns.keys().collect();
        keys.sort();
        keys.into_iter()
            .map(|key| {
                let diag_fn = if strict {
                    ValidationDiagnostic::error
                } else {
                    ValidationDiagnostic::warning
                };
                diag_fn(
                    PipelineSpecError::new(
                        ErrorCode::UnknownField,
                        format!("{path}/{key}"),
                        format!("unrecognized field \"{key}\""),
                    )
                    .with_hint("Check spelling or remove this field"),
                )
            })
            .collect()
    }
}

impl ValidationRule for UnknownFieldsRule {
    fn name(&self) -> &str {
        "unknown_fields"
    }

    fn validate(&self, spec: &SearchSpec) -> Vec<ValidationDiagnostic> {
        let mut out = Vec::new();
        out.extend(Self::check_unknowns("", &spec.unknown_fields, spec.strict));
        out.extend(Self::check_unknowns(
            "/bifid",
            &spec.bifid.unknown_fields,
            spec.strict,
        ));
        out.extend(Self::check_unknowns(
            "/runtime",
            &spec.runtime.unknown_fields,
            spec.strict,
        ));
        out
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: build a SearchSpec from JSON.
    fn spec(json: &str) -> SearchSpec {
        serde_json::from_str(json).unwrap()
    }

    fn engine() -> ValidationEngine {
        ValidationEngine::with_defaults()
    }

    // ─── Valid specs ────────────────────────────────────────────────────

    #[test]
    fn test_minimal_spec_is_valid() {
        let report = engine().validate(&spec(r#"{ "v": 1, "pipeline": "caesar" }"#));
        assert!(report.is_valid());
        assert!(report.is_empty());
    }

    #[test]
    fn test_full_spec_is_valid() {
        let report = engine().validate(&spec(
            r#"{
                "v": 1,
                "pipeline": "b64 > xor > bifid",
                "threshold": 1.5,
                "bifid": { "alphabet": "base64", "period": 10, "normalize_input": false },
                "runtime": { "workers": 8, "chunk_size": 500, "stop_after_hits": 3 },
                "strict": true
            }"#,
        ));
        assert!(report.is_valid(), "{:?}", report.diagnostics);
        assert!(report.is_empty());
    }

    // ─── Rule: version ──────────────────────────────────────────────────

    #[test]
    fn test_unsupported_version_fails() {
        let report = engine().validate(&spec(r#"{ "v": 2, "pipeline": "caesar" }"#));
        let errs: Vec<_> = report.errors().collect();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].path, "/v");
    }

    // ─── Rule: pipeline_stages ──────────────────────────────────────────

    #[test]
    fn test_empty_pipeline_fails() {
        let report = engine().validate(&spec(r#"{ "v": 1 }"#));
        let errs: Vec<_> = report.errors().collect();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].code, ErrorCode::EmptyPipeline);
        assert_eq!(errs[0].path, "/pipeline");
    }

    #[test]
    fn test_unknown_stages_fail_once_with_all_names() {
        let report = engine().validate(&spec(r#"{ "v": 1, "pipeline": "rot13>caesar>atbash" }"#));
        let errs: Vec<_> = report.errors().collect();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].code, ErrorCode::UnknownStage);
        assert!(errs[0].message.contains("rot13"));
        assert!(errs[0].message.contains("atbash"));
    }

    // ─── Rule: bifid_alphabet ───────────────────────────────────────────

    #[test]
    fn test_non_square_alphabet_fails() {
        let report = engine().validate(&spec(
            r#"{ "v": 1, "pipeline": "bifid", "bifid": { "alphabet": { "custom": "ABCDEFGHIJ" } } }"#,
        ));
        let errs: Vec<_> = report.errors().collect();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].code, ErrorCode::InvalidAlphabet);
        assert!(errs[0].message.contains("10"));
    }

    #[test]
    fn test_duplicate_alphabet_fails() {
        let report = engine().validate(&spec(
            r#"{ "v": 1, "pipeline": "bifid", "bifid": { "alphabet": { "custom": "ABCA" } } }"#,
        ));
        assert_eq!(report.errors().next().unwrap().code, ErrorCode::InvalidAlphabet);
    }

    // ─── Rule: bifid_period ─────────────────────────────────────────────

    #[test]
    fn test_zero_period_fails() {
        let report = engine().validate(&spec(
            r#"{ "v": 1, "pipeline": "bifid", "bifid": { "period": 0 } }"#,
        ));
        let errs: Vec<_> = report.errors().collect();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].code, ErrorCode::InvalidPeriod);
        assert_eq!(errs[0].path, "/bifid/period");
    }

    // ─── Rule: threshold_range ──────────────────────────────────────────

    #[test]
    fn test_threshold_above_range_warns() {
        let report = engine().validate(&spec(r#"{ "v": 1, "pipeline": "xor", "threshold": 2.5 }"#));
        assert!(report.is_valid());
        let warns: Vec<_> = report.warnings().collect();
        assert_eq!(warns.len(), 1);
        assert_eq!(warns[0].code, ErrorCode::ThresholdOutOfRange);
        assert!(warns[0].message.contains("no attempt"));
    }

    #[test]
    fn test_negative_threshold_warns() {
        let report = engine().validate(&spec(r#"{ "v": 1, "pipeline": "xor", "threshold": -1 }"#));
        assert!(report.is_valid());
        assert!(report.warnings().next().unwrap().message.contains("every attempt"));
    }

    #[test]
    fn test_threshold_bounds_are_inclusive() {
        for t in ["0", "2"] {
            let json = format!(r#"{{ "v": 1, "pipeline": "xor", "threshold": {t} }}"#);
            assert!(engine().validate(&spec(&json)).is_empty());
        }
    }

    // ─── Rule: runtime_limits ───────────────────────────────────────────

    #[test]
    fn test_zero_chunk_size_fails() {
        let report = engine().validate(&spec(
            r#"{ "v": 1, "pipeline": "caesar", "runtime": { "chunk_size": 0 } }"#,
        ));
        let errs: Vec<_> = report.errors().collect();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].code, ErrorCode::LimitExceeded);
        assert_eq!(errs[0].path, "/runtime/chunk_size");
    }

    #[test]
    fn test_zero_stop_after_hits_fails() {
        let report = engine().validate(&spec(
            r#"{ "v": 1, "pipeline": "caesar", "runtime": { "stop_after_hits": 0 } }"#,
        ));
        assert_eq!(report.errors().next().unwrap().path, "/runtime/stop_after_hits");
    }

    // ─── Rule: unknown_fields ───────────────────────────────────────────

    #[test]
    fn test_unknown_fields_warn_when_not_strict() {
        let report = engine().validate(&spec(
            r#"{ "v": 1, "pipeline": "caesar", "zeta": 1, "alpha": 2, "bifid": { "perod": 3 } }"#,
        ));
        assert!(report.is_valid());
        let paths: Vec<_> = report.warnings().map(|w| w.path.as_str()).collect();
        assert_eq!(paths, vec!["/alpha", "/zeta", "/bifid/perod"]);
    }

    #[test]
    fn test_unknown_fields_fail_when_strict() {
        let report = engine().validate(&spec(
            r#"{ "v": 1, "pipeline": "caesar", "strict": true, "runtime": { "wrkers": 4 } }"#,
        ));
        let errs: Vec<_> = report.errors().collect();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].code, ErrorCode::UnknownField);
        assert_eq!(errs[0].path, "/runtime/wrkers");
    }

    // ─── Multiple errors ────────────────────────────────────────────────

    #[test]
    fn test_collects_all_errors() {
        let report = engine().validate(&spec(
            r#"{
                "v": 1,
                "pipeline": "nope",
                "bifid": { "alphabet": { "custom": "ABC" }, "period": 0 },
                "runtime": { "chunk_size": 0 }
            }"#,
        ));
        let codes: Vec<_> = report.errors().map(|e| e.code).collect();
        assert_eq!(
            codes,
            vec![
                ErrorCode::UnknownStage,
                ErrorCode::InvalidAlphabet,
                ErrorCode::InvalidPeriod,
                ErrorCode::LimitExceeded,
            ]
        );
    }

    #[test]
    fn test_into_result() {
        let ok = engine()
            .validate(&spec(r#"{ "v": 1, "pipeline": "caesar", "extra": true }"#))
            .into_result()
            .unwrap();
        assert_eq!(ok.len(), 1);

        let err = engine()
            .validate(&spec(r#"{ "v": 1 }"#))
            .into_result()
            .unwrap_err();
        assert_eq!(err.first_code(), Some(ErrorCode::EmptyPipeline));
    }

    // ─── Custom rules ───────────────────────────────────────────────────

    struct NoReverseRule;

    impl ValidationRule for NoReverseRule {
        fn name(&self) -> &str {
            "no_reverse"
        }

        fn validate(&self, spec: &SearchSpec) -> Vec<ValidationDiagnostic> {
            if spec.pipeline.contains("reverse") {
                vec![ValidationDiagnostic::error(PipelineSpecError::new(
                    ErrorCode::ValidationFailed,
                    "/pipeline",
                    "reverse is disabled here",
                ))]
            } else {
                vec![]
            }
        }
    }

    #[test]
    fn test_custom_rule() {
        let mut engine = ValidationEngine::new();
        engine.add_rule(Box::new(NoReverseRule));
        assert_eq!(engine.rule_names(), vec!["no_reverse"]);
        let report = engine.validate(&spec(r#"{ "v": 1, "pipeline": "reverse" }"#));
        assert!(report.has_errors());
    }

    #[test]
    fn test_report_serializes_flat() {
        let report = engine().validate(&spec(r#"{ "v": 1, "pipeline": "caesar", "x": 1 }"#));
        let json = serde_json::to_value(&report).unwrap();
        let diag = &json["diagnostics"][0];
        assert_eq!(diag["severity"], "warning");
        assert_eq!(diag["code"], "unknown_field");
        assert_eq!(diag["path"], "/x");
    }
}
