//! Search specification types.
//!
//! A [`SearchSpec`] names the stage sequence, the score threshold, the bifid
//! configuration and runtime limits. It is the input to the
//! [`super::validation::ValidationEngine`] and, once valid, to
//! [`super::context::SearchContext::build`].
//!
//! # JSON shape
//!
//! ```json
//! {
//!   "v": 1,
//!   "pipeline": "caesar>bifid>xor",
//!   "threshold": 0.8,
//!   "bifid": { "alphabet": "standard", "period": null },
//!   "runtime": { "workers": 4, "chunk_size": 10000 },
//!   "strict": false
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error_code::ErrorCode;
use super::errors::PipelineSpecError;
use crate::ciphers::BifidAlphabet;

/// Separator between stage names in a pipeline string.
pub const STAGE_DELIMITER: char = '>';

/// Number of rail counts tried by the railfence axis (2..=30).
pub const RAILFENCE_CARDINALITY: usize = 29;

/// Smallest rail count on the railfence axis.
pub const RAILFENCE_MIN_RAILS: usize = 2;

// ─── Stage vocabulary ───────────────────────────────────────────────────────

/// One transform in a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Caesar,
    Bifid,
    Columnar,
    DoubleColumnar,
    B64,
    Xor,
    Railfence,
    Reverse,
}

impl StageKind {
    /// Every stage, in the order used by help and error messages.
    pub const ALL: [StageKind; 8] = [
        Self::Caesar,
        Self::Bifid,
        Self::Columnar,
        Self::DoubleColumnar,
        Self::B64,
        Self::Xor,
        Self::Railfence,
        Self::Reverse,
    ];

    /// Returns the user-facing name used in pipelines and metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Caesar => "caesar",
            Self::Bifid => "bifid",
            Self::Columnar => "columnar",
            Self::DoubleColumnar => "double_columnar",
            Self::B64 => "b64",
            Self::Xor => "xor",
            Self::Railfence => "railfence",
            Self::Reverse => "reverse",
        }
    }

    /// Whether the stage consumes a parameter axis.
    pub fn is_parametric(&self) -> bool {
        !matches!(self, Self::B64 | Self::Reverse)
    }

    /// Whether the stage draws its parameter from the key dictionary.
    pub fn uses_keys(&self) -> bool {
        matches!(
            self,
            Self::Bifid | Self::Columnar | Self::DoubleColumnar | Self::Xor
        )
    }

    /// Size of this stage's axis for a dictionary of `key_count` keys.
    ///
    /// `None` for non-parametric stages, and for a key-pair axis whose size
    /// does not fit a `usize`.
    pub fn cardinality(&self, key_count: usize) -> Option<usize> {
        match self {
            Self::Caesar => Some(26),
            Self::Railfence => Some(RAILFENCE_CARDINALITY),
            Self::Bifid | Self::Columnar | Self::Xor => Some(key_count),
            Self::DoubleColumnar => key_count.checked_mul(key_count),
            Self::B64 | Self::Reverse => None,
        }
    }

    fn vocabulary() -> String {
        Self::ALL
            .iter()
            .map(StageKind::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageKind {
    type Err = PipelineSpecError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|stage| stage.as_str() == name)
            .ok_or_else(|| unknown_stage_error(&[name]))
    }
}

fn unknown_stage_error(names: &[&str]) -> PipelineSpecError {
    PipelineSpecError::new(
        ErrorCode::UnknownStage,
        "/pipeline",
        format!("unknown stage(s): {}", names.join(", ")),
    )
    .with_hint(format!("Valid stages: {}", StageKind::vocabulary()))
}

/// Parse a `>`-delimited pipeline string.
///
/// Segments are trimmed and empty segments dropped, so `" caesar >> xor "`
/// is `[Caesar, Xor]`. Every unrecognized name is reported in one error.
/// An empty result is not an error here; [`axes_for`] rejects it.
pub fn parse_pipeline(pipeline: &str) -> Result<Vec<StageKind>, PipelineSpecError> {
    let mut stages = Vec::new();
    let mut unknown = Vec::new();
    for name in pipeline
        .split(STAGE_DELIMITER)
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        match name.parse::<StageKind>() {
            Ok(stage) => stages.push(stage),
            Err(_) => unknown.push(name),
        }
    }
    if unknown.is_empty() {
        Ok(stages)
    } else {
        Err(unknown_stage_error(&unknown))
    }
}

/// Render stages back into pipeline syntax.
pub fn format_pipeline(stages: &[StageKind]) -> String {
    stages
        .iter()
        .map(StageKind::as_str)
        .collect::<Vec<_>>()
        .join(">")
}

// ─── Axes ───────────────────────────────────────────────────────────────────

/// The parameter axis contributed by one parametric stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageAxis {
    pub stage: StageKind,
    pub cardinality: usize,
}

impl StageAxis {
    pub fn name(&self) -> &'static str {
        self.stage.as_str()
    }
}

/// Axes for `stages`, in pipeline order, skipping non-parametric stages.
pub fn axes_for(stages: &[StageKind], key_count: usize) -> Result<Vec<StageAxis>, PipelineSpecError> {
    if stages.is_empty() {
        return Err(PipelineSpecError::new(
            ErrorCode::EmptyPipeline,
            "/pipeline",
            "pipeline has no stages",
        )
        .with_hint("Use stage names joined by '>', e.g. \"caesar>xor\""));
    }

    let mut axes = Vec::new();
    for &stage in stages.iter().filter(|s| s.is_parametric()) {
        let cardinality = stage.cardinality(key_count).ok_or_else(|| {
            PipelineSpecError::new(
                ErrorCode::SpaceOverflow,
                "/pipeline",
                format!("{stage} axis for {key_count} keys does not fit in memory indices"),
            )
            .with_hint("Lower runtime.key_limit")
        })?;
        axes.push(StageAxis { stage, cardinality });
    }
    Ok(axes)
}

// ─── Spec document ──────────────────────────────────────────────────────────

/// Top-level search specification (v1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSpec {
    /// Spec version (currently `1`).
    pub v: u32,

    /// Stage names joined by `>`.
    #[serde(default)]
    pub pipeline: String,

    /// Minimum combined score for a hit.
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    #[serde(default)]
    pub bifid: BifidSpec,

    /// Runtime execution limits.
    #[serde(default)]
    pub runtime: RuntimeSpec,

    /// If `true`, unrecognized fields are errors; if `false`, warnings.
    #[serde(default)]
    pub strict: bool,

    /// Captures any fields not recognized by the schema.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}

fn default_threshold() -> f64 {
    0.80
}

impl SearchSpec {
    /// A v1 spec for `pipeline` with every other field at its default.
    pub fn new(pipeline: impl Into<String>) -> Self {
        Self {
            v: 1,
            pipeline: pipeline.into(),
            threshold: default_threshold(),
            bifid: BifidSpec::default(),
            runtime: RuntimeSpec::default(),
            strict: false,
            unknown_fields: HashMap::new(),
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.runtime.workers = workers;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.runtime.chunk_size = chunk_size;
        self
    }

    pub fn with_bifid(mut self, bifid: BifidSpec) -> Self {
        self.bifid = bifid;
        self
    }

    pub fn with_stop_after_hits(mut self, hits: usize) -> Self {
        self.runtime.stop_after_hits = Some(hits);
        self
    }

    /// Parse from a JSON document.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Bifid square configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BifidSpec {
    #[serde(default)]
    pub alphabet: BifidAlphabet,

    /// Fractionation period. `None` treats the whole payload as one block.
    #[serde(default)]
    pub period: Option<usize>,

    /// Strip ciphertext characters outside the alphabet before searching.
    #[serde(default = "default_true")]
    pub normalize_input: bool,

    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}

fn default_true() -> bool {
    true
}

impl Default for BifidSpec {
    fn default() -> Self {
        Self {
            alphabet: BifidAlphabet::default(),
            period: None,
            normalize_input: true,
            unknown_fields: HashMap::new(),
        }
    }
}

/// Runtime limits and scheduling knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeSpec {
    /// Worker threads; `<= 1` runs sequentially on the calling thread.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Indices per worker task.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u64,

    /// Emit a progress report every N completed tasks (0 disables).
    #[serde(default = "default_progress_every")]
    pub progress_every: u64,

    /// Use only the first N dictionary keys (0 = all).
    #[serde(default)]
    pub key_limit: usize,

    /// Hits shown in the report (0 = all).
    #[serde(default = "default_max_hits")]
    pub max_hits: usize,

    /// Stop issuing tasks once this many hits were collected.
    #[serde(default)]
    pub stop_after_hits: Option<usize>,

    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}

fn default_workers() -> usize {
    1
}

fn default_chunk_size() -> u64 {
    10_000
}

fn default_progress_every() -> u64 {
    50
}

fn default_max_hits() -> usize {
    50
}

impl Default for RuntimeSpec {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            chunk_size: default_chunk_size(),
            progress_every: default_progress_every(),
            key_limit: 0,
            max_hits: default_max_hits(),
            stop_after_hits: None,
            unknown_fields: HashMap::new(),
        }
    }
}
