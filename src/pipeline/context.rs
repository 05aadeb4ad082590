//! Immutable search context.
//!
//! Everything a worker needs (ciphertext, stages, keys, scoring words, bifid
//! squares, threshold) is resolved once into a [`SearchContext`] and then
//! only read. Workers borrow it; nothing is global and nothing is mutated
//! after [`SearchContext::build`] returns.

use serde::Serialize;

use super::error_code::ErrorCode;
use super::errors::{InvalidSpec, PipelineSpecError};
use super::spec::{axes_for, format_pipeline, parse_pipeline, RuntimeSpec, SearchSpec, StageAxis, StageKind};
use super::validation::ValidationEngine;
use crate::ciphers::KeyedSquare;
use crate::dictionary::KeyDictionary;
use crate::scoring::CommonWords;
use crate::space::{total_combinations, SpaceIndex, TaskPlan};

/// Resolved, read-only state shared by every task of one search.
#[derive(Debug, Clone)]
pub struct SearchContext {
    ciphertext: String,
    stages: Vec<StageKind>,
    axes: Vec<StageAxis>,
    bases: Vec<usize>,
    plan: TaskPlan,
    keys: KeyDictionary,
    squares: Vec<KeyedSquare>,
    bifid_period: Option<usize>,
    common_words: CommonWords,
    threshold: f64,
    runtime: RuntimeSpec,
    warnings: Vec<PipelineSpecError>,
}

impl SearchContext {
    /// Validate `spec` and resolve it against `keys` and `common_words`.
    ///
    /// Fails with every configuration error at once. Validation warnings are
    /// logged and kept in [`SearchContext::warnings`].
    pub fn build(
        spec: &SearchSpec,
        ciphertext: &str,
        keys: KeyDictionary,
        common_words: CommonWords,
    ) -> Result<Self, InvalidSpec> {
        let warnings = ValidationEngine::with_defaults().validate(spec).into_result()?;
        for warning in &warnings {
            tracing::warn!(code = %warning.code, path = %warning.path, "{}", warning.message);
        }

        let stages = parse_pipeline(&spec.pipeline)?;
        let keys = keys.limit(spec.runtime.key_limit);
        let axes = axes_for(&stages, keys.len())?;
        let bases: Vec<usize> = axes.iter().map(|a| a.cardinality).collect();

        let total = total_combinations(&bases).ok_or_else(|| {
            PipelineSpecError::new(
                ErrorCode::SpaceOverflow,
                "/pipeline",
                "parameter space exceeds 2^128 tuples",
            )
            .with_hint("Use fewer key-based stages or lower runtime.key_limit")
        })?;
        let plan = TaskPlan::new(total, spec.runtime.chunk_size).ok_or_else(|| {
            PipelineSpecError::new(
                ErrorCode::SpaceOverflow,
                "/runtime/chunk_size",
                "parameter space needs more than 2^64 tasks",
            )
            .with_hint("Raise runtime.chunk_size")
        })?;

        if keys.is_empty() && stages.iter().any(StageKind::uses_keys) {
            tracing::warn!("key dictionary is empty; key-based stages have nothing to try");
        }

        let has_bifid = stages.contains(&StageKind::Bifid);
        let alphabet = &spec.bifid.alphabet;
        let ciphertext = if has_bifid && spec.bifid.normalize_input {
            alphabet.normalize(ciphertext)
        } else {
            ciphertext.to_string()
        };

        let squares = if has_bifid {
            keys.iter()
                .map(|key| KeyedSquare::new(alphabet, key))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|err| {
                    PipelineSpecError::new(ErrorCode::InvalidAlphabet, "/bifid/alphabet", err.to_string())
                })?
        } else {
            Vec::new()
        };

        Ok(Self {
            ciphertext,
            stages,
            axes,
            bases,
            plan,
            keys,
            squares,
            bifid_period: spec.bifid.period,
            common_words,
            threshold: spec.threshold,
            runtime: spec.runtime.clone(),
            warnings,
        })
    }

    /// Ciphertext as fed to the first stage (normalized for bifid).
    pub fn ciphertext(&self) -> &str {
        &self.ciphertext
    }

    pub fn stages(&self) -> &[StageKind] {
        &self.stages
    }

    pub fn axes(&self) -> &[StageAxis] {
        &self.axes
    }

    /// Axis cardinalities in pipeline order.
    pub fn bases(&self) -> &[usize] {
        &self.bases
    }

    /// Number of parameter tuples.
    pub fn total(&self) -> SpaceIndex {
        self.plan.total()
    }

    pub fn plan(&self) -> &TaskPlan {
        &self.plan
    }

    pub fn keys(&self) -> &KeyDictionary {
        &self.keys
    }

    /// Pre-built square for key `index` (empty unless the pipeline has bifid).
    #[inline]
    pub fn square(&self, index: usize) -> Option<&KeyedSquare> {
        self.squares.get(index)
    }

    /// Fractionation period for a payload of `len` characters.
    #[inline]
    pub fn bifid_period_for(&self, len: usize) -> usize {
        self.bifid_period.unwrap_or(len).max(1)
    }

    pub fn common_words(&self) -> &CommonWords {
        &self.common_words
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn runtime(&self) -> &RuntimeSpec {
        &self.runtime
    }

    /// Validation warnings raised while building.
    pub fn warnings(&self) -> &[PipelineSpecError] {
        &self.warnings
    }

    /// Summary of the search without running it.
    pub fn search_plan(&self) -> SearchPlan {
        SearchPlan {
            pipeline: format_pipeline(&self.stages),
            key_count: self.keys.len(),
            axes: self.axes.clone(),
            total: self.plan.total(),
            task_count: self.plan.task_count(),
            chunk_size: self.plan.chunk_size(),
            workers: self.runtime.workers.max(1),
        }
    }
}

/// What a search would do: pipeline, axis sizes and task split.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchPlan {
    pub pipeline: String,
    pub key_count: usize,
    pub axes: Vec<StageAxis>,
    pub total: SpaceIndex,
    pub task_count: u64,
    pub chunk_size: SpaceIndex,
    pub workers: usize,
}

impl SearchPlan {
    pub fn is_parallel(&self) -> bool {
        self.workers > 1
    }
}
