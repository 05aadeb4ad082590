//! Search pipeline: specification, validation, execution and coordination.
//!
//! A [`SearchSpec`] is validated and resolved into an immutable
//! [`SearchContext`]. A [`SearchRunner`] then splits the parameter space into
//! worker tasks, runs a [`StageExecutor`] over each and reports to a
//! [`SearchObserver`].

pub mod context;
pub mod error_code;
pub mod errors;
pub mod executor;
pub mod observer;
pub mod runner;
pub mod spec;
pub mod validation;

pub use context::{SearchContext, SearchPlan};
pub use error_code::ErrorCode;
pub use errors::{InvalidSpec, PipelineSpecError};
pub use executor::{ChunkResult, Hit, HitMetadata, Outcome, ParamValue, Payload, StageExecutor};
pub use observer::{NoopObserver, ProgressReport, RecordingObserver, SearchObserver, TracingObserver};
pub use runner::{ExecutionMode, ExecutionResult, SearchRunner};
pub use spec::{
    axes_for, parse_pipeline, BifidSpec, RuntimeSpec, SearchSpec, StageAxis, StageKind,
};
pub use validation::{ValidationEngine, ValidationReport, ValidationRule};
