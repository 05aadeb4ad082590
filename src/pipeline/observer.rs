//! Search observer: hooks for logging, progress and debugging.
//!
//! Observers are notified by the coordinator at run start, after every
//! completed task, at progress intervals and at the end. They always run on
//! the coordinator thread and cannot influence the search.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use super::context::SearchPlan;
use super::executor::ChunkResult;
use super::runner::ExecutionResult;
use crate::report::group_digits;
use crate::space::SpaceIndex;

// ─── Progress ───────────────────────────────────────────────────────────────

/// Snapshot of a running search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressReport {
    pub tasks_done: u64,
    pub task_count: u64,
    pub attempts: SpaceIndex,
    pub hits: usize,
    pub elapsed: Duration,
}

impl ProgressReport {
    /// Attempts per second so far.
    pub fn rate(&self) -> f64 {
        self.attempts as f64 / self.elapsed.as_secs_f64().max(1e-9)
    }
}

impl fmt::Display for ProgressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[progress] tasks={}/{} attempts={} hits={} rate={:.1}/s",
            group_digits(self.tasks_done),
            group_digits(self.task_count),
            group_digits(self.attempts),
            self.hits,
            self.rate()
        )
    }
}

// ─── Observer trait ─────────────────────────────────────────────────────────

/// Callbacks fired by [`super::runner::SearchRunner`].
///
/// Every method has an empty default, so implementors override only what
/// they need.
pub trait SearchObserver {
    fn on_start(&mut self, _plan: &SearchPlan) {}

    /// A task finished. Tasks arrive in completion order.
    fn on_task_complete(&mut self, _result: &ChunkResult) {}

    /// Fired every `runtime.progress_every` completed tasks.
    fn on_progress(&mut self, _report: &ProgressReport) {}

    fn on_finish(&mut self, _result: &ExecutionResult) {}
}

/// Ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SearchObserver for NoopObserver {}

/// Logs the run through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl SearchObserver for TracingObserver {
    fn on_start(&mut self, plan: &SearchPlan) {
        tracing::debug!(
            tasks = plan.task_count,
            chunk_size = %plan.chunk_size,
            workers = plan.workers,
            "task plan ready"
        );
    }

    fn on_task_complete(&mut self, result: &ChunkResult) {
        tracing::debug!(
            start = %result.task.start,
            end = %result.task.end,
            hits = result.hits.len(),
            "task complete"
        );
    }

    fn on_progress(&mut self, report: &ProgressReport) {
        tracing::info!("{report}");
    }

    fn on_finish(&mut self, result: &ExecutionResult) {
        tracing::debug!(
            tasks = result.tasks_completed,
            stopped_early = result.stopped_early,
            "all tasks collected"
        );
    }
}

/// Collects everything it sees. Useful in tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    pub plan: Option<SearchPlan>,
    pub completed: Vec<ChunkResult>,
    pub progress: Vec<ProgressReport>,
    pub finished: Option<(SpaceIndex, usize)>,
}

impl SearchObserver for RecordingObserver {
    fn on_start(&mut self, plan: &SearchPlan) {
        self.plan = Some(plan.clone());
    }

    fn on_task_complete(&mut self, result: &ChunkResult) {
        self.completed.push(result.clone());
    }

    fn on_progress(&mut self, report: &ProgressReport) {
        self.progress.push(*report);
    }

    fn on_finish(&mut self, result: &ExecutionResult) {
        self.finished = Some((result.attempts, result.hits.len()));
    }
}

impl<T: SearchObserver + ?Sized> SearchObserver for &mut T {
    fn on_start(&mut self, plan: &SearchPlan) {
        (**self).on_start(plan);
    }

    fn on_task_complete(&mut self, result: &ChunkResult) {
        (**self).on_task_complete(result);
    }

    fn on_progress(&mut self, report: &ProgressReport) {
        (**self).on_progress(report);
    }

    fn on_finish(&mut self, result: &ExecutionResult) {
        (**self).on_finish(result);
    }
}

/// Forward every notification to two observers.
impl<A: SearchObserver, B: SearchObserver> SearchObserver for (A, B) {
    fn on_start(&mut self, plan: &SearchPlan) {
        self.0.on_start(plan);
        self.1.on_start(plan);
    }

    fn on_task_complete(&mut self, result: &ChunkResult) {
        self.0.on_task_complete(result);
        self.1.on_task_complete(result);
    }

    fn on_progress(&mut self, report: &ProgressReport) {
        self.0.on_progress(report);
        self.1.on_progress(report);
    }

    fn on_finish(&mut self, result: &ExecutionResult) {
        self.0.on_finish(result);
        self.1.on_finish(result);
    }
}
