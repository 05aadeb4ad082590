//! Search runner: distributes worker tasks and aggregates their results.
//!
//! Two modes share one algorithm:
//!
//! - **Sequential** (`workers <= 1`): one [`StageExecutor`] runs every task
//!   on the calling thread, in order.
//! - **Parallel**: a rayon pool of `workers` threads. Each thread owns an
//!   executor over the shared, read-only [`SearchContext`] and pulls task
//!   ordinals from an atomic counter. Results travel back over a bounded
//!   channel to the calling thread, which aggregates them in completion
//!   order and drives the [`SearchObserver`].
//!
//! With `runtime.stop_after_hits` set, reaching the quota stops workers from
//! claiming new tasks. Tasks already in flight still finish and are counted,
//! so the final hit count may exceed the quota.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::bounded;
use serde::Serialize;

use super::context::SearchContext;
use super::executor::{ChunkResult, Hit, StageExecutor};
use super::observer::{ProgressReport, SearchObserver};
use crate::space::SpaceIndex;

/// Aggregate outcome of a search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResult {
    /// Tuples tried. Every index counts, scored or not.
    pub attempts: SpaceIndex,
    /// Hits in completion order.
    pub hits: Vec<Hit>,
    pub elapsed: Duration,
    pub tasks_completed: u64,
    /// The hit quota cut the search short.
    pub stopped_early: bool,
}

/// How a run is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Sequential,
    Parallel(usize),
}

impl ExecutionMode {
    pub fn for_workers(workers: usize) -> Self {
        if workers <= 1 {
            Self::Sequential
        } else {
            Self::Parallel(workers)
        }
    }
}

// ─── Aggregation ────────────────────────────────────────────────────────────

/// Coordinator-side state. Lives on the calling thread only.
struct Aggregator {
    started: Instant,
    task_count: u64,
    progress_every: u64,
    quota: Option<usize>,
    attempts: SpaceIndex,
    hits: Vec<Hit>,
    tasks_done: u64,
}

impl Aggregator {
    fn new(ctx: &SearchContext) -> Self {
        Self {
            started: Instant::now(),
            task_count: ctx.plan().task_count(),
            progress_every: ctx.runtime().progress_every,
            quota: ctx.runtime().stop_after_hits,
            attempts: 0,
            hits: Vec::new(),
            tasks_done: 0,
        }
    }

    /// Fold in one task result. Returns `true` once the hit quota is met.
    fn absorb(&mut self, result: ChunkResult, observer: &mut impl SearchObserver) -> bool {
        observer.on_task_complete(&result);
        self.tasks_done += 1;
        self.attempts += result.attempts;
        self.hits.extend(result.hits);

        if self.progress_every > 0 && self.tasks_done % self.progress_every == 0 {
            observer.on_progress(&ProgressReport {
                tasks_done: self.tasks_done,
                task_count: self.task_count,
                attempts: self.attempts,
                hits: self.hits.len(),
                elapsed: self.started.elapsed(),
            });
        }

        self.quota.is_some_and(|quota| self.hits.len() >= quota)
    }

    fn finish(self, stopped_early: bool) -> ExecutionResult {
        ExecutionResult {
            attempts: self.attempts,
            hits: self.hits,
            elapsed: self.started.elapsed(),
            tasks_completed: self.tasks_done,
            stopped_early,
        }
    }
}

// ─── Runner ─────────────────────────────────────────────────────────────────

/// Runs a search over a [`SearchContext`].
pub struct SearchRunner<'a> {
    ctx: &'a SearchContext,
    mode: ExecutionMode,
}

impl<'a> SearchRunner<'a> {
    /// Use the worker count from the context's runtime settings.
    pub fn new(ctx: &'a SearchContext) -> Self {
        Self {
            ctx,
            mode: ExecutionMode::for_workers(ctx.runtime().workers),
        }
    }

    /// Override the scheduling mode.
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Search the whole space (or until the hit quota is met).
    pub fn run(&self, observer: &mut impl SearchObserver) -> ExecutionResult {
        let mut plan = self.ctx.search_plan();
        plan.workers = match self.mode {
            ExecutionMode::Sequential => 1,
            ExecutionMode::Parallel(w) => w,
        };
        tracing::info!(
            pipeline = %plan.pipeline,
            keys = plan.key_count,
            axes = ?self.ctx.bases(),
            total = %plan.total,
            mode = ?self.mode,
            "starting search"
        );
        observer.on_start(&plan);

        let result = match self.mode {
            ExecutionMode::Sequential => self.run_sequential(observer),
            ExecutionMode::Parallel(workers) => match rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("decipher-worker-{i}"))
                .build()
            {
                Ok(pool) => self.run_parallel(&pool, workers, observer),
                Err(err) => {
                    tracing::warn!(error = %err, "worker pool unavailable, running sequentially");
                    self.run_sequential(observer)
                }
            },
        };

        tracing::info!(
            attempts = %result.attempts,
            hits = result.hits.len(),
            elapsed_ms = result.elapsed.as_millis() as u64,
            "search finished"
        );
        observer.on_finish(&result);
        result
    }

    fn run_sequential(&self, observer: &mut impl SearchObserver) -> ExecutionResult {
        let mut agg = Aggregator::new(self.ctx);
        let mut executor = StageExecutor::new(self.ctx);
        let mut stopped_early = false;

        for task in self.ctx.plan().iter() {
            if agg.absorb(executor.run_task(task), observer) {
                stopped_early = agg.tasks_done < agg.task_count;
                break;
            }
        }
        agg.finish(stopped_early)
    }

    fn run_parallel(
        &self,
        pool: &rayon::ThreadPool,
        workers: usize,
        observer: &mut impl SearchObserver,
    ) -> ExecutionResult {
        let ctx = self.ctx;
        let plan = *ctx.plan();
        let next_task = AtomicU64::new(0);
        let stop = AtomicBool::new(false);
        let (tx, rx) = bounded::<ChunkResult>(workers * 2);
        let mut agg = Aggregator::new(ctx);

        pool.in_place_scope(|scope| {
            for _ in 0..workers {
                let tx = tx.clone();
                let next_task = &next_task;
                let stop = &stop;
                scope.spawn(move |_| {
                    let mut executor = StageExecutor::new(ctx);
                    while !stop.load(Ordering::Relaxed) {
                        let Some(task) = plan.task(next_task.fetch_add(1, Ordering::Relaxed)) else {
                            break;
                        };
                        if tx.send(executor.run_task(task)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(tx);

            for result in rx.iter() {
                if agg.absorb(result, observer) {
                    stop.store(true, Ordering::Relaxed);
                }
            }
        });

        let stopped_early = stop.load(Ordering::Relaxed) && agg.tasks_done < agg.task_count;
        agg.finish(stopped_early)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::KeyDictionary;
    use crate::pipeline::observer::{NoopObserver, RecordingObserver};
    use crate::pipeline::spec::SearchSpec;
    use crate::scoring::CommonWords;
    use rustc_hash::FxHashSet;

    fn caesar_ctx(workers: usize, chunk: u64) -> SearchContext {
        let spec = SearchSpec::new("caesar")
            .with_threshold(1.845)
            .with_workers(workers)
            .with_chunk_size(chunk);
        SearchContext::build(&spec, "DL HAAHJR HA KHDU", KeyDictionary::default(), CommonWords::empty())
            .unwrap()
    }

    #[test]
    fn test_mode_for_workers() {
        assert_eq!(ExecutionMode::for_workers(0), ExecutionMode::Sequential);
        assert_eq!(ExecutionMode::for_workers(1), ExecutionMode::Sequential);
        assert_eq!(ExecutionMode::for_workers(4), ExecutionMode::Parallel(4));
    }

    #[test]
    fn test_sequential_finds_shift() {
        let ctx = caesar_ctx(1, 5);
        let result = SearchRunner::new(&ctx).run(&mut NoopObserver);
        assert_eq!(result.attempts, 26);
        assert_eq!(result.tasks_completed, 6);
        assert_eq!(result.hits.len(), 1);
        assert_eq!(result.hits[0].index, 19);
        assert!(!result.stopped_early);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let ctx = caesar_ctx(4, 3);
        let runner = SearchRunner::new(&ctx);
        assert_eq!(runner.mode(), ExecutionMode::Parallel(4));
        let result = runner.run(&mut NoopObserver);
        assert_eq!(result.attempts, 26);
        assert_eq!(result.tasks_completed, 9);
        assert_eq!(result.hits.len(), 1);
        assert_eq!(result.hits[0].index, 19);
    }

    #[test]
    fn test_every_task_arrives_exactly_once() {
        let spec = SearchSpec::new("caesar>railfence")
            .with_threshold(0.0)
            .with_workers(3)
            .with_chunk_size(7);
        let ctx = SearchContext::build(&spec, "HELLO", KeyDictionary::default(), CommonWords::empty())
            .unwrap();
        let mut recorder = RecordingObserver::default();
        let result = SearchRunner::new(&ctx).run(&mut recorder);

        assert_eq!(result.attempts, 26 * 29);
        let starts: FxHashSet<_> = recorder.completed.iter().map(|r| r.task.start).collect();
        assert_eq!(starts.len() as u64, ctx.plan().task_count());
        assert_eq!(recorder.completed.len() as u64, ctx.plan().task_count());
        // Threshold 0 makes every tuple a hit.
        let indices: FxHashSet<_> = result.hits.iter().map(|h| h.index).collect();
        assert_eq!(indices.len(), 26 * 29);
    }

    #[test]
    fn test_progress_every_n_tasks() {
        let mut spec = SearchSpec::new("caesar").with_chunk_size(2);
        spec.runtime.progress_every = 5;
        let ctx = SearchContext::build(&spec, "ABC", KeyDictionary::default(), CommonWords::empty())
            .unwrap();
        let mut recorder = RecordingObserver::default();
        SearchRunner::new(&ctx).run(&mut recorder);

        let done: Vec<_> = recorder.progress.iter().map(|p| p.tasks_done).collect();
        assert_eq!(done, vec![5, 10]);
        assert_eq!(recorder.progress[1].attempts, 20);
        assert_eq!(recorder.progress[1].task_count, 13);
        assert_eq!(recorder.plan.unwrap().total, 26);
        assert_eq!(recorder.finished, Some((26, 26)));
    }

    #[test]
    fn test_progress_disabled() {
        let mut spec = SearchSpec::new("caesar").with_chunk_size(1);
        spec.runtime.progress_every = 0;
        let ctx = SearchContext::build(&spec, "ABC", KeyDictionary::default(), CommonWords::empty())
            .unwrap();
        let mut recorder = RecordingObserver::default();
        SearchRunner::new(&ctx).run(&mut recorder);
        assert!(recorder.progress.is_empty());
    }

    #[test]
    fn test_sequential_quota_stops_early() {
        let spec = SearchSpec::new("caesar")
            .with_threshold(0.0)
            .with_chunk_size(2)
            .with_stop_after_hits(3);
        let ctx = SearchContext::build(&spec, "ABC", KeyDictionary::default(), CommonWords::empty())
            .unwrap();
        let result = SearchRunner::new(&ctx).run(&mut NoopObserver);
        assert!(result.stopped_early);
        assert_eq!(result.tasks_completed, 2);
        assert_eq!(result.hits.len(), 4);
        assert_eq!(result.attempts, 4);
    }

    #[test]
    fn test_parallel_quota_is_advisory() {
        let spec = SearchSpec::new("caesar>railfence")
            .with_threshold(0.0)
            .with_workers(2)
            .with_chunk_size(10)
            .with_stop_after_hits(1);
        let ctx = SearchContext::build(&spec, "HELLO", KeyDictionary::default(), CommonWords::empty())
            .unwrap();
        let result = SearchRunner::new(&ctx).run(&mut NoopObserver);
        assert!(result.hits.len() >= 1);
        assert!(result.attempts < 26 * 29);
        assert!(result.stopped_early);
    }

    #[test]
    fn test_empty_space_completes_with_summary() {
        let spec = SearchSpec::new("xor").with_workers(2);
        let ctx = SearchContext::build(&spec, "ABC", KeyDictionary::default(), CommonWords::empty())
            .unwrap();
        let result = SearchRunner::new(&ctx).run(&mut NoopObserver);
        assert_eq!(result.attempts, 0);
        assert!(result.hits.is_empty());
        assert_eq!(result.tasks_completed, 0);
    }
}
