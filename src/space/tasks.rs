//! Chunking of the linear index range into worker tasks

use serde::Serialize;

use super::SpaceIndex;

/// A contiguous half-open index range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkerTask {
    pub start: SpaceIndex,
    pub end: SpaceIndex,
}

impl WorkerTask {
    pub fn new(start: SpaceIndex, end: SpaceIndex) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// Number of indices in the task.
    pub fn len(&self) -> SpaceIndex {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Lazy partition of `[0, total)` into fixed-size chunks.
///
/// Tasks are computed from their ordinal on demand, so a plan over an
/// astronomically large space costs nothing to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskPlan {
    total: SpaceIndex,
    chunk_size: SpaceIndex,
    task_count: u64,
}

impl TaskPlan {
    /// Partition `total` indices into chunks of `chunk_size` (clamped to at
    /// least 1). Returns `None` if the number of chunks does not fit in a
    /// `u64` task counter.
    pub fn new(total: SpaceIndex, chunk_size: u64) -> Option<Self> {
        let chunk_size = SpaceIndex::from(chunk_size.max(1));
        let task_count = u64::try_from(total.div_ceil(chunk_size)).ok()?;
        Some(Self {
            total,
            chunk_size,
            task_count,
        })
    }

    pub fn total(&self) -> SpaceIndex {
        self.total
    }

    pub fn chunk_size(&self) -> SpaceIndex {
        self.chunk_size
    }

    pub fn task_count(&self) -> u64 {
        self.task_count
    }

    /// The `ordinal`-th task, or `None` past the end.
    #[inline]
    pub fn task(&self, ordinal: u64) -> Option<WorkerTask> {
        if ordinal >= self.task_count {
            return None;
        }
        let start = SpaceIndex::from(ordinal) * self.chunk_size;
        let end = (start + self.chunk_size).min(self.total);
        Some(WorkerTask::new(start, end))
    }

    /// All tasks in submission order.
    pub fn iter(&self) -> impl Iterator<Item = WorkerTask> + '_ {
        (0..self.task_count).filter_map(move |i| self.task(i))
    }
}
