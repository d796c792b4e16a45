//! The priority queue from `spec.md` §4.3: "Priority queue keyed by
//! `{critical=3, high=2, normal=1, low=0}`, FIFO within a level;
//! `clearQueue()` empties atomically."

use crate::request::JobExecutionRequest;
use std::collections::VecDeque;

/// A FIFO-within-priority job queue.
///
/// Implemented as one `VecDeque` per priority level rather than a binary
/// heap: binary heaps don't preserve insertion order among equal keys,
/// and `spec.md` requires FIFO within a level.
#[derive(Default)]
pub struct JobQueue {
    critical: VecDeque<JobExecutionRequest>,
    high: VecDeque<JobExecutionRequest>,
    normal: VecDeque<JobExecutionRequest>,
    low: VecDeque<JobExecutionRequest>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a job into its priority's level.
    pub fn push(&mut self, job: JobExecutionRequest) {
        self.level_mut(job.priority).push_back(job);
    }

    /// Pops the next job: highest non-empty priority level first, FIFO
    /// within that level.
    pub fn pop(&mut self) -> Option<JobExecutionRequest> {
        self.critical
            .pop_front()
            .or_else(|| self.high.pop_front())
            .or_else(|| self.normal.pop_front())
            .or_else(|| self.low.pop_front())
    }

    /// Total number of queued jobs across all levels.
    pub fn len(&self) -> usize {
        self.critical.len() + self.high.len() + self.normal.len() + self.low.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Empties every level.
    pub fn clear(&mut self) {
        self.critical.clear();
        self.high.clear();
        self.normal.clear();
        self.low.clear();
    }

    fn level_mut(&mut self, priority: crate::request::Priority) -> &mut VecDeque<JobExecutionRequest> {
        use crate::request::Priority;
        match priority {
            Priority::Critical => &mut self.critical,
            Priority::High => &mut self.high,
            Priority::Normal => &mut self.normal,
            Priority::Low => &mut self.low,
        }
    }
}
