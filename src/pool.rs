//! Bounded task pool for fleet operations
//!
//! Every fleet operation funnels its per-repository work through one
//! [`TaskPool`]. The pool is a *batch* limiter: once `max` tasks are in
//! flight, the next submit first waits for the whole batch to finish before
//! launching anything new. A sliding-window scheduler would keep the pool
//! fuller when task durations vary widely; batch draining is simpler and
//! sufficient for fleet-sized workloads (tens to low hundreds of
//! repositories), so the batch semantics are kept deliberately.

use std::future::Future;
use tokio::task::JoinHandle;

/// Bounded-concurrency executor with full-batch draining
pub struct TaskPool {
    max: usize,
    handles: Vec<JoinHandle<()>>,
}

impl TaskPool {
    /// Creates a pool running at most `max` tasks at once.
    /// `max <= 1` selects fully synchronous, in-order execution.
    pub fn new(max: usize) -> Self {
        Self {
            max,
            handles: Vec::new(),
        }
    }

    /// Number of tasks currently in flight
    pub fn in_flight(&self) -> usize {
        self.handles.len()
    }

    /// Submits one unit of work.
    ///
    /// With `max <= 1` the future runs to completion in the caller's context
    /// before `submit` returns. Otherwise, a saturated pool first drains
    /// completely, then the work is spawned. A task that panics does not
    /// abort its siblings; failures inside a task are the task's own to
    /// report.
    pub async fn submit<F>(&mut self, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.max <= 1 {
            work.await;
            return;
        }
        if self.handles.len() >= self.max {
            self.wait().await;
        }
        self.handles.push(tokio::spawn(work));
    }

    /// Blocks until all outstanding tasks complete and resets the in-flight
    /// count to zero
    pub async fn wait(&mut self) {
        for handle in self.handles.drain(..) {
            if let Err(e) = handle.await {
                tracing::warn!("pool task panicked: {e}");
            }
        }
    }
}
