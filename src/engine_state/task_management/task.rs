//! # Task System Core Trait
//!
//! This module defines the unit of work executed by the task system.
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread
//! 3. The task returns its `Output`
//! 4. The output is collected on the main thread by `TaskManager::process_completed_tasks()`
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be transferred to a worker
//! - `Output` must be `Send` to be transferred back to the main thread
//! - Tasks own their inputs; shared inputs are immutable and behind `Arc`

/// A unit of work that can be executed on a worker thread.
///
/// Tasks are the primary mechanism for offloading work from the main thread.
/// They should be self-contained and own all the data they need.
///
/// # Implementation Guidelines
/// - Should be relatively coarse-grained to amortize scheduling overhead
/// - Must not reference state the main thread mutates
pub trait Task: Send + 'static {
    /// Value handed back to the main thread.
    type Output: Send + 'static;

    /// Performs the work.
    ///
    /// Runs on a worker thread, or inline on the main thread when the manager
    /// has no workers.
    fn process(&self) -> Self::Output;
}
