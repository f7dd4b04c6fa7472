//! # Task Management System
//!
//! This module provides a small worker pool for running tasks off the main
//! thread and collecting their outputs back on it.
//!
//! ## Architecture Overview
//!
//! - `TaskManager`: central coordinator for task distribution and worker management
//! - `Task`: a unit of work with a typed output
//! - `TaskChannel`: communication channel between the main thread and one worker
//!
//! Each worker is a `std::thread` with a dedicated pair of `mpsc` channels. Tasks
//! are handed out round-robin, at most [`MAX_TASKS_IN_FLIGHT`] per worker; the
//! rest wait in a FIFO queue on the manager.
//!
//! A manager created with zero workers runs queued tasks inline from
//! `process_queued_tasks()`, which gives fully deterministic single-threaded
//! execution.
//!
//! ## Task Lifecycle
//! 1. Tasks are published via `TaskManager::publish_task()`
//! 2. The manager hands them to available workers using round-robin
//! 3. Workers process tasks and send back their outputs
//! 4. Outputs are collected on the main thread in `process_completed_tasks()`
//!
//! ## Example Usage
//! ```rust,ignore
//! let mut task_manager = TaskManager::new(num_workers);
//! task_manager.publish_task(MyTask::new(...));
//!
//! // In the main loop:
//! task_manager.process_queued_tasks();
//! for output in task_manager.process_completed_tasks() {
//!     // integrate output
//! }
//! ```

pub mod task;

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};

use log::{error, info};
pub use task::Task;

/// A communication channel between the main thread and a worker thread.
///
/// # Fields
/// - `task_sender`: Sends tasks from main thread to worker
/// - `result_receiver`: Receives task outputs from worker
/// - `num_tasks_in_flight`: Number of tasks sent but not yet collected
/// - `_worker`: Handle to the worker thread
///
/// Dropping the channel closes `task_sender`, which ends the worker's loop.
#[derive(Debug)]
pub struct TaskChannel<T: Task> {
    task_sender: Sender<T>,
    result_receiver: Receiver<T::Output>,
    num_tasks_in_flight: usize,
    _worker: JoinHandle<()>,
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// # Fields
/// - `channels`: Set of active worker channels
/// - `queued_tasks`: Tasks waiting for an available worker
/// - `current_channel`: Index for round-robin scheduling
/// - `inline_outputs`: Outputs of tasks run inline when there are no workers
pub struct TaskManager<T: Task> {
    channels: Vec<TaskChannel<T>>,
    queued_tasks: VecDeque<T>,
    current_channel: usize,
    inline_outputs: Vec<T::Output>,
}

/// Maximum number of tasks that can be in flight per worker channel.
///
/// Keeping this low leaves most pending work in the manager's queue, where the
/// caller can still see and reorder it.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

impl<T: Task> TaskManager<T> {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads to create. `0` runs tasks inline.
    ///
    /// # Panics
    /// Panics if the underlying thread creation fails.
    pub fn new(num_workers: usize) -> Self {
        let mut channels = Vec::with_capacity(num_workers);

        info!(
            "Starting {} task workers, available parallelism: {:?}",
            num_workers,
            thread::available_parallelism()
        );

        for _ in 0..num_workers {
            let (task_tx, task_rx) = channel::<T>();
            let (result_tx, result_rx) = channel::<T::Output>();

            let worker = thread::spawn(move || {
                while let Ok(task) = task_rx.recv() {
                    if result_tx.send(task.process()).is_err() {
                        break;
                    }
                }
            });

            channels.push(TaskChannel {
                task_sender: task_tx,
                result_receiver: result_rx,
                num_tasks_in_flight: 0,
                _worker: worker,
            });
        }

        TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
            inline_outputs: Vec::new(),
        }
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of tasks waiting for a worker.
    pub fn queued_count(&self) -> usize {
        self.queued_tasks.len()
    }

    /// Number of tasks handed to workers whose output has not been collected.
    pub fn in_flight_count(&self) -> usize {
        self.channels.iter().map(|c| c.num_tasks_in_flight).sum()
    }

    /// True if no task is queued, running or waiting to be collected.
    pub fn is_idle(&self) -> bool {
        self.queued_tasks.is_empty() && self.in_flight_count() == 0 && self.inline_outputs.is_empty()
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the task was sent
    /// - `Err(task)` if the worker has disconnected
    fn try_send_task(&mut self, task: T, channel_idx: usize) -> Result<(), T> {
        match self.channels[channel_idx].task_sender.send(task) {
            Ok(_) => {
                self.channels[channel_idx].num_tasks_in_flight += 1;
                Ok(())
            }
            Err(err) => {
                error!("Task worker {} disconnected", channel_idx);
                Err(err.0)
            }
        }
    }

    /// Finds an available worker channel, round-robin from the last used one.
    ///
    /// # Returns
    /// - `Some(usize)` index of a channel below `MAX_TASKS_IN_FLIGHT`
    /// - `None` if all channels are busy or there are none
    fn find_available_channel(&self) -> Option<usize> {
        let len = self.channels.len();
        (0..len)
            .map(|offset| (self.current_channel + offset) % len)
            .find(|&idx| self.channels[idx].num_tasks_in_flight < MAX_TASKS_IN_FLIGHT)
    }

    /// Publishes a new task for execution.
    ///
    /// # Returns
    /// - `true` if the task was immediately handed to a worker
    /// - `false` if the task was queued
    pub fn publish_task(&mut self, task: T) -> bool {
        let Some(channel_idx) = self.find_available_channel() else {
            self.queued_tasks.push_back(task);
            return false;
        };

        match self.try_send_task(task, channel_idx) {
            Ok(_) => {
                self.current_channel = (channel_idx + 1) % self.channels.len();
                true
            }
            Err(task) => {
                self.queued_tasks.push_back(task);
                false
            }
        }
    }

    /// Hands queued tasks to workers while any worker has room.
    ///
    /// Without workers, every queued task is processed inline and its output
    /// is held for the next `process_completed_tasks()`.
    pub fn process_queued_tasks(&mut self) {
        if self.channels.is_empty() {
            while let Some(task) = self.queued_tasks.pop_front() {
                self.inline_outputs.push(task.process());
            }
            return;
        }

        while let Some(channel_idx) = self.find_available_channel() {
            let Some(task) = self.queued_tasks.pop_front() else {
                break;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(_) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => {
                    // Channel is disconnected, put task back and stop processing
                    self.queued_tasks.push_front(task);
                    break;
                }
            }
        }
    }

    /// Collects the outputs of every finished task, without blocking.
    pub fn process_completed_tasks(&mut self) -> Vec<T::Output> {
        let mut outputs = std::mem::take(&mut self.inline_outputs);
        for channel in &mut self.channels {
            while let Ok(output) = channel.result_receiver.try_recv() {
                channel.num_tasks_in_flight -= 1;
                outputs.push(output);
            }
        }
        outputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    struct Square(u64);

    impl Task for Square {
        type Output = u64;

        fn process(&self) -> u64 {
            self.0 * self.0
        }
    }

    #[test]
    fn inline_manager_runs_in_order() {
        let mut manager = TaskManager::new(0);
        assert!(!manager.publish_task(Square(2)));
        assert!(!manager.publish_task(Square(3)));
        assert_eq!(manager.queued_count(), 2);
        assert!(manager.process_completed_tasks().is_empty());

        manager.process_queued_tasks();
        assert!(!manager.is_idle());
        assert_eq!(manager.process_completed_tasks(), vec![4, 9]);
        assert!(manager.is_idle());
    }

    #[test]
    fn workers_complete_everything() {
        let mut manager = TaskManager::new(2);
        assert_eq!(manager.worker_count(), 2);
        for i in 0..20 {
            manager.publish_task(Square(i));
        }
        assert!(manager.in_flight_count() <= 2 * MAX_TASKS_IN_FLIGHT);

        let deadline = Instant::now() + Duration::from_secs(10);
        let mut outputs = Vec::new();
        while !manager.is_idle() && Instant::now() < deadline {
            manager.process_queued_tasks();
            outputs.extend(manager.process_completed_tasks());
            std::thread::sleep(Duration::from_millis(1));
        }

        outputs.sort_unstable();
        assert_eq!(outputs, (0..20).map(|i| i * i).collect::<Vec<_>>());
    }
}
