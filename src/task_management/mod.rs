//! # Task Management System
//!
//! A fixed-size pool of worker threads that runs [`Task`]s submitted from any
//! thread.
//!
//! ## Architecture Overview
//! - `TaskManager`: owns the workers and the sending half of the task queue
//! - `Task`: a unit of work, processed on whichever worker is free first
//!
//! Workers share one queue (`std::sync::mpsc` behind a mutex), so a worker
//! stuck on a long job never holds up tasks that another idle worker could
//! take. Submission never blocks. There is no ordering between tasks beyond
//! the queue being FIFO at hand-out time, and no cancellation.
//!
//! ## Shutdown
//! Dropping the `TaskManager` closes the queue. Workers finish every task
//! already queued, then exit and are joined.
//!
//! ## Example Usage
//! ```rust
//! use std::sync::mpsc::channel;
//! use voxel_pathfinder::task_management::TaskManager;
//!
//! let task_manager = TaskManager::new(2);
//! let (tx, rx) = channel();
//! task_manager
//!     .publish_task(Box::new(move || tx.send(6 * 7).unwrap()))
//!     .unwrap();
//! assert_eq!(rx.recv().unwrap(), 42);
//! ```

pub mod task;

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use log::{debug, error, info};

use crate::error::{PathfinderError, Result};
pub use task::Task;

type TaskQueue = Arc<Mutex<Receiver<Box<dyn Task>>>>;

/// Manages a pool of worker threads and hands them tasks.
pub struct TaskManager {
    task_sender: Option<Sender<Box<dyn Task>>>,
    workers: Vec<JoinHandle<()>>,
    num_tasks_in_flight: Arc<AtomicUsize>,
}

impl TaskManager {
    /// Starts `num_workers` worker threads (at least one).
    pub fn new(num_workers: usize) -> Self {
        let num_workers = num_workers.max(1);
        let (task_tx, task_rx) = channel::<Box<dyn Task>>();
        let queue: TaskQueue = Arc::new(Mutex::new(task_rx));
        let num_tasks_in_flight = Arc::new(AtomicUsize::new(0));

        info!(
            "Starting {} path workers (available parallelism: {:?})",
            num_workers,
            thread::available_parallelism()
        );

        let workers = (0..num_workers)
            .map(|index| {
                let queue = queue.clone();
                let in_flight = num_tasks_in_flight.clone();
                thread::Builder::new()
                    .name(format!("path-worker-{index}"))
                    .spawn(move || Self::worker_loop(queue, in_flight))
                    .unwrap_or_else(|e| panic!("failed to spawn path worker {index}: {e}"))
            })
            .collect();

        TaskManager {
            task_sender: Some(task_tx),
            workers,
            num_tasks_in_flight,
        }
    }

    fn worker_loop(queue: TaskQueue, in_flight: Arc<AtomicUsize>) {
        loop {
            // Hold the lock only while taking a task off the queue.
            let next = queue
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .recv();
            let Ok(task) = next else {
                break;
            };

            let description = task.describe();
            debug!("Worker picked up {description}");
            if panic::catch_unwind(AssertUnwindSafe(|| task.process())).is_err() {
                error!("Task panicked on worker: {description}");
            }
            in_flight.fetch_sub(1, Ordering::AcqRel);
        }
    }

    /// Queues `task` for the next free worker. Never blocks.
    ///
    /// # Errors
    /// [`PathfinderError::PoolShutDown`] if no worker can receive tasks any more.
    pub fn publish_task(&self, task: Box<dyn Task>) -> Result<()> {
        let sender = self
            .task_sender
            .as_ref()
            .ok_or(PathfinderError::PoolShutDown)?;
        self.num_tasks_in_flight.fetch_add(1, Ordering::AcqRel);
        sender.send(task).map_err(|_| {
            self.num_tasks_in_flight.fetch_sub(1, Ordering::AcqRel);
            PathfinderError::PoolShutDown
        })
    }

    /// Number of worker threads.
    pub fn num_workers(&self) -> usize {
        self.workers.len()
    }

    /// Tasks queued or running.
    pub fn num_tasks_in_flight(&self) -> usize {
        self.num_tasks_in_flight.load(Ordering::Acquire)
    }
}

impl Drop for TaskManager {
    fn drop(&mut self) {
        // Closing the queue lets each worker drain it and exit.
        drop(self.task_sender.take());
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                error!("Path worker exited abnormally");
            }
        }
    }
}
