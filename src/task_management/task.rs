//! # Task System Core Trait
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. A worker thread takes it off the shared queue and calls `process()`
//! 3. The task hands its outcome to whoever is waiting for it (a oneshot
//!    channel, for instance); the pool itself does not look at results
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be transferred to a worker
//! - All state shared with the submitting thread must be synchronized

/// A unit of work executed on a worker thread.
///
/// Tasks own everything they need. A panic inside `process` is caught by the
/// worker and logged, and the worker moves on to the next task, so a task
/// that promises a result to someone should deliver a failure itself rather
/// than rely on the panic.
pub trait Task: Send {
    /// Performs the work. Consumes the task.
    fn process(self: Box<Self>);

    /// Short description for logs.
    fn describe(&self) -> String {
        String::from("task")
    }
}

impl<F> Task for F
where
    F: FnOnce() + Send,
{
    fn process(self: Box<Self>) {
        (*self)()
    }

    fn describe(&self) -> String {
        String::from("closure task")
    }
}
