//! Named, cancellable, self-rescheduling recurring tasks.
//!
//! Every task owns a thread that sleeps on a one-shot deadline and a control channel.
//! A successful execution rearms the deadline; a failed one hands the error to the failure
//! handler and leaves the task dormant until `reset_task_schedule` reactivates it.

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::errors::{new_err, ErrorKind, RaftError, Result};

#[cfg(test)]
mod tests;

pub type TaskAction = Box<dyn Fn() -> Result<()> + Send + Sync + 'static>;
pub type TaskFailureHandler = Box<dyn Fn(RaftError) + Send + Sync + 'static>;

/// Recurring task definition. `execute` is mandatory, `on_failure` is optional.
pub struct Task {
    pub interval: Duration,
    pub execute: Option<TaskAction>,
    pub on_failure: Option<TaskFailureHandler>,
}

impl Task {
    pub fn new<F>(interval: Duration, execute: F) -> Task
    where
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        Task {
            interval,
            execute: Some(Box::new(execute)),
            on_failure: None,
        }
    }

    pub fn with_failure_handler<F>(mut self, on_failure: F) -> Task
    where
        F: Fn(RaftError) + Send + Sync + 'static,
    {
        self.on_failure = Some(Box::new(on_failure));
        self
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Task")
            .field("interval", &self.interval)
            .field("execute", &self.execute.is_some())
            .field("on_failure", &self.on_failure.is_some())
            .finish()
    }
}

enum TaskControl {
    Reschedule(Duration),
    Stop,
}

#[derive(Debug)]
struct TaskHandle {
    control_tx: Sender<TaskControl>,
    cancelled: Arc<AtomicBool>,
}

impl TaskHandle {
    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);

        // The task thread may already be gone after a stop.
        let _ = self.control_tx.send(TaskControl::Stop);
    }
}

/// Registry of the recurring tasks. Safe to share between threads.
#[derive(Debug, Default)]
pub struct RecurringTaskScheduler {
    tasks: Mutex<HashMap<String, TaskHandle>>,
}

impl RecurringTaskScheduler {
    pub fn new() -> RecurringTaskScheduler {
        RecurringTaskScheduler::default()
    }

    /// Registers the task and schedules its first run after `task.interval`. Does not block.
    pub fn add_task(&self, id: &str, task: Task) -> Result<()> {
        if id.is_empty() {
            return new_err(
                ErrorKind::InvalidTask,
                "Task id cannot be empty".to_string(),
                String::new(),
            );
        }
        if task.interval == Duration::from_millis(0) {
            return new_err(
                ErrorKind::InvalidTask,
                format!("Task interval must be defined. Task: {}", id),
                String::new(),
            );
        }
        let execute = match task.execute {
            Some(execute) => execute,
            None => {
                return new_err(
                    ErrorKind::InvalidTask,
                    format!("Task execute action cannot be empty. Task: {}", id),
                    String::new(),
                )
            }
        };

        let mut tasks = self.tasks.lock();
        if tasks.contains_key(id) {
            return new_err(
                ErrorKind::DuplicateTask,
                format!("Task already exists with id: {}", id),
                String::new(),
            );
        }

        let (control_tx, control_rx): (Sender<TaskControl>, Receiver<TaskControl>) =
            crossbeam_channel::unbounded();
        let cancelled = Arc::new(AtomicBool::new(false));

        let runner = TaskRunner {
            id: id.to_string(),
            interval: task.interval,
            execute,
            on_failure: task.on_failure,
            cancelled: cancelled.clone(),
            control_rx,
        };

        let spawn_result = thread::Builder::new()
            .name(format!("task-{}", id))
            .spawn(move || runner.run());
        if let Err(err) = spawn_result {
            return new_err(
                ErrorKind::Internal,
                format!("Cannot start task thread. Task: {}", id),
                err.to_string(),
            );
        }

        tasks.insert(
            id.to_string(),
            TaskHandle {
                control_tx,
                cancelled,
            },
        );
        trace!("Task {} added with interval {:?}", id, task.interval);

        Ok(())
    }

    /// Cancels the task and removes it. No-op for an unknown id. Once this returns, the task
    /// is not rearmed; a run already in progress finishes but its failure handler is skipped.
    pub fn remove_task(&self, id: &str) {
        let handle = self.tasks.lock().remove(id);

        if let Some(handle) = handle {
            handle.cancel();
            trace!("Task {} removed", id);
        }
    }

    /// Rearms the task to run `interval` from now and keeps `interval` as its period.
    /// Reactivates a task left dormant by a failed run.
    pub fn reset_task_schedule(&self, id: &str, interval: Duration) -> Result<()> {
        if interval == Duration::from_millis(0) {
            return new_err(
                ErrorKind::InvalidTask,
                format!("Task interval must be defined. Task: {}", id),
                String::new(),
            );
        }

        let control_tx = match self.tasks.lock().get(id) {
            Some(handle) => handle.control_tx.clone(),
            None => {
                return new_err(
                    ErrorKind::UnknownTask,
                    format!("Cannot reset schedule of unknown task: {}", id),
                    String::new(),
                )
            }
        };

        if let Err(err) = control_tx.send(TaskControl::Reschedule(interval)) {
            return new_err(
                ErrorKind::UnknownTask,
                format!("Task {} is not running", id),
                err.to_string(),
            );
        }
        trace!("Task {} schedule reset to {:?}", id, interval);

        Ok(())
    }

    pub fn has_task(&self, id: &str) -> bool {
        self.tasks.lock().contains_key(id)
    }

    pub fn task_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.tasks.lock().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Cancels every registered task.
    pub fn shutdown(&self) {
        let handles: Vec<(String, TaskHandle)> = self.tasks.lock().drain().collect();

        for (id, handle) in handles {
            handle.cancel();
            trace!("Task {} stopped on shutdown", id);
        }
    }
}

impl Drop for RecurringTaskScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct TaskRunner {
    id: String,
    interval: Duration,
    execute: TaskAction,
    on_failure: Option<TaskFailureHandler>,
    cancelled: Arc<AtomicBool>,
    control_rx: Receiver<TaskControl>,
}

impl TaskRunner {
    fn run(mut self) {
        let mut deadline = Some(Instant::now() + self.interval);

        loop {
            let timeout = match deadline {
                Some(instant) => crossbeam_channel::at(instant),
                None => crossbeam_channel::never(),
            };

            select!(
                recv(self.control_rx) -> control => {
                    match control {
                        Ok(TaskControl::Reschedule(interval)) => {
                            self.interval = interval;
                            deadline = Some(Instant::now() + interval);
                        }
                        Ok(TaskControl::Stop) | Err(_) => break,
                    }
                },
                recv(timeout) -> _ => {
                    deadline = None;

                    if self.is_cancelled() {
                        trace!("Task {} cancelled before run", self.id);
                        break;
                    }

                    let result = (self.execute)();

                    // Removed while running: the outcome belongs to a task that no longer exists.
                    if self.is_cancelled() {
                        trace!("Task {} cancelled during run", self.id);
                        break;
                    }

                    match result {
                        Ok(()) => deadline = Some(Instant::now() + self.interval),
                        Err(err) => {
                            warn!("Task {} failed: {}", self.id, err);
                            if let Some(on_failure) = &self.on_failure {
                                on_failure(err);
                            }
                        }
                    }
                }
            );
        }

        trace!("Task {} thread stopped", self.id);
    }

    // A run past this check may still start; its result is dropped by the check after it.
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
