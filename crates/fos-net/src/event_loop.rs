//! Event Loop
//!
//! Single-threaded executor that request completions run on.

use std::cell::RefCell;
use std::future::Future;

use smol::{LocalExecutor, Task};

use crate::XhrError;

/// Drives queued completion tasks on the current thread
pub struct EventLoop {
    executor: LocalExecutor<'static>,
    tasks: RefCell<Vec<Task<Result<(), XhrError>>>>,
}

impl EventLoop {
    pub fn new() -> Self {
        Self {
            executor: LocalExecutor::new(),
            tasks: RefCell::new(Vec::new()),
        }
    }

    /// Queue a completion task. It makes progress only inside [`run`](Self::run).
    pub fn spawn(&self, future: impl Future<Output = Result<(), XhrError>> + 'static) {
        let task = self.executor.spawn(future);
        self.tasks.borrow_mut().push(task);
    }

    /// Number of tasks not yet finished
    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Run until every queued task, including ones queued while running,
    /// has finished. Returns the first error a task ended with.
    pub fn run(&self) -> Result<(), XhrError> {
        smol::block_on(self.executor.run(async {
            let mut first_error = None;
            loop {
                let batch = std::mem::take(&mut *self.tasks.borrow_mut());
                if batch.is_empty() {
                    break;
                }
                for task in batch {
                    if let Err(err) = task.await {
                        tracing::error!("Request completion failed: {}", err);
                        first_error.get_or_insert(err);
                    }
                }
            }
            first_error.map_or(Ok(()), Err)
        }))
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLoop")
            .field("pending", &self.pending())
            .finish()
    }
}
