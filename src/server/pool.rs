use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::error;

type Task = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Fixed-size pool of task executors fed from a bounded queue.
///
/// N long-lived workers share the queue's receiving end; each runs one
/// submitted task to completion before taking the next, so at most N tasks
/// make progress at once. The pool size is fixed at construction and not
/// runtime-adjustable. No ordering is guaranteed across tasks.
pub struct WorkerPool {
    sender: mpsc::Sender<Task>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let (sender, receiver) = mpsc::channel::<Task>(size);
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = (0..size)
            .map(|id| {
                let receiver = Arc::clone(&receiver);
                tokio::spawn(async move {
                    loop {
                        // Hold the lock only for the dequeue, never while
                        // the task runs.
                        let task = { receiver.lock().await.recv().await };
                        let Some(task) = task else {
                            break;
                        };

                        // Run the task as a child so a panic terminates
                        // only the task, not the worker.
                        if let Err(e) = tokio::spawn(task).await {
                            error!("Worker {} task failed: {}", id, e);
                        }
                    }
                })
            })
            .collect();

        Self { sender, workers }
    }

    /// Queues a task, waiting for queue space if all workers are busy and
    /// the queue is full.
    pub async fn submit<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.sender.send(Box::pin(task)).await.is_err() {
            error!("Worker pool is shut down, task dropped");
        }
    }

    /// Closes the queue and waits for every worker to finish its in-flight
    /// work and drain what remains queued.
    pub async fn shutdown(self) {
        drop(self.sender);
        for worker in self.workers {
            if let Err(e) = worker.await {
                error!("Worker exited abnormally: {}", e);
            }
        }
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }
}
