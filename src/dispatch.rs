//! Bounded pool of request tasks

use anyhow::{Context, Result};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::{JoinError, JoinSet};
use tracing::{error, info};

/// Runs request handlers concurrently, at most `workers` at a time, and keeps
/// track of them so shutdown can wait for every accepted request.
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    in_flight: JoinSet<()>,
    workers: usize,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(workers)),
            in_flight: JoinSet::new(),
            workers,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Wait for a free worker
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit> {
        self.semaphore
            .clone()
            .acquire_owned()
            .await
            .context("Worker semaphore closed")
    }

    /// Run `task` on the worker held by `permit`
    pub fn spawn<F>(&mut self, permit: OwnedSemaphorePermit, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.in_flight.spawn(async move {
            task.await;
            drop(permit);
        });

        while let Some(result) = self.in_flight.try_join_next() {
            log_task_failure(result);
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Wait until every spawned task has finished
    pub async fn drain(&mut self) {
        info!(in_flight = self.in_flight.len(), "Draining in-flight requests");
        while let Some(result) = self.in_flight.join_next().await {
            log_task_failure(result);
        }
    }
}

fn log_task_failure(result: Result<(), JoinError>) {
    if let Err(e) = result {
        error!(error = %e, "Request task failed");
    }
}
