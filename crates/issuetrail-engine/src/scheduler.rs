//! Concurrency-limited task scheduler

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle};

/// Runs at most `limit` tasks at a time and returns results in admission order.
///
/// Each admitted task gets the next slot; `settle` waits for every slot, so
/// completion order never affects the result order.
pub struct Scheduler<T> {
    limiter: Arc<Semaphore>,
    limit: usize,
    slots: Vec<JoinHandle<T>>,
}

impl<T: Send + 'static> Scheduler<T> {
    /// A limit of zero is treated as one
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            limiter: Arc::new(Semaphore::new(limit)),
            limit,
            slots: Vec::new(),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Wait for a free slot, then start the task. Returns its slot index.
    ///
    /// Waiters are admitted in arrival order.
    pub async fn admit<F>(&mut self, task: F) -> Result<usize>
    where
        F: Future<Output = T> + Send + 'static,
    {
        let permit = self
            .limiter
            .clone()
            .acquire_owned()
            .await
            .context("scheduler limiter closed")?;

        let index = self.slots.len();
        self.slots.push(tokio::spawn(async move {
            let _permit = permit;
            task.await
        }));

        Ok(index)
    }

    /// Wait for every admitted task. Tasks that panicked are replaced by `on_panic`.
    pub async fn settle<F>(self, mut on_panic: F) -> Vec<T>
    where
        F: FnMut(usize, JoinError) -> T,
    {
        let mut results = Vec::with_capacity(self.slots.len());
        for (index, slot) in self.slots.into_iter().enumerate() {
            let result = match slot.await {
                Ok(value) => value,
                Err(e) => on_panic(index, e),
            };
            results.push(result);
        }
        results
    }
}
