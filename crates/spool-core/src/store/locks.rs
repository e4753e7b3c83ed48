//! Per-queue lock registry.
//!
//! The filesystem gives no transaction around "scan the range, then write",
//! so every read-range-then-write sequence runs under the lock of the
//! queue(s) it touches. Locks are in-process: the store assumes a single
//! process owns the base directory.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::timeout;

use crate::domain::StoreError;

/// Lock handles keyed by queue name, created on first use.
///
/// Waits are bounded: no operation here holds a lock for longer than a few
/// filesystem calls, so a wait that exceeds the bound means something is
/// wedged and the caller should fail fast.
pub(crate) struct QueueLocks {
    handles: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
    wait_bound: Duration,
}

impl QueueLocks {
    pub fn new(wait_bound: Duration) -> Self {
        Self {
            handles: StdMutex::new(HashMap::new()),
            wait_bound,
        }
    }

    fn handle(&self, queue: &str) -> Arc<Mutex<()>> {
        let mut handles = self.handles.lock().unwrap();
        handles.entry(queue.to_string()).or_default().clone()
    }

    /// Lock one queue, failing with `LockTimeout` after the wait bound.
    pub async fn lock(&self, queue: &str) -> Result<OwnedMutexGuard<()>, StoreError> {
        let handle = self.handle(queue);
        timeout(self.wait_bound, handle.lock_owned())
            .await
            .map_err(|_| StoreError::LockTimeout(queue.to_string()))
    }

    /// Lock two queues in lexicographic name order (same order from every
    /// caller, so two cross-queue operations cannot deadlock). Returns one
    /// guard when both names are the same queue.
    pub async fn lock_pair(
        &self,
        a: &str,
        b: &str,
    ) -> Result<(OwnedMutexGuard<()>, Option<OwnedMutexGuard<()>>), StoreError> {
        if a == b {
            return Ok((self.lock(a).await?, None));
        }
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        let first_guard = self.lock(first).await?;
        let second_guard = self.lock(second).await?;
        Ok((first_guard, Some(second_guard)))
    }
}
