//! Request Coalescer
//!
//! Collapses concurrent requests for the same key into a single in-flight
//! computation whose result is shared by every caller.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::error;

use crate::error::{CacheError, Result};

/// Completion slot of one in-flight call; `None` until the computation finishes.
type Slot<T> = Option<Result<T>>;

type Calls<T> = Arc<Mutex<HashMap<String, watch::Receiver<Slot<T>>>>>;

// == Coalescer ==
/// Keeps at most one computation per key in flight.
///
/// The first caller for a key starts the computation on its own task.
/// Every caller, the first one included, then waits for and receives a
/// clone of that task's result. Dropping a caller never cancels the
/// computation. The call record is removed as soon as the computation
/// finishes, so a later call starts a fresh one.
pub struct Coalescer<T> {
    calls: Calls<T>,
}

impl<T> Coalescer<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    // == Run ==
    /// Runs `compute` for `key` unless a call for `key` is already in flight,
    /// in which case waits for that call and returns its result.
    ///
    /// `compute` is invoked synchronously; the future it returns is spawned
    /// onto the runtime and runs to completion even if every caller goes away.
    pub async fn run<F, Fut>(&self, key: &str, compute: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let mut rx = self.join(key, compute);
        let result = match rx.wait_for(Option::is_some).await {
            Ok(done) => (*done).clone(),
            Err(_) => None,
        };

        result.unwrap_or_else(|| {
            error!(key, "in-flight computation ended without a result");
            Err(CacheError::Internal(format!(
                "computation for {} ended without a result",
                key
            )))
        })
    }

    /// Number of keys with a computation currently in flight.
    pub fn in_flight(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns the slot of the in-flight call for `key`, starting one first
    /// if there is none.
    fn join<F, Fut>(&self, key: &str, compute: F) -> watch::Receiver<Slot<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let tx = {
            let mut calls = self.calls.lock();
            if let Some(rx) = calls.get(key) {
                return rx.clone();
            }

            let (tx, rx) = watch::channel(None);
            calls.insert(key.to_string(), rx);
            tx
        };
        let rx = tx.subscribe();

        let record = CallRecord {
            calls: self.calls.clone(),
            key: key.to_string(),
        };
        let task = compute();
        tokio::spawn(async move {
            let result = task.await;
            drop(record);
            tx.send_replace(Some(result));
        });
        rx
    }
}

impl<T> Default for Coalescer<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Removes the call record when the computation finishes or panics.
struct CallRecord<T> {
    calls: Calls<T>,
    key: String,
}

impl<T> Drop for CallRecord<T> {
    fn drop(&mut self) {
        self.calls.lock().remove(&self.key);
    }
}
