//! Terminal values.
//!
//! A [`TerminalCell`] is an awaitable slot that resolves exactly once, when
//! the stream runs to completion (or fails). A rejected cell that nobody
//! ever awaits is inert: there is no unhandled-rejection hazard to defuse,
//! and a consumer that does await still sees the stored error.

use std::sync::{Arc, OnceLock};
use tokio::sync::Notify;

use crate::error::StreamObjectError;

/// An awaitable write-once slot. Cloning shares the slot.
#[derive(Debug, Clone)]
pub struct TerminalCell<T> {
    inner: Arc<CellInner<T>>,
}

#[derive(Debug)]
struct CellInner<T> {
    slot: OnceLock<Result<T, StreamObjectError>>,
    notify: Notify,
}

impl<T: Clone> TerminalCell<T> {
    /// Create an unresolved cell.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CellInner {
                slot: OnceLock::new(),
                notify: Notify::new(),
            }),
        }
    }

    /// Resolve with a value. The first resolution wins; returns whether
    /// this call was it.
    pub fn resolve(&self, value: T) -> bool {
        self.complete(Ok(value))
    }

    /// Reject with an error. The first resolution wins.
    pub fn reject(&self, error: StreamObjectError) -> bool {
        self.complete(Err(error))
    }

    fn complete(&self, result: Result<T, StreamObjectError>) -> bool {
        let fresh = self.inner.slot.set(result).is_ok();
        self.inner.notify.notify_waiters();
        fresh
    }

    /// The stored result, if already resolved.
    #[must_use]
    pub fn try_get(&self) -> Option<&Result<T, StreamObjectError>> {
        self.inner.slot.get()
    }

    /// Wait for resolution and clone the result out.
    pub async fn get(&self) -> Result<T, StreamObjectError> {
        loop {
            if let Some(result) = self.inner.slot.get() {
                return result.clone();
            }
            let notified = self.inner.notify.notified();
            // Re-check: resolution may have landed between the check above
            // and registering the waiter.
            if let Some(result) = self.inner.slot.get() {
                return result.clone();
            }
            notified.await;
        }
    }
}

impl<T: Clone> Default for TerminalCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_resolve_before_get() {
        let cell = TerminalCell::new();
        assert!(cell.resolve(42));
        assert_eq!(cell.get().await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_get_before_resolve() {
        let cell: TerminalCell<u32> = TerminalCell::new();
        let waiter = cell.clone();
        let handle = tokio::spawn(async move { waiter.get().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        cell.resolve(7);
        assert_eq!(handle.await.unwrap().unwrap(), 7);
    }

    #[tokio::test]
    async fn test_first_resolution_wins() {
        let cell = TerminalCell::new();
        assert!(cell.resolve(1));
        assert!(!cell.reject(StreamObjectError::Cancelled));
        assert_eq!(cell.get().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_rejection_is_observable() {
        let cell: TerminalCell<u32> = TerminalCell::new();
        cell.reject(StreamObjectError::Cancelled);
        assert!(cell.get().await.unwrap_err().is_cancelled());
    }

    #[test]
    fn test_unawaited_rejection_is_inert() {
        let cell: TerminalCell<u32> = TerminalCell::new();
        cell.reject(StreamObjectError::Cancelled);
        // Dropping without awaiting must not panic or leak observers.
        drop(cell);
    }

    #[tokio::test]
    async fn test_multiple_waiters() {
        let cell: TerminalCell<&'static str> = TerminalCell::new();
        let waiters: Vec<_> = (0..3)
            .map(|_| {
                let cell = cell.clone();
                tokio::spawn(async move { cell.get().await })
            })
            .collect();
        tokio::time::sleep(Duration::from_millis(10)).await;
        cell.resolve("done");
        for waiter in waiters {
            assert_eq!(waiter.await.unwrap().unwrap(), "done");
        }
    }
}
