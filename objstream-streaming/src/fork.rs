//! Bounded broadcast fan-out.
//!
//! One pump publishes; each subscriber consumes at its own pace through a
//! bounded buffer. When any live subscriber's buffer is full,
//! [`StreamFork::publish`] suspends, which is exactly how backpressure
//! reaches the upstream provider stream: the pump is the only upstream
//! reader and it stops polling while a publish is parked.
//!
//! A dropped receiver unsubscribes silently; it neither blocks publishing
//! nor tears the call down.

use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

/// Default per-subscriber buffer depth.
pub const DEFAULT_BUFFER_CAPACITY: usize = 64;

/// The producing side of a bounded broadcast.
#[derive(Debug)]
pub struct StreamFork<T> {
    senders: Vec<mpsc::Sender<T>>,
}

impl<T: Clone> StreamFork<T> {
    /// Create a fork with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            senders: Vec::new(),
        }
    }

    /// Add a subscriber with the given buffer capacity.
    ///
    /// Subscribers see every item published after this call.
    pub fn subscribe(&mut self, capacity: usize) -> ForkStream<T> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        self.senders.push(tx);
        ForkStream { inner: rx }
    }

    /// Publish an item to every live subscriber, waiting for buffer space.
    pub async fn publish(&mut self, item: T) {
        self.senders.retain(|tx| !tx.is_closed());
        for tx in &self.senders {
            // A receiver dropped between retain and send just skips.
            let _ = tx.send(item.clone()).await;
        }
    }

    /// Whether every subscriber has gone away.
    #[must_use]
    pub fn is_abandoned(&self) -> bool {
        self.senders.iter().all(|tx| tx.is_closed())
    }

    /// End the broadcast; every subscriber stream terminates after
    /// draining its buffer.
    pub fn close(&mut self) {
        self.senders.clear();
    }
}

impl<T: Clone> Default for StreamFork<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// One subscriber's view of a [`StreamFork`].
#[derive(Debug)]
pub struct ForkStream<T> {
    inner: mpsc::Receiver<T>,
}

impl<T> Stream for ForkStream<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_recv(cx)
    }
}
