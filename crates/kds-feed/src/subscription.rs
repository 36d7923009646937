//! Cancellable live-snapshot subscriptions
//!
//! A [`Subscription`] is the consumer half of a feed. It yields one
//! `Result<Snapshot, FeedError>` per change, implements [`Stream`], and tears
//! the producer down when cancelled or dropped.

use crate::error::FeedError;
use futures::Stream;
use kds_types::Snapshot;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Item delivered by a subscription
pub type FeedItem = Result<Snapshot, FeedError>;

static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(1);

/// Create a connected sender / subscription pair
pub fn channel() -> (FeedSender, Subscription) {
    let (tx, rx) = mpsc::unbounded_channel();
    let id = NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::Relaxed);
    (
        FeedSender { id, tx },
        Subscription {
            id,
            rx,
            task: None,
        },
    )
}

/// Producer half of a subscription
#[derive(Debug, Clone)]
pub struct FeedSender {
    id: u64,
    tx: mpsc::UnboundedSender<FeedItem>,
}

impl FeedSender {
    /// Push a snapshot; returns false once the subscription is gone
    pub fn send_snapshot(&self, snapshot: Snapshot) -> bool {
        self.tx.send(Ok(snapshot)).is_ok()
    }

    /// Push an error; returns false once the subscription is gone
    pub fn send_error(&self, error: FeedError) -> bool {
        self.tx.send(Err(error)).is_ok()
    }

    /// Returns true when the consumer has cancelled or dropped the subscription
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Subscription id this sender feeds
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Consumer half of a live feed
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<FeedItem>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Attach the producer task, aborted when the subscription goes away
    pub fn with_task(mut self, task: JoinHandle<()>) -> Self {
        self.task = Some(task);
        self
    }

    /// Unique id, for logging
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Wait for the next snapshot or error
    ///
    /// Returns `None` once the producer has stopped.
    pub async fn recv(&mut self) -> Option<FeedItem> {
        self.rx.recv().await
    }

    /// Take the next item if one is already queued
    pub fn try_recv(&mut self) -> Option<FeedItem> {
        self.rx.try_recv().ok()
    }

    /// Stop the feed
    pub fn cancel(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.rx.close();
        if let Some(task) = self.task.take() {
            task.abort();
        }
        debug!(subscription = self.id, "Subscription cancelled");
    }
}

impl Stream for Subscription {
    type Item = FeedItem;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_stream_yields_in_order() {
        let (tx, mut sub) = channel();
        assert!(tx.send_snapshot(Snapshot::empty()));
        assert!(tx.send_error(FeedError::Closed));
        drop(tx);

        assert!(matches!(sub.next().await, Some(Ok(s)) if s.is_empty()));
        assert!(matches!(sub.next().await, Some(Err(FeedError::Closed))));
        assert!(sub.next().await.is_none());
    }

    #[tokio::test]
    async fn test_cancel_closes_sender() {
        let (tx, sub) = channel();
        assert!(!tx.is_closed());
        sub.cancel();
        assert!(tx.is_closed());
        assert!(!tx.send_snapshot(Snapshot::empty()));
    }

    #[tokio::test]
    async fn test_drop_aborts_task() {
        let (_tx, sub) = channel();
        let (done_tx, done_rx) = tokio::sync::oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let _held = done_tx;
            std::future::pending::<()>().await;
        });
        drop(sub.with_task(task));
        // aborting the task drops the oneshot sender
        assert!(done_rx.await.is_err());
    }
}
