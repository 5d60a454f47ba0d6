//! Realtime relay: one room's change feed fanned out to a subscriber.
//!
//! Each subscription is its own forwarding task reading the store's
//! change feed and pushing full-state snapshots to the subscriber's
//! outbound channel. Intermediate states may coalesce under load, but
//! the terminal destroy notification is pushed exactly once, after
//! which the task ends and the channel closes.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use tracing::debug;

use darkroom_protocol::{RoomCode, ServerPush};
use darkroom_store::{RoomStore, RoomWatch, StoreError};

/// The subscriber's outbound channel. The transport end drains it and
/// serializes each push onto the wire.
pub type PushSender = mpsc::UnboundedSender<ServerPush>;

/// Hands out live subscriptions over a [`RoomStore`].
pub struct Relay<S> {
    store: Arc<S>,
}

impl<S: RoomStore> Relay<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Starts streaming `code` to `out`. The first push is the room's
    /// current state (or the destroy notification if the room is
    /// already gone), followed by one push per observed change.
    pub async fn subscribe(
        &self,
        code: &RoomCode,
        out: PushSender,
    ) -> Result<Subscription, StoreError> {
        let feed = self.store.watch(code).await?;
        let room = code.clone();
        let task = tokio::spawn(forward(feed, out, room));
        Ok(Subscription {
            code: code.clone(),
            task,
        })
    }
}

async fn forward(mut feed: RoomWatch, out: PushSender, room: RoomCode) {
    loop {
        let snapshot = feed.borrow_and_update().clone();
        match snapshot {
            Some(record) => {
                if out.send(ServerPush::update(&record)).is_err() {
                    // Subscriber hung up.
                    break;
                }
            }
            None => {
                let _ = out.send(ServerPush::destroy());
                debug!(room = %room, "destroy pushed, subscription over");
                break;
            }
        }
        if feed.changed().await.is_err() {
            // Store dropped the feed without a final None; nothing more
            // will ever arrive.
            break;
        }
    }
}

/// A live subscription. Dropping it stops the forwarding task.
#[derive(Debug)]
pub struct Subscription {
    code: RoomCode,
    task: JoinHandle<()>,
}

impl Subscription {
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Stops forwarding now. No further pushes reach the subscriber.
    pub fn cancel(self) {
        self.task.abort();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}
