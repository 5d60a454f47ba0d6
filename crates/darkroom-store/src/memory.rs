//! In-memory reference implementation of [`RoomStore`].
//!
//! Backs tests and single-process deployments. Every mutation publishes
//! the full updated record on the room's watch channel; removal
//! publishes `None` and drops the channel, so late subscribers of a
//! dead code see `None` immediately.

use std::collections::HashMap;

use darkroom_protocol::{MessageKey, RoomCode, RoomRecord};
use tokio::sync::{watch, Mutex};

use crate::{RoomStore, RoomWatch, StoreError};

struct Entry {
    record: RoomRecord,
    notify: watch::Sender<Option<RoomRecord>>,
}

impl Entry {
    fn publish(&self) {
        // send_replace keeps the latest value even with no receivers,
        // so a watch opened later still starts from current state.
        self.notify.send_replace(Some(self.record.clone()));
    }
}

/// An in-process [`RoomStore`].
///
/// A single async mutex over the whole map serializes writes; the
/// critical sections are plain map operations, never held across awaits.
#[derive(Default)]
pub struct MemoryStore {
    rooms: Mutex<HashMap<RoomCode, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live rooms. Test helper.
    pub async fn len(&self) -> usize {
        self.rooms.lock().await.len()
    }

    /// `true` if no rooms exist. Test helper.
    pub async fn is_empty(&self) -> bool {
        self.rooms.lock().await.is_empty()
    }
}

impl RoomStore for MemoryStore {
    async fn get(
        &self,
        code: &RoomCode,
    ) -> Result<Option<RoomRecord>, StoreError> {
        Ok(self
            .rooms
            .lock()
            .await
            .get(code)
            .map(|entry| entry.record.clone()))
    }

    async fn insert(
        &self,
        code: &RoomCode,
        record: RoomRecord,
    ) -> Result<(), StoreError> {
        let mut rooms = self.rooms.lock().await;
        let (notify, _) = watch::channel(Some(record.clone()));
        rooms.insert(code.clone(), Entry { record, notify });
        Ok(())
    }

    async fn touch(
        &self,
        code: &RoomCode,
        at_ms: u64,
    ) -> Result<(), StoreError> {
        let mut rooms = self.rooms.lock().await;
        if let Some(entry) = rooms.get_mut(code) {
            entry.record.last_activity_timestamp = at_ms;
            entry.publish();
        }
        Ok(())
    }

    async fn append_message(
        &self,
        code: &RoomCode,
        key: MessageKey,
        payload: String,
        at_ms: u64,
    ) -> Result<(), StoreError> {
        let mut rooms = self.rooms.lock().await;
        match rooms.get_mut(code) {
            Some(entry) => {
                entry.record.last_activity_timestamp = at_ms;
                entry.record.messages.insert(key, payload);
                entry.publish();
            }
            None => {
                // Lost to a concurrent destroy; accepted.
                tracing::debug!(%code, "append to absent room dropped");
            }
        }
        Ok(())
    }

    async fn remove(&self, code: &RoomCode) -> Result<(), StoreError> {
        let mut rooms = self.rooms.lock().await;
        if let Some(entry) = rooms.remove(code) {
            // The terminal None reaches every open watch before the
            // sender drops.
            entry.notify.send_replace(None);
        }
        Ok(())
    }

    async fn snapshot(
        &self,
    ) -> Result<HashMap<RoomCode, RoomRecord>, StoreError> {
        Ok(self
            .rooms
            .lock()
            .await
            .iter()
            .map(|(code, entry)| (code.clone(), entry.record.clone()))
            .collect())
    }

    async fn watch(&self, code: &RoomCode) -> Result<RoomWatch, StoreError> {
        let rooms = self.rooms.lock().await;
        match rooms.get(code) {
            Some(entry) => Ok(entry.notify.subscribe()),
            None => {
                // Detached channel pre-loaded with None: the subscriber
                // observes an absent room and terminates on its own.
                let (_, rx) = watch::channel(None);
                Ok(rx)
            }
        }
    }
}
