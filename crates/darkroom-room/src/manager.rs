//! Room lifecycle: create, re-enter, append, destroy.
//!
//! Every operation follows the same shape — read the current record,
//! run all validation and integrity checks against it, and only then
//! write. A request that fails any check leaves the store untouched,
//! including the activity timestamp.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{info, warn};

use darkroom_protocol::{CreateRoom, MessageKey, RoomCode, RoomRecord, SendMessage};
use darkroom_store::RoomStore;

use crate::digest::{seal, verify};
use crate::error::RoomError;
use crate::expiry::{check_expiry, ExpiryVerdict};

/// Current wall-clock time as unix milliseconds.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Orchestrates the lifecycle of rooms over a [`RoomStore`].
pub struct RoomManager<S> {
    store: Arc<S>,
    secret: String,
}

impl<S: RoomStore> RoomManager<S> {
    pub fn new(store: Arc<S>, secret: impl Into<String>) -> Self {
        Self {
            store,
            secret: secret.into(),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Creates a room from a validated command. Fails with
    /// [`RoomError::Conflict`] when the code is already taken — an
    /// existing room is never silently replaced.
    pub async fn create(&self, cmd: CreateRoom) -> Result<RoomRecord, RoomError> {
        if self.store.get(&cmd.code).await?.is_some() {
            return Err(RoomError::Conflict(cmd.code));
        }

        let now = now_millis();
        let time_to_destroy = if cmd.countdown_ms > 0 {
            now + cmd.countdown_ms
        } else {
            0
        };

        let record = RoomRecord {
            last_activity_timestamp: now,
            inactive_days_limit: cmd.inactive_limit_ms,
            time_to_destroy,
            data_hash: seal(&cmd.code, time_to_destroy, &self.secret),
            messages: BTreeMap::new(),
        };
        self.store.insert(&cmd.code, record.clone()).await?;

        info!(room = %cmd.code, time_to_destroy, "room created");
        Ok(record)
    }

    /// Re-enters an existing room. An expired room is destroyed on the
    /// spot and reported as such — a reader can never observe a room
    /// the expiry rules already condemned. On success the activity
    /// timestamp is refreshed.
    pub async fn login(&self, code: &RoomCode) -> Result<(), RoomError> {
        let record = self
            .store
            .get(code)
            .await?
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;

        let now = now_millis();
        if !check_expiry(&record, now).is_alive() {
            self.destroy(code).await?;
            return Err(RoomError::Expired(code.clone()));
        }

        self.store.touch(code, now).await?;
        Ok(())
    }

    /// Appends a message. The presented deadline and digest must both
    /// reproduce the stored digest; any mismatch is one uniform
    /// [`RoomError::Tampered`] with no detail about which field
    /// differed. Checks run strictly before the write — a rejected
    /// message refreshes nothing.
    pub async fn append_message(
        &self,
        cmd: SendMessage,
    ) -> Result<MessageKey, RoomError> {
        let record = self
            .store
            .get(&cmd.code)
            .await?
            .ok_or_else(|| RoomError::NotFound(cmd.code.clone()))?;

        let intact = verify(&cmd.code, cmd.time_to_destroy, &self.secret, &record.data_hash)
            && cmd.data_hash == record.data_hash;
        if !intact {
            warn!(room = %cmd.code, "message rejected: integrity check failed");
            return Err(RoomError::Tampered(cmd.code));
        }

        let now = now_millis();
        if !check_expiry(&record, now).is_alive() {
            self.destroy(&cmd.code).await?;
            return Err(RoomError::Expired(cmd.code));
        }

        let key = MessageKey::generate();
        self.store
            .append_message(&cmd.code, key, cmd.message, now)
            .await?;
        Ok(key)
    }

    /// Tears a room down. Idempotent: destroying an absent room
    /// succeeds, so retries and races between lazy expiry, the sweep,
    /// and explicit destruction all converge on the same end state.
    pub async fn destroy(&self, code: &RoomCode) -> Result<(), RoomError> {
        self.store.remove(code).await?;
        info!(room = %code, "room destroyed");
        Ok(())
    }

    /// Evaluates one record against the clock. Exposed for the sweep,
    /// which checks snapshots without re-reading each room.
    pub fn verdict(&self, record: &RoomRecord, now_ms: u64) -> ExpiryVerdict {
        check_expiry(record, now_ms)
    }
}
