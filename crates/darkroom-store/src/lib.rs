//! Store boundary for Darkroom.
//!
//! The authoritative room collection lives in an external realtime
//! key-value store. This crate pins down exactly what the core needs
//! from it — the [`RoomStore`] trait — and ships [`MemoryStore`], an
//! in-process reference implementation used by tests and local runs.
//!
//! # Contract
//!
//! Implementations must serialize writes per room key; no cross-key
//! transactions are assumed. Removal of a room takes its whole subtree
//! with it in one step — a partially destroyed room (messages surviving
//! the record) must never be observable. Each room exposes a change feed
//! whose items are the full current record, or `None` once the room is
//! gone.

mod error;
mod memory;

pub use error::StoreError;
pub use memory::MemoryStore;

use std::collections::HashMap;
use std::future::Future;

use darkroom_protocol::{MessageKey, RoomCode, RoomRecord};

/// One subscriber's view of a room's change feed.
///
/// Carries the latest full record, or `None` when the room does not
/// exist (any more). Intermediate states may coalesce under load; the
/// final `None` is always delivered.
pub type RoomWatch = tokio::sync::watch::Receiver<Option<RoomRecord>>;

/// The external realtime store, reduced to the operations the room
/// lifecycle, sweep, and relay actually need.
///
/// Methods are written in desugared form with an explicit `Send` bound
/// on the returned futures: the sweep loop awaits them inside spawned
/// tasks, and a bare `async fn` in a trait would not promise `Send`.
/// Implementations can still use plain `async fn`.
pub trait RoomStore: Send + Sync + 'static {
    /// Reads one room's current record.
    fn get(
        &self,
        code: &RoomCode,
    ) -> impl Future<Output = Result<Option<RoomRecord>, StoreError>> + Send;

    /// Writes a freshly created room. Existence checking is the
    /// caller's job — a plain overwrite semantics keeps the contract
    /// implementable on dumb KV backends.
    fn insert(
        &self,
        code: &RoomCode,
        record: RoomRecord,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Refreshes a room's activity timestamp. A no-op if the room is
    /// gone — activity races destruction by design, and last-writer-wins
    /// on a forward-moving clock is acceptable.
    fn touch(
        &self,
        code: &RoomCode,
        at_ms: u64,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Appends one message and refreshes activity in a single step.
    /// A no-op if the room is gone (the message is lost to a concurrent
    /// destroy — a documented, accepted race).
    fn append_message(
        &self,
        code: &RoomCode,
        key: MessageKey,
        payload: String,
        at_ms: u64,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Removes a room and everything under it. Idempotent: removing an
    /// absent room succeeds.
    fn remove(
        &self,
        code: &RoomCode,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Bulk-reads every live room. A single call yields an internally
    /// consistent view for one sweep pass.
    fn snapshot(
        &self,
    ) -> impl Future<Output = Result<HashMap<RoomCode, RoomRecord>, StoreError>> + Send;

    /// Opens a change feed for one room. Subscribing to an absent room
    /// yields an immediate `None`.
    fn watch(
        &self,
        code: &RoomCode,
    ) -> impl Future<Output = Result<RoomWatch, StoreError>> + Send;
}
