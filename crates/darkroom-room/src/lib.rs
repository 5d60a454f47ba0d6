//! Room lifecycle and integrity engine for Darkroom.
//!
//! This is the authoritative state machine for a room between creation
//! and destruction:
//!
//! - [`seal`] / [`verify`] — the digest binding a room's destruction
//!   deadline to its code and the server secret, so clients cannot forge
//!   a different deadline later.
//! - [`check_expiry`] — the pure expiry predicate both the sweep and the
//!   lazy paths evaluate.
//! - [`RoomManager`] — create, login/touch, append-message, and
//!   idempotent destroy over a [`RoomStore`](darkroom_store::RoomStore).
//!
//! Ordering rule throughout: every validation and integrity failure
//! happens strictly before any write. A rejected request leaves
//! `lastActivityTimestamp` and `messages` untouched.

mod digest;
mod error;
mod expiry;
mod manager;

pub use digest::{seal, verify};
pub use error::RoomError;
pub use expiry::{check_expiry, ExpiryVerdict};
pub use manager::{now_millis, RoomManager};
