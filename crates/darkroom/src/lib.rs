//! Darkroom: ephemeral, self-destructing chat rooms.
//!
//! Rooms are identified by a 64-character alphanumeric code, carry an
//! inactivity budget and an optional absolute destruction deadline, and
//! vanish completely once either expires — lazily on access, or through
//! the background sweep. A tamper-evident digest pins the deadline at
//! creation so clients cannot renegotiate it.
//!
//! This crate assembles the pieces behind one [`Darkroom`] service:
//!
//! - [`darkroom_protocol`] — codes, countdown parsing, request schema,
//!   wire frames
//! - [`darkroom_store`] — the store boundary and in-memory backend
//! - [`darkroom_auth`] — bearer tokens gating destruction
//! - [`darkroom_room`] — lifecycle, integrity digest, expiry rules
//! - [`darkroom_sweep`] — the single-flight periodic sweep
//! - [`darkroom_relay`] — full-state pushes to subscribers

mod error;
mod maintenance;
mod service;

pub use error::DarkroomError;
pub use maintenance::MaintenanceLog;
pub use service::{CleanupOutcome, Darkroom, DarkroomBuilder, FrameOutcome};

pub use darkroom_auth::{AccessToken, MemoryBroker, TokenBroker};
pub use darkroom_relay::{PushSender, Subscription};
pub use darkroom_store::{MemoryStore, RoomStore};
pub use darkroom_sweep::{SweepConfig, SweepHandle, SweepReport};

pub use darkroom_protocol as protocol;
