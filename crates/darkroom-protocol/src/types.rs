//! Shared wire types: message keys, the room record, and realtime frames.
//!
//! Field names are camelCase on the wire (`timeToDestroy`,
//! `lastActivityTimestamp`, `darkRoomCode`) so existing clients keep
//! working unchanged.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::request::{SendMessageRequest, SubscribeRequest};
use crate::ProtocolError;

// ---------------------------------------------------------------------------
// MessageKey
// ---------------------------------------------------------------------------

/// A unique, time-ordered key for one message within a room.
///
/// Backed by a UUIDv7: the timestamp sits in the high bits, so the
/// canonical string form sorts in insertion order. That makes a
/// `BTreeMap<MessageKey, String>` an append-ordered sequence without any
/// extra bookkeeping. Two keys generated in the same millisecond carry
/// random low bits — still unique, ordering between them arbitrary.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct MessageKey(Uuid);

impl MessageKey {
    /// Generates a fresh key stamped with the current time.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// RoomRecord
// ---------------------------------------------------------------------------

/// The authoritative state of one room, as stored and as pushed to
/// subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRecord {
    /// Epoch milliseconds of the last accepted interaction (login,
    /// subscribe, or message append). Refreshed only after all
    /// validation and integrity checks pass.
    pub last_activity_timestamp: u64,

    /// Inactivity budget in **milliseconds**, despite the wire name —
    /// the original clients send days and the boundary converts. A value
    /// of 0 expires the room on its first inactivity check; it is never
    /// treated as "no limit".
    pub inactive_days_limit: u64,

    /// Absolute destruction deadline in epoch milliseconds, or 0 for
    /// "no absolute deadline".
    pub time_to_destroy: u64,

    /// Hex SHA-256 binding `code`, `time_to_destroy`, and the server
    /// secret. Immutable after creation; later writes must re-prove the
    /// deadline against it.
    pub data_hash: String,

    /// Append-only message sequence, ordered by key (= insertion order).
    #[serde(default)]
    pub messages: BTreeMap<MessageKey, String>,
}

// ---------------------------------------------------------------------------
// Realtime frames
// ---------------------------------------------------------------------------

/// Client → server frames on the realtime channel, tagged on `action`.
///
/// Anything that does not parse into one of these variants is treated as
/// tampering, not as ordinary bad input.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ClientFrame {
    /// Start streaming a room's state to this connection.
    StartDataListener(SubscribeRequest),

    /// Append a message to a room.
    SendMessage(SendMessageRequest),
}

/// Server → client pushes on the realtime channel.
///
/// The shapes are positional rather than tagged (except `destroy`) to
/// match what the deployed clients already parse, hence `untagged`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ServerPush {
    /// Full current room state: every message plus the deadline.
    /// Always the whole sequence, never a delta.
    Update {
        messages: BTreeMap<MessageKey, String>,
        #[serde(rename = "timeToDestroy")]
        time_to_destroy: u64,
    },

    /// Terminal signal: the room no longer exists. Sent exactly once
    /// per subscription, after which no further pushes follow.
    Destroy { action: &'static str },

    /// The frame was rejected. `status` mirrors HTTP conventions.
    Rejected { message: String, status: u16 },
}

impl ServerPush {
    /// A full-state push for `record`.
    pub fn update(record: &RoomRecord) -> Self {
        Self::Update {
            messages: record.messages.clone(),
            time_to_destroy: record.time_to_destroy,
        }
    }

    /// The terminal destroy signal.
    pub fn destroy() -> Self {
        Self::Destroy { action: "destroy" }
    }

    /// The generic rejection sent for invalid or malformed frames.
    pub fn invalid() -> Self {
        Self::Rejected {
            message: "Invalid Request.".to_owned(),
            status: 400,
        }
    }
}

/// Decodes a raw realtime frame.
///
/// # Errors
/// Returns [`ProtocolError::MalformedFrame`] for non-JSON input and for
/// JSON that is not a known `action` — both are treated as probable
/// injection attempts by callers.
pub fn decode_frame(data: &[u8]) -> Result<ClientFrame, ProtocolError> {
    serde_json::from_slice(data).map_err(ProtocolError::MalformedFrame)
}

/// Encodes an outbound push to bytes.
pub fn encode_push(push: &ServerPush) -> Result<Vec<u8>, ProtocolError> {
    serde_json::to_vec(push).map_err(ProtocolError::Encode)
}
