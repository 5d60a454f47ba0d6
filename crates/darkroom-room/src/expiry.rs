//! Pure expiry evaluation.
//!
//! The same predicate backs lazy checks on the request path and the
//! periodic sweep, so the two can never disagree about whether a room
//! is alive.

use darkroom_protocol::RoomRecord;

/// Outcome of evaluating a room against a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryVerdict {
    /// Neither rule fired.
    Alive,
    /// The absolute self-destruct deadline has passed.
    ExpiredByDeadline,
    /// No activity for longer than the room's inactivity limit.
    ExpiredByInactivity,
}

impl ExpiryVerdict {
    pub fn is_alive(self) -> bool {
        matches!(self, ExpiryVerdict::Alive)
    }
}

/// Evaluates `record` as of `now_ms` (unix milliseconds).
///
/// The deadline rule wins when both fire. A `time_to_destroy` of zero
/// means no deadline was set. Inactivity is strict: a room idle for
/// exactly its limit is still alive, one millisecond more is not —
/// which also makes a limit of zero mean "expires on any idle tick".
pub fn check_expiry(record: &RoomRecord, now_ms: u64) -> ExpiryVerdict {
    if record.time_to_destroy > 0 && now_ms >= record.time_to_destroy {
        return ExpiryVerdict::ExpiredByDeadline;
    }
    if now_ms.saturating_sub(record.last_activity_timestamp) > record.inactive_days_limit {
        return ExpiryVerdict::ExpiredByInactivity;
    }
    ExpiryVerdict::Alive
}
