use darkroom_protocol::RoomCode;
use darkroom_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoomError {
    #[error("room {0} already exists")]
    Conflict(RoomCode),

    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// Presented integrity data did not match the room. Intentionally
    /// carries no detail about which field differed.
    #[error("integrity check failed for room {0}")]
    Tampered(RoomCode),

    #[error("room {0} has expired")]
    Expired(RoomCode),

    #[error(transparent)]
    Store(#[from] StoreError),
}
