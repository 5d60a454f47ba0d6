use thiserror::Error;

use darkroom_auth::AuthError;
use darkroom_protocol::ProtocolError;
use darkroom_room::RoomError;
use darkroom_store::StoreError;

/// Unified error for the service boundary.
#[derive(Debug, Error)]
pub enum DarkroomError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Room(#[from] RoomError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DarkroomError {
    /// HTTP-style status for the transport layer: the caller's fault is
    /// 400, ours is 500.
    pub fn status(&self) -> u16 {
        match self {
            Self::Protocol(_) => 400,
            Self::Room(RoomError::Store(_)) => 500,
            Self::Room(_) => 400,
            Self::Auth(AuthError::InvalidToken) => 400,
            Self::Auth(AuthError::Broker(_)) => 500,
            Self::Store(_) | Self::Io(_) => 500,
        }
    }
}
