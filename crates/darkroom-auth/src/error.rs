//! Error types for the token broker boundary.

/// Errors that can occur issuing or verifying bearer tokens.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The token is unknown, revoked, or maps to a different room.
    /// Carries no detail on purpose.
    #[error("invalid bearer token")]
    InvalidToken,

    /// The broker backend failed (unreachable service, etc.).
    #[error("token broker error: {0}")]
    Broker(String),
}
