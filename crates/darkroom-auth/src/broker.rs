//! The token broker trait and its in-memory implementation.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;

use darkroom_protocol::RoomCode;
use rand::Rng;
use tokio::sync::Mutex;

use crate::AuthError;

/// An opaque bearer credential bound to exactly one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Tokens are credentials; Display keeps them out of logs.
impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "token({}…)", &self.0[..self.0.len().min(6)])
    }
}

/// Issues and verifies the opaque bearer credentials that gate
/// `destroy_room` and friends.
///
/// Returned futures carry an explicit `Send` bound so handlers can
/// await them from spawned per-connection tasks.
pub trait TokenBroker: Send + Sync + 'static {
    /// Mints a fresh token bound to `code`.
    fn issue(
        &self,
        code: &RoomCode,
    ) -> impl Future<Output = Result<AccessToken, AuthError>> + Send;

    /// Resolves a presented token back to the room it was issued for.
    ///
    /// # Errors
    /// [`AuthError::InvalidToken`] if the token is unknown or revoked.
    fn verify(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<RoomCode, AuthError>> + Send;

    /// Invalidates every token issued for `code`. Called when the room
    /// is destroyed so stale credentials die with it.
    fn revoke(
        &self,
        code: &RoomCode,
    ) -> impl Future<Output = Result<(), AuthError>> + Send;
}

/// In-process [`TokenBroker`] keeping a token → code index.
///
/// Tokens are 32 hex characters (128 bits of entropy) — infeasible to
/// guess, cheap to compare.
#[derive(Default)]
pub struct MemoryBroker {
    tokens: Mutex<HashMap<String, RoomCode>>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenBroker for MemoryBroker {
    async fn issue(&self, code: &RoomCode) -> Result<AccessToken, AuthError> {
        let token = generate_token();
        self.tokens
            .lock()
            .await
            .insert(token.clone(), code.clone());
        tracing::debug!(%code, "token issued");
        Ok(AccessToken::new(token))
    }

    async fn verify(&self, token: &str) -> Result<RoomCode, AuthError> {
        self.tokens
            .lock()
            .await
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }

    async fn revoke(&self, code: &RoomCode) -> Result<(), AuthError> {
        self.tokens.lock().await.retain(|_, c| c != code);
        tracing::debug!(%code, "tokens revoked");
        Ok(())
    }
}

/// Generates a random 32-character hex string (128 bits of entropy).
fn generate_token() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
