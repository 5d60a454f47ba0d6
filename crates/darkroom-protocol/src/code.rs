//! Room code validation.
//!
//! A room is addressed by an opaque high-entropy code: exactly 64
//! characters drawn from the 62-character alphanumeric alphabet,
//! case-sensitive. The code doubles as the room's capability, so
//! validation is deliberately strict — no trimming, no normalization,
//! any deviation fails closed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// Required length of a room code.
pub const CODE_LENGTH: usize = 64;

/// Returns `true` iff `code` has the exact shape of a room code:
/// 64 characters, each in `[A-Za-z0-9]`.
pub fn is_valid_code(code: &str) -> bool {
    code.len() == CODE_LENGTH
        && code.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// A validated room code.
///
/// Construction goes through [`RoomCode::parse`] (or serde, which routes
/// through the same check via `try_from`), so holding a `RoomCode` is
/// proof the shape is correct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    /// Validates `code` and wraps it.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidCode`] if the length or alphabet
    /// is wrong.
    pub fn parse(code: &str) -> Result<Self, ProtocolError> {
        if !is_valid_code(code) {
            return Err(ProtocolError::InvalidCode);
        }
        Ok(Self(code.to_owned()))
    }

    /// The full 64-character code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RoomCode {
    type Error = ProtocolError;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        if !is_valid_code(&code) {
            return Err(ProtocolError::InvalidCode);
        }
        Ok(Self(code))
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

/// Display renders only a prefix — codes are capabilities and must not
/// leak into logs wholesale.
impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}…", &self.0[..8])
    }
}
