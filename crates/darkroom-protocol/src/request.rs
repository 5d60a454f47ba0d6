//! Per-operation request schema.
//!
//! Each operation has two types: the `*Request` shape clients actually
//! send (loose field types, camelCase wire names) and the command a
//! successful `validate()` produces (validated [`RoomCode`], durations
//! already in milliseconds). Handlers only ever see commands, so a bad
//! shape is a typed [`ProtocolError`] at the boundary instead of a
//! boolean threading through unrelated code.
//!
//! The set of operations is closed by construction — there is no
//! "unknown operation" runtime path to fail fatally on.

use serde::Deserialize;

use crate::{parse_countdown, days_to_millis, ProtocolError, RoomCode};

// ---------------------------------------------------------------------------
// login
// ---------------------------------------------------------------------------

/// `login` request: re-enter an existing room by code.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub code: String,
}

/// Validated `login` command.
#[derive(Debug, Clone)]
pub struct Login {
    pub code: RoomCode,
}

impl LoginRequest {
    pub fn validate(self) -> Result<Login, ProtocolError> {
        Ok(Login {
            code: RoomCode::parse(&self.code)?,
        })
    }
}

// ---------------------------------------------------------------------------
// create
// ---------------------------------------------------------------------------

/// `create_room` request. `inactiveDaysLimit` is whole days;
/// `autoDestroyTimer` is an `HH:MM:SS` countdown.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    pub code: String,
    pub inactive_days_limit: u32,
    pub auto_destroy_timer: String,
}

/// Validated `create_room` command, durations in milliseconds.
#[derive(Debug, Clone)]
pub struct CreateRoom {
    pub code: RoomCode,
    /// Inactivity budget in milliseconds.
    pub inactive_limit_ms: u64,
    /// Countdown until forced destruction, in milliseconds. 0 disables
    /// the absolute deadline.
    pub countdown_ms: u64,
}

impl CreateRequest {
    pub fn validate(self) -> Result<CreateRoom, ProtocolError> {
        Ok(CreateRoom {
            code: RoomCode::parse(&self.code)?,
            inactive_limit_ms: days_to_millis(self.inactive_days_limit),
            countdown_ms: parse_countdown(&self.auto_destroy_timer)?,
        })
    }
}

// ---------------------------------------------------------------------------
// subscribe
// ---------------------------------------------------------------------------

/// `startDataListener` frame body: begin streaming one room.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeRequest {
    pub dark_room_code: String,
}

/// Validated subscribe command.
#[derive(Debug, Clone)]
pub struct Subscribe {
    pub code: RoomCode,
}

impl SubscribeRequest {
    pub fn validate(self) -> Result<Subscribe, ProtocolError> {
        Ok(Subscribe {
            code: RoomCode::parse(&self.dark_room_code)?,
        })
    }
}

// ---------------------------------------------------------------------------
// destroy
// ---------------------------------------------------------------------------

/// `destroy_room` request: the bearer credential plus the code it is
/// claimed to map to. Credential *verification* is delegated to the
/// token broker; this layer only requires the field to be present.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestroyRequest {
    pub code: String,
    pub auth_token: String,
}

/// Validated destroy command.
#[derive(Debug, Clone)]
pub struct DestroyRoom {
    pub code: RoomCode,
    pub auth_token: String,
}

impl DestroyRequest {
    pub fn validate(self) -> Result<DestroyRoom, ProtocolError> {
        if self.auth_token.is_empty() {
            return Err(ProtocolError::InvalidRequest(
                "missing auth token".to_owned(),
            ));
        }
        Ok(DestroyRoom {
            code: RoomCode::parse(&self.code)?,
            auth_token: self.auth_token,
        })
    }
}

// ---------------------------------------------------------------------------
// send_message
// ---------------------------------------------------------------------------

/// `sendMessage` frame body. `message` is an opaque payload — the system
/// is content-agnostic, so any string passes. `timeToDestroy` and
/// `dataHash` re-present the deadline fixed at creation; the lifecycle
/// layer verifies them against the stored digest.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub dark_room_code: String,
    pub message: String,
    pub time_to_destroy: u64,
    pub data_hash: String,
}

/// Validated send-message command.
#[derive(Debug, Clone)]
pub struct SendMessage {
    pub code: RoomCode,
    pub message: String,
    pub time_to_destroy: u64,
    pub data_hash: String,
}

impl SendMessageRequest {
    pub fn validate(self) -> Result<SendMessage, ProtocolError> {
        Ok(SendMessage {
            code: RoomCode::parse(&self.dark_room_code)?,
            message: self.message,
            time_to_destroy: self.time_to_destroy,
            data_hash: self.data_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code64() -> String {
        "k".repeat(64)
    }

    #[test]
    fn test_create_request_validates_and_converts() {
        let req = CreateRequest {
            code: code64(),
            inactive_days_limit: 2,
            auto_destroy_timer: "01:00:00".to_owned(),
        };
        let cmd = req.validate().unwrap();
        assert_eq!(cmd.inactive_limit_ms, 172_800_000);
        assert_eq!(cmd.countdown_ms, 3_600_000);
    }

    #[test]
    fn test_create_request_rejects_bad_code() {
        let req = CreateRequest {
            code: "nope".to_owned(),
            inactive_days_limit: 1,
            auto_destroy_timer: "00:00:00".to_owned(),
        };
        assert!(matches!(
            req.validate(),
            Err(ProtocolError::InvalidCode)
        ));
    }

    #[test]
    fn test_create_request_rejects_bad_countdown() {
        let req = CreateRequest {
            code: code64(),
            inactive_days_limit: 1,
            auto_destroy_timer: "100:00:00".to_owned(),
        };
        assert!(matches!(
            req.validate(),
            Err(ProtocolError::InvalidCountdown(_))
        ));
    }

    #[test]
    fn test_create_request_deserializes_camel_case() {
        let json = format!(
            r#"{{"code":"{}","inactiveDaysLimit":7,
                "autoDestroyTimer":"00:30:00"}}"#,
            code64()
        );
        let req: CreateRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(req.inactive_days_limit, 7);
    }

    #[test]
    fn test_create_request_rejects_non_numeric_days() {
        // The type system carries the "must be numeric" rule: a string
        // where a number belongs fails at deserialization.
        let json = format!(
            r#"{{"code":"{}","inactiveDaysLimit":"seven",
                "autoDestroyTimer":"00:30:00"}}"#,
            code64()
        );
        let result: Result<CreateRequest, _> = serde_json::from_str(&json);
        assert!(result.is_err());
    }

    #[test]
    fn test_subscribe_request_validates_code() {
        let ok = SubscribeRequest {
            dark_room_code: code64(),
        };
        assert!(ok.validate().is_ok());

        let bad = SubscribeRequest {
            dark_room_code: "x".to_owned(),
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_destroy_request_requires_token() {
        let req = DestroyRequest {
            code: code64(),
            auth_token: String::new(),
        };
        assert!(matches!(
            req.validate(),
            Err(ProtocolError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_send_message_accepts_any_string_payload() {
        // Content-agnostic: even hostile-looking payloads are opaque data.
        let req = SendMessageRequest {
            dark_room_code: code64(),
            message: "<script>alert(1)</script>".to_owned(),
            time_to_destroy: 0,
            data_hash: "0".repeat(64),
        };
        let cmd = req.validate().unwrap();
        assert_eq!(cmd.message, "<script>alert(1)</script>");
    }

    #[test]
    fn test_send_message_requires_string_payload() {
        let json = format!(
            r#"{{"darkRoomCode":"{}","message":42,
                "timeToDestroy":0,"dataHash":"0"}}"#,
            code64()
        );
        let result: Result<SendMessageRequest, _> =
            serde_json::from_str(&json);
        assert!(result.is_err());
    }
}
