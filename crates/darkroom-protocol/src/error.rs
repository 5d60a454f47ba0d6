//! Error types for the protocol layer.

/// Errors that can occur while validating or (de)serializing input.
///
/// Expected validation failures (`InvalidCode`, `InvalidCountdown`,
/// `InvalidRequest`) are ordinary 400-class rejections. `MalformedFrame`
/// is different in kind: a frame that is not even JSON is treated as a
/// probable injection attempt, and callers terminate the connection.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The room code has the wrong length or alphabet.
    ///
    /// Deliberately carries no detail — the shape rule is public, and
    /// the rejected input is a credential-like value we keep out of
    /// error strings.
    #[error("invalid room code")]
    InvalidCode,

    /// The `HH:MM:SS` countdown string failed structural or bounds checks.
    #[error("invalid countdown {0:?}")]
    InvalidCountdown(String),

    /// A request decoded but failed semantic validation.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A realtime frame was not valid JSON or carried an unknown action
    /// tag. Security-relevant: logged and the connection is closed.
    #[error("malformed frame: {0}")]
    MalformedFrame(serde_json::Error),

    /// Serializing an outbound push failed.
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),
}
