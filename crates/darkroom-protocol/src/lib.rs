//! Wire protocol and input validation for Darkroom.
//!
//! This crate defines everything that crosses the boundary into the core:
//!
//! - **Identity** ([`RoomCode`], [`MessageKey`]) — validated room codes and
//!   time-ordered message keys.
//! - **Durations** ([`parse_countdown`], [`days_to_millis`]) — human-entered
//!   countdown / day-limit strings converted to milliseconds.
//! - **Requests** ([`CreateRequest`], [`SendMessageRequest`], etc.) — the
//!   loosely-typed shapes clients send, each with a `validate()` step that
//!   produces a strongly-typed command or a typed error.
//! - **Frames** ([`ClientFrame`], [`ServerPush`]) — the realtime channel's
//!   tagged messages.
//! - **Errors** ([`ProtocolError`]) — what can go wrong at the boundary.
//!
//! The protocol layer knows nothing about rooms, stores, or schedulers —
//! it only decides whether input is well-formed. Anything that fails here
//! fails closed, before any state is touched.

mod code;
mod duration;
mod error;
mod request;
mod types;

pub use code::{is_valid_code, RoomCode, CODE_LENGTH};
pub use duration::{days_to_millis, parse_countdown, MS_PER_DAY};
pub use error::ProtocolError;
pub use request::{
    CreateRequest, CreateRoom, DestroyRequest, DestroyRoom, Login,
    LoginRequest, SendMessage, SendMessageRequest, Subscribe,
    SubscribeRequest,
};
pub use types::{
    decode_frame, encode_push, ClientFrame, MessageKey, RoomRecord,
    ServerPush,
};
