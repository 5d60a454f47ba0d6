//! Bearer-token broker boundary for Darkroom.
//!
//! Darkroom does not implement an auth scheme of its own — the contract
//! is just "one opaque bearer token maps to one room code". The
//! [`TokenBroker`] trait pins that contract down, and [`MemoryBroker`]
//! implements it in-process for tests and single-node deployments; a
//! real deployment can put a JWT service or an external broker behind
//! the same trait.

mod broker;
mod error;

pub use broker::{AccessToken, MemoryBroker, TokenBroker};
pub use error::AuthError;
