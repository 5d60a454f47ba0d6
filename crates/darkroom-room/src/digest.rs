//! Integrity digest: tamper-evident binding of a room's deadline.
//!
//! At creation the server computes `SHA-256(code || deadline || secret)`
//! once and stores the hex digest alongside the room. Any later write
//! that presents a `timeToDestroy` must reproduce the stored digest —
//! without the secret, a client cannot mint a digest for a different
//! deadline, so it can neither extend nor shorten the room's life.

use darkroom_protocol::RoomCode;
use sha2::{Digest, Sha256};

/// Computes the hex digest binding `code` and `time_to_destroy` to the
/// server secret. Single round, 256-bit.
pub fn seal(code: &RoomCode, time_to_destroy: u64, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_str().as_bytes());
    hasher.update(time_to_destroy.to_string().as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Checks a presented `(deadline, digest)` pair against the secret.
///
/// The result says only match / no-match — which input differed is
/// deliberately not distinguishable from the outside.
pub fn verify(
    code: &RoomCode,
    time_to_destroy: u64,
    secret: &str,
    presented: &str,
) -> bool {
    seal(code, time_to_destroy, secret) == presented
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(ch: char) -> RoomCode {
        RoomCode::parse(&ch.to_string().repeat(64)).unwrap()
    }

    #[test]
    fn test_seal_is_deterministic() {
        let a = seal(&code('a'), 12_345, "secret");
        let b = seal(&code('a'), 12_345, "secret");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64, "hex SHA-256 is 64 characters");
    }

    #[test]
    fn test_seal_changes_with_any_input() {
        let base = seal(&code('a'), 12_345, "secret");
        assert_ne!(base, seal(&code('b'), 12_345, "secret"));
        assert_ne!(base, seal(&code('a'), 12_346, "secret"));
        assert_ne!(base, seal(&code('a'), 12_345, "other"));
    }

    #[test]
    fn test_verify_accepts_the_sealed_pair() {
        let digest = seal(&code('a'), 777, "secret");
        assert!(verify(&code('a'), 777, "secret", &digest));
    }

    #[test]
    fn test_verify_rejects_forged_deadline() {
        let digest = seal(&code('a'), 777, "secret");
        assert!(!verify(&code('a'), 999_999, "secret", &digest));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        assert!(!verify(&code('a'), 777, "secret", "not-a-digest"));
        assert!(!verify(&code('a'), 777, "secret", ""));
    }
}
