//! Error types for the store boundary.

/// Errors that can occur talking to the room store.
///
/// [`MemoryStore`](crate::MemoryStore) never produces these; they exist
/// for remote backends, where any failure is an internal (500-class)
/// fault — never a user-facing validation error.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend rejected or failed the operation.
    #[error("store backend error: {0}")]
    Backend(String),

    /// The backend could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
