//! Auth gate error kinds.

use thiserror::Error;

/// Outcomes of a failed validation, kept distinct so transports can map
/// them to the right status (401 vs 403 vs 503).
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// No credential was presented, or it was empty/malformed.
    #[error("missing or malformed credential")]
    MissingCredential,

    /// The identity service explicitly rejected the credential.
    #[error("credential rejected: {0}")]
    Rejected(String),

    /// The identity service could not be reached or answered with an
    /// unexpected status. Retryable; never treated as an allow.
    #[error("identity service unavailable: {0}")]
    Unavailable(String),
}
