//! Error types for access on raw targets.

use thiserror::Error;

/// Errors reported by reads and writes on a raw target.
///
/// The tracking machinery itself never fails; these only surface the
/// outcome of the underlying write or delete.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReactiveError {
    /// A scalar was given where an object or array is required.
    #[error("expected an object or array, got {0}")]
    NotComposite(&'static str),

    /// The target has been frozen and rejects writes and deletes.
    #[error("cannot modify frozen {0}")]
    Frozen(&'static str),

    /// The key cannot address a slot on this kind of target.
    #[error("invalid key `{key}` for {kind}")]
    InvalidKey {
        /// The rejected key, rendered.
        key: String,
        /// The kind of target the key was used on.
        kind: &'static str,
    },
}

/// Result type for target access.
pub type Result<T> = std::result::Result<T, ReactiveError>;
