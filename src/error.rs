//! Error types for mediagate

use crate::resource::ResourceKind;

/// Everything that can go wrong while building a subject or reaching a decision.
///
/// A denied action is not an error: it is [`crate::Decision::Deny`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    /// The identity behind a subject cannot be resolved to exactly one role.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The action is not defined for the resource kind.
    #[error("invalid action '{action}' for {kind}")]
    InvalidAction { kind: ResourceKind, action: String },

    /// The persisted identity / manager relation could not be read or written.
    #[error("directory error: {0}")]
    Directory(String),

    /// A management action was called with arguments it cannot apply.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl AccessError {
    pub(crate) fn invalid_action(kind: ResourceKind, action: impl Into<String>) -> Self {
        AccessError::InvalidAction { kind, action: action.into() }
    }
}

/// Result type alias for mediagate operations
pub type Result<T> = std::result::Result<T, AccessError>;

/// Convert any collaborator error (LMDB, JSON, IO) to AccessError
pub fn err<E: std::error::Error>(e: E) -> AccessError {
    AccessError::Directory(e.to_string())
}
