//! Operation-specific error types for the Replidoc library.
//!
//! Every variant here rejects an operation before it reaches the document tree,
//! so the tree is always left untouched.

use thiserror::Error;

use super::OpId;

/// Errors that can occur while constructing or decoding operations.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum OperationError {
    /// The operation identifier is not of the form `<count>.<seed>`
    #[error("Malformed operation id '{id}': {reason}")]
    MalformedId {
        /// The rejected identifier
        id: String,
        /// Why parsing failed
        reason: String,
    },

    /// One of the causal dependencies is not a valid operation identifier
    #[error("Malformed dependency '{id}': {reason}")]
    MalformedDependency {
        /// The rejected dependency
        id: String,
        /// Why parsing failed
        reason: String,
    },

    /// A local operation was applied before the operations it depends on
    #[error("Operation {id} has {} unapplied dependencies", .missing.len())]
    UnmetDependencies {
        /// The rejected operation
        id: String,
        /// Dependencies not yet applied, in declaration order
        missing: Vec<OpId>,
    },
}

impl OperationError {
    /// Check if this error rejected a malformed operation.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            OperationError::MalformedId { .. } | OperationError::MalformedDependency { .. }
        )
    }

    /// Check if this error rejected an operation whose dependencies are missing.
    pub fn is_unmet_dependencies(&self) -> bool {
        matches!(self, OperationError::UnmetDependencies { .. })
    }

    /// Get the offending identifier text.
    pub fn id(&self) -> &str {
        match self {
            OperationError::MalformedId { id, .. }
            | OperationError::MalformedDependency { id, .. }
            | OperationError::UnmetDependencies { id, .. } => id,
        }
    }
}

// Conversion from OperationError to the main Error type
impl From<OperationError> for crate::Error {
    fn from(err: OperationError) -> Self {
        crate::Error::Operation(err)
    }
}
