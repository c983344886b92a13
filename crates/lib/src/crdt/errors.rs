//! Error types for tree node operations.
//!
//! These errors surface when a cursor or mutation addresses a node slot with a
//! key or value of the wrong kind.

use thiserror::Error;

/// Structured error types for node operations.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CRDTError {
    /// The key cannot address a child node
    #[error("Invalid key type for '{key}': {reason}")]
    InvalidKeyType { key: String, reason: String },

    /// The value does not fit the slot the key addresses
    #[error("Invalid value type {value} for '{key}': {reason}")]
    InvalidValueType {
        key: String,
        value: String,
        reason: String,
    },
}

impl CRDTError {
    /// Check if this error is a key or value type mismatch
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            CRDTError::InvalidKeyType { .. } | CRDTError::InvalidValueType { .. }
        )
    }

    /// Check if this error rejected a key
    pub fn is_key_error(&self) -> bool {
        matches!(self, CRDTError::InvalidKeyType { .. })
    }

    /// Check if this error rejected a value
    pub fn is_value_error(&self) -> bool {
        matches!(self, CRDTError::InvalidValueType { .. })
    }

    /// Get the offending key
    pub fn key(&self) -> &str {
        match self {
            CRDTError::InvalidKeyType { key, .. } | CRDTError::InvalidValueType { key, .. } => key,
        }
    }
}

// Conversion from CRDTError to the main Error type
impl From<CRDTError> for crate::Error {
    fn from(err: CRDTError) -> Self {
        crate::Error::CRDT(err)
    }
}
