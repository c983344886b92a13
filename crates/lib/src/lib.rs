//!
//! Replidoc: an operation-based CRDT for JSON-shaped documents.
//! Every replica holds a local tree, applies local and remote edits in any delivery
//! order, and converges with every other replica without coordination.
//!
//! ## Core Concepts
//!
//! * **Clocks (`clock::Clock`)**: Per-replica logical clocks that mint globally unique
//!   operation identifiers of the form `"<count>.<seed>"`.
//! * **Operations (`operation::Operation`)**: The immutable unit of change. An operation
//!   carries its identifier, its causal dependencies, a cursor into the tree and a mutation.
//! * **Nodes (`crdt::Node`)**: The single recursive structure of the tree. A node is at the
//!   same time a potential map, list and multi-value register, and carries a presence set of
//!   the operations that witness its existence.
//! * **Documents (`document::Document`)**: One replica. Owns the tree, the clock, the set of
//!   applied operations and the buffer of remote operations waiting on their dependencies.
//!
//! ## Example
//!
//! ```
//! use replidoc::document::Document;
//! use replidoc::operation::{Cursor, Mutation, PathElement, Key};
//!
//! let mut alice = Document::init("alice");
//! let mut bob = Document::init("bob");
//!
//! let cursor = Cursor::new(Key::Register, [PathElement::map("title")]);
//! let op = alice.new_operation(cursor, Mutation::insert(Key::Register, "Hello"))?;
//! alice.apply_operation(op.clone())?;
//! bob.apply_remote_operation(op)?;
//!
//! assert_eq!(alice.head(), bob.head());
//! # Ok::<(), replidoc::Error>(())
//! ```

pub mod clock;
pub mod crdt;
pub mod document;
pub mod idset;
pub mod operation;

/// Re-export the `Document` struct for easier access.
pub use document::Document;

/// Result type used throughout the Replidoc library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Replidoc library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured clock errors from the clock module
    #[error(transparent)]
    Clock(clock::ClockError),

    /// Structured operation errors from the operation module
    #[error(transparent)]
    Operation(operation::OperationError),

    /// Structured CRDT errors from the crdt module
    #[error(transparent)]
    CRDT(crdt::CRDTError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Clock(_) => "clock",
            Error::Operation(_) => "operation",
            Error::CRDT(_) => "crdt",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error rejected an operation before it touched the tree.
    pub fn is_malformed_operation(&self) -> bool {
        match self {
            Error::Operation(op_err) => op_err.is_malformed(),
            _ => false,
        }
    }

    /// Check if this error rejected an operation applied ahead of its dependencies.
    pub fn is_unmet_dependencies(&self) -> bool {
        match self {
            Error::Operation(op_err) => op_err.is_unmet_dependencies(),
            _ => false,
        }
    }

    /// Check if this error is a key or value type mismatch.
    pub fn is_type_error(&self) -> bool {
        match self {
            Error::CRDT(crdt_err) => crdt_err.is_type_error(),
            _ => false,
        }
    }

    /// Check if this error is a clock or timestamp parse failure.
    pub fn is_parse_error(&self) -> bool {
        match self {
            Error::Clock(clock_err) => clock_err.is_parse_error(),
            _ => false,
        }
    }

    /// Check if this error is a clock whose count cannot advance.
    pub fn is_clock_exhausted(&self) -> bool {
        match self {
            Error::Clock(clock_err) => clock_err.is_exhausted(),
            _ => false,
        }
    }

    /// Check if this error is serialization-related.
    pub fn is_serialization_error(&self) -> bool {
        matches!(self, Error::Serialize(_))
    }
}
