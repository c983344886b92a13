//! The replicated tree structure.
//!
//! # Core Types
//!
//! - [`Node`] - The recursive map/list/register node every branch is built from
//! - [`NodeKind`] - The effective shapes a node exposes at query time
//! - [`CRDTError`] - Key and value type mismatches

pub mod errors;
pub mod node;

pub use errors::CRDTError;
pub use node::{Node, NodeKind};
