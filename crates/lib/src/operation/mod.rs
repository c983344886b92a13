//! Operations: the immutable unit of change exchanged between replicas.
//!
//! An [`Operation`] bundles a globally unique [`OpId`], the causal dependencies
//! that must be applied before it, a [`Cursor`] into the tree and a [`Mutation`].
//!
//! # Usage
//!
//! ```
//! use replidoc::operation::{Cursor, Key, Mutation, Operation, PathElement};
//!
//! let cursor = Cursor::new(Key::Register, [PathElement::map("name")]);
//! let op = Operation::new("2.1", ["1.1"], cursor, Mutation::insert(Key::Register, "Jane"))?;
//!
//! assert_eq!(op.node_id(), "1");
//! assert_eq!(op.deps().len(), 1);
//!
//! // Wire form for transports
//! let json = op.to_json()?;
//! assert_eq!(Operation::from_json(&json)?, op);
//!
//! // Malformed identifiers are rejected up front
//! let deps: Vec<&str> = Vec::new();
//! let bad = Operation::new("nope", deps, Cursor::empty(), Mutation::delete(Key::Register));
//! assert!(bad.is_err());
//! # Ok::<(), replidoc::Error>(())
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Result, crdt::CRDTError};

pub mod cursor;
pub mod errors;
pub mod id;
pub mod value;

pub use cursor::{Cursor, Key, PathElement};
pub use errors::OperationError;
pub use id::OpId;
pub use value::{Scalar, Value};

/// The kind of change a mutation performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MutationType {
    /// Add a value under the key of the targeted node
    Insert,
    /// Causally clear the subtree at the key
    Delete,
    /// Delete, then insert (overwrite)
    Assign,
}

impl fmt::Display for MutationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationType::Insert => write!(f, "insert"),
            MutationType::Delete => write!(f, "delete"),
            MutationType::Assign => write!(f, "assign"),
        }
    }
}

/// What an operation does at its cursor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mutation {
    #[serde(rename = "type")]
    kind: MutationType,
    key: Key,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
}

impl Mutation {
    /// Creates a mutation from its raw parts.
    pub fn new(kind: MutationType, key: impl Into<Key>, value: Option<Value>) -> Self {
        Self {
            kind,
            key: key.into(),
            value,
        }
    }

    /// Insert `value` under `key`.
    pub fn insert(key: impl Into<Key>, value: impl Into<Value>) -> Self {
        Self::new(MutationType::Insert, key, Some(value.into()))
    }

    /// Causally clear whatever `key` addresses.
    pub fn delete(key: impl Into<Key>) -> Self {
        Self::new(MutationType::Delete, key, None)
    }

    /// Overwrite whatever `key` addresses with `value`.
    pub fn assign(key: impl Into<Key>, value: impl Into<Value>) -> Self {
        Self::new(MutationType::Assign, key, Some(value.into()))
    }

    pub fn kind(&self) -> MutationType {
        self.kind
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Checks that the value fits the slot the key addresses.
    ///
    /// Map and list slots take [`Value::Branch`]; the register slot takes a
    /// scalar. `Delete` carries no value and always passes.
    pub fn check(&self) -> std::result::Result<(), CRDTError> {
        match (self.kind, &self.value) {
            (MutationType::Delete, _) => Ok(()),
            (_, None) => Err(CRDTError::InvalidValueType {
                key: self.key.to_string(),
                value: "none".to_string(),
                reason: format!("{} requires a value", self.kind),
            }),
            (_, Some(value)) => crate::crdt::node::check_slot(&self.key, value),
        }
    }
}

/// An immutable, causally tagged edit against a tree location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    id: OpId,
    deps: Vec<OpId>,
    cursor: Cursor,
    mutation: Mutation,
}

impl Operation {
    /// Builds an operation from wire-level string identifiers.
    ///
    /// # Errors
    /// Returns [`OperationError::MalformedId`] or [`OperationError::MalformedDependency`]
    /// if an identifier is not of the form `<count>.<seed>`.
    pub fn new<I, S>(id: &str, deps: I, cursor: Cursor, mutation: Mutation) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let op_id: OpId = id.parse()?;
        let deps = deps
            .into_iter()
            .map(|dep| {
                let dep = dep.as_ref();
                id::parse_parts(dep)
                    .map(|(count, seed)| OpId::new(count, seed))
                    .map_err(|reason| OperationError::MalformedDependency {
                        id: dep.to_string(),
                        reason,
                    })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self::from_parts(op_id, deps, cursor, mutation))
    }

    /// Builds an operation from already parsed identifiers.
    pub fn from_parts(id: OpId, deps: Vec<OpId>, cursor: Cursor, mutation: Mutation) -> Self {
        Self {
            id,
            deps,
            cursor,
            mutation,
        }
    }

    pub fn id(&self) -> &OpId {
        &self.id
    }

    /// The operations that must be applied before this one.
    pub fn deps(&self) -> &[OpId] {
        &self.deps
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn mutation(&self) -> &Mutation {
        &self.mutation
    }

    /// Returns the seed of the replica that minted this operation.
    pub fn node_id(&self) -> String {
        self.id.seed().to_string()
    }

    /// Encodes the operation for a transport.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes an operation received from a transport.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} at {}",
            self.id,
            self.mutation.kind,
            self.mutation
                .value
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            self.cursor.clone().with_key(self.mutation.key.clone())
        )
    }
}
