//! Cursors addressing a location in the document tree.
//!
//! A [`Cursor`] is a path of branch selections from the document root down to
//! the node an operation acts on, plus a terminal [`Key`] naming the slot of that
//! node the mutation targets.
//!
//! # Usage
//!
//! ```rust
//! use replidoc::operation::{Cursor, Key, PathElement};
//!
//! // colors[2] -> register slot
//! let cursor = Cursor::new(Key::Register, [PathElement::map("colors"), PathElement::list(2)]);
//! assert_eq!(cursor.path().len(), 2);
//!
//! // Build incrementally
//! let cursor = Cursor::empty().push("colors").push(2usize).with_key("red");
//! assert_eq!(cursor.key(), &Key::Map("red".to_string()));
//! assert_eq!(cursor.to_string(), "$.colors[2] -> \"red\"");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// One branch selection along a cursor's path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathElement {
    /// Select the child bound under a string key in a node's map.
    MapKey(String),
    /// Select the child at a position in a node's list.
    ListKey(usize),
}

impl PathElement {
    /// Shorthand for [`PathElement::MapKey`].
    pub fn map(key: impl Into<String>) -> Self {
        PathElement::MapKey(key.into())
    }

    /// Shorthand for [`PathElement::ListKey`].
    pub fn list(index: usize) -> Self {
        PathElement::ListKey(index)
    }
}

impl From<&str> for PathElement {
    fn from(key: &str) -> Self {
        PathElement::MapKey(key.to_string())
    }
}

impl From<String> for PathElement {
    fn from(key: String) -> Self {
        PathElement::MapKey(key)
    }
}

impl From<usize> for PathElement {
    fn from(index: usize) -> Self {
        PathElement::ListKey(index)
    }
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathElement::MapKey(key) => write!(f, ".{key}"),
            PathElement::ListKey(index) => write!(f, "[{index}]"),
        }
    }
}

/// The terminal slot a mutation targets inside a node.
///
/// The slot kind is decided here, at the API boundary, so a node never has to
/// guess whether a key addresses its map, its list or its register.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Key {
    /// The node's multi-value register.
    #[default]
    Register,
    /// A string key in the node's map.
    Map(String),
    /// A position in the node's list.
    List(usize),
}

impl Key {
    /// Returns the slot kind as a string
    pub fn kind_name(&self) -> &'static str {
        match self {
            Key::Register => "register",
            Key::Map(_) => "map",
            Key::List(_) => "list",
        }
    }
}

impl From<&str> for Key {
    fn from(key: &str) -> Self {
        Key::Map(key.to_string())
    }
}

impl From<String> for Key {
    fn from(key: String) -> Self {
        Key::Map(key)
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Key::List(index)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Register => write!(f, "<register>"),
            Key::Map(key) => write!(f, "{key:?}"),
            Key::List(index) => write!(f, "{index}"),
        }
    }
}

/// A path into the document tree plus the terminal slot of a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Cursor {
    path: Vec<PathElement>,
    key: Key,
}

impl Cursor {
    /// Creates a cursor from a terminal key and the path leading to it.
    pub fn new(key: impl Into<Key>, path: impl IntoIterator<Item = PathElement>) -> Self {
        Self {
            path: path.into_iter().collect(),
            key: key.into(),
        }
    }

    /// Creates a cursor that targets the register of the document root.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Appends a path element, builder style.
    pub fn push(mut self, element: impl Into<PathElement>) -> Self {
        self.path.push(element.into());
        self
    }

    /// Replaces the terminal key, builder style.
    pub fn with_key(mut self, key: impl Into<Key>) -> Self {
        self.key = key.into();
        self
    }

    /// Returns the path elements from the root downwards.
    pub fn path(&self) -> &[PathElement] {
        &self.path
    }

    /// Returns the terminal key.
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Returns true if the cursor addresses the document root directly.
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for element in &self.path {
            write!(f, "{element}")?;
        }
        write!(f, " -> {}", self.key)
    }
}
