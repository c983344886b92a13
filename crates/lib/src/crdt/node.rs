//! The recursive tree node every document branch is built from.
//!
//! A [`Node`] is at the same time a potential map, list and multi-value
//! register. It never declares a single type: one tree position can collect a
//! map shape from one branch of history and a register value from a concurrent
//! branch, and both stay representable.
//!
//! # Presence
//!
//! Every node carries a presence set (`deps`) of the operations that currently
//! witness its existence. Operations witness the nodes they traverse or create,
//! and a causal delete strips the witnesses it knew about. A node whose set is
//! empty is logically deleted but stays physically linked into its parent so
//! that list positions and concurrent edits keep resolving the same way on
//! every replica. Read helpers such as [`Node::live_map`] filter on presence.
//!
//! # Example
//!
//! ```
//! use replidoc::crdt::{Node, NodeKind};
//! use replidoc::operation::{Key, OpId, Value};
//!
//! let a = OpId::new(2, 1);
//! let b = OpId::new(2, 7);
//!
//! let mut node = Node::default();
//! node.add(Key::Register, Value::from("red"), a)?;
//! node.add(Key::Register, Value::from("blue"), b)?;
//! node.add(Key::from("shades"), Value::Branch, a)?;
//!
//! // Concurrent register writes are both kept
//! assert_eq!(node.get_mv_register().len(), 2);
//! assert_eq!(node.kinds(), vec![NodeKind::Map, NodeKind::Register]);
//! assert!(node.get_child(&Key::from("shades"))?.is_some());
//! # Ok::<(), replidoc::crdt::CRDTError>(())
//! ```

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::crdt::CRDTError;
use crate::idset::IdSet;
use crate::operation::{Key, OpId, PathElement, Scalar, Value};

/// The effective shape a node exposes at query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    Map,
    List,
    Register,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Map => write!(f, "map"),
            NodeKind::List => write!(f, "list"),
            NodeKind::Register => write!(f, "register"),
        }
    }
}

/// Checks that `value` fits the slot `key` addresses.
///
/// Map and list slots link a fresh node and take [`Value::Branch`]. The register
/// slot holds leaf values and takes a [`Scalar`].
pub(crate) fn check_slot(key: &Key, value: &Value) -> Result<(), CRDTError> {
    match (key, value) {
        (Key::Map(_) | Key::List(_), Value::Branch) | (Key::Register, Value::Scalar(_)) => Ok(()),
        (Key::Map(_) | Key::List(_), Value::Scalar(scalar)) => Err(CRDTError::InvalidValueType {
            key: key.to_string(),
            value: scalar.type_name().to_string(),
            reason: format!("{} slots take a branch", key.kind_name()),
        }),
        (Key::Register, Value::Branch) => Err(CRDTError::InvalidValueType {
            key: key.to_string(),
            value: value.type_name().to_string(),
            reason: "register slots take an int or text value".to_string(),
        }),
    }
}

/// A tree node: map, list and multi-value register in one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Node {
    /// The operation that created this node. `None` for the document head.
    op_id: Option<OpId>,
    /// Presence set
    deps: IdSet,
    hmap: BTreeMap<String, Node>,
    list: Vec<Node>,
    reg: BTreeMap<OpId, Scalar>,
}

impl Node {
    /// Creates an empty node tagged with the operation that created it.
    ///
    /// The presence set starts empty; the creating operation witnesses the
    /// node separately.
    pub fn new(op_id: OpId) -> Self {
        Self {
            op_id: Some(op_id),
            ..Default::default()
        }
    }

    fn witnessed(op_id: OpId) -> Self {
        let mut node = Self::new(op_id);
        node.add_dependency(op_id);
        node
    }

    pub fn op_id(&self) -> Option<&OpId> {
        self.op_id.as_ref()
    }

    /// The operations currently witnessing this node.
    pub fn deps(&self) -> &IdSet {
        &self.deps
    }

    /// Every map child, including logically deleted ones.
    pub fn hmap(&self) -> &BTreeMap<String, Node> {
        &self.hmap
    }

    /// Every list element in physical order, including logically deleted ones.
    pub fn list(&self) -> &[Node] {
        &self.list
    }

    /// Borrows the multi-value register.
    pub fn register(&self) -> &BTreeMap<OpId, Scalar> {
        &self.reg
    }

    /// Returns true while at least one operation witnesses this node.
    pub fn is_present(&self) -> bool {
        !self.deps.is_empty()
    }

    /// Looks up a child through a map or list key.
    ///
    /// List keys are physical positions.
    ///
    /// # Errors
    /// [`CRDTError::InvalidKeyType`] for the register key, which addresses
    /// values rather than child nodes.
    pub fn get_child(&self, key: &Key) -> Result<Option<&Node>, CRDTError> {
        match key {
            Key::Map(name) => Ok(self.hmap.get(name)),
            Key::List(index) => Ok(self.list.get(*index)),
            Key::Register => Err(CRDTError::InvalidKeyType {
                key: key.to_string(),
                reason: "the register slot holds values, not child nodes".to_string(),
            }),
        }
    }

    /// Follows one path element along physical links.
    pub fn get(&self, element: &PathElement) -> Option<&Node> {
        match element {
            PathElement::MapKey(name) => self.hmap.get(name),
            PathElement::ListKey(index) => self.list.get(*index),
        }
    }

    /// Adds `value` under `key` on behalf of operation `op_id`.
    ///
    /// - Map key: links a new node witnessed by `op_id`. An already bound
    ///   child is kept and re-witnessed instead, so concurrent inserts of the
    ///   same key merge rather than replace each other.
    /// - List key: positional insert; later elements shift. Positions past
    ///   the end append.
    /// - Register: records the scalar under `op_id`, never touching entries
    ///   of other operations.
    ///
    /// # Errors
    /// [`CRDTError::InvalidValueType`] when the value does not fit the slot.
    pub fn add(&mut self, key: Key, value: Value, op_id: OpId) -> Result<(), CRDTError> {
        check_slot(&key, &value)?;
        match key {
            Key::Map(name) => {
                self.witness_map_child(name, op_id);
            }
            Key::List(index) => {
                let index = index.min(self.list.len());
                self.list.insert(index, Self::witnessed(op_id));
            }
            Key::Register => {
                if let Value::Scalar(scalar) = value {
                    self.reg.insert(op_id, scalar);
                }
            }
        }
        Ok(())
    }

    /// Returns a snapshot of every concurrently held register value.
    pub fn get_mv_register(&self) -> BTreeMap<OpId, Scalar> {
        self.reg.clone()
    }

    pub fn add_dependency(&mut self, id: OpId) {
        self.deps.add(id);
    }

    pub fn clear_dependency(&mut self, id: &OpId) {
        self.deps.remove(id);
    }

    /// Removes exactly the given IDs from the presence set.
    ///
    /// Returns how many were present.
    pub fn clear_dependencies<'a>(&mut self, ids: impl IntoIterator<Item = &'a OpId>) -> usize {
        ids.into_iter().filter(|id| self.deps.remove(id)).count()
    }

    /// Drops the register entries written by the given operations.
    pub fn clear_register(&mut self, ids: &IdSet) -> usize {
        let before = self.reg.len();
        self.reg.retain(|id, _| !ids.exists(id));
        before - self.reg.len()
    }

    /// Collects every node reachable through map and list links, breadth
    /// first, excluding `self`.
    pub fn all_descendants(&self) -> Vec<&Node> {
        let mut found = Vec::new();
        let mut queue: VecDeque<&Node> = self.children().collect();
        while let Some(node) = queue.pop_front() {
            queue.extend(node.children());
            found.push(node);
        }
        found
    }

    fn children(&self) -> impl Iterator<Item = &Node> {
        self.hmap.values().chain(self.list.iter())
    }

    /// Visits `self` and every descendant breadth first.
    pub(crate) fn visit_subtree_mut(&mut self, mut f: impl FnMut(&mut Node)) {
        let mut queue: VecDeque<&mut Node> = VecDeque::from([self]);
        while let Some(node) = queue.pop_front() {
            f(&mut *node);
            let Node { hmap, list, .. } = node;
            queue.extend(hmap.values_mut());
            queue.extend(list.iter_mut());
        }
    }

    /// Causally clears this subtree: strips `ids` from every presence set and
    /// drops the register entries they wrote. Returns the number of witnesses
    /// removed.
    pub(crate) fn clear_subtree(&mut self, ids: &IdSet) -> usize {
        let mut cleared = 0;
        self.visit_subtree_mut(|node| {
            cleared += node.clear_dependencies(ids);
            node.clear_register(ids);
        });
        cleared
    }

    /// Returns every effective kind with at least one live entry, in
    /// `Map`, `List`, `Register` order.
    pub fn kinds(&self) -> Vec<NodeKind> {
        let mut kinds = Vec::new();
        if self.hmap.values().any(Node::is_present) {
            kinds.push(NodeKind::Map);
        }
        if self.list.iter().any(Node::is_present) {
            kinds.push(NodeKind::List);
        }
        if !self.reg.is_empty() {
            kinds.push(NodeKind::Register);
        }
        kinds
    }

    /// Map children that are still present.
    pub fn live_map(&self) -> BTreeMap<&str, &Node> {
        self.hmap
            .iter()
            .filter(|(_, child)| child.is_present())
            .map(|(name, child)| (name.as_str(), child))
            .collect()
    }

    /// List elements that are still present, in order.
    pub fn live_list(&self) -> Vec<&Node> {
        self.list.iter().filter(|child| child.is_present()).collect()
    }

    /// Translates an index over [`Node::live_list`] into the physical index an
    /// operation should carry. Indexes past the last live element map to the
    /// end of the list.
    pub fn list_position(&self, visible: usize) -> usize {
        self.list
            .iter()
            .enumerate()
            .filter(|(_, child)| child.is_present())
            .nth(visible)
            .map(|(position, _)| position)
            .unwrap_or(self.list.len())
    }

    /// Physical position of the `index`-th element created by a known
    /// operation.
    pub(crate) fn known_position(&self, index: usize, known: &IdSet) -> Option<usize> {
        self.list
            .iter()
            .enumerate()
            .filter(|(_, child)| child.op_id.is_some_and(|id| known.exists(&id)))
            .nth(index)
            .map(|(position, _)| position)
    }

    /// Physical position for a new element that an author placed at `index`
    /// of the list it knew.
    ///
    /// The element goes after the `(index - 1)`-th known element. Concurrent
    /// elements in between are skipped while their creator orders greater
    /// than `op_id`, never past the `index`-th known element. Every replica
    /// therefore picks the same slot regardless of delivery order. Indexes
    /// past the known elements append after the last of them.
    pub(crate) fn insertion_point(&self, index: usize, known: &IdSet, op_id: OpId) -> usize {
        let known_len = self
            .list
            .iter()
            .filter(|child| child.op_id.is_some_and(|id| known.exists(&id)))
            .count();
        let index = index.min(known_len);

        let start = match index.checked_sub(1) {
            None => 0,
            Some(prev) => self
                .known_position(prev, known)
                .map_or(0, |position| position + 1),
        };
        let end = self
            .known_position(index, known)
            .unwrap_or(self.list.len())
            .max(start);

        let mut position = start;
        while position < end && self.list[position].op_id.is_some_and(|id| id > op_id) {
            position += 1;
        }
        position
    }

    /// Map child under `name`, witnessed by `op_id`. Creates it when absent.
    fn witness_map_child(&mut self, name: String, op_id: OpId) -> (&mut Node, bool) {
        let mut created = false;
        let child = self.hmap.entry(name).or_insert_with(|| {
            created = true;
            Node::new(op_id)
        });
        child.add_dependency(op_id);
        if child.op_id.is_none_or(|existing| op_id < existing) {
            child.op_id = Some(op_id);
        }
        (child, created)
    }

    /// Moves one step down a cursor path on behalf of `op_id`, creating the
    /// child when absent. The child is witnessed either way.
    ///
    /// List positions resolve against the elements created by `known`
    /// operations. Returns the child and whether it was created.
    pub(crate) fn descend(
        &mut self,
        element: &PathElement,
        op_id: OpId,
        known: &IdSet,
    ) -> (&mut Node, bool) {
        match element {
            PathElement::MapKey(name) => self.witness_map_child(name.clone(), op_id),
            PathElement::ListKey(index) => {
                let (position, created) = match self.known_position(*index, known) {
                    Some(position) => (position, false),
                    None => {
                        let position = self.insertion_point(*index, known, op_id);
                        self.list.insert(position, Node::new(op_id));
                        (position, true)
                    }
                };
                let child = &mut self.list[position];
                child.add_dependency(op_id);
                (child, created)
            }
        }
    }

    /// The node a delete or assign clears: the child a map or list key
    /// selects, or `self` for the register key. Never creates anything.
    pub(crate) fn slot_mut(&mut self, key: &Key, known: &IdSet) -> Option<&mut Node> {
        match key {
            Key::Register => Some(self),
            Key::Map(name) => self.hmap.get_mut(name),
            Key::List(index) => {
                let position = self.known_position(*index, known)?;
                self.list.get_mut(position)
            }
        }
    }
}
