//! Document module: one replica of a replicated tree.
//!
//! A [`Document`] owns the tree head, the replica's [`Clock`], the set of
//! applied operation IDs and a buffer of remote operations whose causal
//! dependencies have not arrived yet. It is a single threaded state machine:
//! every `apply_*` call runs to completion, and callers sharing a document
//! across threads must serialize access themselves.
//!
//! # Applying operations
//!
//! Applying an operation walks its cursor from the head, creating missing
//! nodes, and every node on the way records the operation as a witness. The
//! mutation then acts on the node the path reaches:
//!
//! - `Insert` adds to the addressed slot.
//! - `Delete` strips the witnesses and register entries of every operation in
//!   its `deps` from the addressed subtree, so concurrent inserts it never saw
//!   survive.
//! - `Assign` clears like `Delete`, then inserts.
//!
//! Remote operations with unmet dependencies are parked and released by a
//! bounded fixpoint loop once the missing operations are applied.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::{
    Result,
    clock::{Clock, ClockError},
    crdt::{CRDTError, Node},
    idset::IdSet,
    operation::{
        Cursor, Key, Mutation, MutationType, OpId, Operation, OperationError, PathElement,
    },
};


/// One replica of a replicated JSON-shaped document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    id: String,
    clock: Clock,
    operations: IdSet,
    head: Node,
    buffer: Vec<Operation>,
}

impl Document {
    /// Creates an empty replica whose clock is seeded from `id`.
    pub fn init(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            clock: Clock::new(id.as_bytes()),
            id,
            operations: IdSet::new(),
            head: Node::default(),
            buffer: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// The root of the tree.
    pub fn head(&self) -> &Node {
        &self.head
    }

    /// IDs of every applied operation.
    pub fn applied(&self) -> &IdSet {
        &self.operations
    }

    /// Remote operations waiting on their dependencies, in arrival order.
    pub fn buffered(&self) -> &[Operation] {
        &self.buffer
    }

    /// Returns true if the operation has been applied to this replica.
    pub fn is_applied(&self, id: &OpId) -> bool {
        self.operations.exists(id)
    }

    /// Returns true if the operation is parked in the buffer.
    pub fn is_buffered(&self, id: &OpId) -> bool {
        self.buffer.iter().any(|op| op.id() == id)
    }

    /// Follows physical links from the head, without filtering on presence.
    pub fn node_at(&self, path: &[PathElement]) -> Option<&Node> {
        path.iter()
            .try_fold(&self.head, |node, element| node.get(element))
    }

    /// Authors a new local operation.
    ///
    /// Mints a fresh ID from the replica clock and declares every operation
    /// applied so far as a dependency. The operation is not applied; pass it to
    /// [`Document::apply_operation`] and broadcast it to the other replicas.
    ///
    /// # Errors
    /// Returns a clock error if the replica clock cannot advance.
    pub fn new_operation(&mut self, cursor: Cursor, mutation: Mutation) -> Result<Operation> {
        let id = self.clock.mint()?;
        let deps = self.operations.iter().copied().collect();
        Ok(Operation::from_parts(id, deps, cursor, mutation))
    }

    /// Applies an operation authored by this replica.
    ///
    /// The caller has already advanced the clock and set the dependencies (see
    /// [`Document::new_operation`]). Reapplying an operation is a no-op. Any
    /// buffered operation it unblocks is applied too.
    ///
    /// # Errors
    /// Returns a type error if the mutation's value does not fit its key, and
    /// an unmet dependencies error if any of its `deps` has not been applied.
    /// Local operations are never buffered. The tree is left untouched.
    pub fn apply_operation(&mut self, op: Operation) -> Result<()> {
        if self.is_applied(op.id()) {
            trace!(op_id = %op.id(), "Operation already applied");
            return Ok(());
        }
        Self::admit(&op)?;

        let missing = self.operations.diff(op.deps());
        if !missing.is_empty() {
            warn!(
                op_id = %op.id(),
                missing = ?missing,
                "Rejecting local operation with unmet dependencies"
            );
            return Err(OperationError::UnmetDependencies {
                id: op.id().to_string(),
                missing,
            }
            .into());
        }

        if !self.clock.owns(op.id()) {
            warn!(
                op_id = %op.id(),
                replica = %self.id,
                "Applying a local operation minted by another replica"
            );
        }

        self.apply_ready(&op)?;
        self.release_buffered()
    }

    /// Applies an operation received from another replica, or this replica's
    /// own operation echoed back.
    ///
    /// Duplicates are ignored. An operation with unmet dependencies is parked
    /// until they are applied; it is then applied without further calls.
    ///
    /// # Errors
    /// Returns a type error if the mutation's value does not fit its key, and
    /// a clock error if its ID count exceeds [`Clock::MAX_COUNT`]. Such
    /// operations are rejected, not buffered.
    pub fn apply_remote_operation(&mut self, op: Operation) -> Result<()> {
        if self.is_applied(op.id()) {
            trace!(op_id = %op.id(), "Ignoring duplicate operation");
            return Ok(());
        }
        Self::admit(&op)?;

        let missing = self.operations.diff(op.deps());
        if !missing.is_empty() {
            if self.is_buffered(op.id()) {
                trace!(op_id = %op.id(), "Operation already buffered");
            } else {
                debug!(
                    op_id = %op.id(),
                    missing = ?missing,
                    buffered = self.buffer.len() + 1,
                    "Buffering operation with unmet dependencies"
                );
                self.buffer.push(op);
            }
            return Ok(());
        }

        self.apply_ready(&op)?;
        self.release_buffered()
    }

    /// Checks that an operation can ever be applied.
    ///
    /// Merging an ID counted past [`Clock::MAX_COUNT`] would leave the clock
    /// unable to mint.
    fn admit(op: &Operation) -> Result<()> {
        op.mutation().check()?;
        let count = op.id().count();
        if count > Clock::MAX_COUNT {
            warn!(op_id = %op.id(), "Rejecting operation with an exhausted clock count");
            return Err(ClockError::Exhausted { count }.into());
        }
        Ok(())
    }

    fn is_ready(&self, op: &Operation) -> bool {
        op.deps().iter().all(|dep| self.operations.exists(dep))
    }

    /// Applies buffered operations until none is ready.
    fn release_buffered(&mut self) -> Result<()> {
        while let Some(index) = self.buffer.iter().position(|op| self.is_ready(op)) {
            let op = self.buffer.remove(index);
            if self.is_applied(op.id()) {
                continue;
            }
            debug!(
                op_id = %op.id(),
                remaining = self.buffer.len(),
                "Releasing buffered operation"
            );
            self.apply_ready(&op)?;
        }
        Ok(())
    }

    /// Applies an operation whose dependencies are satisfied.
    fn apply_ready(&mut self, op: &Operation) -> Result<()> {
        let id = *op.id();
        let known: IdSet = op.deps().iter().copied().collect();
        let mutation = op.mutation();

        let mut node = &mut self.head;
        let mut created = 0usize;
        for element in op.cursor().path() {
            let (child, was_created) = node.descend(element, id, &known);
            created += usize::from(was_created);
            node = child;
        }

        match mutation.kind() {
            MutationType::Insert => insert(node, mutation, id, &known)?,
            MutationType::Delete => {
                let mut cleared = known.clone();
                cleared.add(id);
                clear(node, mutation.key(), &known, &cleared);
            }
            MutationType::Assign => {
                clear(node, mutation.key(), &known, &known);
                insert(node, mutation, id, &known)?;
            }
        }

        self.operations.add(id);
        self.clock.update(&Clock::from(id));

        debug!(
            op_id = %id,
            deps = known.len(),
            mutation = %mutation.kind(),
            created,
            "Applied operation"
        );
        Ok(())
    }
}

/// Inserts the mutation's value into the slot its key addresses.
fn insert(
    node: &mut Node,
    mutation: &Mutation,
    id: OpId,
    known: &IdSet,
) -> std::result::Result<(), CRDTError> {
    let value = mutation
        .value()
        .cloned()
        .ok_or_else(|| CRDTError::InvalidValueType {
            key: mutation.key().to_string(),
            value: "none".to_string(),
            reason: format!("{} requires a value", mutation.kind()),
        })?;

    let key = match mutation.key() {
        Key::List(index) => Key::List(node.insertion_point(*index, known, id)),
        key => key.clone(),
    };
    node.add(key, value, id)
}

/// Causally clears the subtree the key addresses. A slot that does not exist
/// is left alone.
fn clear(node: &mut Node, key: &Key, known: &IdSet, ids: &IdSet) {
    if let Some(slot) = node.slot_mut(key, known) {
        let cleared = slot.clear_subtree(ids);
        trace!(key = %key, cleared, "Cleared dependencies");
    }
}
