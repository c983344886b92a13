use replidoc::{
    Document,
    crdt::Node,
    operation::{Cursor, Key, Mutation, OpId, Operation, Value},
};

use crate::helpers::*;

#[test]
fn test_out_of_order_operation_waits_for_dependencies() {
    let mut alice = Document::init("alice");
    let mut bob = Document::init("bob");

    let parent = author(&mut alice, Cursor::empty(), Mutation::insert("todo", Value::Branch));
    let child = author(
        &mut alice,
        register_at(&["todo", "title"]),
        Mutation::insert(Key::Register, "write tests"),
    );

    bob.apply_remote_operation(child.clone()).unwrap();
    assert_eq!(bob.buffered(), &[child.clone()]);
    assert!(bob.is_buffered(child.id()));
    assert!(bob.applied().is_empty());
    assert_eq!(bob.head(), &Node::default());

    bob.apply_remote_operation(parent).unwrap();
    assert!(bob.buffered().is_empty());
    assert!(bob.is_applied(child.id()));
    assert_converged(&[&alice, &bob]);
}

#[test]
fn test_fixpoint_releases_whole_chains() {
    let mut alice = Document::init("alice");
    let ops: Vec<Operation> = (0..10)
        .map(|n| author(&mut alice, register_at(&["counter"]), Mutation::assign(Key::Register, n)))
        .collect();

    let mut bob = Document::init("bob");
    let (first, rest) = ops.split_first().unwrap();
    for op in rest.iter().rev() {
        bob.apply_remote_operation(op.clone()).unwrap();
    }
    assert_eq!(bob.buffered().len(), 9);

    bob.apply_remote_operation(first.clone()).unwrap();
    assert_converged(&[&alice, &bob]);
    assert_eq!(
        values(bob.node_at(&map_path(&["counter"])).unwrap()),
        vec!["9"]
    );
}

#[test]
fn test_operation_with_permanently_missing_dependency_stays_buffered() {
    let mut doc = Document::init("bob");
    let orphan = Operation::from_parts(
        OpId::new(7, 12345),
        vec![OpId::new(6, 12345)],
        register_at(&["x"]),
        Mutation::insert(Key::Register, 1),
    );

    doc.apply_remote_operation(orphan.clone()).unwrap();
    let local = author(&mut doc, register_at(&["y"]), Mutation::insert(Key::Register, 2));

    assert!(doc.is_buffered(orphan.id()));
    assert!(doc.is_applied(local.id()));
    assert!(doc.node_at(&map_path(&["x"])).is_none());
}

#[test]
fn test_duplicates_are_idempotent() {
    let mut alice = Document::init("alice");
    let ops = vec![
        author(&mut alice, Cursor::empty(), Mutation::insert("a", Value::Branch)),
        author(&mut alice, register_at(&["a"]), Mutation::insert(Key::Register, "v")),
        author(&mut alice, Cursor::empty(), Mutation::delete("a")),
    ];

    let mut once = Document::init("bob");
    deliver(&mut once, &ops);

    let mut many = Document::init("bob");
    for op in ops.iter().rev().chain(ops.iter()).chain(ops.iter().rev()) {
        many.apply_remote_operation(op.clone()).unwrap();
    }

    assert_eq!(once, many);
    assert_converged(&[&alice, &once, &many]);
}

#[test]
fn test_own_operations_echoed_back_are_ignored() {
    let mut alice = Document::init("alice");
    let op = author(&mut alice, register_at(&["k"]), Mutation::insert(Key::Register, 1));
    let snapshot = alice.clone();

    alice.apply_remote_operation(op).unwrap();
    assert_eq!(alice, snapshot);
}

#[test]
fn test_rejected_operation_is_not_buffered() {
    let mut doc = Document::init("bob");
    let bad = Operation::from_parts(
        OpId::new(3, 1),
        vec![OpId::new(2, 1)],
        Cursor::empty(),
        Mutation::insert("k", 5),
    );

    let err = doc.apply_remote_operation(bad).unwrap_err();
    assert!(err.is_type_error());
    assert!(doc.buffered().is_empty());
    assert!(doc.applied().is_empty());
}

#[test]
fn test_local_apply_does_not_buffer() {
    let mut alice = Document::init("alice");
    let mut bob = Document::init("bob");

    let parent = author(&mut alice, Cursor::empty(), Mutation::insert("todo", Value::Branch));
    let child = author(
        &mut alice,
        register_at(&["todo", "done"]),
        Mutation::insert(Key::Register, "no"),
    );

    let err = bob.apply_operation(child.clone()).unwrap_err();
    assert!(err.is_unmet_dependencies());
    assert!(bob.buffered().is_empty());
    assert_eq!(bob.head(), &Node::default());

    deliver(&mut bob, &[child, parent]);
    assert_converged(&[&alice, &bob]);
}
