use replidoc::operation::{
    Cursor, Key, Mutation, MutationType, OpId, Operation, OperationError, PathElement, Value,
};

#[test]
fn test_new_operation_from_wire_strings() {
    let cursor = Cursor::new(Key::Register, [PathElement::map("todos"), PathElement::list(0)]);
    let op = Operation::new(
        "5.77",
        ["3.77", "4.12"],
        cursor.clone(),
        Mutation::insert(Key::Register, "milk"),
    )
    .unwrap();

    assert_eq!(op.id(), &OpId::new(5, 77));
    assert_eq!(op.deps(), &[OpId::new(3, 77), OpId::new(4, 12)]);
    assert_eq!(op.cursor(), &cursor);
    assert_eq!(op.mutation().kind(), MutationType::Insert);
    assert_eq!(op.mutation().value(), Some(&Value::from("milk")));
    assert_eq!(op.node_id(), "77");
}

#[test]
fn test_malformed_ids_are_rejected() {
    for bad in ["", "5", "5.", "five.77", "5.77.1"] {
        let err = Operation::new(
            bad,
            Vec::<String>::new(),
            Cursor::empty(),
            Mutation::delete(Key::Register),
        )
        .unwrap_err();
        assert!(err.is_malformed_operation(), "'{bad}' accepted");
        assert_eq!(err.module(), "operation");
    }

    let err =
        Operation::new("5.77", ["3.77", "x"], Cursor::empty(), Mutation::delete("k")).unwrap_err();
    match err {
        replidoc::Error::Operation(OperationError::MalformedDependency { ref id, .. }) => {
            assert_eq!(id, "x")
        }
        other => panic!("Expected MalformedDependency, got {other:?}"),
    }
}

#[test]
fn test_empty_cursor_targets_root() {
    let cursor = Cursor::empty();
    assert!(cursor.is_root());
    assert!(cursor.path().is_empty());
    assert_eq!(cursor.key(), &Key::Register);
}

#[test]
fn test_json_wire_form() {
    let op = Operation::new(
        "9.4",
        ["8.4"],
        Cursor::empty().push("colors").push(1usize),
        Mutation::assign(Key::Register, 42),
    )
    .unwrap();

    let json = op.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["id"], "9.4");
    assert_eq!(value["deps"][0], "8.4");
    assert_eq!(value["mutation"]["type"], "Assign");

    assert_eq!(Operation::from_json(&json).unwrap(), op);
}

#[test]
fn test_decoding_revalidates_ids() {
    let op = Operation::new("9.4", ["8.4"], Cursor::empty(), Mutation::delete("k")).unwrap();
    let json = op.to_json().unwrap().replace("8.4", "eight");

    let err = Operation::from_json(&json).unwrap_err();
    assert!(err.is_serialization_error());
}

#[test]
fn test_mutation_value_checks() {
    assert!(Mutation::insert("k", Value::Branch).check().is_ok());
    assert!(Mutation::insert(3usize, Value::Branch).check().is_ok());
    assert!(Mutation::assign(Key::Register, 7).check().is_ok());

    let err = Mutation::assign(3usize, "text").check().unwrap_err();
    assert!(err.is_value_error());
    assert_eq!(err.key(), "3");
}
