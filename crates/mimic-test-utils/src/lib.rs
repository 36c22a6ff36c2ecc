//! Testing utilities for the Mimic workspace
//!
//! Shared fixture types and graph builders.

#![allow(missing_docs)]

use std::sync::Arc;

use mimic_registry::{FieldSpec, FieldType, TypeRegistry, TypeSpec};
use mimic_value::{ArrayRef, ObjectRef, Value, ValueKind};

/// Registry pre-populated with the fixture types used across the
/// integration suites.
///
/// Types:
/// - `fixture.Person` with `age`, `name`, and a transient `scratch`
/// - `fixture.TreeNode` with `children` (array) and `label`
/// - `fixture.ListNode` with `next` (object) and `value`
/// - `fixture.Color` enum with `Red`, `Green`, `Blue`
/// - `fixture.Shape` (abstract) and `fixture.Circle` extending it
pub fn fixture_registry() -> Arc<TypeRegistry> {
    let registry = TypeRegistry::new();

    registry
        .register(
            TypeSpec::new("fixture.Person")
                .field(FieldSpec::new("age").typed(FieldType::Scalar(ValueKind::Int)))
                .field(FieldSpec::new("name").typed(FieldType::Scalar(ValueKind::Text)))
                .field(FieldSpec::new("scratch").transient()),
        )
        .unwrap();

    registry
        .register(
            TypeSpec::new("fixture.TreeNode")
                .field(FieldSpec::new("children").typed(FieldType::Array))
                .field(FieldSpec::new("label").typed(FieldType::Scalar(ValueKind::Text))),
        )
        .unwrap();

    registry
        .register(
            TypeSpec::new("fixture.ListNode")
                .field(FieldSpec::new("next").typed(FieldType::Object("fixture.ListNode".into())))
                .field(FieldSpec::new("value").typed(FieldType::Scalar(ValueKind::Int))),
        )
        .unwrap();

    registry
        .register(TypeSpec::new("fixture.Color").enumeration(["Red", "Green", "Blue"]))
        .unwrap();

    registry
        .register(
            TypeSpec::new("fixture.Shape")
                .abstract_type()
                .field(FieldSpec::new("sides").typed(FieldType::Scalar(ValueKind::Int))),
        )
        .unwrap();

    registry
        .register(
            TypeSpec::new("fixture.Circle")
                .extends("fixture.Shape")
                .field(FieldSpec::new("radius").typed(FieldType::Scalar(ValueKind::Float))),
        )
        .unwrap();

    Arc::new(registry)
}

/// Build a `fixture.Person` instance.
///
/// Slots follow lexical field order: `age`, `name`, `scratch`.
pub fn person(name: &str, age: i64) -> ObjectRef {
    ObjectRef::new(
        Arc::from("fixture.Person"),
        vec![Value::Int(age), Value::from(name), Value::Null],
    )
}

/// Build a `fixture.TreeNode` with the given children.
///
/// Slots follow lexical field order: `children`, `label`.
pub fn tree_node(label: &str, children: Vec<Value>) -> ObjectRef {
    ObjectRef::new(
        Arc::from("fixture.TreeNode"),
        vec![Value::Array(ArrayRef::new(children)), Value::from(label)],
    )
}

/// Build a `fixture.ListNode` with no successor.
///
/// Slots follow lexical field order: `next`, `value`.
pub fn list_node(value: i64) -> ObjectRef {
    ObjectRef::new(
        Arc::from("fixture.ListNode"),
        vec![Value::Null, Value::Int(value)],
    )
}

/// Link `node` to `next` through its `next` slot.
pub fn link(node: &ObjectRef, next: &ObjectRef) {
    node.set_field(0, Value::Object(next.clone()));
}

/// A two-node list whose tail points back at its head.
pub fn cyclic_list() -> ObjectRef {
    let head = list_node(1);
    let tail = list_node(2);
    link(&head, &tail);
    link(&tail, &head);
    head
}

/// A tree whose root holds the same child instance twice.
///
/// Returns `(root, child)` so callers can assert on sharing.
pub fn diamond_tree() -> (ObjectRef, ObjectRef) {
    let child = tree_node("leaf", vec![]);
    let root = tree_node(
        "root",
        vec![Value::Object(child.clone()), Value::Object(child.clone())],
    );
    (root, child)
}

/// A singly linked list of `len` nodes, head first.
pub fn linked_list(len: usize) -> ObjectRef {
    let head = list_node(0);
    let mut cursor = head.clone();
    for value in 1..len as i64 {
        let next = list_node(value);
        link(&cursor, &next);
        cursor = next;
    }
    head
}
