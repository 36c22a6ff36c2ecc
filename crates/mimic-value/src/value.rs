//! The dynamic value type
//!
//! [`Value`] is the single currency of a value graph: scalar immutables
//! are carried inline or behind shared immutable storage, while objects
//! and arrays are shared mutable nodes with reference identity.

use crate::node::{ArrayRef, Identity, ObjectRef};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Discriminant of a [`Value`], used as a classification key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Absent value
    Null,
    /// Boolean
    Bool,
    /// 64-bit signed integer
    Int,
    /// 64-bit float
    Float,
    /// Immutable text
    Text,
    /// Immutable byte string
    Bytes,
    /// UUID
    Uuid,
    /// UTC timestamp
    Timestamp,
    /// Enum variant (singleton semantics)
    Enum,
    /// Mutable ordered sequence
    Array,
    /// Typed object node
    Object,
}

impl ValueKind {
    /// Whether values of this kind are immutable scalars
    ///
    /// Scalar-immutable values are never copied by the clone engine;
    /// aliasing them is safe.
    #[inline]
    #[must_use]
    pub fn is_scalar(self) -> bool {
        !matches!(self, Self::Enum | Self::Array | Self::Object)
    }
}

/// A named variant of a registered enum type
///
/// Enum values are effectively singletons: the clone engine returns them
/// as-is, never copies them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    /// Registered enum type name
    pub type_name: Arc<str>,
    /// Variant name
    pub variant: Arc<str>,
}

impl EnumValue {
    /// Create an enum value
    #[inline]
    #[must_use]
    pub fn new(type_name: Arc<str>, variant: Arc<str>) -> Self {
        Self { type_name, variant }
    }
}

/// A dynamic value in an object graph
///
/// `Clone` is cheap for every variant: inline copy for scalars, refcount
/// bump for shared storage. Cloning a `Value` therefore returns "the same
/// reference" in the graph sense; deep copying is the engine's job.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value
    Null,
    /// Boolean
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit float
    Float(f64),
    /// Immutable text
    Text(Arc<str>),
    /// Immutable byte string
    Bytes(Arc<[u8]>),
    /// UUID
    Uuid(Uuid),
    /// UTC timestamp
    Timestamp(DateTime<Utc>),
    /// Enum variant
    Enum(Arc<EnumValue>),
    /// Mutable ordered sequence node
    Array(ArrayRef),
    /// Typed object node
    Object(ObjectRef),
}

impl Value {
    /// Discriminant of this value
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::Text(_) => ValueKind::Text,
            Self::Bytes(_) => ValueKind::Bytes,
            Self::Uuid(_) => ValueKind::Uuid,
            Self::Timestamp(_) => ValueKind::Timestamp,
            Self::Enum(_) => ValueKind::Enum,
            Self::Array(_) => ValueKind::Array,
            Self::Object(_) => ValueKind::Object,
        }
    }

    /// Whether this value is an immutable scalar
    #[inline]
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        self.kind().is_scalar()
    }

    /// Reference identity, defined only for graph nodes
    #[inline]
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        match self {
            Self::Object(obj) => Some(obj.identity()),
            Self::Array(arr) => Some(arr.identity()),
            _ => None,
        }
    }

    /// Whether two values denote the same reference
    ///
    /// Pointer equality for reference-counted payloads, value equality for
    /// inline scalars, `false` across kinds.
    #[must_use]
    pub fn same_ref(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Text(a), Self::Text(b)) => Arc::ptr_eq(a, b),
            (Self::Bytes(a), Self::Bytes(b)) => Arc::ptr_eq(a, b),
            (Self::Uuid(a), Self::Uuid(b)) => a == b,
            (Self::Timestamp(a), Self::Timestamp(b)) => a == b,
            (Self::Enum(a), Self::Enum(b)) => Arc::ptr_eq(a, b),
            (Self::Array(a), Self::Array(b)) => a.ptr_eq(b),
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Type name carried by typed values (objects and enum values)
    #[must_use]
    pub fn type_name(&self) -> Option<Arc<str>> {
        match self {
            Self::Object(obj) => Some(obj.type_name()),
            Self::Enum(e) => Some(e.type_name.clone()),
            _ => None,
        }
    }

    /// Borrow the object node, if this is an object
    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Borrow the array node, if this is an array
    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Self::Array(arr) => Some(arr),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(Arc::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(Arc::from(v.as_str()))
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Self::Uuid(v)
    }
}

impl From<ObjectRef> for Value {
    fn from(v: ObjectRef) -> Self {
        Self::Object(v)
    }
}

impl From<ArrayRef> for Value {
    fn from(v: ArrayRef) -> Self {
        Self::Array(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_scalar_partition() {
        assert!(ValueKind::Null.is_scalar());
        assert!(ValueKind::Int.is_scalar());
        assert!(ValueKind::Text.is_scalar());
        assert!(ValueKind::Uuid.is_scalar());
        assert!(ValueKind::Timestamp.is_scalar());

        assert!(!ValueKind::Enum.is_scalar());
        assert!(!ValueKind::Array.is_scalar());
        assert!(!ValueKind::Object.is_scalar());
    }

    #[test]
    fn identity_only_for_nodes() {
        assert!(Value::Int(1).identity().is_none());
        assert!(Value::from("x").identity().is_none());

        let arr = Value::Array(ArrayRef::new(vec![]));
        assert!(arr.identity().is_some());
    }

    #[test]
    fn same_ref_text_is_pointer_equality() {
        let a = Value::from("hello");
        let b = a.clone();
        let c = Value::from("hello");

        assert!(a.same_ref(&b));
        // Equal content, distinct allocation
        assert_eq!(a, c);
        assert!(!a.same_ref(&c));
    }

    #[test]
    fn same_ref_nodes() {
        let node = ObjectRef::new("t.T".into(), vec![]);
        let a = Value::Object(node.clone());
        let b = Value::Object(node);
        let c = Value::Object(ObjectRef::new("t.T".into(), vec![]));

        assert!(a.same_ref(&b));
        assert!(!a.same_ref(&c));
    }

    #[test]
    fn same_ref_across_kinds_is_false() {
        assert!(!Value::Int(0).same_ref(&Value::Float(0.0)));
        assert!(!Value::Null.same_ref(&Value::Bool(false)));
    }

    #[test]
    fn type_name_for_typed_values() {
        let obj = Value::Object(ObjectRef::new("app.Order".into(), vec![]));
        assert_eq!(obj.type_name().as_deref(), Some("app.Order"));

        let e = Value::Enum(Arc::new(EnumValue::new("app.Color".into(), "Red".into())));
        assert_eq!(e.type_name().as_deref(), Some("app.Color"));

        assert!(Value::Int(3).type_name().is_none());
    }

    #[test]
    fn from_conversions() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(42i64), Value::Int(42));
        assert_eq!(Value::from("s"), Value::Text(Arc::from("s")));
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_inline_scalars_same_ref_iff_equal(a in any::<i64>(), b in any::<i64>()) {
            let x = Value::Int(a);
            let y = Value::Int(b);
            prop_assert_eq!(x.same_ref(&y), a == b);
        }

        // Structural equality never implies reference identity for
        // graph nodes.
        #[test]
        fn prop_equal_arrays_have_distinct_identity(elems in proptest::collection::vec(any::<i64>(), 0..16)) {
            let values: Vec<Value> = elems.iter().copied().map(Value::Int).collect();
            let a = Value::Array(ArrayRef::new(values.clone()));
            let b = Value::Array(ArrayRef::new(values));

            prop_assert_ne!(a.identity(), b.identity());
            prop_assert!(!a.same_ref(&b));
        }
    }
}
