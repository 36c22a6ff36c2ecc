//! Shared mutable graph nodes
//!
//! Provides [`ObjectRef`] and [`ArrayRef`], the two reference-counted node
//! kinds of a value graph, plus [`Identity`] for pointer-based identity.

use crate::value::Value;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Reference identity of a graph node
///
/// Derived from the node's allocation address. Two handles have equal
/// identity iff they denote the same storage location, regardless of
/// whether their contents compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identity(usize);

impl Identity {
    /// Raw address value (diagnostics only)
    #[inline]
    #[must_use]
    pub fn as_usize(self) -> usize {
        self.0
    }
}

/// A typed instance: the payload behind an [`ObjectRef`]
///
/// Field slots are positional; their order is fixed by the type's field
/// access model (lexical by field name), not by construction order.
#[derive(Debug, Clone)]
pub struct Instance {
    type_name: Arc<str>,
    fields: Vec<Value>,
}

impl Instance {
    /// Create an instance with the given field slots
    #[inline]
    #[must_use]
    pub fn new(type_name: Arc<str>, fields: Vec<Value>) -> Self {
        Self { type_name, fields }
    }

    /// Registered type name
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &Arc<str> {
        &self.type_name
    }

    /// Number of field slots
    #[inline]
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Read a field slot
    #[inline]
    #[must_use]
    pub fn field(&self, slot: usize) -> Option<&Value> {
        self.fields.get(slot)
    }

    /// Write a field slot
    ///
    /// Returns `false` if the slot is out of range.
    pub fn set_field(&mut self, slot: usize, value: Value) -> bool {
        match self.fields.get_mut(slot) {
            Some(dst) => {
                *dst = value;
                true
            }
            None => false,
        }
    }
}

/// Shared handle to a typed instance
///
/// Cloning the handle shares the node (refcount bump). Nodes are the unit
/// of identity tracking during clone operations.
#[derive(Clone)]
pub struct ObjectRef(Arc<RwLock<Instance>>);

impl ObjectRef {
    /// Allocate a new node holding the given instance data
    #[must_use]
    pub fn new(type_name: Arc<str>, fields: Vec<Value>) -> Self {
        Self(Arc::new(RwLock::new(Instance::new(type_name, fields))))
    }

    /// Registered type name of the instance
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> Arc<str> {
        self.0.read().type_name().clone()
    }

    /// Number of field slots
    #[inline]
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.0.read().field_count()
    }

    /// Read a field slot (cheap clone of the slot value)
    #[inline]
    #[must_use]
    pub fn field(&self, slot: usize) -> Option<Value> {
        self.0.read().field(slot).cloned()
    }

    /// Write a field slot
    ///
    /// Returns `false` if the slot is out of range.
    #[inline]
    pub fn set_field(&self, slot: usize, value: Value) -> bool {
        self.0.write().set_field(slot, value)
    }

    /// Snapshot all field slots under a single read lock
    #[must_use]
    pub fn fields(&self) -> Vec<Value> {
        self.0.read().fields.clone()
    }

    /// Reference identity of this node
    #[inline]
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity(Arc::as_ptr(&self.0) as usize)
    }

    /// Whether two handles denote the same node
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for ObjectRef {
    /// Identity comparison, not structural (graphs may be cyclic)
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ObjectRef {}

impl fmt::Debug for ObjectRef {
    // Identity-only formatting: structural output would recurse forever
    // on cyclic graphs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectRef")
            .field("type", &self.type_name())
            .field("identity", &self.identity())
            .finish()
    }
}

/// Shared handle to a mutable ordered sequence
///
/// Arrays always carry mutable backing storage, so the clone engine copies
/// them element-wise regardless of element kinds.
#[derive(Clone)]
pub struct ArrayRef(Arc<RwLock<Vec<Value>>>);

impl ArrayRef {
    /// Allocate a new array node
    #[inline]
    #[must_use]
    pub fn new(elements: Vec<Value>) -> Self {
        Self(Arc::new(RwLock::new(elements)))
    }

    /// Number of elements
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    /// Whether the array is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Read an element (cheap clone)
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.read().get(index).cloned()
    }

    /// Write an element
    ///
    /// Returns `false` if the index is out of range.
    pub fn set(&self, index: usize, value: Value) -> bool {
        let mut guard = self.0.write();
        match guard.get_mut(index) {
            Some(dst) => {
                *dst = value;
                true
            }
            None => false,
        }
    }

    /// Append an element
    #[inline]
    pub fn push(&self, value: Value) {
        self.0.write().push(value);
    }

    /// Snapshot all elements under a single read lock
    #[must_use]
    pub fn snapshot(&self) -> Vec<Value> {
        self.0.read().clone()
    }

    /// Reference identity of this node
    #[inline]
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity(Arc::as_ptr(&self.0) as usize)
    }

    /// Whether two handles denote the same node
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for ArrayRef {
    /// Identity comparison, not structural
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ArrayRef {}

impl fmt::Debug for ArrayRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayRef")
            .field("len", &self.len())
            .field("identity", &self.identity())
            .finish()
    }
}
