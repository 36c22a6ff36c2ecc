//! Type and field descriptors
//!
//! [`TypeSpec`]/[`FieldSpec`] are the declarative registration surface;
//! validation turns them into immutable [`TypeDescriptor`] metadata held
//! by the registry.

use mimic_value::{Value, ValueKind};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Declared type of a field slot
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Any value
    #[default]
    Any,
    /// A scalar of the given kind
    Scalar(ValueKind),
    /// An object of the named type (or a subtype)
    Object(String),
    /// An array
    Array,
    /// A variant of the named enum type
    Enum(String),
}

impl FieldType {
    /// Zero-initialized value for a freshly allocated slot
    ///
    /// Inline scalars get their zero; everything reference-like (text,
    /// bytes, UUID, timestamp, enum, object, array) starts out `Null`.
    #[must_use]
    pub fn zero_value(&self) -> Value {
        match self {
            Self::Scalar(ValueKind::Bool) => Value::Bool(false),
            Self::Scalar(ValueKind::Int) => Value::Int(0),
            Self::Scalar(ValueKind::Float) => Value::Float(0.0),
            _ => Value::Null,
        }
    }
}

/// Declarative field registration input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name (unique across the flattened inheritance chain)
    pub name: String,

    /// Declared type
    #[serde(default)]
    pub ty: FieldType,

    /// Clone-transient: never read or written during cloning
    #[serde(default)]
    pub transient: bool,

    /// Static: excluded from instances unconditionally
    #[serde(default, rename = "static")]
    pub is_static: bool,
}

impl FieldSpec {
    /// Create a field spec with defaults (`Any`, non-transient)
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: FieldType::Any,
            transient: false,
            is_static: false,
        }
    }

    /// Set the declared type
    #[inline]
    #[must_use]
    pub fn typed(mut self, ty: FieldType) -> Self {
        self.ty = ty;
        self
    }

    /// Mark the field clone-transient
    #[inline]
    #[must_use]
    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }

    /// Mark the field static
    #[inline]
    #[must_use]
    pub fn static_field(mut self) -> Self {
        self.is_static = true;
        self
    }
}

/// Declarative type registration input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeSpec {
    /// Type name
    pub name: String,

    /// Optional parent type (single-inheritance chain)
    #[serde(default)]
    pub parent: Option<String>,

    /// Fields declared on this type (not counting inherited ones)
    #[serde(default)]
    pub fields: Vec<FieldSpec>,

    /// Whether instances can be materialized (`false` models
    /// abstract/interface types)
    #[serde(default = "default_instantiable")]
    pub instantiable: bool,

    /// Enum variants; a non-empty list makes this an enum type
    #[serde(default)]
    pub variants: Vec<String>,
}

fn default_instantiable() -> bool {
    true
}

impl TypeSpec {
    /// Create a spec for a plain instantiable type
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            fields: Vec::new(),
            instantiable: true,
            variants: Vec::new(),
        }
    }

    /// Declare the parent type
    #[inline]
    #[must_use]
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Add a declared field
    #[inline]
    #[must_use]
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Mark the type abstract (non-instantiable)
    #[inline]
    #[must_use]
    pub fn abstract_type(mut self) -> Self {
        self.instantiable = false;
        self
    }

    /// Turn the spec into an enum type with the given variants
    #[must_use]
    pub fn enumeration(mut self, variants: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.variants = variants.into_iter().map(Into::into).collect();
        self.instantiable = false;
        self
    }
}

/// A field declared on a type, as held by descriptors and access models
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    name: Arc<str>,
    ty: FieldType,
    transient: bool,
}

impl FieldDescriptor {
    pub(crate) fn new(name: Arc<str>, ty: FieldType, transient: bool) -> Self {
        Self {
            name,
            ty,
            transient,
        }
    }

    /// Field name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// Declared type
    #[inline]
    #[must_use]
    pub fn ty(&self) -> &FieldType {
        &self.ty
    }

    /// Whether the field is clone-transient
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.transient
    }
}

/// Immutable per-type metadata
///
/// Built once from a validated [`TypeSpec`] and never mutated afterwards,
/// so it is safe to share across threads and clone operations.
#[derive(Debug)]
pub struct TypeDescriptor {
    name: Arc<str>,
    parent: Option<Arc<str>>,
    fields: Vec<FieldDescriptor>,
    instantiable: bool,
    variants: Vec<Arc<str>>,
}

impl TypeDescriptor {
    pub(crate) fn new(
        name: Arc<str>,
        parent: Option<Arc<str>>,
        fields: Vec<FieldDescriptor>,
        instantiable: bool,
        variants: Vec<Arc<str>>,
    ) -> Self {
        Self {
            name,
            parent,
            fields,
            instantiable,
            variants,
        }
    }

    /// Type name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// Parent type name, if any
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<&Arc<str>> {
        self.parent.as_ref()
    }

    /// Fields declared directly on this type (instance fields only)
    #[inline]
    #[must_use]
    pub fn declared_fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Whether shells of this type can be allocated
    #[inline]
    #[must_use]
    pub fn is_instantiable(&self) -> bool {
        self.instantiable
    }

    /// Whether this is an enum type
    #[inline]
    #[must_use]
    pub fn is_enum(&self) -> bool {
        !self.variants.is_empty()
    }

    /// Enum variants (empty for non-enum types)
    #[inline]
    #[must_use]
    pub fn variants(&self) -> &[Arc<str>] {
        &self.variants
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_value_inline_scalars() {
        assert_eq!(
            FieldType::Scalar(ValueKind::Bool).zero_value(),
            Value::Bool(false)
        );
        assert_eq!(FieldType::Scalar(ValueKind::Int).zero_value(), Value::Int(0));
        assert_eq!(
            FieldType::Scalar(ValueKind::Float).zero_value(),
            Value::Float(0.0)
        );
    }

    #[test]
    fn zero_value_reference_like_is_null() {
        assert_eq!(FieldType::Any.zero_value(), Value::Null);
        assert_eq!(FieldType::Array.zero_value(), Value::Null);
        assert_eq!(
            FieldType::Object("app.Person".into()).zero_value(),
            Value::Null
        );
        assert_eq!(
            FieldType::Scalar(ValueKind::Text).zero_value(),
            Value::Null
        );
        assert_eq!(
            FieldType::Scalar(ValueKind::Uuid).zero_value(),
            Value::Null
        );
    }

    #[test]
    fn spec_builders() {
        let spec = TypeSpec::new("app.Employee")
            .extends("app.Person")
            .field(FieldSpec::new("badge").typed(FieldType::Scalar(ValueKind::Text)))
            .field(FieldSpec::new("session").transient());

        assert_eq!(spec.parent.as_deref(), Some("app.Person"));
        assert_eq!(spec.fields.len(), 2);
        assert!(spec.fields[1].transient);
        assert!(spec.instantiable);
    }

    #[test]
    fn enum_spec_is_not_instantiable() {
        let spec = TypeSpec::new("app.Color").enumeration(["Red", "Green"]);
        assert!(!spec.instantiable);
        assert_eq!(spec.variants.len(), 2);
    }

    #[test]
    fn spec_deserializes_from_json() {
        let json = r#"{
            "name": "app.Account",
            "fields": [
                {"name": "id", "ty": {"scalar": "uuid"}},
                {"name": "cache", "transient": true}
            ]
        }"#;

        let spec: TypeSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.name, "app.Account");
        assert!(spec.instantiable);
        assert_eq!(spec.fields[0].ty, FieldType::Scalar(ValueKind::Uuid));
        assert!(spec.fields[1].transient);
        assert_eq!(spec.fields[1].ty, FieldType::Any);
    }
}
