//! Process-wide type registry
//!
//! Provides [`TypeRegistry`]: concurrent registration and lookup of type
//! descriptors, default constructors, and memoized field access models.

use crate::access::FieldAccessModel;
use crate::descriptor::{FieldDescriptor, TypeDescriptor, TypeSpec};
use crate::error::RegistryError;
use dashmap::DashMap;
use mimic_value::Value;
use std::collections::HashSet;
use std::sync::Arc;

/// Boxed error type carried by user-supplied closures
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A registered zero-argument default constructor
///
/// Used as the fallback allocation path when raw allocation is
/// unavailable. Expected to return a fully shaped `Value::Object` of the
/// registered type.
pub type DefaultConstructor = Arc<dyn Fn() -> Result<Value, BoxError> + Send + Sync>;

/// Concurrent registry of type metadata
///
/// Descriptors are immutable once registered. Access models are computed
/// lazily on first request and memoized; the memoization write is
/// idempotent, so concurrent computation of the same model is harmless.
#[derive(Default)]
pub struct TypeRegistry {
    types: DashMap<Arc<str>, Arc<TypeDescriptor>>,
    models: DashMap<Arc<str>, Arc<FieldAccessModel>>,
    constructors: DashMap<Arc<str>, DefaultConstructor>,
}

impl TypeRegistry {
    /// Create an empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and register a type spec
    ///
    /// # Errors
    /// Rejects empty names, duplicate registration, unknown or enum
    /// parents, enum specs with fields or parents, and field names that
    /// collide anywhere in the flattened inheritance chain.
    pub fn register(&self, spec: TypeSpec) -> Result<Arc<TypeDescriptor>, RegistryError> {
        if spec.name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.types.contains_key(spec.name.as_str()) {
            return Err(RegistryError::DuplicateType { name: spec.name });
        }

        let is_enum = !spec.variants.is_empty();
        if is_enum {
            if !spec.fields.is_empty() {
                return Err(RegistryError::InvalidSpec {
                    name: spec.name,
                    reason: "enum types cannot declare fields".to_string(),
                });
            }
            if spec.parent.is_some() {
                return Err(RegistryError::InvalidSpec {
                    name: spec.name,
                    reason: "enum types cannot declare a parent".to_string(),
                });
            }
            if spec.instantiable {
                return Err(RegistryError::InvalidSpec {
                    name: spec.name,
                    reason: "enum types are not instantiable".to_string(),
                });
            }
        }

        // Resolve the parent before accepting the spec; registration
        // order therefore guarantees an acyclic chain.
        let parent: Option<Arc<str>> = match &spec.parent {
            Some(parent) => {
                let desc = self.types.get(parent.as_str()).ok_or_else(|| {
                    RegistryError::UnknownParent {
                        name: spec.name.clone(),
                        parent: parent.clone(),
                    }
                })?;
                if desc.is_enum() {
                    return Err(RegistryError::EnumParent {
                        name: spec.name,
                        parent: parent.clone(),
                    });
                }
                Some(desc.name().clone())
            }
            None => None,
        };

        // Instance fields declared here, statics dropped unconditionally
        let fields: Vec<FieldDescriptor> = spec
            .fields
            .iter()
            .filter(|f| !f.is_static)
            .map(|f| FieldDescriptor::new(f.name.as_str().into(), f.ty.clone(), f.transient))
            .collect();

        // Collision check over the whole flattened chain
        let mut seen: HashSet<Arc<str>> = HashSet::new();
        let mut ancestor = parent.clone();
        while let Some(name) = ancestor {
            let Some(desc) = self.get(name.as_ref()) else {
                break;
            };
            for field in desc.declared_fields() {
                seen.insert(field.name().clone());
            }
            ancestor = desc.parent().cloned();
        }
        for field in &fields {
            if !seen.insert(field.name().clone()) {
                return Err(RegistryError::DuplicateField {
                    type_name: spec.name,
                    field: field.name().to_string(),
                });
            }
        }

        let name: Arc<str> = spec.name.as_str().into();
        let variants: Vec<Arc<str>> = spec.variants.iter().map(|v| v.as_str().into()).collect();
        let descriptor = Arc::new(TypeDescriptor::new(
            name.clone(),
            parent,
            fields,
            spec.instantiable,
            variants,
        ));

        self.types.insert(name, descriptor.clone());
        Ok(descriptor)
    }

    /// Look up a descriptor
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        self.types.get(name).map(|entry| entry.value().clone())
    }

    /// Look up a descriptor, failing on unregistered types
    ///
    /// # Errors
    /// `RegistryError::UnknownType` when the name is not registered.
    pub fn require(&self, name: &str) -> Result<Arc<TypeDescriptor>, RegistryError> {
        self.get(name).ok_or_else(|| RegistryError::UnknownType {
            name: name.to_string(),
        })
    }

    /// Whether a type is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Number of registered types
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Whether `base` is `derived` or one of its ancestors
    #[must_use]
    pub fn is_assignable_from(&self, base: &str, derived: &str) -> bool {
        if base == derived {
            return true;
        }
        let mut current = self.get(derived).and_then(|d| d.parent().cloned());
        while let Some(name) = current {
            if name.as_ref() == base {
                return true;
            }
            current = self.get(name.as_ref()).and_then(|d| d.parent().cloned());
        }
        false
    }

    /// Register a default constructor for the fallback allocation path
    ///
    /// # Errors
    /// `RegistryError::UnknownType` when the type is not registered.
    pub fn register_constructor(
        &self,
        name: &str,
        constructor: DefaultConstructor,
    ) -> Result<(), RegistryError> {
        let descriptor = self.require(name)?;
        self.constructors
            .insert(descriptor.name().clone(), constructor);
        Ok(())
    }

    /// Registered default constructor, if any
    #[must_use]
    pub fn constructor(&self, name: &str) -> Option<DefaultConstructor> {
        self.constructors.get(name).map(|entry| entry.value().clone())
    }

    /// Flattened, memoized field access model for a type
    ///
    /// The model collects every instance field along the inheritance
    /// chain exactly once and orders the slots lexically by field name.
    ///
    /// # Errors
    /// `RegistryError::UnknownType` when the name is not registered.
    pub fn access_model(&self, name: &str) -> Result<Arc<FieldAccessModel>, RegistryError> {
        if let Some(model) = self.models.get(name) {
            return Ok(model.value().clone());
        }

        let descriptor = self.require(name)?;

        let mut fields: Vec<FieldDescriptor> = Vec::new();
        let mut current = Some(descriptor.clone());
        while let Some(desc) = current {
            fields.extend(desc.declared_fields().iter().cloned());
            current = desc.parent().and_then(|p| self.get(p.as_ref()));
        }
        fields.sort_by(|a, b| a.name().cmp(b.name()));

        let model = Arc::new(FieldAccessModel::new(descriptor.name().clone(), fields));

        // Idempotent memoization: a concurrent writer computed the same
        // model, keep whichever landed first.
        Ok(self
            .models
            .entry(descriptor.name().clone())
            .or_insert(model)
            .value()
            .clone())
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.types.len())
            .field("models", &self.models.len())
            .field("constructors", &self.constructors.len())
            .finish()
    }
}
