//! Type classification
//!
//! Decides, per type, whether instances are immutable scalars (aliasing
//! is safe, no copy), structurally cloneable, or excluded by policy, and
//! resolves the clone implementor to use. Results are memoized per type.

use crate::error::CloneError;
use crate::implementor::{CloneImplementor, NoCloneImplementor, StructuralFieldCopyImplementor};
use dashmap::{DashMap, DashSet};
use mimic_registry::{FieldAccessModel, FieldType, TypeDescriptor, TypeRegistry};
use mimic_value::ValueKind;
use std::sync::Arc;

/// How a type relates to cloning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Instances can never be mutated; return the same reference
    ScalarImmutable,

    /// Instances need a structural (or strategy-driven) deep copy
    StructurallyCloneable,

    /// Cloning is forbidden by policy unless the caller opts into
    /// retain-reference semantics
    PolicyExcluded,
}

/// Cached per-type clone plan
///
/// Computed once per type and shared; effectively immutable after the
/// memoization write.
#[derive(Debug)]
pub struct TypeProfile {
    classification: Classification,
    implementor: Arc<dyn CloneImplementor>,
    access: Option<Arc<FieldAccessModel>>,
}

impl TypeProfile {
    /// Classification of the type
    #[inline]
    #[must_use]
    pub fn classification(&self) -> Classification {
        self.classification
    }

    /// Implementor selected for the type
    #[inline]
    #[must_use]
    pub fn implementor(&self) -> &Arc<dyn CloneImplementor> {
        &self.implementor
    }

    /// Field access model, present for structural copies
    #[inline]
    #[must_use]
    pub fn access(&self) -> Option<&Arc<FieldAccessModel>> {
        self.access.as_ref()
    }
}

/// Best-effort deep mutability analysis
///
/// Additive-only and fail-open: `Some(true)` promotes a type to
/// scalar-immutable (skipping copies); `Some(false)` and `None` change
/// nothing. Correctness never depends on a probe being installed.
pub trait MutabilityProbe: Send + Sync + std::fmt::Debug {
    /// Whether instances of this type can never be mutated
    fn deeply_immutable(&self, descriptor: &TypeDescriptor, registry: &TypeRegistry)
        -> Option<bool>;
}

/// Built-in probe: a type whose flattened fields are all declared inline
/// scalars is reported deeply immutable
///
/// Installing it is the caller's assertion that such instances are not
/// mutated after construction.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScalarFieldsProbe;

impl MutabilityProbe for ScalarFieldsProbe {
    fn deeply_immutable(
        &self,
        descriptor: &TypeDescriptor,
        registry: &TypeRegistry,
    ) -> Option<bool> {
        let model = registry.access_model(descriptor.name()).ok()?;
        let all_scalar = model.fields().iter().all(|f| match f.ty() {
            FieldType::Scalar(kind) => kind.is_scalar(),
            _ => false,
        });
        all_scalar.then_some(true)
    }
}

/// Per-type classification with a process-wide memo cache
#[derive(Debug)]
pub struct TypeClassifier {
    registry: Arc<TypeRegistry>,
    profiles: DashMap<Arc<str>, Arc<TypeProfile>>,
    overrides: DashMap<Arc<str>, Arc<dyn CloneImplementor>>,
    excluded: DashSet<Arc<str>>,
    probe: Option<Arc<dyn MutabilityProbe>>,
}

impl TypeClassifier {
    /// Create a classifier over the given registry
    #[must_use]
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self {
            registry,
            profiles: DashMap::new(),
            overrides: DashMap::new(),
            excluded: DashSet::new(),
            probe: None,
        }
    }

    /// Install a mutability probe
    #[must_use]
    pub fn with_probe(mut self, probe: Arc<dyn MutabilityProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Classification for a value kind, independent of any registry state
    ///
    /// Scalars and enum values alias safely; arrays always need an
    /// element-wise defensive copy.
    #[must_use]
    pub fn classify_kind(kind: ValueKind) -> Classification {
        match kind {
            ValueKind::Enum => Classification::ScalarImmutable,
            ValueKind::Array | ValueKind::Object => Classification::StructurallyCloneable,
            _ => Classification::ScalarImmutable,
        }
    }

    /// Register an explicit implementor for a type
    ///
    /// Takes precedence over the default structural strategy. Invalidates
    /// any cached profile for the type.
    ///
    /// # Errors
    /// Fails when the type is unregistered or the implementor rejects it.
    pub fn register_implementor(
        &self,
        type_name: &str,
        implementor: Arc<dyn CloneImplementor>,
    ) -> Result<(), CloneError> {
        let descriptor = self.registry.require(type_name)?;
        if !implementor.can_handle(&descriptor) {
            return Err(CloneError::Configuration {
                type_name: type_name.to_string(),
                reason: format!("implementor `{}` cannot handle this type", implementor.name()),
            });
        }
        tracing::debug!(type_name, implementor = implementor.name(), "registered implementor");
        self.overrides.insert(descriptor.name().clone(), implementor);
        self.profiles.remove(type_name);
        Ok(())
    }

    /// Exclude a type from cloning by policy
    ///
    /// # Errors
    /// Fails when the type is unregistered.
    pub fn exclude(&self, type_name: &str) -> Result<(), CloneError> {
        let descriptor = self.registry.require(type_name)?;
        tracing::debug!(type_name, "policy-excluded type");
        self.excluded.insert(descriptor.name().clone());
        self.profiles.remove(type_name);
        Ok(())
    }

    /// Whether the type is policy-excluded
    #[inline]
    #[must_use]
    pub fn is_excluded(&self, type_name: &str) -> bool {
        self.excluded.contains(type_name)
    }

    /// Memoized clone profile for an object type
    ///
    /// Deterministic and side-effect-free beyond the memo cache write;
    /// concurrent computation writes equivalent profiles.
    ///
    /// # Errors
    /// Fails when the type is not registered.
    pub fn profile(&self, type_name: &Arc<str>) -> Result<Arc<TypeProfile>, CloneError> {
        if let Some(profile) = self.profiles.get(type_name.as_ref()) {
            return Ok(profile.value().clone());
        }

        let descriptor = self
            .registry
            .get(type_name)
            .ok_or_else(|| CloneError::UnknownType(type_name.clone()))?;

        let profile = Arc::new(self.compute_profile(&descriptor)?);
        tracing::trace!(%type_name, classification = ?profile.classification(), "computed type profile");

        Ok(self
            .profiles
            .entry(descriptor.name().clone())
            .or_insert(profile)
            .value()
            .clone())
    }

    fn compute_profile(&self, descriptor: &TypeDescriptor) -> Result<TypeProfile, CloneError> {
        let name = descriptor.name();

        if self.excluded.contains(name.as_ref()) {
            return Ok(TypeProfile {
                classification: Classification::PolicyExcluded,
                implementor: Arc::new(NoCloneImplementor::new(name.clone())),
                access: None,
            });
        }

        // Probe promotion is additive-only: it can add a type to the
        // immutable set, never remove one.
        if let Some(probe) = &self.probe {
            if probe.deeply_immutable(descriptor, &self.registry) == Some(true) {
                return Ok(TypeProfile {
                    classification: Classification::ScalarImmutable,
                    implementor: Arc::new(NoCloneImplementor::new(name.clone())),
                    access: None,
                });
            }
        }

        let implementor: Arc<dyn CloneImplementor> = match self.overrides.get(name.as_ref()) {
            Some(entry) => entry.value().clone(),
            None => Arc::new(StructuralFieldCopyImplementor::new()),
        };

        let access = self.registry.access_model(name)?;
        Ok(TypeProfile {
            classification: Classification::StructurallyCloneable,
            implementor,
            access: Some(access),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mimic_registry::{FieldSpec, TypeSpec};

    fn registry() -> Arc<TypeRegistry> {
        let registry = TypeRegistry::new();
        registry
            .register(
                TypeSpec::new("test.Point")
                    .field(FieldSpec::new("x").typed(FieldType::Scalar(ValueKind::Int)))
                    .field(FieldSpec::new("y").typed(FieldType::Scalar(ValueKind::Int))),
            )
            .unwrap();
        registry
            .register(TypeSpec::new("test.Holder").field(FieldSpec::new("payload")))
            .unwrap();
        Arc::new(registry)
    }

    #[test]
    fn kind_classification() {
        assert_eq!(
            TypeClassifier::classify_kind(ValueKind::Int),
            Classification::ScalarImmutable
        );
        assert_eq!(
            TypeClassifier::classify_kind(ValueKind::Uuid),
            Classification::ScalarImmutable
        );
        assert_eq!(
            TypeClassifier::classify_kind(ValueKind::Enum),
            Classification::ScalarImmutable
        );
        assert_eq!(
            TypeClassifier::classify_kind(ValueKind::Array),
            Classification::StructurallyCloneable
        );
        assert_eq!(
            TypeClassifier::classify_kind(ValueKind::Object),
            Classification::StructurallyCloneable
        );
    }

    #[test]
    fn default_profile_is_structural() {
        let classifier = TypeClassifier::new(registry());
        let profile = classifier.profile(&Arc::from("test.Holder")).unwrap();

        assert_eq!(profile.classification(), Classification::StructurallyCloneable);
        assert_eq!(profile.implementor().name(), "structural_field_copy");
        assert!(profile.access().is_some());
    }

    #[test]
    fn profile_is_memoized_and_idempotent() {
        let classifier = TypeClassifier::new(registry());
        let name: Arc<str> = Arc::from("test.Point");

        let a = classifier.profile(&name).unwrap();
        let b = classifier.profile(&name).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.classification(), b.classification());
    }

    #[test]
    fn unknown_type_rejected() {
        let classifier = TypeClassifier::new(registry());
        let err = classifier.profile(&Arc::from("test.Ghost")).unwrap_err();
        assert!(matches!(err, CloneError::UnknownType(_)));
    }

    #[test]
    fn exclusion_changes_classification() {
        let classifier = TypeClassifier::new(registry());
        classifier.exclude("test.Point").unwrap();

        let profile = classifier.profile(&Arc::from("test.Point")).unwrap();
        assert_eq!(profile.classification(), Classification::PolicyExcluded);
        assert!(classifier.is_excluded("test.Point"));
    }

    #[test]
    fn exclusion_invalidates_cached_profile() {
        let classifier = TypeClassifier::new(registry());
        let name: Arc<str> = Arc::from("test.Point");

        let before = classifier.profile(&name).unwrap();
        assert_eq!(before.classification(), Classification::StructurallyCloneable);

        classifier.exclude("test.Point").unwrap();
        let after = classifier.profile(&name).unwrap();
        assert_eq!(after.classification(), Classification::PolicyExcluded);
    }

    #[test]
    fn probe_promotes_scalar_only_types() {
        let classifier =
            TypeClassifier::new(registry()).with_probe(Arc::new(ScalarFieldsProbe));

        let point = classifier.profile(&Arc::from("test.Point")).unwrap();
        assert_eq!(point.classification(), Classification::ScalarImmutable);

        // `payload` is declared Any; the probe must not promote it
        let holder = classifier.profile(&Arc::from("test.Holder")).unwrap();
        assert_eq!(holder.classification(), Classification::StructurallyCloneable);
    }

    #[test]
    fn probe_absence_defaults_to_structural() {
        let classifier = TypeClassifier::new(registry());
        let profile = classifier.profile(&Arc::from("test.Point")).unwrap();
        assert_eq!(profile.classification(), Classification::StructurallyCloneable);
    }
}
