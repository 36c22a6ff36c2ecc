//! Clone driver
//!
//! The orchestrator: classifies each value, consults the per-call
//! identity tracker, delegates to the selected implementor, and recurses
//! into fields and elements. The sole public entry point is
//! [`CloneDriver::clone_value`].

use crate::classify::{Classification, MutabilityProbe, TypeClassifier};
use crate::error::CloneError;
use crate::implementor::{
    CloneImplementor, CopyConstructorImplementor, FactoryMethodImplementor, FactorySignature,
    UserCloneFn,
};
use crate::tracker::IdentityTracker;
use mimic_registry::{Instantiator, TypeRegistry};
use mimic_value::{ArrayRef, Identity, Value, ValueKind};
use std::sync::Arc;

/// Default recursion depth limit
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct CloneConfig {
    /// Maximum recursion depth before a clone call fails with
    /// [`CloneError::DepthExceeded`]
    pub max_depth: usize,

    /// Return policy-excluded values as-is instead of failing
    pub retain_excluded: bool,

    /// Override the raw-allocation capability probe (`None` uses the
    /// process-wide probe)
    pub raw_allocation: Option<bool>,
}

impl Default for CloneConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            retain_excluded: false,
            raw_allocation: None,
        }
    }
}

impl CloneConfig {
    /// Create the default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum recursion depth
    #[inline]
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Opt into retain-reference semantics for policy-excluded types
    #[inline]
    #[must_use]
    pub fn with_retain_excluded(mut self, retain: bool) -> Self {
        self.retain_excluded = retain;
        self
    }

    /// Force the raw-allocation capability on or off
    #[inline]
    #[must_use]
    pub fn with_raw_allocation(mut self, enabled: bool) -> Self {
        self.raw_allocation = Some(enabled);
        self
    }
}

/// Per-call clone state: identity tracker plus depth counter
///
/// Owned exclusively by one top-level clone call, discarded when it
/// returns. Never shared across concurrent calls.
#[derive(Debug, Default)]
pub struct CloneCx {
    tracker: IdentityTracker,
    depth: usize,
}

impl CloneCx {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Clone already produced for a source identity within this call
    #[inline]
    #[must_use]
    pub fn lookup(&self, id: Identity) -> Option<&Value> {
        self.tracker.get(id)
    }

    /// Register the clone for a source identity
    ///
    /// Must happen before recursing into the source's fields so cyclic
    /// back-references resolve to the registered (possibly still
    /// unpopulated) shell.
    #[inline]
    pub fn record(&mut self, id: Identity, clone: Value) {
        self.tracker.insert(id, clone);
    }

    fn enter(&mut self, max_depth: usize) -> Result<(), CloneError> {
        if self.depth >= max_depth {
            return Err(CloneError::DepthExceeded(max_depth));
        }
        self.depth += 1;
        Ok(())
    }

    fn exit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

/// The clone orchestrator
///
/// Holds the process-wide pieces (registry, classifier with its memoized
/// profiles, instantiator); per-call state lives in [`CloneCx`]. One
/// driver is safely shared by concurrent clone calls.
#[derive(Debug)]
pub struct CloneDriver {
    registry: Arc<TypeRegistry>,
    classifier: TypeClassifier,
    instantiator: Instantiator,
    config: CloneConfig,
}

impl CloneDriver {
    /// Create a driver with the default configuration
    #[must_use]
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self::with_config(registry, CloneConfig::default())
    }

    /// Create a driver with an explicit configuration
    #[must_use]
    pub fn with_config(registry: Arc<TypeRegistry>, config: CloneConfig) -> Self {
        let mut instantiator = Instantiator::new(registry.clone());
        if let Some(enabled) = config.raw_allocation {
            instantiator = instantiator.with_raw_allocation(enabled);
        }
        Self {
            classifier: TypeClassifier::new(registry.clone()),
            instantiator,
            registry,
            config,
        }
    }

    /// Install a mutability probe on the classifier
    #[must_use]
    pub fn with_probe(mut self, probe: Arc<dyn MutabilityProbe>) -> Self {
        self.classifier = self.classifier.with_probe(probe);
        self
    }

    /// The type registry this driver operates over
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// The shell allocator
    #[inline]
    #[must_use]
    pub fn instantiator(&self) -> &Instantiator {
        &self.instantiator
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &CloneConfig {
        &self.config
    }

    /// Register an explicit implementor for a type
    ///
    /// # Errors
    /// Fails when the type is unregistered or the implementor rejects it.
    pub fn register_implementor(
        &self,
        type_name: &str,
        implementor: Arc<dyn CloneImplementor>,
    ) -> Result<(), CloneError> {
        self.classifier.register_implementor(type_name, implementor)
    }

    /// Register a copy-constructor strategy for a type
    ///
    /// # Errors
    /// `CloneError::Configuration` when the signature does not meet the
    /// copy-constructor contract; raised here, not during cloning.
    pub fn register_copy_constructor(
        &self,
        bound: &str,
        param_type: &str,
        func: UserCloneFn,
    ) -> Result<(), CloneError> {
        let imp = CopyConstructorImplementor::new(&self.registry, bound, param_type, func)?;
        self.register_implementor(bound, Arc::new(imp))
    }

    /// Register a factory-method strategy for a type
    ///
    /// # Errors
    /// `CloneError::Configuration` for signatures outside the two
    /// permitted shapes; raised here, not during cloning.
    pub fn register_factory(
        &self,
        bound: &str,
        signature: FactorySignature,
        func: UserCloneFn,
    ) -> Result<(), CloneError> {
        let imp = FactoryMethodImplementor::new(&self.registry, bound, signature, func)?;
        self.register_implementor(bound, Arc::new(imp))
    }

    /// Exclude a type from cloning by policy
    ///
    /// # Errors
    /// Fails when the type is unregistered.
    pub fn exclude_type(&self, type_name: &str) -> Result<(), CloneError> {
        self.classifier.exclude(type_name)
    }

    /// Deep-clone a value graph
    ///
    /// Returns a structurally independent copy preserving reference
    /// topology: shared nodes stay shared, cycles stay cycles, scalar
    /// immutables come back as the same reference.
    ///
    /// # Errors
    /// Any failure aborts the whole call; no partial clone is returned.
    pub fn clone_value(&self, root: &Value) -> Result<Value, CloneError> {
        tracing::debug!(kind = ?root.kind(), "clone start");
        let mut cx = CloneCx::new();
        let result = self.clone_with(root, &mut cx);
        match &result {
            Ok(_) => tracing::debug!(tracked = cx.tracker.len(), "clone complete"),
            Err(e) => tracing::debug!(error = %e, "clone failed"),
        }
        result
    }

    /// Clone one value within an ongoing clone call
    ///
    /// This is the re-entry point for implementors copying field values.
    ///
    /// # Errors
    /// Same contract as [`Self::clone_value`].
    pub fn clone_with(&self, value: &Value, cx: &mut CloneCx) -> Result<Value, CloneError> {
        // Scalar immutables and enum singletons alias safely.
        if TypeClassifier::classify_kind(value.kind()) == Classification::ScalarImmutable {
            return Ok(value.clone());
        }

        match value {
            Value::Array(arr) => self.clone_array(arr, cx),
            Value::Object(_) => self.clone_object(value, cx),
            // classify_kind routed everything else above
            _ => Ok(value.clone()),
        }
    }

    fn clone_array(&self, arr: &ArrayRef, cx: &mut CloneCx) -> Result<Value, CloneError> {
        let id = arr.identity();
        if let Some(existing) = cx.lookup(id) {
            return Ok(existing.clone());
        }

        cx.enter(self.config.max_depth)?;
        let shell = ArrayRef::new(Vec::with_capacity(arr.len()));
        cx.record(id, Value::Array(shell.clone()));

        for element in arr.snapshot() {
            let cloned = self.clone_with(&element, cx)?;
            shell.push(cloned);
        }
        cx.exit();

        Ok(Value::Array(shell))
    }

    fn clone_object(&self, value: &Value, cx: &mut CloneCx) -> Result<Value, CloneError> {
        let Value::Object(obj) = value else {
            return Ok(value.clone());
        };
        let type_name = obj.type_name();
        let profile = self.classifier.profile(&type_name)?;

        match profile.classification() {
            Classification::ScalarImmutable => Ok(value.clone()),
            Classification::PolicyExcluded => {
                if self.config.retain_excluded {
                    Ok(value.clone())
                } else {
                    Err(CloneError::Policy(type_name))
                }
            }
            Classification::StructurallyCloneable => {
                let id = obj.identity();
                if let Some(existing) = cx.lookup(id) {
                    return Ok(existing.clone());
                }

                cx.enter(self.config.max_depth)?;
                let produced = profile.implementor().produce(obj, self, cx)?;
                cx.exit();

                // Structural copies registered their shell before
                // recursing; constructor/factory results register here.
                if cx.lookup(id).is_none() {
                    cx.record(id, produced.clone());
                }
                Ok(produced)
            }
        }
    }
}
