//! Clone implementor strategies
//!
//! Pluggable per-type copy algorithms behind the [`CloneImplementor`]
//! trait: default structural field copy, user copy-constructors, user
//! factory methods, and the no-clone sentinel.
//!
//! # Safety
//! Implementors are stateless beyond their bound type and shared across
//! all clone operations; `produce` must never return a half-populated
//! graph on error.

use crate::driver::{CloneCx, CloneDriver};
use crate::error::CloneError;
use mimic_registry::{BoxError, TypeDescriptor, TypeRegistry};
use mimic_value::{ObjectRef, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// User-supplied copy routine (copy-constructor or factory body)
///
/// Receives the source object; must return a fully formed clone of the
/// bound type. Returning a [`CloneError`] propagates it unwrapped.
pub type UserCloneFn = Arc<dyn Fn(&Value) -> Result<Value, BoxError> + Send + Sync>;

/// Per-type copy strategy
///
/// Selection order: an explicitly registered implementor takes precedence
/// over the default structural strategy.
pub trait CloneImplementor: Send + Sync + fmt::Debug {
    /// Strategy name (for diagnostics)
    fn name(&self) -> &'static str;

    /// Whether this implementor can copy instances of the type
    fn can_handle(&self, descriptor: &TypeDescriptor) -> bool;

    /// Produce the clone of `source`
    ///
    /// Recursive field copies go back through
    /// [`CloneDriver::clone_with`], which re-enters classification and
    /// identity tracking.
    ///
    /// # Errors
    /// Any failure aborts the whole top-level clone call.
    fn produce(
        &self,
        source: &ObjectRef,
        driver: &CloneDriver,
        cx: &mut CloneCx,
    ) -> Result<Value, CloneError>;
}

/// Default strategy: allocate a shell, register it, copy fields one by one
///
/// The shell is registered against the source identity **before** any
/// field is cloned, so cyclic back-references resolve to it.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuralFieldCopyImplementor;

impl StructuralFieldCopyImplementor {
    /// Create the structural strategy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl CloneImplementor for StructuralFieldCopyImplementor {
    fn name(&self) -> &'static str {
        "structural_field_copy"
    }

    fn can_handle(&self, descriptor: &TypeDescriptor) -> bool {
        descriptor.is_instantiable() && !descriptor.is_enum()
    }

    fn produce(
        &self,
        source: &ObjectRef,
        driver: &CloneDriver,
        cx: &mut CloneCx,
    ) -> Result<Value, CloneError> {
        let type_name = source.type_name();

        let shell = driver.instantiator().allocate(&type_name)?;
        cx.record(source.identity(), Value::Object(shell.clone()));

        let model = driver.registry().access_model(&type_name)?;
        for (slot, field) in model.fields().iter().enumerate() {
            // Transient fields stay at their post-allocation defaults,
            // neither read nor written.
            if field.is_transient() {
                continue;
            }
            let value = model.get(source, slot)?;
            let cloned = driver
                .clone_with(&value, cx)
                .map_err(|e| e.at_field(&type_name, field.name()))?;
            model.set(&shell, slot, cloned)?;
        }

        Ok(Value::Object(shell))
    }
}

/// Copy-constructor strategy: a user routine whose declared parameter
/// type is the bound class or one of its supertypes
pub struct CopyConstructorImplementor {
    bound: Arc<str>,
    param_type: Arc<str>,
    func: UserCloneFn,
}

impl CopyConstructorImplementor {
    /// Validate and create a copy-constructor implementor
    ///
    /// # Errors
    /// `CloneError::Configuration` when the bound type is not concrete or
    /// the declared parameter type is not the bound type or a supertype.
    /// Raised here, at registration time, never inside a clone call.
    pub fn new(
        registry: &TypeRegistry,
        bound: &str,
        param_type: &str,
        func: UserCloneFn,
    ) -> Result<Self, CloneError> {
        let descriptor = registry.require(bound)?;
        if !descriptor.is_instantiable() || descriptor.is_enum() {
            return Err(CloneError::Configuration {
                type_name: bound.to_string(),
                reason: "copy constructor requires a concrete bound type".to_string(),
            });
        }
        if !registry.is_assignable_from(param_type, bound) {
            return Err(CloneError::Configuration {
                type_name: bound.to_string(),
                reason: format!(
                    "parameter type `{param_type}` is not the bound type or a supertype"
                ),
            });
        }
        Ok(Self {
            bound: descriptor.name().clone(),
            param_type: param_type.into(),
            func,
        })
    }

    /// Declared parameter type
    #[inline]
    #[must_use]
    pub fn param_type(&self) -> &Arc<str> {
        &self.param_type
    }
}

impl fmt::Debug for CopyConstructorImplementor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CopyConstructorImplementor")
            .field("bound", &self.bound)
            .field("param_type", &self.param_type)
            .finish_non_exhaustive()
    }
}

impl CloneImplementor for CopyConstructorImplementor {
    fn name(&self) -> &'static str {
        "copy_constructor"
    }

    fn can_handle(&self, descriptor: &TypeDescriptor) -> bool {
        *descriptor.name() == self.bound
    }

    fn produce(
        &self,
        source: &ObjectRef,
        driver: &CloneDriver,
        _cx: &mut CloneCx,
    ) -> Result<Value, CloneError> {
        let produced = (self.func)(&Value::Object(source.clone()))
            .map_err(|e| CloneError::from_user(&self.bound, e))?;
        check_produced_type(driver.registry(), &self.bound, &produced)?;
        Ok(produced)
    }
}

/// Declared shape of a factory method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorySignature {
    /// Static, single parameter of the bound type or a supertype
    Static {
        /// Declared parameter type
        param_type: String,
    },
    /// Instance-scoped, zero parameters, declared on the bound type
    Instance {
        /// Declaring type of the method
        declared_on: String,
    },
}

/// Factory-method strategy: a user routine returning the bound type
pub struct FactoryMethodImplementor {
    bound: Arc<str>,
    signature: FactorySignature,
    func: UserCloneFn,
}

impl FactoryMethodImplementor {
    /// Validate and create a factory-method implementor
    ///
    /// # Errors
    /// `CloneError::Configuration` for any signature outside the two
    /// permitted shapes; raised at registration time.
    pub fn new(
        registry: &TypeRegistry,
        bound: &str,
        signature: FactorySignature,
        func: UserCloneFn,
    ) -> Result<Self, CloneError> {
        let descriptor = registry.require(bound)?;
        match &signature {
            FactorySignature::Static { param_type } => {
                if !registry.contains(param_type) {
                    return Err(CloneError::Configuration {
                        type_name: bound.to_string(),
                        reason: format!("factory parameter type `{param_type}` is not registered"),
                    });
                }
                if !registry.is_assignable_from(param_type, bound) {
                    return Err(CloneError::Configuration {
                        type_name: bound.to_string(),
                        reason: format!(
                            "factory parameter type `{param_type}` is not the bound type or a supertype"
                        ),
                    });
                }
            }
            FactorySignature::Instance { declared_on } => {
                if declared_on.as_str() != bound {
                    return Err(CloneError::Configuration {
                        type_name: bound.to_string(),
                        reason: format!(
                            "instance factory must be declared on the bound type, not `{declared_on}`"
                        ),
                    });
                }
            }
        }
        Ok(Self {
            bound: descriptor.name().clone(),
            signature,
            func,
        })
    }

    /// Declared signature
    #[inline]
    #[must_use]
    pub fn signature(&self) -> &FactorySignature {
        &self.signature
    }
}

impl fmt::Debug for FactoryMethodImplementor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryMethodImplementor")
            .field("bound", &self.bound)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

impl CloneImplementor for FactoryMethodImplementor {
    fn name(&self) -> &'static str {
        "factory_method"
    }

    fn can_handle(&self, descriptor: &TypeDescriptor) -> bool {
        *descriptor.name() == self.bound
    }

    fn produce(
        &self,
        source: &ObjectRef,
        driver: &CloneDriver,
        _cx: &mut CloneCx,
    ) -> Result<Value, CloneError> {
        let produced = (self.func)(&Value::Object(source.clone()))
            .map_err(|e| CloneError::from_user(&self.bound, e))?;
        check_produced_type(driver.registry(), &self.bound, &produced)?;
        Ok(produced)
    }
}

/// Sentinel for "declares no clone capability"
///
/// Invoking `produce` is a defect in the calling driver: it fails with
/// `CloneError::Unsupported` unconditionally, never a silent no-op.
#[derive(Debug, Clone)]
pub struct NoCloneImplementor {
    bound: Arc<str>,
}

impl NoCloneImplementor {
    /// Create the sentinel for a type
    #[inline]
    #[must_use]
    pub fn new(bound: Arc<str>) -> Self {
        Self { bound }
    }
}

impl CloneImplementor for NoCloneImplementor {
    fn name(&self) -> &'static str {
        "no_clone"
    }

    fn can_handle(&self, _descriptor: &TypeDescriptor) -> bool {
        false
    }

    fn produce(
        &self,
        _source: &ObjectRef,
        _driver: &CloneDriver,
        _cx: &mut CloneCx,
    ) -> Result<Value, CloneError> {
        Err(CloneError::Unsupported(self.bound.clone()))
    }
}

/// Result check shared by the user-routine strategies: the produced value
/// must be an object assignable to the bound type.
fn check_produced_type(
    registry: &TypeRegistry,
    bound: &Arc<str>,
    produced: &Value,
) -> Result<(), CloneError> {
    let ok = produced
        .as_object()
        .is_some_and(|obj| registry.is_assignable_from(bound, &obj.type_name()));
    if ok {
        Ok(())
    } else {
        Err(CloneError::Implementor {
            type_name: bound.clone(),
            source: format!("produced a value not assignable to `{bound}`").into(),
        })
    }
}
