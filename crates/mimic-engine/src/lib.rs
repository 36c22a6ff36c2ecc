//! Mimic Clone Engine
//!
//! Cycle-safe deep cloning for dynamic object graphs with pluggable
//! per-type copy strategies.
//!
//! # Core Concepts
//!
//! - [`CloneDriver`]: the orchestrator and sole entry point
//!   ([`CloneDriver::clone_value`])
//! - [`TypeClassifier`]: scalar-immutable / structurally-cloneable /
//!   policy-excluded decision per type, memoized
//! - [`IdentityTracker`]: per-call identity map making shared nodes stay
//!   shared and cycles terminate
//! - [`CloneImplementor`]: strategy trait with structural, copy-
//!   constructor, factory-method, and no-clone variants
//! - [`MutabilityProbe`]: optional, fail-open immutability analysis
//!
//! # Example
//!
//! ```rust,ignore
//! use mimic_engine::CloneDriver;
//! use mimic_registry::{TypeRegistry, TypeSpec, FieldSpec};
//! use mimic_value::Value;
//!
//! let registry = Arc::new(TypeRegistry::new());
//! registry.register(TypeSpec::new("app.Node").field(FieldSpec::new("next")))?;
//!
//! let driver = CloneDriver::new(registry);
//! let clone = driver.clone_value(&root)?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod classify;
mod driver;
mod error;
mod implementor;
mod tracker;

pub use classify::{
    Classification, MutabilityProbe, ScalarFieldsProbe, TypeClassifier, TypeProfile,
};
pub use driver::{CloneConfig, CloneCx, CloneDriver, DEFAULT_MAX_DEPTH};
pub use error::CloneError;
pub use implementor::{
    CloneImplementor, CopyConstructorImplementor, FactoryMethodImplementor, FactorySignature,
    NoCloneImplementor, StructuralFieldCopyImplementor, UserCloneFn,
};
pub use tracker::IdentityTracker;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
