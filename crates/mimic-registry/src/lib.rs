//! Mimic Type Registry
//!
//! Process-wide type metadata for the dynamic value model: descriptors,
//! flattened field access models, and shell instantiation.
//!
//! # Core Concepts
//!
//! - [`TypeSpec`]/[`FieldSpec`]: declarative registration input (serde-
//!   deserializable, the annotation replacement)
//! - [`TypeDescriptor`]: immutable per-type metadata with a single parent
//!   chain
//! - [`TypeRegistry`]: concurrent registry; registration validates specs
//!   up front
//! - [`FieldAccessModel`]: flattened, lexically ordered field slots per
//!   concrete type, memoized process-wide
//! - [`Instantiator`]: produces empty shells, raw path first, registered
//!   default constructor as fallback
//!
//! # Example
//!
//! ```rust,ignore
//! use mimic_registry::{TypeRegistry, TypeSpec, FieldSpec};
//!
//! let registry = TypeRegistry::new();
//! registry.register(TypeSpec::new("app.Person").field(FieldSpec::new("name")))?;
//!
//! let model = registry.access_model("app.Person")?;
//! assert_eq!(model.slot_of("name"), Some(0));
//! ```

#![warn(unreachable_pub)]

mod access;
mod descriptor;
mod error;
mod instantiate;
mod registry;

pub use access::FieldAccessModel;
pub use descriptor::{FieldDescriptor, FieldSpec, FieldType, TypeDescriptor, TypeSpec};
pub use error::{AccessError, InstantiateError, RegistryError};
pub use instantiate::{raw_allocation_available, Instantiator};
pub use registry::{BoxError, DefaultConstructor, TypeRegistry};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
