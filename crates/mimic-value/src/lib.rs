//! Mimic Value Model
//!
//! Dynamic values forming shareable, possibly cyclic object graphs.
//!
//! # Core Concepts
//!
//! - [`Value`]: enum over scalar immutables, enum values, and shared
//!   mutable [`ArrayRef`]/[`ObjectRef`] graph nodes
//! - [`Identity`]: reference identity of a graph node (pointer-derived,
//!   distinct from structural equality)
//! - [`ValueKind`]: discriminant used as a classification key
//!
//! # Example
//!
//! ```rust,ignore
//! use mimic_value::{ObjectRef, Value};
//!
//! let node = ObjectRef::new("app.Person".into(), vec![Value::Null; 2]);
//! let a = Value::Object(node.clone());
//! let b = Value::Object(node);
//!
//! // Same storage location, same identity
//! assert!(a.same_ref(&b));
//! ```

#![warn(unreachable_pub)]

mod node;
mod value;

pub use node::{ArrayRef, Identity, Instance, ObjectRef};
pub use value::{EnumValue, Value, ValueKind};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
