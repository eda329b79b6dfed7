//! # Autocast: Tag-Driven Type Casting for Untyped Data
//!
//! Autocast turns plain records (as produced by parsing JSON or a similar
//! format) into records carrying the behavior of registered classes. A tag
//! field inside each record names the class; nested records and sequences are
//! walked recursively, and per-field transforms convert values once a record
//! has been typed.
//!
//! ## Features
//!
//! - **Class registry**: descriptors with named methods, registered under a computed type name
//! - **Transform registry**: per-type, per-field conversion functions with isolated failures
//! - **Pluggable policy**: tag key, tag lookup, class naming, before/after hooks, error handler
//! - **Per-call overrides**: [`CastOptions`] beat the configuration for a single cast
//! - **Declarative schemas**: register types and builtin transforms from YAML
//!
//! ## Example
//!
//! ```
//! use autocast::{ClassDescriptor, Node, TransformError, TypeCaster};
//! use serde_json::json;
//!
//! let mut caster = TypeCaster::new();
//! caster.register_class(
//!     ClassDescriptor::new("BlogComment")
//!         .with_method("headline", |comment, _| {
//!             let author = comment.get("author").and_then(Node::as_str).unwrap_or("?");
//!             let title = comment.get("title").and_then(Node::as_str).unwrap_or("?");
//!             Ok(Node::from(format!("{} - {}", author, title)))
//!         })
//!         .with_transform("title", |value: &Node| {
//!             value
//!                 .as_str()
//!                 .map(|s| Node::from(s.trim()))
//!                 .ok_or_else(|| TransformError::InvalidArgs("title must be a string".into()))
//!         }),
//! );
//!
//! let mut posts = Node::from(json!([
//!     {"title": "Post 1", "comments": [
//!         {"__type": "BlogComment", "author": "Ann", "title": " Hello "}
//!     ]}
//! ]));
//! caster.cast(&mut posts).unwrap();
//!
//! let comment = &posts.as_array().unwrap()[0]
//!     .as_record().unwrap()
//!     .get("comments").and_then(Node::as_array).unwrap()[0];
//! let comment = comment.as_record().unwrap();
//! assert_eq!(comment.call("headline", &[]).unwrap(), Node::from("Ann - Hello"));
//! ```

pub mod builtins;
pub mod caster;
pub mod class_registry;
pub mod config;
pub mod error;
pub mod record;
pub mod schema;
pub mod settings;
pub mod transform_registry;

// Re-export key types
pub use caster::TypeCaster;
pub use class_registry::{ClassDescriptor, ClassRegistry, Method};
pub use config::{
    CastOptions, Configuration, HookFn, TransformErrorFn, TransformFailure, DEFAULT_TYPE_KEY,
};
pub use error::{Error, HookError, HookStage, Result, TransformError};
pub use record::{Node, Record, Shape};
pub use schema::{SchemaConfig, TypeDef};
pub use settings::CastSettings;
pub use transform_registry::{TransformFn, TransformMap, TransformRegistry};
