//! Casting policy: the default tag key and the pluggable strategy functions.
//!
//! [`Configuration`] is owned by a [`TypeCaster`](crate::TypeCaster); every
//! field is public and can be reassigned independently. [`CastOptions`]
//! overrides the per-record hooks and the tag key for a single cast.

use std::fmt;
use std::sync::Arc;

use crate::class_registry::ClassDescriptor;
use crate::error::{HookError, TransformError};
use crate::record::{Node, Record};
use crate::transform_registry::TransformFn;

/// Default name of the tag field.
pub const DEFAULT_TYPE_KEY: &str = "__type";

/// Resolves a record's type name given the effective tag key.
pub type ObjectTypeFn = Arc<dyn Fn(&Record, &str) -> Option<String> + Send + Sync>;

/// Computes the name a descriptor is registered under.
pub type ClassTypeFn = Arc<dyn Fn(&ClassDescriptor) -> String + Send + Sync>;

/// Hook run immediately before or after a record's shape is upgraded.
pub type HookFn = Arc<dyn Fn(&mut Record) -> Result<(), HookError> + Send + Sync>;

/// Receives transform failures. The field keeps its original value.
pub type TransformErrorFn = Arc<dyn Fn(&TransformFailure<'_>) + Send + Sync>;

/// Everything known about a failed field transform.
pub struct TransformFailure<'a> {
    pub error: &'a TransformError,
    pub field: &'a str,
    pub value: &'a Node,
    pub transform: &'a Arc<dyn TransformFn>,
    pub type_name: &'a str,
}

impl fmt::Debug for TransformFailure<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformFailure")
            .field("error", self.error)
            .field("field", &self.field)
            .field("value", self.value)
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Reads the tag field as a string; any other tag value resolves to nothing.
pub fn read_type_tag(record: &Record, type_key: &str) -> Option<String> {
    record
        .get(type_key)
        .and_then(Node::as_str)
        .map(str::to_string)
}

/// Registered name if one was given, else the declared name.
pub fn class_type_name(class: &ClassDescriptor) -> String {
    class.registered_name().unwrap_or(class.name()).to_string()
}

/// Default before/after hook.
pub fn no_op_hook(_record: &mut Record) -> Result<(), HookError> {
    Ok(())
}

/// Logs the failure and moves on.
pub fn warn_on_transform_error(failure: &TransformFailure<'_>) {
    tracing::warn!(
        "Transform failed for {}.{}: {}; falling back to original value: {:?}",
        failure.type_name,
        failure.field,
        failure.error,
        failure.value
    );
}

/// Process policy consulted by the caster at the moment each record is visited.
#[derive(Clone)]
pub struct Configuration {
    pub type_key: String,
    pub get_object_type: ObjectTypeFn,
    pub get_class_type: ClassTypeFn,
    pub before_type_cast: HookFn,
    pub after_type_cast: HookFn,
    pub on_transform_error: TransformErrorFn,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            type_key: DEFAULT_TYPE_KEY.to_string(),
            get_object_type: Arc::new(read_type_tag),
            get_class_type: Arc::new(class_type_name),
            before_type_cast: Arc::new(no_op_hook),
            after_type_cast: Arc::new(no_op_hook),
            on_transform_error: Arc::new(warn_on_transform_error),
        }
    }
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore every field to its default.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("type_key", &self.type_key)
            .finish_non_exhaustive()
    }
}

/// Per-call overrides. Each one that is set replaces the configuration's
/// counterpart for the whole call tree.
#[derive(Clone, Default)]
pub struct CastOptions {
    pub type_key: Option<String>,
    pub before_type_cast: Option<HookFn>,
    pub after_type_cast: Option<HookFn>,
    pub on_transform_error: Option<TransformErrorFn>,
}

impl CastOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type_key(mut self, type_key: impl Into<String>) -> Self {
        self.type_key = Some(type_key.into());
        self
    }

    pub fn with_before_type_cast<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Record) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.before_type_cast = Some(Arc::new(hook));
        self
    }

    pub fn with_after_type_cast<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Record) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.after_type_cast = Some(Arc::new(hook));
        self
    }

    pub fn with_on_transform_error<F>(mut self, handler: F) -> Self
    where
        F: Fn(&TransformFailure<'_>) + Send + Sync + 'static,
    {
        self.on_transform_error = Some(Arc::new(handler));
        self
    }
}

impl fmt::Debug for CastOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CastOptions")
            .field("type_key", &self.type_key)
            .field("before_type_cast", &self.before_type_cast.is_some())
            .field("after_type_cast", &self.after_type_cast.is_some())
            .field("on_transform_error", &self.on_transform_error.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Configuration::default();
        assert_eq!(config.type_key, "__type");

        let record = Record::new().with_field("__type", "TestA").with_field("kind", "TestB");
        assert_eq!((config.get_object_type)(&record, "__type").as_deref(), Some("TestA"));
        assert_eq!((config.get_object_type)(&record, "kind").as_deref(), Some("TestB"));
        assert_eq!((config.get_object_type)(&record, "missing"), None);
    }

    #[test]
    fn test_non_string_tag_is_untagged() {
        let record = Record::new().with_field("__type", 7i64);
        assert_eq!(read_type_tag(&record, "__type"), None);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut config = Configuration::default();
        config.type_key = "typeName".to_string();
        config.before_type_cast =
            Arc::new(|_: &mut Record| -> Result<(), HookError> { Err("nope".into()) });

        config.reset();

        assert_eq!(config.type_key, DEFAULT_TYPE_KEY);
        assert!((config.before_type_cast)(&mut Record::new()).is_ok());
    }

    #[test]
    fn test_options_builder() {
        let options = CastOptions::new()
            .with_type_key("typeName")
            .with_after_type_cast(|_| Ok(()));

        assert_eq!(options.type_key.as_deref(), Some("typeName"));
        assert!(options.after_type_cast.is_some());
        assert!(options.before_type_cast.is_none());
        assert!(options.on_transform_error.is_none());
    }
}
