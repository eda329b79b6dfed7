//! Transform registry for per-type, per-field value conversions.
//!
//! Transforms are keyed by type name, not by descriptor, so two descriptors
//! that compute the same type name share one set of field transforms.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::TransformError;
use crate::record::Node;

/// Trait for field transformation functions
///
/// A transform receives the current (non-null) field value and returns its
/// replacement. Returning `Err` leaves the field untouched.
pub trait TransformFn: Send + Sync {
    fn execute(&self, value: &Node) -> Result<Node, TransformError>;
}

/// Simple function-based implementation of TransformFn
impl<F> TransformFn for F
where
    F: Fn(&Node) -> Result<Node, TransformError> + Send + Sync,
{
    fn execute(&self, value: &Node) -> Result<Node, TransformError> {
        self(value)
    }
}

/// Field name -> transform, in registration order.
pub type TransformMap = IndexMap<String, Arc<dyn TransformFn>>;

/// Registry of field transforms grouped by type name
#[derive(Default)]
pub struct TransformRegistry {
    transforms: IndexMap<String, TransformMap>,
    empty: TransformMap,
}

impl fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.transforms
                    .iter()
                    .map(|(type_name, fields)| (type_name, fields.keys().collect::<Vec<_>>())),
            )
            .finish()
    }
}

impl TransformRegistry {
    /// Create a new empty transform registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transform for `type_name.field`, replacing any previous one.
    ///
    /// # Example
    ///
    /// ```
    /// use autocast::{Node, TransformError, TransformRegistry};
    ///
    /// let mut registry = TransformRegistry::new();
    /// registry.register("Person", "name", |value: &Node| {
    ///     let text = value
    ///         .as_str()
    ///         .ok_or_else(|| TransformError::InvalidArgs("expected a string".to_string()))?;
    ///     Ok(Node::from(text.to_uppercase()))
    /// });
    ///
    /// assert!(registry.get_transforms("Person").contains_key("name"));
    /// ```
    pub fn register<F>(&mut self, type_name: impl Into<String>, field: impl Into<String>, func: F)
    where
        F: Fn(&Node) -> Result<Node, TransformError> + Send + Sync + 'static,
    {
        self.register_shared(type_name, field, Arc::new(func));
    }

    /// Register an already shared transform.
    pub fn register_shared(
        &mut self,
        type_name: impl Into<String>,
        field: impl Into<String>,
        func: Arc<dyn TransformFn>,
    ) {
        self.transforms
            .entry(type_name.into())
            .or_default()
            .insert(field.into(), func);
    }

    /// Transforms registered for `type_name`; empty if there are none.
    pub fn get_transforms(&self, type_name: &str) -> &TransformMap {
        self.transforms.get(type_name).unwrap_or(&self.empty)
    }

    /// Check if any transform is registered for a type
    pub fn has_transforms(&self, type_name: &str) -> bool {
        self.transforms
            .get(type_name)
            .is_some_and(|fields| !fields.is_empty())
    }

    /// Type names with registered transforms, in first-registration order
    pub fn type_names(&self) -> Vec<String> {
        self.transforms.keys().cloned().collect()
    }

    /// Total number of (type, field) transforms.
    pub fn count(&self) -> usize {
        self.transforms.values().map(IndexMap::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uppercase(value: &Node) -> Result<Node, TransformError> {
        let text = value
            .as_str()
            .ok_or_else(|| TransformError::InvalidArgs("Missing 'text'".to_string()))?;
        Ok(Node::String(text.to_uppercase()))
    }

    #[test]
    fn test_register_and_call_transform() {
        let mut registry = TransformRegistry::new();

        registry.register("Person", "name", uppercase);

        let transform = registry.get_transforms("Person").get("name").unwrap();
        let result = transform.execute(&Node::from("hello")).unwrap();
        assert_eq!(result, Node::from("HELLO"));
    }

    #[test]
    fn test_missing_type_yields_empty_map() {
        let registry = TransformRegistry::new();

        assert!(registry.get_transforms("nonexistent").is_empty());
        assert!(!registry.has_transforms("nonexistent"));
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_reregistering_field_overwrites() {
        let mut registry = TransformRegistry::new();

        registry.register("Person", "name", uppercase);
        registry.register("Person", "name", |_value: &Node| Ok(Node::from("replaced")));

        let transforms = registry.get_transforms("Person");
        assert_eq!(transforms.len(), 1);
        let result = transforms["name"].execute(&Node::from("x")).unwrap();
        assert_eq!(result, Node::from("replaced"));
    }

    #[test]
    fn test_fields_keep_registration_order() {
        let mut registry = TransformRegistry::new();

        registry.register("User", "third", uppercase);
        registry.register("User", "first", uppercase);
        registry.register("User", "second", uppercase);

        let fields: Vec<&String> = registry.get_transforms("User").keys().collect();
        assert_eq!(fields, vec!["third", "first", "second"]);
        assert_eq!(registry.count(), 3);
        assert!(registry.has_transforms("User"));
    }

    #[test]
    fn test_type_names_in_registration_order() {
        let mut registry = TransformRegistry::new();

        registry.register("Zebra", "name", uppercase);
        registry.register("Apple", "name", uppercase);
        registry.register("Mango", "name", uppercase);
        registry.register("Zebra", "stripes", uppercase);

        assert_eq!(registry.type_names(), vec!["Zebra", "Apple", "Mango"]);
        assert_eq!(registry.count(), 4);
    }
}
