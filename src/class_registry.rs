//! Class descriptors and the registry mapping type names to them.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::config::Configuration;
use crate::error::TransformError;
use crate::record::{Node, Record};
use crate::transform_registry::TransformFn;

/// A method provided by a class shape.
pub type Method = Arc<dyn Fn(&Record, &[Node]) -> Result<Node, TransformError> + Send + Sync>;

/// A registered unit of behavior.
///
/// Descriptors are built once and shared behind an `Arc`; nothing mutates
/// them after registration.
///
/// # Example
///
/// ```
/// use autocast::{ClassDescriptor, Node, TransformError};
///
/// let person = ClassDescriptor::new("Person")
///     .with_method("shout", |record, _args| {
///         let name = record
///             .get("name")
///             .and_then(Node::as_str)
///             .ok_or_else(|| TransformError::InvalidArgs("missing 'name'".to_string()))?;
///         Ok(Node::from(name.to_uppercase()))
///     })
///     .with_transform("name", |value: &Node| Ok(value.clone()));
///
/// assert_eq!(person.name(), "Person");
/// assert!(person.has_method("shout"));
/// ```
pub struct ClassDescriptor {
    name: String,
    registered_name: Option<String>,
    methods: IndexMap<String, Method>,
    transforms: Vec<(String, Arc<dyn TransformFn>)>,
}

impl ClassDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registered_name: None,
            methods: IndexMap::new(),
            transforms: Vec::new(),
        }
    }

    /// Register under `name` instead of the declared name.
    pub fn registered_as(mut self, name: impl Into<String>) -> Self {
        self.registered_name = Some(name.into());
        self
    }

    pub fn with_method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&Record, &[Node]) -> Result<Node, TransformError> + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Arc::new(method));
        self
    }

    /// Declare a field transform, registered together with the class.
    pub fn with_transform<F>(mut self, field: impl Into<String>, transform: F) -> Self
    where
        F: Fn(&Node) -> Result<Node, TransformError> + Send + Sync + 'static,
    {
        let transform: Arc<dyn TransformFn> = Arc::new(transform);
        self.transforms.push((field.into(), transform));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registered_name(&self) -> Option<&str> {
        self.registered_name.as_deref()
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn method_names(&self) -> impl Iterator<Item = &String> {
        self.methods.keys()
    }

    pub fn transforms(&self) -> &[(String, Arc<dyn TransformFn>)] {
        &self.transforms
    }
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("name", &self.name)
            .field("registered_name", &self.registered_name)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field(
                "transforms",
                &self.transforms.iter().map(|(field, _)| field).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Registry mapping type names to class descriptors.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: IndexMap<String, Arc<ClassDescriptor>>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `descriptor` under the type name computed by `config.get_class_type`.
    ///
    /// A second registration under the same name replaces the first.
    pub fn register(&mut self, descriptor: Arc<ClassDescriptor>, config: &Configuration) -> String {
        let type_name = (config.get_class_type)(&descriptor);

        if let Some(previous) = self.classes.insert(type_name.clone(), descriptor) {
            tracing::debug!(
                "Replaced class '{}' registered as '{}'",
                previous.name(),
                type_name
            );
        }

        type_name
    }

    pub fn lookup(&self, type_name: &str) -> Option<&Arc<ClassDescriptor>> {
        self.classes.get(type_name)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.classes.contains_key(type_name)
    }

    pub fn count(&self) -> usize {
        self.classes.len()
    }

    /// Registered type names, in first-registration order.
    pub fn type_names(&self) -> Vec<&String> {
        self.classes.keys().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_uses_declared_name() {
        let mut registry = ClassRegistry::new();
        let config = Configuration::default();

        let name = registry.register(Arc::new(ClassDescriptor::new("TestRegisterClass")), &config);

        assert_eq!(name, "TestRegisterClass");
        assert_eq!(
            registry.lookup("TestRegisterClass").map(|c| c.name()),
            Some("TestRegisterClass")
        );
        assert!(registry.lookup("Missing").is_none());
    }

    #[test]
    fn test_register_prefers_registered_name() {
        let mut registry = ClassRegistry::new();
        let config = Configuration::default();

        let name = registry.register(
            Arc::new(ClassDescriptor::new("PersonImpl").registered_as("Person")),
            &config,
        );

        assert_eq!(name, "Person");
        assert!(registry.contains("Person"));
        assert!(!registry.contains("PersonImpl"));
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = ClassRegistry::new();
        let config = Configuration::default();

        registry.register(Arc::new(ClassDescriptor::new("A").registered_as("Shared")), &config);
        registry.register(Arc::new(ClassDescriptor::new("B").registered_as("Shared")), &config);

        assert_eq!(registry.count(), 1);
        assert_eq!(registry.lookup("Shared").map(|c| c.name()), Some("B"));
    }

    #[test]
    fn test_custom_class_type_strategy() {
        let mut registry = ClassRegistry::new();
        let mut config = Configuration::default();
        config.get_class_type = Arc::new(|class: &ClassDescriptor| format!("app.{}", class.name()));

        registry.register(Arc::new(ClassDescriptor::new("Order")), &config);

        assert!(registry.contains("app.Order"));
        assert_eq!(registry.type_names(), vec!["app.Order"]);
    }

    #[test]
    fn test_type_names_in_registration_order() {
        let mut registry = ClassRegistry::new();
        let config = Configuration::new();

        for name in ["Zebra", "Apple", "Mango"] {
            registry.register(Arc::new(ClassDescriptor::new(name)), &config);
        }
        registry.register(Arc::new(ClassDescriptor::new("Apple")), &config);

        assert_eq!(registry.type_names(), vec!["Zebra", "Apple", "Mango"]);
    }

    #[test]
    fn test_method_names_in_declaration_order() {
        let class = ClassDescriptor::new("Greeter")
            .with_method("wave", |_, _| Ok(Node::Null))
            .with_method("greet", |_, _| Ok(Node::Null));

        let names: Vec<&String> = class.method_names().collect();
        assert_eq!(names, vec!["wave", "greet"]);
    }
}
