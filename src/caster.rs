//! The recursive caster.
//!
//! Walks a [`Node`] depth-first. Children of a plain record are cast before the
//! record itself is tagged; sequences are walked in index order. Records that
//! already carry a typed shape are never revisited, which makes re-casting an
//! already-cast tree a no-op for those records.

use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::class_registry::{ClassDescriptor, ClassRegistry};
use crate::config::{CastOptions, Configuration, TransformFailure};
use crate::error::{Error, HookStage, Result, TransformError};
use crate::record::{Node, Record, Shape};
use crate::transform_registry::TransformRegistry;

/// Owns the configuration and both registries, and performs casts.
///
/// # Example
///
/// ```
/// use autocast::{ClassDescriptor, Node, TypeCaster};
/// use serde_json::json;
///
/// let mut caster = TypeCaster::new();
/// caster.register_class(
///     ClassDescriptor::new("BlogPost")
///         .with_method("comment_count", |post, _| {
///             let count = post.get("comments").and_then(Node::as_array).map_or(0, Vec::len);
///             Ok(Node::from(count as i64))
///         }),
/// );
///
/// let mut data = Node::from(json!({"__type": "BlogPost", "comments": [{}, {}]}));
/// caster.cast(&mut data).unwrap();
///
/// let post = data.as_record().unwrap();
/// assert_eq!(post.call("comment_count", &[]).unwrap(), Node::from(2i64));
/// ```
#[derive(Debug, Default)]
pub struct TypeCaster {
    config: Configuration,
    classes: ClassRegistry,
    transforms: TransformRegistry,
}

impl TypeCaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Configuration) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Changes apply to every later cast.
    pub fn config_mut(&mut self) -> &mut Configuration {
        &mut self.config
    }

    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    pub fn transforms(&self) -> &TransformRegistry {
        &self.transforms
    }

    /// Register a class and the field transforms it declares.
    ///
    /// Returns the type name it was stored under.
    pub fn register_class(&mut self, descriptor: ClassDescriptor) -> String {
        self.register_shared_class(Arc::new(descriptor))
    }

    pub fn register_shared_class(&mut self, descriptor: Arc<ClassDescriptor>) -> String {
        let type_name = (self.config.get_class_type)(&descriptor);
        for (field, transform) in descriptor.transforms() {
            self.transforms
                .register_shared(type_name.as_str(), field.as_str(), Arc::clone(transform));
        }
        self.classes.register(descriptor, &self.config)
    }

    pub fn register_transform<F>(&mut self, type_name: &str, field: &str, func: F)
    where
        F: Fn(&Node) -> std::result::Result<Node, TransformError> + Send + Sync + 'static,
    {
        self.transforms.register(type_name, field, func);
    }

    /// Cast `node` in place using the configuration alone.
    pub fn cast(&self, node: &mut Node) -> Result<()> {
        self.cast_with(node, &CastOptions::default())
    }

    /// Cast `node` in place; `options` apply to every nested record.
    ///
    /// # Errors
    /// Only hook failures abort a cast. Transform failures go to the
    /// `on_transform_error` handler and the cast carries on.
    pub fn cast_with(&self, node: &mut Node, options: &CastOptions) -> Result<()> {
        match node {
            Node::Array(items) => {
                for item in items.iter_mut() {
                    self.cast_with(item, options)?;
                }
            }
            Node::Record(record) if record.is_plain() => self.cast_record(record, options)?,
            _ => {}
        }
        Ok(())
    }

    /// Convert parsed JSON and cast it.
    pub fn cast_json(&self, value: JsonValue, options: &CastOptions) -> Result<Node> {
        let mut node = Node::from(value);
        self.cast_with(&mut node, options)?;
        Ok(node)
    }

    fn cast_record(&self, record: &mut Record, options: &CastOptions) -> Result<()> {
        for value in record.values_mut() {
            self.cast_with(value, options)?;
        }

        let type_key = options
            .type_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .unwrap_or(&self.config.type_key);
        let Some(type_name) =
            (self.config.get_object_type)(record, type_key).filter(|name| !name.is_empty())
        else {
            return Ok(());
        };

        let Some(class) = self.classes.lookup(&type_name) else {
            tracing::trace!("No class registered for type '{}'", type_name);
            return Ok(());
        };

        let before = options
            .before_type_cast
            .as_ref()
            .unwrap_or(&self.config.before_type_cast);
        before(record).map_err(|e| Error::hook(HookStage::BeforeTypeCast, &type_name, e))?;

        record.set_shape(Shape::Typed(Arc::clone(class)));
        tracing::debug!("Cast record to '{}'", type_name);

        self.apply_transforms(record, &type_name, options);

        let after = options
            .after_type_cast
            .as_ref()
            .unwrap_or(&self.config.after_type_cast);
        after(record).map_err(|e| Error::hook(HookStage::AfterTypeCast, &type_name, e))
    }

    fn apply_transforms(&self, record: &mut Record, type_name: &str, options: &CastOptions) {
        for (field, transform) in self.transforms.get_transforms(type_name) {
            let Some(value) = record.get_mut(field) else {
                continue;
            };
            if value.is_null() {
                continue;
            }

            match transform.execute(value) {
                Ok(transformed) => *value = transformed,
                Err(error) => {
                    let handler = options
                        .on_transform_error
                        .as_ref()
                        .unwrap_or(&self.config.on_transform_error);
                    handler(&TransformFailure {
                        error: &error,
                        field,
                        value,
                        transform,
                        type_name,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    fn test_caster() -> TypeCaster {
        let mut caster = TypeCaster::new();
        caster.register_class(
            ClassDescriptor::new("TestA").with_method("testA", |_, _| Ok(Node::from("testA"))),
        );
        caster.register_class(
            ClassDescriptor::new("TestB").with_method("testB", |_, _| Ok(Node::from("testB"))),
        );
        caster
    }

    #[test]
    fn test_casts_tagged_record() {
        let caster = test_caster();
        let mut node = Node::from(json!({"arbitraryAttribute": "testA", "__type": "TestA"}));

        caster.cast(&mut node).unwrap();

        let record = node.as_record().unwrap();
        assert_eq!(record.class_name(), Some("TestA"));
        assert_eq!(record.call("testA", &[]).unwrap(), Node::from("testA"));
        assert_eq!(record.get("arbitraryAttribute"), Some(&Node::from("testA")));
    }

    #[test]
    fn test_scalars_pass_through() {
        let caster = test_caster();
        for value in [json!(null), json!(true), json!("test"), json!(1.2)] {
            let mut node = Node::from(value.clone());
            caster.cast(&mut node).unwrap();
            assert_eq!(node, Node::from(value));
        }
    }

    #[test]
    fn test_children_cast_before_parent_hook() {
        let caster = test_caster();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let options = CastOptions::new().with_before_type_cast(move |record| {
            let child_typed = record
                .get("b")
                .and_then(Node::as_record)
                .map(|child| !child.is_plain());
            log.lock().unwrap().push((record.is_plain(), child_typed));
            Ok(())
        });
        let mut node = Node::from(json!({
            "__type": "TestA",
            "b": {"__type": "TestB"}
        }));

        caster.cast_with(&mut node, &options).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![(true, None), (true, Some(true))]);
    }

    #[test]
    fn test_before_hook_failure_aborts_cast() {
        let caster = test_caster();
        let options = CastOptions::new().with_before_type_cast(|_| Err("refused".into()));
        let mut node = Node::from(json!([{"__type": "TestA"}, {"__type": "TestB"}]));

        let err = caster.cast_with(&mut node, &options).unwrap_err();

        assert!(matches!(
            err,
            Error::Hook { stage: HookStage::BeforeTypeCast, ref type_name, .. } if type_name == "TestA"
        ));
        let items = node.as_array().unwrap();
        assert!(items[0].as_record().unwrap().is_plain());
        assert!(items[1].as_record().unwrap().is_plain());
    }

    #[test]
    fn test_empty_option_type_key_falls_back_to_configuration() {
        let mut caster = test_caster();
        caster.config_mut().type_key = "kind".to_string();
        assert_eq!(caster.config().type_key, "kind");

        let node = caster
            .cast_json(
                json!({"kind": "TestA", "__type": "TestB"}),
                &CastOptions::new().with_type_key(""),
            )
            .unwrap();

        assert_eq!(node.as_record().unwrap().class_name(), Some("TestA"));
    }

    #[test]
    fn test_empty_tag_is_untagged() {
        let mut caster = test_caster();
        caster.register_class(ClassDescriptor::new(""));
        assert!(caster.classes().contains(""));

        let node = caster
            .cast_json(json!({"__type": ""}), &CastOptions::new())
            .unwrap();

        let record = node.as_record().unwrap();
        assert_eq!(record.shape(), &Shape::Plain);
        assert_eq!(record.class_name(), None);
    }

    #[test]
    fn test_shape_points_at_registered_descriptor() {
        let caster = test_caster();
        let mut node = Node::from(json!({"__type": "TestA", "scratch": 1}));

        caster.cast(&mut node).unwrap();

        let record = node.as_record_mut().unwrap();
        let test_a = caster.classes().lookup("TestA").unwrap();
        assert_eq!(record.shape(), &Shape::Typed(Arc::clone(test_a)));
        assert_eq!(record.remove("scratch"), Some(Node::from(1i64)));
        assert_eq!(record.remove("scratch"), None);
        assert_eq!(record.class_name(), Some("TestA"));
    }

    #[test]
    fn test_after_hook_failure_leaves_record_typed() {
        let caster = test_caster();
        let options = CastOptions::new().with_after_type_cast(|_| Err("late".into()));
        let mut node = Node::from(json!({"__type": "TestB"}));

        let err = caster.cast_with(&mut node, &options).unwrap_err();

        assert!(matches!(err, Error::Hook { stage: HookStage::AfterTypeCast, .. }));
        assert_eq!(node.as_record().unwrap().class_name(), Some("TestB"));
    }
}
