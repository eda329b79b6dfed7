//! Untyped data nodes and the records the caster upgrades in place.
//!
//! A [`Node`] is the tagged union for data as it comes out of a parsed
//! interchange format. A [`Record`] is a string-keyed mapping that also carries
//! a [`Shape`]: either plain, or typed by a registered [`ClassDescriptor`].

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Number, Value as JsonValue};

use crate::class_registry::ClassDescriptor;
use crate::error::{Error, Result};

/// An untyped data value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Node {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Node>),
    Record(Record),
}

impl Node {
    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Node::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Node::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Node>> {
        match self {
            Node::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Node::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut Record> {
        match self {
            Node::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Every typed record in the tree with its path (`$`, `$.a[0].b`),
    /// in traversal order.
    pub fn typed_records(&self) -> Vec<(String, &Record)> {
        let mut found = Vec::new();
        collect_typed(self, "$".to_string(), &mut found);
        found
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "boolean",
            Node::Number(_) => "number",
            Node::String(_) => "string",
            Node::Array(_) => "array",
            Node::Record(_) => "record",
        }
    }
}

fn collect_typed<'a>(node: &'a Node, path: String, found: &mut Vec<(String, &'a Record)>) {
    match node {
        Node::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                collect_typed(item, format!("{}[{}]", path, index), found);
            }
        }
        Node::Record(record) => {
            for (key, value) in record.fields() {
                collect_typed(value, format!("{}.{}", path, key), found);
            }
            if !record.is_plain() {
                found.push((path, record));
            }
        }
        _ => {}
    }
}

impl From<JsonValue> for Node {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Node::Null,
            JsonValue::Bool(b) => Node::Bool(b),
            JsonValue::Number(n) => Node::Number(n),
            JsonValue::String(s) => Node::String(s),
            JsonValue::Array(items) => Node::Array(items.into_iter().map(Node::from).collect()),
            JsonValue::Object(map) => Node::Record(map.into_iter().collect()),
        }
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::String(value.to_string())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::String(value)
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Bool(value)
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Node::Number(value.into())
    }
}

/// Non-finite floats have no numeric representation and become `Null`.
impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(Node::Null, Node::Number)
    }
}

impl From<Vec<Node>> for Node {
    fn from(value: Vec<Node>) -> Self {
        Node::Array(value)
    }
}

impl From<Record> for Node {
    fn from(value: Record) -> Self {
        Node::Record(value)
    }
}

/// The behavior a record currently exposes.
#[derive(Debug, Clone, Default)]
pub enum Shape {
    #[default]
    Plain,
    Typed(Arc<ClassDescriptor>),
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Shape::Plain, Shape::Plain) => true,
            (Shape::Typed(a), Shape::Typed(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// A string-keyed record. Field iteration follows insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: IndexMap<String, Node>,
    shape: Shape,
}

impl Record {
    /// Create an empty plain record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty record that already carries `class`'s shape.
    ///
    /// The caster never re-processes such a record, whatever its tag says.
    pub fn instance_of(class: Arc<ClassDescriptor>) -> Self {
        Self {
            fields: IndexMap::new(),
            shape: Shape::Typed(class),
        }
    }

    /// Builder-style field insertion.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Node>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.fields.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.fields.get_mut(key)
    }

    /// Insert or replace a field; a new key goes to the end of the order.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Node>) -> Option<Node> {
        self.fields.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Node> {
        self.fields.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Node)> {
        self.fields.iter()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.fields.values_mut()
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn is_plain(&self) -> bool {
        matches!(self.shape, Shape::Plain)
    }

    pub(crate) fn set_shape(&mut self, shape: Shape) {
        self.shape = shape;
    }

    /// The descriptor attached to this record, if it has been cast.
    pub fn class(&self) -> Option<&Arc<ClassDescriptor>> {
        match &self.shape {
            Shape::Plain => None,
            Shape::Typed(class) => Some(class),
        }
    }

    /// Declared name of the attached descriptor.
    pub fn class_name(&self) -> Option<&str> {
        self.class().map(|class| class.name())
    }

    /// Whether the record's shape provides `method`.
    pub fn responds_to(&self, method: &str) -> bool {
        self.class().is_some_and(|class| class.has_method(method))
    }

    /// Invoke a method provided by the record's shape.
    ///
    /// # Errors
    /// * [`Error::NotTyped`] for plain records
    /// * [`Error::MethodNotFound`] if the shape lacks the method
    /// * [`Error::Method`] if the method itself fails
    pub fn call(&self, method: &str, args: &[Node]) -> Result<Node> {
        let class = self.class().ok_or_else(|| Error::NotTyped {
            method: method.to_string(),
        })?;

        let func = class.method(method).ok_or_else(|| Error::MethodNotFound {
            type_name: class.name().to_string(),
            method: method.to_string(),
        })?;

        func(self, args).map_err(|source| Error::Method {
            type_name: class.name().to_string(),
            method: method.to_string(),
            source,
        })
    }
}

impl<K: Into<String>> FromIterator<(K, JsonValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, JsonValue)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), Node::from(v)))
                .collect(),
            shape: Shape::Plain,
        }
    }
}
