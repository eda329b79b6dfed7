//! Declarative type schema.
//!
//! Declares classes and their field transforms in YAML instead of code:
//!
//! ```yaml
//! types:
//!   - name: Person
//!     transforms:
//!       name: uppercase
//!       birth_date: iso_date
//!   - name: FoodImpl
//!     registered_name: Food
//!     transforms:
//!       category: lowercase
//! ```
//!
//! Transform names refer to [`builtins`](crate::builtins).

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::builtins;
use crate::caster::TypeCaster;
use crate::class_registry::ClassDescriptor;
use crate::error::{Error, Result};

/// One declared type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDef {
    pub name: String,

    #[serde(default)]
    pub registered_name: Option<String>,

    /// field -> builtin transform name
    #[serde(default)]
    pub transforms: IndexMap<String, String>,
}

/// A set of declared types.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaConfig {
    #[serde(default)]
    pub types: Vec<TypeDef>,
}

impl SchemaConfig {
    /// Load and validate a schema from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let schema: SchemaConfig = serde_yaml::from_str(yaml)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Every type needs a name and every transform must be a known builtin.
    pub fn validate(&self) -> Result<()> {
        for def in &self.types {
            if def.name.trim().is_empty() {
                return Err(Error::Schema("type with empty name".to_string()));
            }
            for (field, transform) in &def.transforms {
                if builtins::lookup(transform).is_none() {
                    return Err(Error::Schema(format!(
                        "unknown transform '{}' for {}.{} (available: {})",
                        transform,
                        def.name,
                        field,
                        builtins::names().collect::<Vec<_>>().join(", ")
                    )));
                }
            }
        }
        Ok(())
    }

    /// Register every declared type with `caster`, in declaration order.
    ///
    /// Returns the type names the classes were stored under.
    pub fn register_into(&self, caster: &mut TypeCaster) -> Result<Vec<String>> {
        self.validate()?;

        let mut registered = Vec::with_capacity(self.types.len());
        for def in &self.types {
            let mut descriptor = ClassDescriptor::new(def.name.as_str());
            if let Some(name) = &def.registered_name {
                descriptor = descriptor.registered_as(name.as_str());
            }
            for (field, transform) in &def.transforms {
                let func = builtins::lookup(transform)
                    .ok_or_else(|| Error::Schema(format!("unknown transform '{}'", transform)))?;
                descriptor = descriptor.with_transform(field.as_str(), func);
            }

            let type_name = caster.register_class(descriptor);
            tracing::debug!("Registered type '{}' from schema", type_name);
            registered.push(type_name);
        }

        Ok(registered)
    }
}
