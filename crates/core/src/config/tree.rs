//! Hierarchical configuration consumed by the module resolver.
//!
//! The tree is an already parsed `serde_json::Value`. The module section has the
//! shape
//!
//! ```text
//! { "modules": [ { "type": "<name>", "configuration": { .. }, "modules": [ .. ] } ] }
//! ```

use crate::config::{ConfigError, ConfigSource};
use serde_json::Value;

/// Key holding the list of module nodes, at the root and inside each node
pub const MODULES_KEY: &str = "modules";
/// Key holding the registered module name inside a node
pub const TYPE_KEY: &str = "type";
/// Key holding the module settings inside a node
pub const CONFIGURATION_KEY: &str = "configuration";
/// Separator for nested section paths, e.g. `modules:0:type`
pub const KEY_DELIMITER: char = ':';

static NULL: Value = Value::Null;

/// An already parsed configuration tree
#[derive(Debug, Clone)]
pub struct ConfigurationTree {
    root: Value,
    source: ConfigSource,
}

impl ConfigurationTree {
    /// Wrap an already parsed value
    pub fn new(root: Value) -> Self {
        Self {
            root,
            source: ConfigSource::Programmatic,
        }
    }

    /// A tree without any sections
    pub fn empty() -> Self {
        Self {
            root: Value::Object(serde_json::Map::new()),
            source: ConfigSource::Empty,
        }
    }

    /// Parse a JSON document
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let root: Value = serde_json::from_str(text)?;
        Ok(Self {
            root,
            source: ConfigSource::Json,
        })
    }

    /// Parse a YAML document
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let root: Value = serde_yaml::from_str(text)?;
        Ok(Self {
            root,
            source: ConfigSource::Yaml,
        })
    }

    /// The root value
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Where this tree came from
    pub fn source(&self) -> &ConfigSource {
        &self.source
    }

    /// Look up a nested section by a `:` delimited path.
    ///
    /// Array elements are addressed by index, so `modules:0:type` reads the type
    /// of the first module node.
    pub fn section(&self, path: &str) -> Option<&Value> {
        path.split(KEY_DELIMITER)
            .filter(|key| !key.is_empty())
            .try_fold(&self.root, |current, key| match current {
                Value::Object(map) => map.get(key),
                Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            })
    }

    /// The top-level module nodes. An absent or `null` section is an empty list.
    pub fn modules(&self) -> Result<&[Value], ConfigError> {
        module_list(&self.root, MODULES_KEY)
    }
}

impl Default for ConfigurationTree {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Value> for ConfigurationTree {
    fn from(root: Value) -> Self {
        Self::new(root)
    }
}

/// Borrowed view of one module node
#[derive(Debug, Clone, Copy)]
pub struct ModuleNode<'a> {
    /// Registered module name
    pub module_type: &'a str,
    /// Settings section; `Value::Null` when omitted
    pub configuration: &'a Value,
    /// Child nodes in declaration order
    pub modules: &'a [Value],
}

impl<'a> ModuleNode<'a> {
    /// Read the node shape out of a value
    pub fn parse(value: &'a Value) -> Result<Self, ConfigError> {
        let object = value.as_object().ok_or_else(|| {
            ConfigError::invalid_value("module", value.to_string(), "an object with a 'type' key")
        })?;

        let module_type = match object.get(TYPE_KEY) {
            Some(Value::String(name)) if !name.trim().is_empty() => name.as_str(),
            Some(other) => {
                return Err(ConfigError::invalid_value(
                    TYPE_KEY,
                    other.to_string(),
                    "a non-empty module name",
                ))
            }
            None => {
                return Err(ConfigError::missing_required(
                    TYPE_KEY,
                    "Every module node must name a registered module",
                ))
            }
        };

        Ok(Self {
            module_type,
            configuration: object.get(CONFIGURATION_KEY).unwrap_or(&NULL),
            modules: module_list(value, MODULES_KEY)?,
        })
    }
}

fn module_list<'a>(value: &'a Value, key: &str) -> Result<&'a [Value], ConfigError> {
    match value.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(other) => Err(ConfigError::invalid_value(
            key,
            other.to_string(),
            "an array of module nodes",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_section_paths() {
        let tree = ConfigurationTree::new(json!({
            "modules": [
                { "type": "greeting", "configuration": { "message": "Hi" } }
            ]
        }));

        assert_eq!(tree.section("modules:0:type"), Some(&json!("greeting")));
        assert_eq!(
            tree.section("modules:0:configuration:message"),
            Some(&json!("Hi"))
        );
        assert_eq!(tree.section("modules:1:type"), None);
        assert_eq!(tree.section("modules:x"), None);
        assert_eq!(tree.section(""), Some(tree.root()));
    }

    #[test]
    fn test_modules_absent_or_null_is_empty() {
        assert!(ConfigurationTree::empty().modules().unwrap().is_empty());
        assert!(ConfigurationTree::new(json!({ "modules": null }))
            .modules()
            .unwrap()
            .is_empty());
        assert!(ConfigurationTree::new(json!({ "modules": "nope" }))
            .modules()
            .is_err());
    }

    #[test]
    fn test_parse_json_and_yaml() {
        let json = ConfigurationTree::from_json_str(r#"{"modules":[{"type":"a"}]}"#).unwrap();
        assert_eq!(json.source(), &ConfigSource::Json);
        assert_eq!(json.modules().unwrap().len(), 1);

        let yaml = ConfigurationTree::from_yaml_str(
            "modules:\n  - type: a\n    configuration:\n      retries: 3\n",
        )
        .unwrap();
        assert_eq!(yaml.source(), &ConfigSource::Yaml);
        assert_eq!(yaml.section("modules:0:configuration:retries"), Some(&json!(3)));

        assert!(ConfigurationTree::from_json_str("{ not json").is_err());
        assert!(ConfigurationTree::from_yaml_str("modules: [").is_err());
    }

    #[test]
    fn test_module_node_defaults() {
        let value = json!({ "type": "greeting" });
        let node = ModuleNode::parse(&value).unwrap();

        assert_eq!(node.module_type, "greeting");
        assert!(node.configuration.is_null());
        assert!(node.modules.is_empty());
    }

    #[test]
    fn test_module_node_rejects_bad_shapes() {
        assert!(matches!(
            ModuleNode::parse(&json!({ "configuration": {} })),
            Err(ConfigError::MissingRequired { .. })
        ));
        assert!(ModuleNode::parse(&json!({ "type": 5 })).is_err());
        assert!(ModuleNode::parse(&json!({ "type": "  " })).is_err());
        assert!(ModuleNode::parse(&json!(["greeting"])).is_err());
        assert!(ModuleNode::parse(&json!({ "type": "a", "modules": {} })).is_err());
    }
}
