use crate::config::{ConfigurationTree, ModuleNode, MODULES_KEY, TYPE_KEY};
use crate::modules::{ModuleError, ModuleRef, ModuleRegistry};
use serde_json::Value;

/// Turns module nodes of a configuration tree into module trees.
///
/// Every node of a subtree is checked for shape and a registered `type` before
/// any module in it is constructed, so an unknown name anywhere builds nothing.
/// Children are then constructed before their parent and keep their declaration
/// order. The first failure aborts resolution and carries the path of the
/// failing node, e.g. `modules[0].modules[2]`.
#[derive(Debug, Clone, Copy)]
pub struct ModuleResolver<'r> {
    registry: &'r ModuleRegistry,
}

impl<'r> ModuleResolver<'r> {
    /// Create a resolver over a registry
    pub fn new(registry: &'r ModuleRegistry) -> Self {
        Self { registry }
    }

    /// Resolve the top-level `modules` section of a tree.
    ///
    /// A tree without that section yields an empty forest.
    pub fn resolve_tree(&self, tree: &ConfigurationTree) -> Result<Vec<ModuleRef>, ModuleError> {
        let nodes = tree
            .modules()
            .map_err(|source| ModuleError::binding(MODULES_KEY, MODULES_KEY, source))?;

        let modules = self.resolve_nodes(nodes, "")?;
        tracing::debug!(
            "Resolved {} top-level modules from the {}",
            modules.len(),
            tree.source()
        );
        Ok(modules)
    }

    /// Resolve a list of module nodes in order
    pub fn resolve_nodes(&self, nodes: &[Value], parent_path: &str) -> Result<Vec<ModuleRef>, ModuleError> {
        self.check_nodes(nodes, parent_path)?;
        self.construct_nodes(nodes, parent_path)
    }

    /// Resolve one module node and its subtree
    pub fn resolve_node(&self, node: &Value, path: &str) -> Result<ModuleRef, ModuleError> {
        self.check_node(node, path)?;
        self.construct_node(node, path)
    }

    fn check_nodes(&self, nodes: &[Value], parent_path: &str) -> Result<(), ModuleError> {
        nodes
            .iter()
            .enumerate()
            .try_for_each(|(index, node)| self.check_node(node, &child_path(parent_path, index)))
    }

    // Pre-order, so the outermost unknown name is the one reported.
    fn check_node(&self, node: &Value, path: &str) -> Result<(), ModuleError> {
        let parsed = parse_node(node, path)?;
        self.registry.ensure_known(parsed.module_type, path)?;
        self.check_nodes(parsed.modules, path)
    }

    fn construct_nodes(&self, nodes: &[Value], parent_path: &str) -> Result<Vec<ModuleRef>, ModuleError> {
        nodes
            .iter()
            .enumerate()
            .map(|(index, node)| self.construct_node(node, &child_path(parent_path, index)))
            .collect()
    }

    fn construct_node(&self, node: &Value, path: &str) -> Result<ModuleRef, ModuleError> {
        let parsed = parse_node(node, path)?;
        let nested_modules = self.construct_nodes(parsed.modules, path)?;

        tracing::trace!("Resolving module '{}' at {}", parsed.module_type, path);
        self.registry
            .resolve_at(parsed.module_type, parsed.configuration, nested_modules, path)
    }
}

fn parse_node<'a>(node: &'a Value, path: &str) -> Result<ModuleNode<'a>, ModuleError> {
    ModuleNode::parse(node).map_err(|source| ModuleError::binding(node_label(node), path, source))
}

fn child_path(parent_path: &str, index: usize) -> String {
    if parent_path.is_empty() {
        format!("{}[{}]", MODULES_KEY, index)
    } else {
        format!("{}.{}[{}]", parent_path, MODULES_KEY, index)
    }
}

// Best effort name for a node that failed to parse.
fn node_label(node: &Value) -> String {
    node.get(TYPE_KEY)
        .and_then(Value::as_str)
        .filter(|name| !name.trim().is_empty())
        .unwrap_or("<unnamed>")
        .to_string()
}
