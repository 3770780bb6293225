//! The node registry.
//!
//! One [`Registry`] is constructed at startup, filled by the loader and by
//! native registrations, and read by consumers afterwards. It is not
//! synchronized: registering from several threads at once is the caller's
//! problem, and `&mut self` on every mutating method keeps safe code honest.

use super::builder::{NodeBuilder, NodeOptions};
use super::spec::{NodeDescriptor, NodeFunction, NodeSummary};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Ordered node list plus the union of every socket they reference.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    nodes: Vec<NodeDescriptor>,
    sockets: BTreeSet<String>,
}

/// Serializable view of the registry handed to external consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub nodes: Vec<NodeSummary>,
    pub sockets: Vec<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bare function or a pending builder.
    ///
    /// Returns the original function so it stays callable on its own.
    pub fn register(
        &mut self,
        builder: impl Into<NodeBuilder>,
        options: NodeOptions,
    ) -> Result<NodeFunction> {
        self.register_in_module(builder, options, None)
    }

    /// Register on behalf of a loaded module.
    ///
    /// The descriptor is fully resolved before either collection is touched,
    /// so a failed registration leaves the registry unchanged.
    pub fn register_in_module(
        &mut self,
        builder: impl Into<NodeBuilder>,
        options: NodeOptions,
        module: Option<String>,
    ) -> Result<NodeFunction> {
        let node = builder.into().finish(options, module)?;
        let function = node.function.clone();

        if self.nodes.iter().any(|n| n.name == node.name) {
            tracing::warn!(
                "Node name '{}' is already registered; registering a duplicate (module: {:?})",
                node.name,
                node.module
            );
        }

        tracing::debug!(
            "Registered node '{}' ({} inputs, {} controls, {} outputs)",
            node.name,
            node.inputs.len(),
            node.controls.len(),
            node.outputs.len()
        );

        self.sockets.extend(node.sockets().map(str::to_string));
        self.nodes.push(node);

        Ok(function)
    }

    /// Nodes in registration order
    pub fn nodes(&self) -> &[NodeDescriptor] {
        &self.nodes
    }

    pub fn sockets(&self) -> &BTreeSet<String> {
        &self.sockets
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First node registered under `name`
    pub fn find(&self, name: &str) -> Option<&NodeDescriptor> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Nodes grouped by category, categories in order of first appearance
    pub fn by_category(&self) -> Vec<(&str, Vec<&NodeDescriptor>)> {
        let mut groups: Vec<(&str, Vec<&NodeDescriptor>)> = Vec::new();
        for node in &self.nodes {
            match groups.iter_mut().find(|(c, _)| *c == node.category) {
                Some((_, members)) => members.push(node),
                None => groups.push((node.category.as_str(), vec![node])),
            }
        }
        groups
    }

    /// Names registered more than once, in order of first appearance
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for node in &self.nodes {
            *counts.entry(node.name.as_str()).or_default() += 1;
        }

        let mut seen = BTreeSet::new();
        self.nodes
            .iter()
            .map(|n| n.name.as_str())
            .filter(|name| counts[name] > 1 && seen.insert(*name))
            .collect()
    }

    /// Drop every node and socket
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.sockets.clear();
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            nodes: self.nodes.iter().map(NodeDescriptor::summary).collect(),
            sockets: self.sockets.iter().cloned().collect(),
        }
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let snapshot = self.snapshot();
        let json = if pretty {
            serde_json::to_string_pretty(&snapshot)?
        } else {
            serde_json::to_string(&snapshot)?
        };
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VidixyError;
    use crate::node::spec::ParamType;
    use rhai::Dynamic;

    fn number_fn() -> NodeFunction {
        NodeFunction::native("number", vec![ParamType::typed("i", "int")], |args| {
            Ok(args[0].clone())
        })
    }

    fn add_fn() -> NodeFunction {
        NodeFunction::native(
            "add",
            vec![ParamType::typed("a", "int"), ParamType::typed("b", "int")],
            |args| {
                let a = args[0].as_int().map_err(|t| VidixyError::Script(t.to_string()))?;
                let b = args[1].as_int().map_err(|t| VidixyError::Script(t.to_string()))?;
                Ok(Dynamic::from(a + b))
            },
        )
    }

    #[test]
    fn test_register_bare_function() {
        let mut registry = Registry::new();
        let f = registry.register(number_fn(), NodeOptions::default()).unwrap();

        assert_eq!(f.ident(), "number");
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.nodes()[0].name, "Number");
        assert!(registry.nodes()[0].inputs.is_empty());
        assert!(registry.sockets().is_empty());
    }

    #[test]
    fn test_register_returns_original_function() {
        let mut registry = Registry::new();
        let original = add_fn();

        let mut builder = NodeBuilder::new(original.clone());
        builder.add_output("sum", "Number", "");
        builder.add_input("b", Some("Number"), "").unwrap();
        builder.add_input("a", Some("Number"), "").unwrap();

        let returned = registry.register(builder, NodeOptions::default()).unwrap();
        assert!(returned.same_body(&original));

        let sum = returned
            .call_native(&[Dynamic::from(2_i64), Dynamic::from(3_i64)])
            .unwrap();
        assert_eq!(sum.as_int().unwrap(), 5);
    }

    #[test]
    fn test_sockets_are_union() {
        let mut registry = Registry::new();

        let mut builder = NodeBuilder::new(add_fn());
        builder.add_output("sum", "Number", "");
        builder.add_input("b", None, "").unwrap();
        builder.add_input("a", Some("Number"), "").unwrap();
        registry.register(builder, NodeOptions::default()).unwrap();

        let mut builder = NodeBuilder::new(number_fn());
        builder.add_output("number", "Number", "");
        registry.register(builder, NodeOptions::default()).unwrap();

        let sockets: Vec<&str> = registry.sockets().iter().map(String::as_str).collect();
        assert_eq!(sockets, vec!["Number", "int"]);
    }

    #[test]
    fn test_failed_registration_leaves_registry_unchanged() {
        let mut registry = Registry::new();
        let f = NodeFunction::native("show", vec![ParamType::untyped("value")], |_| {
            Ok(Dynamic::UNIT)
        });
        let mut builder = NodeBuilder::new(f);
        builder.add_output("out", "Any", "");
        builder.add_input("value", None, "").unwrap();

        assert!(registry.register(builder, NodeOptions::default()).is_err());
        assert!(registry.is_empty());
        assert!(registry.sockets().is_empty());
    }

    #[test]
    fn test_duplicates_are_kept_and_reported() {
        let mut registry = Registry::new();
        registry.register(number_fn(), NodeOptions::default()).unwrap();
        registry.register(add_fn(), NodeOptions::default()).unwrap();
        registry.register(number_fn(), NodeOptions::default()).unwrap();

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.duplicate_names(), vec!["Number"]);
        assert_eq!(registry.find("Number").unwrap().function.ident(), "number");
    }

    #[test]
    fn test_by_category() {
        let mut registry = Registry::new();
        registry
            .register(number_fn(), NodeOptions::new().category("Inputs"))
            .unwrap();
        registry
            .register(add_fn(), NodeOptions::new().category("Math"))
            .unwrap();
        registry
            .register(number_fn(), NodeOptions::new().named("Other").category("Inputs"))
            .unwrap();

        let groups = registry.by_category();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "Inputs");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, "Math");
    }

    #[test]
    fn test_snapshot_json() {
        let mut registry = Registry::new();
        let mut builder = NodeBuilder::new(number_fn());
        builder.add_output("number", "Number", "");
        builder.add_control("Number", "", serde_json::json!(1)).unwrap();
        registry
            .register(builder, NodeOptions::new().description("A constant"))
            .unwrap();

        let json: serde_json::Value = serde_json::from_str(&registry.to_json(false).unwrap()).unwrap();
        assert_eq!(json["sockets"], serde_json::json!(["Number"]));
        assert_eq!(json["nodes"][0]["name"], "Number");
        assert_eq!(json["nodes"][0]["function"], "number");
        assert_eq!(json["nodes"][0]["controls"][0]["type"], "int");
        assert_eq!(json["nodes"][0]["controls"][0]["default"], 1);
        assert!(json["nodes"][0].get("module").is_none());
    }

    #[test]
    fn test_clear() {
        let mut registry = Registry::new();
        let mut builder = NodeBuilder::new(number_fn());
        builder.add_output("number", "Number", "");
        registry.register(builder, NodeOptions::default()).unwrap();

        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.sockets().is_empty());
    }
}
