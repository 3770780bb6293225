//! Node descriptors and the specs they are made of.
//!
//! A node is described by its inputs (wired sockets), controls (editor widgets
//! with defaults) and outputs. Descriptors are produced by
//! [`NodeBuilder`](super::NodeBuilder) and owned by the
//! [`Registry`](super::Registry).

use crate::error::{Result, VidixyError};
use rhai::{Dynamic, AST};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Default category for nodes registered without one.
pub const DEFAULT_CATEGORY: &str = "General";

/// A wired input of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSpec {
    pub name: String,
    pub socket: String,
    #[serde(default)]
    pub description: String,
}

/// A user-editable, non-wired parameter of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlSpec {
    pub name: String,
    /// Editor hint taken from the declared parameter type
    #[serde(rename = "type")]
    pub control_type: String,
    #[serde(default)]
    pub default: serde_json::Value,
    #[serde(default)]
    pub description: String,
}

/// A wired output of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSpec {
    pub name: String,
    pub socket: String,
    #[serde(default)]
    pub description: String,
}

/// One entry of a function's explicit parameter schema.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParamType {
    pub name: Option<String>,
    pub type_name: Option<String>,
}

impl ParamType {
    pub fn typed(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            type_name: Some(type_name.into()),
        }
    }

    /// A parameter without a type annotation
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            type_name: None,
        }
    }

    /// An anonymous parameter of the given type
    pub fn of(type_name: impl Into<String>) -> Self {
        Self {
            name: None,
            type_name: Some(type_name.into()),
        }
    }
}

/// Signature of a native node implementation.
pub type NativeFn = dyn Fn(&[Dynamic]) -> Result<Dynamic> + Send + Sync;

/// Where a node function's body lives.
#[derive(Clone)]
pub enum FunctionBody {
    /// A Rust closure
    Native(Arc<NativeFn>),
    /// A function defined in a node-definition script
    Script(Arc<AST>),
}

/// Handle to the callable behind a node.
///
/// Cloning is cheap: the body is reference counted.
#[derive(Clone)]
pub struct NodeFunction {
    ident: String,
    params: Vec<ParamType>,
    body: FunctionBody,
}

impl NodeFunction {
    /// Wrap a Rust closure with an explicit parameter schema
    pub fn native<F>(ident: impl Into<String>, params: Vec<ParamType>, f: F) -> Self
    where
        F: Fn(&[Dynamic]) -> Result<Dynamic> + Send + Sync + 'static,
    {
        Self {
            ident: ident.into(),
            params,
            body: FunctionBody::Native(Arc::new(f)),
        }
    }

    /// Refer to the script function `ident` defined in `ast`
    pub fn script(ident: impl Into<String>, params: Vec<ParamType>, ast: Arc<AST>) -> Self {
        Self {
            ident: ident.into(),
            params,
            body: FunctionBody::Script(ast),
        }
    }

    pub fn ident(&self) -> &str {
        &self.ident
    }

    pub fn params(&self) -> &[ParamType] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn body(&self) -> &FunctionBody {
        &self.body
    }

    pub fn is_native(&self) -> bool {
        matches!(self.body, FunctionBody::Native(_))
    }

    /// Call a native body directly.
    ///
    /// Script bodies need an engine; use
    /// [`ScriptHost::call`](crate::scripting::ScriptHost::call) for those.
    pub fn call_native(&self, args: &[Dynamic]) -> Result<Dynamic> {
        match &self.body {
            FunctionBody::Native(f) => f(args),
            FunctionBody::Script(_) => Err(VidixyError::Script(format!(
                "'{}' is a script function and needs a script host to run",
                self.ident
            ))),
        }
    }

    /// Whether two handles share the same body
    pub fn same_body(&self, other: &NodeFunction) -> bool {
        match (&self.body, &other.body) {
            (FunctionBody::Native(a), FunctionBody::Native(b)) => Arc::ptr_eq(a, b),
            (FunctionBody::Script(a), FunctionBody::Script(b)) => {
                Arc::ptr_eq(a, b) && self.ident == other.ident
            }
            _ => false,
        }
    }
}

impl fmt::Debug for NodeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.body {
            FunctionBody::Native(_) => "native",
            FunctionBody::Script(_) => "script",
        };
        f.debug_struct("NodeFunction")
            .field("ident", &self.ident)
            .field("params", &self.params)
            .field("kind", &kind)
            .finish()
    }
}

/// A finalized node, owned by the registry.
#[derive(Debug, Clone)]
pub struct NodeDescriptor {
    pub name: String,
    pub description: String,
    pub category: String,
    pub function: NodeFunction,
    /// Dotted module path of the file that registered this node
    pub module: Option<String>,
    pub inputs: Vec<InputSpec>,
    pub controls: Vec<ControlSpec>,
    pub outputs: Vec<OutputSpec>,
}

impl NodeDescriptor {
    /// Every socket referenced by an input or output, in declaration order
    pub fn sockets(&self) -> impl Iterator<Item = &str> {
        self.inputs
            .iter()
            .map(|i| i.socket.as_str())
            .chain(self.outputs.iter().map(|o| o.socket.as_str()))
    }

    pub fn summary(&self) -> NodeSummary {
        NodeSummary {
            name: self.name.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            function: self.function.ident().to_string(),
            module: self.module.clone(),
            inputs: self.inputs.clone(),
            controls: self.controls.clone(),
            outputs: self.outputs.clone(),
        }
    }
}

/// Serializable view of a node, without its function body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSummary {
    pub name: String,
    pub description: String,
    pub category: String,
    pub function: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    pub inputs: Vec<InputSpec>,
    pub controls: Vec<ControlSpec>,
    pub outputs: Vec<OutputSpec>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_call() {
        let double = NodeFunction::native("double", vec![ParamType::typed("x", "int")], |args| {
            let x = args[0].as_int().map_err(|t| VidixyError::Script(t.to_string()))?;
            Ok(Dynamic::from(x * 2))
        });

        assert!(double.is_native());
        assert_eq!(double.arity(), 1);
        let out = double.call_native(&[Dynamic::from(21_i64)]).unwrap();
        assert_eq!(out.as_int().unwrap(), 42);
    }

    #[test]
    fn test_script_body_needs_host() {
        let ast = Arc::new(rhai::Engine::new().compile("fn f() { 1 }").unwrap());
        let f = NodeFunction::script("f", Vec::new(), ast);
        assert!(f.call_native(&[]).is_err());
    }

    #[test]
    fn test_control_serializes_type_field() {
        let control = ControlSpec {
            name: "Number".to_string(),
            control_type: "int".to_string(),
            default: serde_json::json!(1),
            description: String::new(),
        };
        let json = serde_json::to_value(&control).unwrap();
        assert_eq!(json["type"], "int");
        assert_eq!(json["default"], 1);
    }
}
