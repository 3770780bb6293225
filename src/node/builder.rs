//! Declaration builder.
//!
//! A [`NodeBuilder`] collects the declarations applied to one function before
//! it is registered. Every input or control declaration consumes one declared
//! parameter type, always the last one not yet consumed:
//!
//! ```text
//! fn add(a: int, b: int)
//!
//! .input("b")   consumes b
//! .input("a")   consumes a
//! .input("c")   ArityError
//! ```
//!
//! Outputs consume nothing. Socket inference for inputs and controls is
//! deferred until [`NodeBuilder::finish`], so a failing declaration never
//! leaves a half-built node behind.

use super::name::normalize_name;
use super::socket::{control_type, infer_socket};
use super::spec::{
    ControlSpec, InputSpec, NodeDescriptor, NodeFunction, OutputSpec, ParamType, DEFAULT_CATEGORY,
};
use crate::error::{Result, VidixyError};

#[derive(Debug, Clone)]
struct PendingInput {
    name: String,
    socket: Option<String>,
    param: ParamType,
    description: String,
}

#[derive(Debug, Clone)]
struct PendingControl {
    name: String,
    param: ParamType,
    default: serde_json::Value,
    description: String,
}

/// Options of the final node declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeOptions {
    /// Display name; derived from the function identifier when `None`
    pub name: Option<String>,
    pub description: String,
    pub category: String,
}

impl Default for NodeOptions {
    fn default() -> Self {
        Self {
            name: None,
            description: String::new(),
            category: DEFAULT_CATEGORY.to_string(),
        }
    }
}

impl NodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

/// Accumulates input, control and output declarations for one function.
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    function: NodeFunction,
    remaining: Vec<ParamType>,
    inputs: Vec<PendingInput>,
    controls: Vec<PendingControl>,
    outputs: Vec<OutputSpec>,
}

impl NodeBuilder {
    /// Start a builder with every declared parameter unconsumed
    pub fn new(function: NodeFunction) -> Self {
        let remaining = function.params().to_vec();
        Self {
            function,
            remaining,
            inputs: Vec::new(),
            controls: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn function(&self) -> &NodeFunction {
        &self.function
    }

    /// Number of declared parameters not yet consumed
    pub fn remaining_params(&self) -> usize {
        self.remaining.len()
    }

    /// Declare an input on the last unconsumed parameter
    pub fn add_input(
        &mut self,
        name: impl Into<String>,
        socket: Option<&str>,
        description: impl Into<String>,
    ) -> Result<&mut Self> {
        let param = self.consume()?;
        self.inputs.push(PendingInput {
            name: name.into(),
            socket: socket.map(str::to_string),
            param,
            description: description.into(),
        });
        Ok(self)
    }

    /// Declare a control on the last unconsumed parameter
    pub fn add_control(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        default: serde_json::Value,
    ) -> Result<&mut Self> {
        let param = self.consume()?;
        self.controls.push(PendingControl {
            name: name.into(),
            param,
            default,
            description: description.into(),
        });
        Ok(self)
    }

    /// Declare an output; outputs do not consume parameters
    pub fn add_output(
        &mut self,
        name: impl Into<String>,
        socket: impl Into<String>,
        description: impl Into<String>,
    ) -> &mut Self {
        self.outputs.push(OutputSpec {
            name: name.into(),
            socket: socket.into(),
            description: description.into(),
        });
        self
    }

    fn consume(&mut self) -> Result<ParamType> {
        self.remaining.pop().ok_or_else(|| VidixyError::Arity {
            function: self.function.ident().to_string(),
            declared: self.function.arity(),
        })
    }

    /// Resolve every socket and produce the immutable descriptor
    pub fn finish(self, options: NodeOptions, module: Option<String>) -> Result<NodeDescriptor> {
        let ident = self.function.ident();

        let inputs = self
            .inputs
            .into_iter()
            .map(|input| {
                let socket = infer_socket(ident, &input.name, input.socket.as_deref(), &input.param)?;
                Ok(InputSpec {
                    name: input.name,
                    socket,
                    description: input.description,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let controls = self
            .controls
            .into_iter()
            .map(|control| {
                let control_type = control_type(ident, &control.name, &control.param)?;
                Ok(ControlSpec {
                    name: control.name,
                    control_type,
                    default: control.default,
                    description: control.description,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let name = options.name.unwrap_or_else(|| normalize_name(ident));

        Ok(NodeDescriptor {
            name,
            description: options.description,
            category: options.category,
            function: self.function,
            module,
            inputs,
            controls,
            outputs: self.outputs,
        })
    }
}

impl From<NodeFunction> for NodeBuilder {
    fn from(function: NodeFunction) -> Self {
        NodeBuilder::new(function)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rhai::Dynamic;

    fn add_fn() -> NodeFunction {
        NodeFunction::native(
            "add",
            vec![ParamType::typed("a", "int"), ParamType::typed("b", "float")],
            |_| Ok(Dynamic::UNIT),
        )
    }

    #[test]
    fn test_consumes_from_the_end() {
        let mut builder = NodeBuilder::new(add_fn());
        builder.add_input("first", None, "").unwrap();
        builder.add_input("second", None, "").unwrap();

        let node = builder.finish(NodeOptions::default(), None).unwrap();
        assert_eq!(node.inputs[0].name, "first");
        assert_eq!(node.inputs[0].socket, "float");
        assert_eq!(node.inputs[1].socket, "int");
    }

    #[test]
    fn test_arity_error() {
        let mut builder = NodeBuilder::new(add_fn());
        builder
            .add_input("b", Some("Number"), "")
            .unwrap()
            .add_control("a", "", serde_json::Value::Null)
            .unwrap();
        assert_eq!(builder.remaining_params(), 0);

        let err = builder.add_input("c", None, "").unwrap_err();
        assert!(matches!(
            err,
            VidixyError::Arity { ref function, declared: 2 } if function == "add"
        ));
    }

    #[test]
    fn test_outputs_do_not_consume() {
        let mut builder = NodeBuilder::new(add_fn());
        builder.add_output("sum", "Number", "").add_output("carry", "Bool", "");
        assert_eq!(builder.remaining_params(), 2);
    }

    #[test]
    fn test_control_type_and_default() {
        let mut builder = NodeBuilder::new(add_fn());
        builder
            .add_control("Scale", "multiplier", serde_json::json!(1.5))
            .unwrap();

        let node = builder.finish(NodeOptions::default(), None).unwrap();
        let control = &node.controls[0];
        assert_eq!(control.control_type, "float");
        assert_eq!(control.default, serde_json::json!(1.5));
        assert_eq!(control.description, "multiplier");
    }

    #[test]
    fn test_missing_annotation_fails_finish() {
        let f = NodeFunction::native("show", vec![ParamType::untyped("value")], |_| {
            Ok(Dynamic::UNIT)
        });
        let mut builder = NodeBuilder::new(f);
        builder.add_input("value", None, "").unwrap();

        let err = builder.finish(NodeOptions::default(), None).unwrap_err();
        assert!(matches!(err, VidixyError::MissingTypeAnnotation { .. }));
    }

    #[test]
    fn test_default_name_and_category() {
        let node = NodeBuilder::from(add_fn())
            .finish(NodeOptions::default(), None)
            .unwrap();
        assert_eq!(node.name, "Add");
        assert_eq!(node.category, "General");

        let node = NodeBuilder::from(add_fn())
            .finish(NodeOptions::new().named("Plus").category("Math"), None)
            .unwrap();
        assert_eq!(node.name, "Plus");
        assert_eq!(node.category, "Math");
    }
}
