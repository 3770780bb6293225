//! Declaration API exposed to node-definition scripts.
//!
//! Scripts describe their functions with a builder chain:
//!
//! ```rhai
//! fn add(a, b) { a + b }
//!
//! declare("add", ["int", "int"])
//!     .output("sum", "Number")
//!     .input("b", "Number")
//!     .input("a", "Number")
//!     .node(#{ category: "Math" });
//! ```
//!
//! Failures are recorded as typed errors in the declaration context before
//! being raised as Rhai runtime errors, so the loader can report them as
//! such.

use crate::error::{Result, VidixyError};
use crate::node::{NodeBuilder, NodeFunction, NodeOptions, ParamType};
use crate::scripting::engine::{read_context, write_context, SharedDeclarationContext};
use rhai::{Array, Dynamic, Engine, EvalAltResult, FnPtr, Map};

type ScriptResult<T> = std::result::Result<T, Box<EvalAltResult>>;

/// Register `declare` and the builder methods on `engine`
pub(crate) fn register_declarations(engine: &mut Engine, context: SharedDeclarationContext) {
    engine.register_type_with_name::<NodeBuilder>("NodeBuilder");

    {
        let ctx = context.clone();
        engine.register_fn(
            "declare",
            move |name: &str, types: Array| -> ScriptResult<NodeBuilder> {
                declare(&ctx, name, types).map_err(|e| raise(&ctx, e))
            },
        );
    }

    // ===== Inputs =====

    {
        let ctx = context.clone();
        engine.register_fn(
            "input",
            move |builder: NodeBuilder, name: &str| -> ScriptResult<NodeBuilder> {
                input(builder, name, Dynamic::UNIT, "").map_err(|e| raise(&ctx, e))
            },
        );
    }
    {
        let ctx = context.clone();
        engine.register_fn(
            "input",
            move |builder: NodeBuilder, name: &str, socket: Dynamic| -> ScriptResult<NodeBuilder> {
                input(builder, name, socket, "").map_err(|e| raise(&ctx, e))
            },
        );
    }
    {
        let ctx = context.clone();
        engine.register_fn(
            "input",
            move |builder: NodeBuilder,
                  name: &str,
                  socket: Dynamic,
                  description: &str|
                  -> ScriptResult<NodeBuilder> {
                input(builder, name, socket, description).map_err(|e| raise(&ctx, e))
            },
        );
    }

    // ===== Controls =====

    {
        let ctx = context.clone();
        engine.register_fn(
            "control",
            move |builder: NodeBuilder, name: &str| -> ScriptResult<NodeBuilder> {
                control(builder, name, Dynamic::UNIT, "").map_err(|e| raise(&ctx, e))
            },
        );
    }
    {
        let ctx = context.clone();
        engine.register_fn(
            "control",
            move |builder: NodeBuilder, name: &str, default: Dynamic| -> ScriptResult<NodeBuilder> {
                control(builder, name, default, "").map_err(|e| raise(&ctx, e))
            },
        );
    }
    {
        let ctx = context.clone();
        engine.register_fn(
            "control",
            move |builder: NodeBuilder,
                  name: &str,
                  default: Dynamic,
                  description: &str|
                  -> ScriptResult<NodeBuilder> {
                control(builder, name, default, description).map_err(|e| raise(&ctx, e))
            },
        );
    }

    // ===== Outputs =====

    engine.register_fn(
        "output",
        |mut builder: NodeBuilder, name: &str, socket: &str| -> NodeBuilder {
            builder.add_output(name, socket, "");
            builder
        },
    );
    engine.register_fn(
        "output",
        |mut builder: NodeBuilder, name: &str, socket: &str, description: &str| -> NodeBuilder {
            builder.add_output(name, socket, description);
            builder
        },
    );

    // ===== Node =====

    {
        let ctx = context.clone();
        engine.register_fn("node", move |builder: NodeBuilder| -> ScriptResult<FnPtr> {
            node(&ctx, builder, NodeOptions::default()).map_err(|e| raise(&ctx, e))
        });
    }
    {
        let ctx = context.clone();
        engine.register_fn(
            "node",
            move |builder: NodeBuilder, name: &str| -> ScriptResult<FnPtr> {
                node(&ctx, builder, NodeOptions::new().named(name)).map_err(|e| raise(&ctx, e))
            },
        );
    }
    {
        let ctx = context.clone();
        engine.register_fn(
            "node",
            move |builder: NodeBuilder, options: Map| -> ScriptResult<FnPtr> {
                node_options(&options)
                    .and_then(|opts| node(&ctx, builder, opts))
                    .map_err(|e| raise(&ctx, e))
            },
        );
    }

    engine.register_fn("remaining", |builder: &mut NodeBuilder| -> i64 {
        builder.remaining_params() as i64
    });
}

fn raise(ctx: &SharedDeclarationContext, err: VidixyError) -> Box<EvalAltResult> {
    let message = err.to_string();
    write_context(ctx).record(err);
    message.into()
}

fn declare(ctx: &SharedDeclarationContext, name: &str, types: Array) -> Result<NodeBuilder> {
    let ast = read_context(ctx).ast().cloned().ok_or_else(|| {
        VidixyError::Script("declare() is only available while a node module loads".to_string())
    })?;

    let param_names: Vec<String> = ast
        .iter_functions()
        .find(|f| f.name == name && f.params.len() == types.len())
        .map(|f| f.params.iter().map(|p| p.to_string()).collect())
        .ok_or_else(|| VidixyError::UnknownFunction {
            name: name.to_string(),
            arity: types.len(),
        })?;

    let params = param_names
        .into_iter()
        .zip(types)
        .map(|(param, ty)| param_type(param, ty))
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!("Declaring node function '{}' with {} parameter(s)", name, params.len());
    Ok(NodeBuilder::new(NodeFunction::script(name, params, ast)))
}

fn param_type(name: String, ty: Dynamic) -> Result<ParamType> {
    if ty.is_unit() {
        return Ok(ParamType::untyped(name));
    }
    match ty.into_string() {
        Ok(type_name) => Ok(ParamType::typed(name, type_name)),
        Err(found) => Err(VidixyError::Script(format!(
            "Type of parameter '{}' must be a string or (), found {}",
            name, found
        ))),
    }
}

fn optional_string(what: &str, value: Dynamic) -> Result<Option<String>> {
    if value.is_unit() {
        return Ok(None);
    }
    value
        .into_string()
        .map(Some)
        .map_err(|found| VidixyError::Script(format!("{} must be a string, found {}", what, found)))
}

fn input(
    mut builder: NodeBuilder,
    name: &str,
    socket: Dynamic,
    description: &str,
) -> Result<NodeBuilder> {
    let socket = optional_string("Input socket", socket)?;
    builder.add_input(name, socket.as_deref(), description)?;
    Ok(builder)
}

fn control(
    mut builder: NodeBuilder,
    name: &str,
    default: Dynamic,
    description: &str,
) -> Result<NodeBuilder> {
    let default = if default.is_unit() {
        serde_json::Value::Null
    } else {
        rhai::serde::from_dynamic::<serde_json::Value>(&default).map_err(|e| {
            VidixyError::Script(format!("Default of control '{}' is not representable: {}", name, e))
        })?
    };
    builder.add_control(name, description, default)?;
    Ok(builder)
}

fn node_options(map: &Map) -> Result<NodeOptions> {
    let field = |key: &str| -> Result<Option<String>> {
        match map.get(key) {
            Some(value) => optional_string(&format!("Node option '{}'", key), value.clone()),
            None => Ok(None),
        }
    };

    let mut options = NodeOptions::default();
    options.name = field("name")?;
    if let Some(description) = field("description")? {
        options.description = description;
    }
    if let Some(category) = field("category")? {
        options.category = category;
    }
    Ok(options)
}

fn node(ctx: &SharedDeclarationContext, builder: NodeBuilder, options: NodeOptions) -> Result<FnPtr> {
    let ident = builder.function().ident().to_string();

    {
        let mut context = write_context(ctx);
        let module = context.module().map(str::to_string);
        let registry = context.registry_mut().ok_or_else(|| {
            VidixyError::Script("node() is only available while a node module loads".to_string())
        })?;
        registry.register_in_module(builder, options, module)?;
        context.count_registration();
    }

    FnPtr::new(ident).map_err(VidixyError::from_rhai_error)
}
