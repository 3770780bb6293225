//! Node declaration and registration.
//!
//! A function becomes a node in three steps:
//!
//! 1. wrap it in a [`NodeFunction`] with an explicit parameter schema,
//! 2. apply input, control and output declarations through a [`NodeBuilder`],
//! 3. commit it with [`Registry::register`].
//!
//! ```
//! use vidixy::node::{NodeBuilder, NodeFunction, NodeOptions, ParamType, Registry};
//! use rhai::Dynamic;
//!
//! let add = NodeFunction::native(
//!     "add",
//!     vec![ParamType::typed("a", "int"), ParamType::typed("b", "int")],
//!     |args| Ok(Dynamic::from(args[0].as_int().unwrap_or(0) + args[1].as_int().unwrap_or(0))),
//! );
//!
//! let mut builder = NodeBuilder::new(add);
//! builder.add_output("sum", "Number", "");
//! builder.add_input("b", Some("Number"), "")?;
//! builder.add_input("a", Some("Number"), "")?;
//!
//! let mut registry = Registry::new();
//! registry.register(builder, NodeOptions::default())?;
//!
//! assert_eq!(registry.nodes()[0].name, "Add");
//! assert!(registry.sockets().contains("Number"));
//! # Ok::<(), vidixy::VidixyError>(())
//! ```

pub mod builder;
pub mod name;
pub mod registry;
pub mod socket;
pub mod spec;

pub use builder::{NodeBuilder, NodeOptions};
pub use name::normalize_name;
pub use registry::{Registry, RegistrySnapshot};
pub use socket::{control_type, infer_socket};
pub use spec::{
    ControlSpec, FunctionBody, InputSpec, NativeFn, NodeDescriptor, NodeFunction, NodeSummary,
    OutputSpec, ParamType, DEFAULT_CATEGORY,
};
