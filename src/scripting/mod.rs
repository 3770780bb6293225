//! Rhai Scripting Host for Node-Definition Files
//!
//! Node-definition files are Rhai scripts. Each file defines plain script
//! functions and then declares them as nodes; evaluating the file registers
//! those nodes as a side effect.
//!
//! ## Declaration API
//!
//! - `declare(fn_name, types)` - Start declaring the script function `fn_name`.
//!   `types` holds one entry per parameter: a type name, or `()` when the
//!   parameter has no type.
//! - `.input(name)` / `.input(name, socket)` / `.input(name, socket, description)` -
//!   Declare an input on the last unconsumed parameter. A `()` socket is
//!   inferred from the parameter type.
//! - `.control(name)` / `.control(name, default)` / `.control(name, default, description)` -
//!   Declare a control on the last unconsumed parameter.
//! - `.output(name, socket)` / `.output(name, socket, description)` - Declare an output.
//! - `.node()` / `.node(name)` / `.node(#{ name, description, category })` -
//!   Register the node and return a function pointer to the original function.
//! - `.remaining()` - Number of parameters not yet consumed.
//!
//! ## Example Node File
//!
//! ```rhai
//! fn number(i) {
//!     i
//! }
//!
//! declare("number", ["int"])
//!     .output("number", "Number")
//!     .control("Number", 1)
//!     .node();
//!
//! fn add(a, b) {
//!     a + b
//! }
//!
//! declare("add", ["int", "int"])
//!     .output("sum", "Number")
//!     .input("b", "Number")
//!     .input("a", "Number")
//!     .node(#{ category: "Math" });
//! ```
//!
//! Files whose name starts with `_` are never loaded as node files but can be
//! imported by them (`import "_helpers" as helpers;`).

mod declarations;
mod engine;

pub use engine::{DeclarationContext, ScriptHost, ScriptLimits, SharedDeclarationContext};
