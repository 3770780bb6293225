//! # Vidixy: script-declared graph nodes
//!
//! Plugin authors declare computational nodes (typed functions with named
//! inputs, controls and outputs) and Vidixy collects them into a
//! [`Registry`] that a graph editor or execution engine can read.
//!
//! ## Architecture
//!
//! - **Node**: specs, the declaration builder, socket inference, name
//!   normalization and the registry itself
//! - **Scripting**: sandboxed Rhai host that node-definition files run in
//! - **Loader**: discovers node files in a directory tree and evaluates them
//! - **Config**: TOML configuration for the binary and the loader
//!
//! ## Example
//!
//! ```no_run
//! use vidixy::{NodeLoader, Registry};
//!
//! fn main() -> vidixy::Result<()> {
//!     let mut registry = Registry::new();
//!     let mut loader = NodeLoader::new();
//!     loader.load_all(&mut registry, "nodes")?;
//!
//!     for node in registry.nodes() {
//!         println!("{} ({})", node.name, node.category);
//!     }
//!     println!("sockets: {:?}", registry.sockets());
//!     Ok(())
//! }
//! ```
//!
//! Registration is single-threaded and happens at startup; the registry is
//! read-only for consumers afterwards.

pub mod config;
pub mod error;
pub mod loader;
pub mod node;
pub mod scripting;

// Re-export commonly used types
pub use config::VidixyConfig;
pub use error::{Result, VidixyError};
pub use loader::{LoadReport, NodeLoader};
pub use node::{
    ControlSpec, InputSpec, NodeBuilder, NodeDescriptor, NodeFunction, NodeOptions, OutputSpec,
    ParamType, Registry,
};
pub use scripting::{ScriptHost, ScriptLimits};
