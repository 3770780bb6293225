//! Error handling for Vidixy
//!
//! This module defines the error taxonomy for node declaration, registration
//! and loading, plus a Result alias used throughout the crate.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Vidixy operations
#[derive(Error, Debug)]
pub enum VidixyError {
    /// An input or control needs a socket/type and none can be inferred
    #[error("Missing type annotation for parameter '{parameter}' of node function '{function}'")]
    MissingTypeAnnotation { function: String, parameter: String },

    /// More input/control declarations than the function has parameters
    #[error("Arity error: function '{function}' declares {declared} parameter(s), all already consumed")]
    Arity { function: String, declared: usize },

    /// A declaration refers to a function the node file does not define
    #[error("Unknown function '{name}' taking {arity} parameter(s)")]
    UnknownFunction { name: String, arity: usize },

    /// A node-definition file failed to read, compile or evaluate
    #[error("Failed to load node module {path:?}: {source}")]
    ModuleLoad {
        path: PathBuf,
        #[source]
        source: Box<VidixyError>,
    },

    /// Errors related to Rhai script compilation or execution
    #[error("Script error: {0}")]
    Script(String),

    /// Errors related to configuration loading
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<VidixyError>,
    },
}

impl VidixyError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        VidixyError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Wrap an error as the cause of a failed module load
    pub fn module_load(path: impl Into<PathBuf>, source: VidixyError) -> Self {
        VidixyError::ModuleLoad {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// Create a script error from a Rhai error
    pub fn from_rhai_error(err: Box<rhai::EvalAltResult>) -> Self {
        VidixyError::Script(err.to_string())
    }

    /// Strip `ModuleLoad` and `WithContext` wrappers down to the underlying cause
    pub fn root(&self) -> &VidixyError {
        match self {
            VidixyError::ModuleLoad { source, .. } | VidixyError::WithContext { source, .. } => {
                source.root()
            }
            other => other,
        }
    }
}

impl From<serde_json::Error> for VidixyError {
    fn from(err: serde_json::Error) -> Self {
        VidixyError::Serialization(err.to_string())
    }
}

/// Result type alias for Vidixy operations
pub type Result<T> = std::result::Result<T, VidixyError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, Box<rhai::EvalAltResult>> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| VidixyError::from_rhai_error(e).with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| VidixyError::from_rhai_error(e).with_context(f()))
    }
}
