//! Socket type inference.
//!
//! An input's socket is the explicit name its declaration gives, or else the
//! declared type name of the parameter it consumed. Names are used verbatim:
//! `Int` and `int` are different sockets.

use super::spec::ParamType;
use crate::error::{Result, VidixyError};

/// Resolve the socket for an input declaration.
///
/// An empty explicit socket counts as not given.
pub fn infer_socket(
    function: &str,
    declaration: &str,
    explicit: Option<&str>,
    declared: &ParamType,
) -> Result<String> {
    match explicit {
        Some(socket) if !socket.is_empty() => Ok(socket.to_string()),
        _ => declared_type(function, declaration, declared),
    }
}

/// Resolve the editor type hint for a control declaration.
pub fn control_type(function: &str, declaration: &str, declared: &ParamType) -> Result<String> {
    declared_type(function, declaration, declared)
}

fn declared_type(function: &str, declaration: &str, declared: &ParamType) -> Result<String> {
    match declared.type_name.as_deref() {
        Some(type_name) if !type_name.is_empty() => Ok(type_name.to_string()),
        _ => Err(VidixyError::MissingTypeAnnotation {
            function: function.to_string(),
            parameter: declared
                .name
                .clone()
                .unwrap_or_else(|| declaration.to_string()),
        }),
    }
}
