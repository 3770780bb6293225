//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use vidixy::{NodeLoader, Registry};

/// The number/add node file used across loader tests
pub const NUMBER_NODES: &str = r#"
fn number(i) {
    i
}

declare("number", ["int"])
    .output("number", "Number")
    .control("Number", 1)
    .node();

fn add(a, b) {
    a + b
}

declare("add", ["int", "int"])
    .output("sum", "Number")
    .input("b", "Number")
    .input("a", "Number")
    .node();
"#;

/// A throwaway node directory
pub struct NodeDir {
    dir: TempDir,
}

impl NodeDir {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the directory root, creating parents
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        std::fs::write(&path, contents).expect("Failed to write node file");
        path
    }

    /// Load the whole directory into a fresh registry
    pub fn load(&self) -> vidixy::Result<Registry> {
        let mut registry = Registry::new();
        NodeLoader::new().load_all(&mut registry, self.path())?;
        Ok(registry)
    }
}

/// Node names in registration order
pub fn node_names(registry: &Registry) -> Vec<&str> {
    registry.nodes().iter().map(|n| n.name.as_str()).collect()
}

/// Socket set as a sorted list
pub fn socket_list(registry: &Registry) -> Vec<&str> {
    registry.sockets().iter().map(String::as_str).collect()
}
