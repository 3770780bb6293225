//! Node module discovery and loading.
//!
//! [`NodeLoader::load_all`] walks a directory tree for node-definition files
//! and evaluates each of them once; their declarations register nodes as a
//! side effect. Files are visited in file-name order within each directory.
//! Files whose name starts with `_` are private helpers: never evaluated by
//! the loader, but importable from node files.
//!
//! Loading is not idempotent. Loading the same directory twice registers
//! every node twice.

use crate::config::{VidixyConfig, DEFAULT_EXTENSION};
use crate::error::{Result, VidixyError};
use crate::node::Registry;
use crate::scripting::{ScriptHost, ScriptLimits};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A node file found during discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleFile {
    /// Dotted module path, e.g. `math.basic` for `math/basic.rhai`
    pub module: String,
    pub path: PathBuf,
}

/// Result of walking a node directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    pub modules: Vec<ModuleFile>,
    /// Private files that were skipped
    pub skipped: Vec<PathBuf>,
}

/// A module that was evaluated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedModule {
    pub module: String,
    pub path: PathBuf,
    /// Number of nodes the module registered
    pub nodes: usize,
}

/// Summary of a `load_all` call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: Vec<LoadedModule>,
    pub skipped: Vec<PathBuf>,
}

impl LoadReport {
    pub fn node_count(&self) -> usize {
        self.loaded.iter().map(|m| m.nodes).sum()
    }
}

/// Derive the dotted module path of `path` relative to `root`
pub fn module_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?.with_extension("");
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("."))
    }
}

fn is_private(path: &Path) -> bool {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().starts_with('_'))
        .unwrap_or(false)
}

/// Find every node file under `root` with the given extension
pub fn discover(root: &Path, extension: &str) -> Result<Discovery> {
    if !root.is_dir() {
        return Err(VidixyError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Node directory {:?} does not exist or is not a directory", root),
        )));
    }

    let mut discovery = Discovery::default();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        let path = entry.path();

        if !entry.file_type().is_file() || path.extension().map_or(true, |ext| ext != extension) {
            continue;
        }

        if is_private(path) {
            tracing::debug!("Skipping private node file {:?}", path);
            discovery.skipped.push(path.to_path_buf());
            continue;
        }

        if let Some(module) = module_path(root, path) {
            discovery.modules.push(ModuleFile {
                module,
                path: path.to_path_buf(),
            });
        }
    }

    Ok(discovery)
}

/// Discovers node files and evaluates them in a script host
#[derive(Debug)]
pub struct NodeLoader {
    host: ScriptHost,
    extension: String,
}

impl NodeLoader {
    pub fn new() -> Self {
        Self::with_limits(ScriptLimits::default())
    }

    pub fn with_limits(limits: ScriptLimits) -> Self {
        Self {
            host: ScriptHost::with_limits(limits),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    pub fn from_config(config: &VidixyConfig) -> Self {
        Self {
            host: ScriptHost::with_limits(config.limits),
            extension: config.extension.clone(),
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// The host node functions are called through after loading
    pub fn host(&self) -> &ScriptHost {
        &self.host
    }

    /// Load every node file under `root` into `registry`.
    ///
    /// Stops at the first module that fails; nodes registered before it stay
    /// in the registry.
    pub fn load_all(&mut self, registry: &mut Registry, root: impl AsRef<Path>) -> Result<LoadReport> {
        let root = root.as_ref();
        let discovery = discover(root, &self.extension)?;
        self.host.set_module_root(root, &self.extension);

        tracing::debug!(
            "Discovered {} node module(s) under {:?} ({} private)",
            discovery.modules.len(),
            root,
            discovery.skipped.len()
        );

        let mut report = LoadReport {
            loaded: Vec::with_capacity(discovery.modules.len()),
            skipped: discovery.skipped,
        };

        for file in discovery.modules {
            let nodes = self.evaluate_file(registry, &file)?;
            report.loaded.push(LoadedModule {
                module: file.module,
                path: file.path,
                nodes,
            });
        }

        tracing::info!(
            "Loaded {} node(s) from {} module(s) under {:?}",
            report.node_count(),
            report.loaded.len(),
            root
        );

        for name in registry.duplicate_names() {
            tracing::warn!("Node name '{}' is registered more than once", name);
        }

        Ok(report)
    }

    /// Load a single node file, resolving its module path against `root`
    pub fn load_file(
        &mut self,
        registry: &mut Registry,
        root: impl AsRef<Path>,
        path: impl AsRef<Path>,
    ) -> Result<LoadedModule> {
        let root = root.as_ref();
        let path = path.as_ref();

        let module = module_path(root, path).ok_or_else(|| {
            VidixyError::module_load(
                path,
                VidixyError::Config(format!("{:?} is not inside {:?}", path, root)),
            )
        })?;
        self.host.set_module_root(root, &self.extension);

        let file = ModuleFile {
            module,
            path: path.to_path_buf(),
        };
        let nodes = self.evaluate_file(registry, &file)?;
        Ok(LoadedModule {
            module: file.module,
            path: file.path,
            nodes,
        })
    }

    fn evaluate_file(&self, registry: &mut Registry, file: &ModuleFile) -> Result<usize> {
        tracing::debug!("Loading node module '{}' from {:?}", file.module, file.path);

        let source = std::fs::read_to_string(&file.path)
            .map_err(|e| VidixyError::module_load(&file.path, VidixyError::Io(e)))?;

        let nodes = self
            .host
            .evaluate(registry, &file.module, &source)
            .map_err(|e| VidixyError::module_load(&file.path, e))?;

        tracing::debug!("Module '{}' registered {} node(s)", file.module, nodes);
        Ok(nodes)
    }
}

impl Default for NodeLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_path() {
        let root = Path::new("/plugins/nodes");
        assert_eq!(
            module_path(root, Path::new("/plugins/nodes/debug.rhai")).as_deref(),
            Some("debug")
        );
        assert_eq!(
            module_path(root, Path::new("/plugins/nodes/math/basic.rhai")).as_deref(),
            Some("math.basic")
        );
        assert_eq!(module_path(root, Path::new("/elsewhere/x.rhai")), None);
    }

    #[test]
    fn test_is_private() {
        assert!(is_private(Path::new("nodes/_helpers.rhai")));
        assert!(!is_private(Path::new("nodes/_shared/helpers.rhai")));
        assert!(!is_private(Path::new("nodes/math.rhai")));
    }

    #[test]
    fn test_discover_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir(root.join("math")).unwrap();
        std::fs::write(root.join("zeta.rhai"), "").unwrap();
        std::fs::write(root.join("alpha.rhai"), "").unwrap();
        std::fs::write(root.join("_helpers.rhai"), "").unwrap();
        std::fs::write(root.join("notes.txt"), "").unwrap();
        std::fs::write(root.join("math").join("basic.rhai"), "").unwrap();

        let discovery = discover(root, "rhai").unwrap();
        let modules: Vec<&str> = discovery.modules.iter().map(|m| m.module.as_str()).collect();

        assert_eq!(modules, vec!["alpha", "math.basic", "zeta"]);
        assert_eq!(discovery.skipped, vec![root.join("_helpers.rhai")]);
    }

    #[test]
    fn test_discover_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover(&dir.path().join("nope"), "rhai").unwrap_err();
        assert!(matches!(err, VidixyError::Io(_)));
    }
}
