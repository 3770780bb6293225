//! Rhai Script Host Implementation
//!
//! The host owns a sandboxed Rhai engine with the declaration API registered
//! on it. While a module is being evaluated, the registry is parked in the
//! shared [`DeclarationContext`] so declaration callbacks can register into
//! it; it is handed back to the caller once evaluation ends, successful or
//! not.

use crate::error::{Result, VidixyError};
use crate::node::{FunctionBody, NodeFunction, Registry};
use crate::scripting::declarations::register_declarations;
use rhai::module_resolvers::FileModuleResolver;
use rhai::{CallFnOptions, Dynamic, Engine, Scope, AST};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Safety limits applied to the Rhai engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptLimits {
    pub max_expr_depth: usize,
    pub max_function_expr_depth: usize,
    pub max_call_levels: usize,
    pub max_operations: u64,
    pub max_string_size: usize,
    pub max_array_size: usize,
    pub max_map_size: usize,
}

impl Default for ScriptLimits {
    fn default() -> Self {
        Self {
            max_expr_depth: 64,
            max_function_expr_depth: 64,
            max_call_levels: 32,
            max_operations: 100_000,
            max_string_size: 10_000,
            max_array_size: 1_000,
            max_map_size: 1_000,
        }
    }
}

/// State shared with declaration callbacks during a module evaluation
#[derive(Debug, Default)]
pub struct DeclarationContext {
    registry: Option<Registry>,
    module: Option<String>,
    ast: Option<Arc<AST>>,
    error: Option<VidixyError>,
    registered: usize,
}

/// What a finished evaluation leaves behind
pub(crate) struct DeclarationOutcome {
    pub registry: Registry,
    pub registered: usize,
    pub error: Option<VidixyError>,
}

impl DeclarationContext {
    fn begin(&mut self, registry: Registry, module: &str, ast: Arc<AST>) {
        self.registry = Some(registry);
        self.module = Some(module.to_string());
        self.ast = Some(ast);
        self.error = None;
        self.registered = 0;
    }

    fn finish(&mut self) -> DeclarationOutcome {
        self.module = None;
        self.ast = None;
        DeclarationOutcome {
            registry: self.registry.take().unwrap_or_default(),
            registered: std::mem::take(&mut self.registered),
            error: self.error.take(),
        }
    }

    pub(crate) fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    pub(crate) fn ast(&self) -> Option<&Arc<AST>> {
        self.ast.as_ref()
    }

    pub(crate) fn registry_mut(&mut self) -> Option<&mut Registry> {
        self.registry.as_mut()
    }

    pub(crate) fn count_registration(&mut self) {
        self.registered += 1;
    }

    /// Keep the typed error behind the Rhai runtime error a callback raised
    pub(crate) fn record(&mut self, err: VidixyError) {
        self.error = Some(err);
    }
}

/// Shared declaration context
pub type SharedDeclarationContext = Arc<RwLock<DeclarationContext>>;

pub(crate) fn read_context(ctx: &SharedDeclarationContext) -> RwLockReadGuard<'_, DeclarationContext> {
    ctx.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write_context(
    ctx: &SharedDeclarationContext,
) -> RwLockWriteGuard<'_, DeclarationContext> {
    ctx.write().unwrap_or_else(PoisonError::into_inner)
}

/// The sandboxed engine node-definition files run in
pub struct ScriptHost {
    /// The Rhai engine instance
    engine: Engine,
    /// Shared context for declaration callbacks
    context: SharedDeclarationContext,
}

impl ScriptHost {
    /// Create a script host with default limits
    pub fn new() -> Self {
        Self::with_limits(ScriptLimits::default())
    }

    pub fn with_limits(limits: ScriptLimits) -> Self {
        let context = Arc::new(RwLock::new(DeclarationContext::default()));
        let mut engine = Engine::new();
        Self::configure_engine(&mut engine, &limits);
        register_declarations(&mut engine, context.clone());

        Self { engine, context }
    }

    /// Configure the Rhai engine with safety limits and logging hooks
    fn configure_engine(engine: &mut Engine, limits: &ScriptLimits) {
        engine.set_max_expr_depths(limits.max_expr_depth, limits.max_function_expr_depth);
        engine.set_max_call_levels(limits.max_call_levels);
        engine.set_max_operations(limits.max_operations);
        engine.set_max_string_size(limits.max_string_size);
        engine.set_max_array_size(limits.max_array_size);
        engine.set_max_map_size(limits.max_map_size);

        engine.on_print(|text| tracing::info!(target: "vidixy::script", "{}", text));
        engine.on_debug(|text, source, pos| {
            tracing::debug!(target: "vidixy::script", "{} @ {:?}: {}", source.unwrap_or("<script>"), pos, text)
        });
    }

    /// Resolve `import` statements against files under `root`
    pub fn set_module_root(&mut self, root: &Path, extension: &str) {
        let resolver = FileModuleResolver::new_with_path_and_extension(root, extension);
        self.engine.set_module_resolver(resolver);
    }

    pub fn compile(&self, source: &str) -> Result<AST> {
        self.engine
            .compile(source)
            .map_err(|e| VidixyError::Script(format!("Compilation error: {}", e)))
    }

    /// Evaluate a node-definition module against `registry`.
    ///
    /// Returns how many nodes the module registered. Nodes registered before
    /// a failure stay registered.
    pub fn evaluate(&self, registry: &mut Registry, module: &str, source: &str) -> Result<usize> {
        let ast = Arc::new(self.compile(source)?);

        write_context(&self.context).begin(std::mem::take(registry), module, ast.clone());
        let result = self.engine.run_ast(&ast);
        let outcome = write_context(&self.context).finish();
        *registry = outcome.registry;

        match result {
            Ok(()) => Ok(outcome.registered),
            Err(err) => {
                let message = err.to_string();
                Err(match outcome.error {
                    Some(declaration) if message.contains(&declaration.to_string()) => declaration,
                    _ => VidixyError::Script(format!("Execution error: {}", message)),
                })
            }
        }
    }

    /// Call a registered node function
    pub fn call(&self, function: &NodeFunction, args: Vec<Dynamic>) -> Result<Dynamic> {
        match function.body() {
            FunctionBody::Native(_) => function.call_native(&args),
            FunctionBody::Script(ast) => {
                let options = CallFnOptions::new().eval_ast(false);
                self.engine
                    .call_fn_with_options::<Dynamic>(
                        options,
                        &mut Scope::new(),
                        ast,
                        function.ident(),
                        args,
                    )
                    .map_err(|e| {
                        VidixyError::Script(format!(
                            "Execution error in '{}': {}",
                            function.ident(),
                            e
                        ))
                    })
            }
        }
    }

    /// Validate a script without executing it
    pub fn validate(&self, source: &str) -> Result<()> {
        self.compile(source).map(|_| ())
    }

    /// Get a reference to the underlying Rhai engine
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn context(&self) -> &SharedDeclarationContext {
        &self.context
    }
}

impl Default for ScriptHost {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ScriptHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptHost")
            .field("module", &read_context(&self.context).module())
            .finish()
    }
}
