//! The runtime: one root scope, the builtin verbs, and `run`.

use std::rc::Rc;

use etl_eval::{
    EvalError, Evaluator, Output, ScopeArena, ScopeError, ScopeId, StdoutOutput, Value, Verb,
    VerbBody, DEFAULT_GAS_LIMIT,
};
use etl_types::ast::{BuiltinKind, Script};
use etl_types::CompileErrors;
use tracing::debug;

use crate::pipeline::parse;

/// Runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Maximum nodes a single `run` may visit.
    pub gas_limit: u64,
    /// Name used in diagnostics.
    pub file_name: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            gas_limit: DEFAULT_GAS_LIMIT,
            file_name: "<script>".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("{0}")]
    Parse(CompileErrors),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Owns a root scope and evaluates scripts against it.
///
/// The root lists a builtins scope (`write`, `set`) as its only parent, so
/// scripts can shadow a builtin without replacing it. Nouns, structs, and
/// `it` persist across calls to [`Runtime::run`].
pub struct Runtime {
    evaluator: Evaluator,
    builtins: ScopeId,
    root: ScopeId,
    config: RuntimeConfig,
}

impl Runtime {
    /// A runtime writing to stdout with default settings.
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default(), Box::new(StdoutOutput))
    }

    pub fn with_output(output: impl Output + 'static) -> Self {
        Self::with_config(RuntimeConfig::default(), Box::new(output))
    }

    pub fn with_config(config: RuntimeConfig, output: Box<dyn Output>) -> Self {
        let mut evaluator = Evaluator::new(config.gas_limit, output);
        // Both handles come from the arena that was just created.
        let (builtins, root) = install_builtins(&mut evaluator.scopes)
            .expect("a fresh arena accepts its own scope handles");
        debug!(builtins = %builtins, root = %root, "runtime ready");
        Self {
            evaluator,
            builtins,
            root,
            config,
        }
    }

    pub fn root(&self) -> ScopeId {
        self.root
    }

    pub fn builtins(&self) -> ScopeId {
        self.builtins
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn scopes(&self) -> &ScopeArena {
        &self.evaluator.scopes
    }

    /// Gas consumed by the most recent run.
    pub fn gas_used(&self) -> u64 {
        self.evaluator.gas
    }

    /// Register a host verb in the root scope.
    pub fn define_verb<F>(
        &mut self,
        name: impl Into<String>,
        params: Vec<BuiltinKind>,
        body: F,
    ) -> Result<Rc<Verb>, EvalError>
    where
        F: Fn(&[Value]) -> Result<Value, String> + 'static,
    {
        let verb = self.evaluator.scopes.define_verb(
            self.root,
            name,
            params,
            VerbBody::Native(Rc::new(body)),
        )?;
        Ok(verb)
    }

    /// Bind a noun in the root scope.
    pub fn define_noun(&mut self, name: impl Into<String>, value: Value) -> Result<(), EvalError> {
        self.evaluator.scopes.define_noun(self.root, name, value)?;
        Ok(())
    }

    /// Resolve a noun from the root scope.
    pub fn noun(&self, name: &str) -> Option<&Value> {
        self.evaluator.scopes.lookup_noun(self.root, name).found()
    }

    /// The root scope's current `it`.
    pub fn it(&self) -> Option<&Value> {
        self.evaluator.scopes.it(self.root)
    }

    /// Parse and evaluate `source`, returning the last sentence's value.
    pub fn run(&mut self, source: &str) -> Result<Value, RunError> {
        let _span = tracing::debug_span!("run", file = %self.config.file_name).entered();
        let parsed = parse(source, &self.config.file_name);
        let script = match parsed.script {
            Some(script) if !parsed.errors.has_errors() => script,
            _ => return Err(RunError::Parse(parsed.errors)),
        };
        debug!(sentences = script.sentences().count(), "parsed");
        Ok(self.eval_script(&script)?)
    }

    /// Evaluate an already-parsed script against the root scope.
    pub fn eval_script(&mut self, script: &Script) -> Result<Value, EvalError> {
        self.evaluator.reset_gas();
        let result = self.evaluator.eval_script(script, self.root);
        match &result {
            Ok(_) => debug!(gas = self.evaluator.gas, "run finished"),
            Err(e) => debug!(error = %e, kind = %e.kind(), "run failed"),
        }
        result
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

fn install_builtins(scopes: &mut ScopeArena) -> Result<(ScopeId, ScopeId), ScopeError> {
    let builtins = scopes.root();
    scopes.define_verb(builtins, "write", vec![BuiltinKind::Text], VerbBody::Write)?;
    scopes.define_verb(builtins, "set", vec![BuiltinKind::Text], VerbBody::Identity)?;
    let root = scopes.new_scope(vec![builtins])?;
    Ok((builtins, root))
}
