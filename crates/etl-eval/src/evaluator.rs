//! Core sentence and argument evaluator.

use etl_types::ast::*;
use etl_types::literal::{join_number, resolve_escapes};
use etl_types::Span;
use std::rc::Rc;
use tracing::{debug, trace};

use crate::error::{EvalError, EvalResult};
use crate::math;
use crate::output::Output;
use crate::scope::{Lookup, ScopeArena, ScopeId};
use crate::value::{StructRef, Value, Verb, VerbBody};

/// Gas limit used when the host does not configure one.
pub const DEFAULT_GAS_LIMIT: u64 = 1_000_000;

/// Where an assignment stores its result.
enum Binding<'n> {
    /// A noun table entry in `scope`.
    Noun { scope: ScopeId, name: &'n Ident },
    /// Only the `it` slot (`set it to 5`).
    It,
}

/// The core evaluator: walks syntax nodes against a scope and produces
/// [`Value`]s.
pub struct Evaluator {
    /// Every scope this evaluator has created.
    pub scopes: ScopeArena,
    /// Gas counter, one unit per visited node.
    pub gas: u64,
    pub gas_limit: u64,
    output: Box<dyn Output>,
}

impl Evaluator {
    pub fn new(gas_limit: u64, output: Box<dyn Output>) -> Self {
        Self {
            scopes: ScopeArena::new(),
            gas: 0,
            gas_limit,
            output,
        }
    }

    pub fn reset_gas(&mut self) {
        self.gas = 0;
    }

    /// Consume one unit of gas. Returns error if exhausted.
    fn tick(&mut self) -> EvalResult<()> {
        self.gas += 1;
        if self.gas > self.gas_limit {
            Err(EvalError::GasExhausted)
        } else {
            Ok(())
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Sentences & clauses
    // ══════════════════════════════════════════════════════════════════════

    /// Evaluate every sentence in order. The result is the value of the
    /// last sentence, or [`Value::Nothing`] for a script of only comments.
    pub fn eval_script(&mut self, script: &Script, scope: ScopeId) -> EvalResult<Value> {
        let mut last = Value::Nothing;
        for sentence in script.sentences() {
            last = self.eval_sentence(sentence, scope)?;
        }
        Ok(last)
    }

    /// Clauses run strictly in order; each result is `it` for the next.
    pub fn eval_sentence(&mut self, sentence: &Sentence, scope: ScopeId) -> EvalResult<Value> {
        self.tick()?;
        let mut last = Value::Nothing;
        for clause in sentence.clauses() {
            last = self.eval_clause(clause, scope)?;
        }
        Ok(last)
    }

    pub fn eval_clause(&mut self, clause: &Clause, scope: ScopeId) -> EvalResult<Value> {
        match clause {
            Clause::Statement(statement) => self.eval_statement(statement, scope),
            Clause::Assignment(assignment) => self.eval_assignment(assignment, scope),
            Clause::Creation(creation) => self.eval_creation(creation, scope),
        }
    }

    /// Resolve the verb, evaluate the arguments left to right, invoke.
    pub fn eval_statement(&mut self, statement: &Statement, scope: ScopeId) -> EvalResult<Value> {
        self.tick()?;
        let verb = self.resolve_verb(&statement.verb, scope)?;
        let mut args = Vec::with_capacity(statement.arguments.len());
        for argument in &statement.arguments {
            args.push(self.eval_argument(argument, scope)?);
        }
        let value = self.call_verb(&verb, args, statement.span)?;
        self.scopes.set_it(scope, value.clone())?;
        Ok(value)
    }

    /// `set x to 5`: the verb receives the target value and its result is
    /// bound to the noun.
    pub fn eval_assignment(&mut self, assignment: &Assignment, scope: ScopeId) -> EvalResult<Value> {
        self.tick()?;
        let verb = self.resolve_verb(&assignment.verb, scope)?;
        let binding = match &assignment.from {
            Target::Noun(noun) => {
                let (owner, name) = self.owner_of(noun, scope)?;
                Binding::Noun { scope: owner, name }
            }
            Target::It(it) => match &it.property {
                None => Binding::It,
                Some(property) => {
                    let container = self.it_value(scope, it.span)?;
                    let inner = struct_scope(&container, "it", it.span)?;
                    let (owner, name) = self.owner_of(property, inner)?;
                    Binding::Noun { scope: owner, name }
                }
            },
        };
        let target = self.eval_argument(&assignment.to, scope)?;
        let value = self.call_verb(&verb, vec![target], assignment.span)?;
        if let Binding::Noun { scope: owner, name } = binding {
            trace!(noun = %name.name, scope = %owner, "assign");
            self.scopes.define_noun(owner, name.name.clone(), value.clone())?;
        }
        self.scopes.set_it(scope, value.clone())?;
        Ok(value)
    }

    /// `create the number score as 5`, `create the struct game`,
    /// `create the game zuuup`, `create the verb greeting as "hi"`.
    pub fn eval_creation(&mut self, creation: &Creation, scope: ScopeId) -> EvalResult<Value> {
        self.tick()?;
        let typed = &creation.noun;
        let (owner, name) = match &typed.property {
            None => (scope, &typed.name),
            Some(property) => {
                let container = self.resolve_name(&typed.name, None, scope)?;
                let inner = struct_scope(&container, &typed.name.name, typed.name.span)?;
                self.owner_of(property, inner)?
            }
        };
        let initial = match &creation.value {
            Some(argument) => Some(self.eval_argument(argument, scope)?),
            None => None,
        };

        let value = match &typed.ty {
            TypeRef::Builtin(builtin) => match builtin.kind {
                BuiltinKind::Number => initial.unwrap_or(Value::Number(0.0)),
                BuiltinKind::Text => initial.unwrap_or_else(|| Value::Text(String::new())),
                BuiltinKind::Struct => {
                    let template = self.scopes.new_scope(Vec::new())?;
                    self.scopes.define_struct(owner, name.name.clone(), template)?;
                    debug!(name = %name.name, scope = %template, "declared struct");
                    let value = Value::Struct(StructRef::template(name.name.clone(), template));
                    self.scopes.set_it(scope, value.clone())?;
                    return Ok(value);
                }
                BuiltinKind::Verb => {
                    let body = VerbBody::Constant(initial.unwrap_or(Value::Nothing));
                    let verb = self
                        .scopes
                        .define_verb(owner, name.name.clone(), Vec::new(), body)?;
                    debug!(name = %name.name, "declared verb");
                    let value = Value::Verb(verb);
                    self.scopes.set_it(scope, value.clone())?;
                    return Ok(value);
                }
            },
            TypeRef::Struct(struct_type) => match initial {
                Some(value) => value,
                None => self.instantiate(&struct_type.strukt, scope)?,
            },
        };

        trace!(noun = %name.name, scope = %owner, "create");
        self.scopes.define_noun(owner, name.name.clone(), value.clone())?;
        self.scopes.set_it(scope, value.clone())?;
        Ok(value)
    }

    /// Create an instance scope whose single parent is the struct template.
    fn instantiate(&mut self, strukt: &Struct, scope: ScopeId) -> EvalResult<Value> {
        let template = self.resolve_template(&strukt.name, scope)?;
        let instance = self.scopes.new_scope(vec![template])?;
        trace!(name = %strukt.name.name, template = %template, scope = %instance, "instantiate");
        Ok(Value::Struct(StructRef::instance(
            strukt.name.name.clone(),
            instance,
        )))
    }

    // ══════════════════════════════════════════════════════════════════════
    // Arguments
    // ══════════════════════════════════════════════════════════════════════

    pub fn eval_argument(&mut self, argument: &Argument, scope: ScopeId) -> EvalResult<Value> {
        self.tick()?;
        match &argument.kind {
            ArgumentKind::Inline(statement) => self.eval_statement(statement, scope),
            ArgumentKind::Assignment(assignment) => self.eval_assignment(assignment, scope),
            ArgumentKind::Noun(noun) => self.eval_noun(noun, scope),
            ArgumentKind::It(it) => self.eval_it(it, scope),
            ArgumentKind::Math(m) => self.eval_math(m, scope).map(Value::Number),
            ArgumentKind::BuiltinType(builtin) => Ok(Value::Type(builtin.kind)),
            ArgumentKind::StructType(struct_type) => self.eval_struct(&struct_type.strukt, scope),
            ArgumentKind::Number(n) => Ok(Value::Number(join_number(n.base, &n.trail))),
            ArgumentKind::Text(text) => eval_text(text),
        }
    }

    /// Resolve a noun, then each link of its property chain inside the
    /// previous link's struct scope.
    pub fn eval_noun(&mut self, noun: &Noun, scope: ScopeId) -> EvalResult<Value> {
        self.tick()?;
        let value = self.resolve_name(&noun.name, noun.ty.as_ref(), scope)?;
        match &noun.property {
            None => Ok(value),
            Some(property) => {
                let inner = struct_scope(&value, &noun.name.name, noun.name.span)?;
                self.eval_noun(property, inner)
            }
        }
    }

    pub fn eval_it(&mut self, it: &It, scope: ScopeId) -> EvalResult<Value> {
        self.tick()?;
        let value = self.it_value(scope, it.span)?;
        match &it.property {
            None => Ok(value),
            Some(property) => {
                let inner = struct_scope(&value, "it", it.span)?;
                self.eval_noun(property, inner)
            }
        }
    }

    pub fn eval_struct(&mut self, strukt: &Struct, scope: ScopeId) -> EvalResult<Value> {
        let template = self.resolve_template(&strukt.name, scope)?;
        Ok(Value::Struct(StructRef::template(
            strukt.name.name.clone(),
            template,
        )))
    }

    // ── Math ─────────────────────────────────────────────────────────────

    pub fn eval_math(&mut self, m: &Math, scope: ScopeId) -> EvalResult<f64> {
        self.tick()?;
        let mut acc = self.eval_math_term(&m.base, scope)?;
        for operation in &m.operations {
            let rhs = self.eval_math_term(&operation.term, scope)?;
            acc = math::apply(operation.operator.op, acc, rhs).map_err(|e| {
                EvalError::InvalidExpression {
                    message: e.to_string(),
                    span: operation.operator.span,
                }
            })?;
        }
        Ok(acc)
    }

    fn eval_math_term(&mut self, term: &MathTerm, scope: ScopeId) -> EvalResult<f64> {
        self.tick()?;
        let value = match term {
            MathTerm::Number(n) => return Ok(join_number(n.base, &n.trail)),
            MathTerm::Math(inner) => return self.eval_math(inner, scope),
            MathTerm::Noun(noun) => self.eval_noun(noun, scope)?,
            MathTerm::It(it) => self.eval_it(it, scope)?,
        };
        value.as_number().ok_or_else(|| EvalError::InvalidExpression {
            message: format!("expected a number, found {}", value.type_name()),
            span: term.span(),
        })
    }

    // ══════════════════════════════════════════════════════════════════════
    // Verbs
    // ══════════════════════════════════════════════════════════════════════

    /// Invoke `verb` with already-evaluated arguments.
    pub fn call_verb(&mut self, verb: &Verb, args: Vec<Value>, span: Span) -> EvalResult<Value> {
        trace!(verb = %verb.name, args = args.len(), "invoke");
        match &verb.body {
            VerbBody::Write => {
                let line = args
                    .iter()
                    .map(Value::to_string)
                    .collect::<Vec<_>>()
                    .join(" ");
                self.output
                    .emit(&line)
                    .map_err(|e| EvalError::Output {
                        message: e.to_string(),
                        span,
                    })?;
                Ok(Value::Text(line))
            }
            VerbBody::Identity => Ok(args.into_iter().next().unwrap_or(Value::Nothing)),
            VerbBody::Constant(value) => Ok(value.clone()),
            VerbBody::Native(f) => f(&args).map_err(|message| {
                debug!(verb = %verb.name, %message, "native verb failed");
                EvalError::VerbFailed {
                    verb: verb.name.clone(),
                    message,
                    span,
                }
            }),
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Name resolution
    // ══════════════════════════════════════════════════════════════════════

    fn resolve_verb(&self, name: &Ident, scope: ScopeId) -> EvalResult<Rc<Verb>> {
        match self.scopes.lookup_verb(scope, &name.name) {
            Lookup::Found { value, .. } => Ok(Rc::clone(value)),
            Lookup::NotFound => Err(EvalError::UndefinedVerb {
                name: name.name.clone(),
                span: name.span,
            }),
        }
    }

    fn resolve_template(&self, name: &Ident, scope: ScopeId) -> EvalResult<ScopeId> {
        self.scopes
            .lookup_struct(scope, &name.name)
            .found()
            .ok_or_else(|| EvalError::UndefinedStruct {
                name: name.name.clone(),
                span: name.span,
            })
    }

    /// Resolve a single name using its declared type as a table hint.
    fn resolve_name(&self, name: &Ident, hint: Option<&TypeRef>, scope: ScopeId) -> EvalResult<Value> {
        match hint {
            Some(TypeRef::Builtin(BuiltinType {
                kind: BuiltinKind::Struct,
                ..
            })) => {
                let template = self.resolve_template(name, scope)?;
                Ok(Value::Struct(StructRef::template(name.name.clone(), template)))
            }
            Some(TypeRef::Builtin(BuiltinType {
                kind: BuiltinKind::Verb,
                ..
            })) => self.resolve_verb(name, scope).map(Value::Verb),
            _ => {
                if let Some(value) = self.scopes.lookup_noun(scope, &name.name).found() {
                    return Ok(value.clone());
                }
                match self.scopes.lookup_struct(scope, &name.name) {
                    Lookup::Found { value, .. } => Ok(Value::Struct(StructRef::template(
                        name.name.clone(),
                        value,
                    ))),
                    Lookup::NotFound => Err(EvalError::UndefinedNoun {
                        name: name.name.clone(),
                        span: name.span,
                    }),
                }
            }
        }
    }

    fn it_value(&self, scope: ScopeId, span: Span) -> EvalResult<Value> {
        self.scopes
            .it(scope)
            .cloned()
            .ok_or_else(|| EvalError::UndefinedNoun {
                name: "it".to_string(),
                span,
            })
    }

    /// Follow `noun`'s property chain to the scope that owns its last link.
    fn owner_of<'n>(&self, noun: &'n Noun, scope: ScopeId) -> EvalResult<(ScopeId, &'n Ident)> {
        match &noun.property {
            None => Ok((scope, &noun.name)),
            Some(property) => {
                let container = self.resolve_name(&noun.name, noun.ty.as_ref(), scope)?;
                let inner = struct_scope(&container, &noun.name.name, noun.name.span)?;
                self.owner_of(property, inner)
            }
        }
    }
}

/// The scope behind a struct value, or `NotAStruct`.
fn struct_scope(value: &Value, name: &str, span: Span) -> EvalResult<ScopeId> {
    match value {
        Value::Struct(s) => Ok(s.scope),
        other => Err(EvalError::NotAStruct {
            name: name.to_string(),
            found: other.type_name(),
            span,
        }),
    }
}

fn eval_text(text: &Text) -> EvalResult<Value> {
    resolve_escapes(&text.raw)
        .map(Value::Text)
        .map_err(|e| EvalError::InvalidEscape {
            sequence: e.sequence,
            span: text.span,
        })
}
