//! Runtime values and verbs.

use std::fmt;
use std::rc::Rc;

use etl_types::ast::BuiltinKind;

use crate::scope::ScopeId;

/// A value produced by evaluation.
#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    Text(String),
    Struct(StructRef),
    Verb(Rc<Verb>),
    /// A bare builtin type used as an argument: `describe number.`
    Type(BuiltinKind),
    /// Result of a verb that produces nothing.
    Nothing,
}

impl Value {
    /// The foundational kind of this value, if it has one.
    pub fn kind(&self) -> Option<BuiltinKind> {
        match self {
            Value::Number(_) => Some(BuiltinKind::Number),
            Value::Text(_) => Some(BuiltinKind::Text),
            Value::Struct(_) => Some(BuiltinKind::Struct),
            Value::Verb(_) => Some(BuiltinKind::Verb),
            Value::Type(_) | Value::Nothing => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Type(_) => "type",
            Value::Nothing => "nothing",
            other => other.kind().map(BuiltinKind::keyword).unwrap_or("nothing"),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructRef> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Struct(a), Value::Struct(b)) => a == b,
            (Value::Verb(a), Value::Verb(b)) => Rc::ptr_eq(a, b),
            (Value::Type(a), Value::Type(b)) => a == b,
            (Value::Nothing, Value::Nothing) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Numbers always show a fractional part: `14.0`, `3.14`.
            Value::Number(n) if n.is_finite() && n.fract() == 0.0 => write!(f, "{n:.1}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(t) => f.write_str(t),
            Value::Struct(s) => write!(f, "{s}"),
            Value::Verb(v) => write!(f, "<verb {}>", v.name),
            Value::Type(kind) => write!(f, "{kind}"),
            Value::Nothing => Ok(()),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Structs
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructKind {
    /// The definition created by `create the struct game.`
    Template,
    /// A value created by `create the game zuuup.`
    Instance,
}

/// A handle to a struct's scope, named after its struct type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructRef {
    pub name: String,
    pub scope: ScopeId,
    pub kind: StructKind,
}

impl StructRef {
    pub fn template(name: impl Into<String>, scope: ScopeId) -> Self {
        Self {
            name: name.into(),
            scope,
            kind: StructKind::Template,
        }
    }

    pub fn instance(name: impl Into<String>, scope: ScopeId) -> Self {
        Self {
            name: name.into(),
            scope,
            kind: StructKind::Instance,
        }
    }
}

impl fmt::Display for StructRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            StructKind::Template => write!(f, "<struct {}>", self.name),
            StructKind::Instance => write!(f, "<{}>", self.name),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Verbs
// ══════════════════════════════════════════════════════════════════════════════

/// Host-provided verb body. An `Err` aborts the run with `VerbFailed`.
pub type NativeFn = Rc<dyn Fn(&[Value]) -> Result<Value, String>>;

/// A named callable.
///
/// `params` documents the expected argument kinds; calls are never checked
/// against it.
#[derive(Debug)]
pub struct Verb {
    pub name: String,
    pub params: Vec<BuiltinKind>,
    pub body: VerbBody,
}

impl Verb {
    pub fn new(name: impl Into<String>, params: Vec<BuiltinKind>, body: VerbBody) -> Self {
        Self {
            name: name.into(),
            params,
            body,
        }
    }
}

pub enum VerbBody {
    /// Emit the arguments to the runtime output.
    Write,
    /// Return the first argument unchanged.
    Identity,
    /// Return a fixed value (`create the verb greeting as "hi"`).
    Constant(Value),
    Native(NativeFn),
}

impl fmt::Debug for VerbBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerbBody::Write => f.write_str("Write"),
            VerbBody::Identity => f.write_str("Identity"),
            VerbBody::Constant(v) => f.debug_tuple("Constant").field(v).finish(),
            VerbBody::Native(_) => f.write_str("Native(..)"),
        }
    }
}
