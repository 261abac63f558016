//! Syntax tree for ETL scripts.
//!
//! Every node carries a [`Span`] for error reporting. Nodes are built once
//! per parse and never mutated afterwards; both the evaluator and the
//! compiler walk them by shared reference.

use crate::Span;
use std::fmt;

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// A complete script: sentences and comments in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub items: Vec<Item>,
    pub span: Span,
}

impl Script {
    /// The sentences of the script, skipping comments.
    pub fn sentences(&self) -> impl Iterator<Item = &Sentence> {
        self.items.iter().filter_map(|item| match item {
            Item::Sentence(sentence) => Some(sentence),
            Item::Comment(_) => None,
        })
    }
}

/// A top-level element of a script.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Sentence(Sentence),
    Comment(Comment),
}

/// `-- note` or `--[ note ]--`.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub kind: CommentKind,
    /// Payload without the delimiters.
    pub text: String,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    Line,
    Block,
}

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Sentences & Clauses
// ══════════════════════════════════════════════════════════════════════════════

/// `write "hi", and write it.`
///
/// A leading clause followed by zero or more "and"-joined clauses.
#[derive(Debug, Clone, PartialEq)]
pub struct Sentence {
    pub leading: Clause,
    pub joined: Vec<Clause>,
    pub span: Span,
}

impl Sentence {
    /// All clauses in execution order.
    pub fn clauses(&self) -> impl Iterator<Item = &Clause> {
        std::iter::once(&self.leading).chain(self.joined.iter())
    }
}

/// One "and"-separated part of a sentence.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Statement(Statement),
    Assignment(Assignment),
    Creation(Creation),
}

impl Clause {
    pub fn span(&self) -> Span {
        match self {
            Clause::Statement(s) => s.span,
            Clause::Assignment(a) => a.span,
            Clause::Creation(c) => c.span,
        }
    }
}

/// A verb followed by comma-delimited arguments: `give bob, 5`.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub verb: Ident,
    pub arguments: Vec<Argument>,
    pub span: Span,
}

/// `set the game's description to "weird"`
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub verb: Ident,
    pub from: Target,
    pub to: Box<Argument>,
    pub span: Span,
}

/// The noun an assignment binds: a named noun, or `it` / `its property`.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Noun(Noun),
    It(It),
}

impl Target {
    pub fn span(&self) -> Span {
        match self {
            Target::Noun(noun) => noun.span,
            Target::It(it) => it.span,
        }
    }
}

/// `create the number score as 5`
#[derive(Debug, Clone, PartialEq)]
pub struct Creation {
    pub noun: TypedNoun,
    pub value: Option<Box<Argument>>,
    pub span: Span,
}

/// The declared target of a creation: a name, its type, and an optional
/// property chain naming where inside a struct the binding lives.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedNoun {
    pub name: Ident,
    pub ty: TypeRef,
    pub property: Option<Box<Noun>>,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Arguments
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub kind: ArgumentKind,
    pub span: Span,
}

impl Argument {
    pub fn new(kind: ArgumentKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentKind {
    /// `[write "hi"]`
    Inline(Box<Statement>),
    /// `[set x to 5]`
    Assignment(Box<Assignment>),
    Noun(Noun),
    It(It),
    Math(Math),
    /// Bare `number`, `text`, `struct` or `verb`.
    BuiltinType(BuiltinType),
    /// `a game`
    StructType(StructType),
    Number(Number),
    Text(Text),
}

/// `the game's description`, `the number of apples`, `score`.
#[derive(Debug, Clone, PartialEq)]
pub struct Noun {
    pub name: Ident,
    /// Declared type; a lookup hint only, never checked at runtime.
    pub ty: Option<TypeRef>,
    pub property: Option<Box<Noun>>,
    pub span: Span,
}

/// `it`, `its description`.
#[derive(Debug, Clone, PartialEq)]
pub struct It {
    pub property: Option<Box<Noun>>,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Math
// ══════════════════════════════════════════════════════════════════════════════

/// `(3 + 4 * 2)`: a base term and operations folded left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct Math {
    pub base: MathTerm,
    pub operations: Vec<MathOperation>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MathOperation {
    pub operator: MathOperator,
    pub term: MathTerm,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MathTerm {
    Number(Number),
    Noun(Noun),
    It(It),
    Math(Box<Math>),
}

impl MathTerm {
    pub fn span(&self) -> Span {
        match self {
            MathTerm::Number(n) => n.span,
            MathTerm::Noun(n) => n.span,
            MathTerm::It(it) => it.span,
            MathTerm::Math(m) => m.span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MathOperator {
    pub op: MathOp,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MathOp {
    Add,
    Subtract,
    Divide,
    Exponent,
    Multiply,
}

impl MathOp {
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '+' => Some(MathOp::Add),
            '-' => Some(MathOp::Subtract),
            '/' => Some(MathOp::Divide),
            '^' => Some(MathOp::Exponent),
            '*' => Some(MathOp::Multiply),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            MathOp::Add => "+",
            MathOp::Subtract => "-",
            MathOp::Divide => "/",
            MathOp::Exponent => "^",
            MathOp::Multiply => "*",
        }
    }
}

impl fmt::Display for MathOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Types
// ══════════════════════════════════════════════════════════════════════════════

/// A type position: either a builtin kind or a named struct type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    Builtin(BuiltinType),
    Struct(StructType),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuiltinType {
    pub kind: BuiltinKind,
    pub span: Span,
}

/// The four foundational kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BuiltinKind {
    Number,
    Text,
    Struct,
    Verb,
}

impl BuiltinKind {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "number" => Some(BuiltinKind::Number),
            "text" => Some(BuiltinKind::Text),
            "struct" => Some(BuiltinKind::Struct),
            "verb" => Some(BuiltinKind::Verb),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            BuiltinKind::Number => "number",
            BuiltinKind::Text => "text",
            BuiltinKind::Struct => "struct",
            BuiltinKind::Verb => "verb",
        }
    }
}

impl fmt::Display for BuiltinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A reference to a struct definition by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Struct {
    pub name: Ident,
}

/// A struct used in type position: `create the game zuuup`.
#[derive(Debug, Clone, PartialEq)]
pub struct StructType {
    pub strukt: Struct,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Literals
// ══════════════════════════════════════════════════════════════════════════════

/// `3.14` as written: the integer base and the integer trailing-digit run.
///
/// `trail` is the digit run read as an integer, kept as text so any length
/// is accepted: `3.04` and `3.4` both carry `"4"`. See
/// [`crate::literal::join_number`].
#[derive(Debug, Clone, PartialEq)]
pub struct Number {
    pub base: u64,
    pub trail: String,
    pub span: Span,
}

/// A double-quoted literal with its escapes still unresolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub raw: String,
    pub span: Span,
}
