//! Runtime error types for the ETL evaluator.

use std::fmt;

use etl_types::Span;

use crate::scope::ScopeError;

/// Evaluation error. Any of these aborts the current run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("{span}: undefined verb '{name}'")]
    UndefinedVerb { name: String, span: Span },

    #[error("{span}: undefined noun '{name}'")]
    UndefinedNoun { name: String, span: Span },

    #[error("{span}: undefined struct '{name}'")]
    UndefinedStruct { name: String, span: Span },

    /// Math over a non-number, division by zero, or a non-finite result.
    #[error("{span}: invalid expression: {message}")]
    InvalidExpression { message: String, span: Span },

    #[error("{span}: invalid escape sequence '{sequence}' in text")]
    InvalidEscape { sequence: String, span: Span },

    /// Property access (`x's y`, `its y`) on something that is not a struct.
    #[error("{span}: '{name}' is a {found}, not a struct")]
    NotAStruct {
        name: String,
        found: &'static str,
        span: Span,
    },

    #[error("{span}: verb '{verb}' failed: {message}")]
    VerbFailed {
        verb: String,
        message: String,
        span: Span,
    },

    #[error("{span}: output failed: {message}")]
    Output { message: String, span: Span },

    #[error(transparent)]
    Scope(#[from] ScopeError),

    #[error("gas exhausted")]
    GasExhausted,
}

impl EvalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UndefinedVerb { .. } => ErrorKind::UndefinedVerb,
            Self::UndefinedNoun { .. } => ErrorKind::UndefinedNoun,
            Self::UndefinedStruct { .. } => ErrorKind::UndefinedStruct,
            Self::InvalidExpression { .. } => ErrorKind::InvalidExpression,
            Self::InvalidEscape { .. } => ErrorKind::InvalidEscape,
            Self::NotAStruct { .. } => ErrorKind::NotAStruct,
            Self::VerbFailed { .. } => ErrorKind::VerbFailed,
            Self::Output { .. } => ErrorKind::Output,
            Self::Scope(_) => ErrorKind::Scope,
            Self::GasExhausted => ErrorKind::GasExhausted,
        }
    }

    /// Source position of the failing node, when there is one.
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::UndefinedVerb { span, .. }
            | Self::UndefinedNoun { span, .. }
            | Self::UndefinedStruct { span, .. }
            | Self::InvalidExpression { span, .. }
            | Self::InvalidEscape { span, .. }
            | Self::NotAStruct { span, .. }
            | Self::VerbFailed { span, .. }
            | Self::Output { span, .. } => Some(*span),
            Self::Scope(_) | Self::GasExhausted => None,
        }
    }
}

/// Stable, payload-free tag for an [`EvalError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UndefinedVerb,
    UndefinedNoun,
    UndefinedStruct,
    InvalidExpression,
    InvalidEscape,
    NotAStruct,
    VerbFailed,
    Output,
    Scope,
    GasExhausted,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UndefinedVerb => "undefined_verb",
            Self::UndefinedNoun => "undefined_noun",
            Self::UndefinedStruct => "undefined_struct",
            Self::InvalidExpression => "invalid_expression",
            Self::InvalidEscape => "invalid_escape",
            Self::NotAStruct => "not_a_struct",
            Self::VerbFailed => "verb_failed",
            Self::Output => "output",
            Self::Scope => "scope",
            Self::GasExhausted => "gas_exhausted",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result alias for evaluator operations.
pub type EvalResult<T> = Result<T, EvalError>;
