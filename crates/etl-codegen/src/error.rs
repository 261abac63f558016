//! Codegen error types.

use etl_types::Span;
use thiserror::Error;

/// Errors that can occur while compiling a syntax tree to IR.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodegenError {
    /// A text literal contains an unrecognised backslash sequence.
    #[error("{span}: invalid escape sequence '{sequence}' in text")]
    InvalidEscape { sequence: String, span: Span },

    /// A node violates a structural invariant the parser guarantees.
    #[error("internal invariant violation at {span}: {message}")]
    InternalInvariantViolation { message: String, span: Span },
}

/// Codegen result type alias.
pub type CodegenResult<T> = Result<T, CodegenError>;
