//! Shared types for the English Test Language (ETL).
//!
//! This crate defines the syntax tree handed from the grammar engine to the
//! evaluator and compiler, source spans, parse diagnostics, and the literal
//! conventions (number join, text escapes) both back ends must agree on.

mod error;
mod span;
pub mod ast;
pub mod literal;

pub use error::{CompileErrors, ErrorCategory, ErrorCode, EtlError, Severity, MAX_ERRORS};
pub use span::{SourceFile, Span};

/// Result type used by the grammar engine.
pub type Result<T> = std::result::Result<T, EtlError>;
