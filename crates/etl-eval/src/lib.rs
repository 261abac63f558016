//! ETL tree-walking evaluator.
//!
//! Executes a [`Script`](etl_types::ast::Script) directly against a chain of
//! [`Scope`]s, producing side effects (through an [`Output`]) and a final
//! [`Value`].

pub mod error;
pub mod evaluator;
pub mod math;
pub mod output;
pub mod scope;
pub mod value;

pub use error::{ErrorKind, EvalError, EvalResult};
pub use evaluator::{Evaluator, DEFAULT_GAS_LIMIT};
pub use output::{CapturedOutput, Output, StdoutOutput};
pub use scope::{Lookup, Scope, ScopeArena, ScopeError, ScopeId};
pub use value::{NativeFn, StructKind, StructRef, Value, Verb, VerbBody};
