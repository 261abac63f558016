//! ETL instruction compiler: turns a parsed [`Script`](etl_types::ast::Script)
//! into a nested, inert intermediate representation.
//!
//! Compilation is pure. No verb is invoked and no scope is touched, so the
//! resulting [`InstructionList`] can be retained, serialized, or discarded
//! freely.
//!
//! # Shape
//!
//! - a script is a list of compiled sentences and comments
//! - a sentence is a list of compiled clauses
//! - a statement is `[verb, args...]`
//! - every other node is a [`Special`]: a record keyed by tag
//!   (`verb`, `iexpr`, `noun`, `type`, `prop`, `math`, `struct`, `bit`,
//!   `srt`, `comment`, `create`, `as`, `from`, `to`)

pub mod compiler;
pub mod error;
pub mod ir;
pub mod pretty;

pub use compiler::compile;
pub use error::{CodegenError, CodegenResult};
pub use ir::{Instr, InstructionList, Special};
