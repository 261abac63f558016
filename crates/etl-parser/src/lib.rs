//! ETL parser: converts a token stream into a [`Script`](etl_types::ast::Script).

mod parse_argument;
mod parse_sentence;
mod parser;

pub use parser::{ParseResult, Parser, MAX_NESTING_DEPTH};
