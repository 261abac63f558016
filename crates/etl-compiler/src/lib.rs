//! ETL pipeline: ties the grammar engine to both back ends.
//!
//! ```text
//! ETL Source → Lexer → Parser ─┬─ Evaluator (Runtime::run) → Value + output
//!                              └─ Compiler  (compile)      → InstructionList
//! ```

mod pipeline;
mod runtime;

pub use pipeline::{
    compile, compile_to_result, parse, source_hash, CompileFailure, CompileResult,
};
pub use runtime::{RunError, Runtime, RuntimeConfig};

pub use etl_codegen::{pretty, CodegenError, Instr, InstructionList, Special};
pub use etl_eval::{
    CapturedOutput, ErrorKind, EvalError, Output, ScopeId, StdoutOutput, Value, VerbBody,
};
pub use etl_parser::ParseResult;
pub use etl_types::{CompileErrors, EtlError};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber for the pipeline's debug events.
///
/// Does nothing unless `RUST_LOG` is set; filtering follows its value
/// (e.g. `RUST_LOG=etl_eval=trace`). Safe to call more than once, and a
/// no-op when the host has already installed a global subscriber.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .try_init()
                .ok();
        }
    });
}
