//! Source-to-tree and source-to-IR entry points.

use etl_codegen::{pretty, CodegenError, InstructionList};
use etl_lexer::Lexer;
use etl_parser::{ParseResult, Parser};
use etl_types::{CompileErrors, SourceFile};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

/// Lex and parse `source`. Lexical errors stop the pass before parsing.
pub fn parse(source: &str, file_name: &str) -> ParseResult {
    let source_file = SourceFile::new(file_name, source);
    let lexed = Lexer::new(&source_file).lex();
    if lexed.errors.has_errors() {
        debug!(file = file_name, errors = lexed.errors.total_errors, "lexing failed");
        return ParseResult {
            script: None,
            errors: lexed.errors,
        };
    }
    let result = Parser::new(lexed.tokens, &source_file).parse();
    if result.errors.has_errors() {
        debug!(file = file_name, errors = result.errors.total_errors, "parsing failed");
    }
    result
}

/// Why [`compile`] produced no IR.
#[derive(Debug, thiserror::Error)]
pub enum CompileFailure {
    #[error("{0}")]
    Parse(CompileErrors),
    #[error(transparent)]
    Codegen(#[from] CodegenError),
}

/// Parse `source` and compile it to IR. Never runs a verb.
pub fn compile(source: &str, file_name: &str) -> Result<InstructionList, CompileFailure> {
    let _span = tracing::debug_span!("compile", file = file_name).entered();
    let parsed = parse(source, file_name);
    let script = match parsed.script {
        Some(script) if !parsed.errors.has_errors() => script,
        _ => return Err(CompileFailure::Parse(parsed.errors)),
    };
    let ir = etl_codegen::compile(&script)?;
    debug!(items = ir.len(), "compiled");
    Ok(ir)
}

/// Structured, serializable outcome of [`compile`], for tooling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileResult {
    pub success: bool,
    /// IR as JSON, when compilation succeeded.
    pub ir: Option<serde_json::Value>,
    /// IR in the [`pretty`] layout, when compilation succeeded.
    pub rendered: Option<String>,
    /// Lexical and syntax diagnostics.
    pub errors: CompileErrors,
    /// Set when the tree parsed but could not be compiled.
    pub codegen_error: Option<String>,
    /// SHA-256 of the source, hex encoded.
    pub source_hash: String,
}

pub fn compile_to_result(source: &str, file_name: &str) -> CompileResult {
    let source_hash = source_hash(source);
    match compile(source, file_name) {
        Ok(ir) => match serde_json::to_value(&ir) {
            Ok(json) => CompileResult {
                success: true,
                rendered: Some(pretty::render(&ir)),
                ir: Some(json),
                errors: CompileErrors::empty(),
                codegen_error: None,
                source_hash,
            },
            Err(e) => failure(CompileErrors::empty(), Some(e.to_string()), source_hash),
        },
        Err(CompileFailure::Parse(errors)) => failure(errors, None, source_hash),
        Err(CompileFailure::Codegen(e)) => {
            failure(CompileErrors::empty(), Some(e.to_string()), source_hash)
        }
    }
}

fn failure(errors: CompileErrors, codegen_error: Option<String>, source_hash: String) -> CompileResult {
    CompileResult {
        success: false,
        ir: None,
        rendered: None,
        errors,
        codegen_error,
        source_hash,
    }
}

/// Hex SHA-256 of `source`, usable as a cache key for compiled IR.
pub fn source_hash(source: &str) -> String {
    Sha256::digest(source.as_bytes())
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_hash_known_value() {
        assert_eq!(
            source_hash(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(source_hash("write 1.").len(), 64);
    }

    #[test]
    fn test_lex_errors_stop_before_parse() {
        let result = parse("write \"open", "bad.etl");
        assert!(result.script.is_none());
        assert!(result
            .errors
            .errors
            .iter()
            .all(|e| e.category == etl_types::ErrorCategory::Lexical));
    }
}
