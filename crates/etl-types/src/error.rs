use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of diagnostics kept before the grammar engine gives up.
pub const MAX_ERRORS: usize = 20;

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Diagnostic category, determined by error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Lexical,
    Syntax,
}

/// Numeric diagnostic code (E100–E299).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Lexical errors (E100–E199) ──
    pub const UNEXPECTED_CHARACTER: Self = Self(100);
    pub const UNTERMINATED_TEXT: Self = Self(101);
    pub const UNTERMINATED_COMMENT: Self = Self(102);
    pub const MISPLACED_APOSTROPHE: Self = Self(103);
    pub const NUMBER_OUT_OF_RANGE: Self = Self(104);

    // ── Syntax errors (E200–E299) ──
    pub const UNEXPECTED_TOKEN: Self = Self(200);
    pub const MISSING_PERIOD: Self = Self(201);
    pub const EMPTY_SCRIPT: Self = Self(202);
    pub const INVALID_INLINE: Self = Self(203);
    pub const NESTING_TOO_DEEP: Self = Self(204);

    pub fn category(self) -> ErrorCategory {
        match self.0 {
            100..=199 => ErrorCategory::Lexical,
            _ => ErrorCategory::Syntax,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lexical => write!(f, "lexical"),
            Self::Syntax => write!(f, "syntax"),
        }
    }
}

/// A structured diagnostic produced while turning source text into a
/// [`Script`](crate::ast::Script).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtlError {
    pub file: String,
    pub code: ErrorCode,
    pub severity: Severity,
    pub category: ErrorCategory,
    pub message: String,
    #[serde(flatten)]
    pub span: Span,
    /// The offending source line, for context.
    pub source_line: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl EtlError {
    pub fn new(
        file: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            code,
            severity: Severity::Error,
            category: code.category(),
            message: message.into(),
            span,
            source_line: source_line.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for EtlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {} [{}] {}",
            self.file, self.span, self.code, self.category, self.message
        )
    }
}

impl std::error::Error for EtlError {}

/// Every diagnostic from one lex + parse pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompileErrors {
    pub errors: Vec<EtlError>,
    pub warnings: Vec<EtlError>,
    pub total_errors: usize,
    pub total_warnings: usize,
}

impl CompileErrors {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// Record an error; only the first [`MAX_ERRORS`] are kept, all are counted.
    pub fn push_error(&mut self, error: EtlError) {
        if self.errors.len() < MAX_ERRORS {
            self.errors.push(error);
        }
        self.total_errors += 1;
    }

    pub fn push_warning(&mut self, warning: EtlError) {
        self.warnings.push(warning);
        self.total_warnings += 1;
    }

    /// Fold another pass's diagnostics into this one.
    pub fn extend(&mut self, other: CompileErrors) {
        let dropped = other.total_errors.saturating_sub(other.errors.len());
        for error in other.errors {
            self.push_error(error);
        }
        self.total_errors += dropped;
        for warning in other.warnings {
            self.push_warning(warning);
        }
    }
}

impl fmt::Display for CompileErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        if self.total_errors > self.errors.len() {
            write!(f, "\n... and {} more", self.total_errors - self.errors.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(code: ErrorCode) -> EtlError {
        EtlError::new(
            "game.etl",
            code,
            "expected '.' at end of sentence",
            Span::new(1, 11, 1, 11),
            "write \"hi\"",
        )
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::UNTERMINATED_TEXT.category(), ErrorCategory::Lexical);
        assert_eq!(ErrorCode::NUMBER_OUT_OF_RANGE.category(), ErrorCategory::Lexical);
        assert_eq!(ErrorCode::MISSING_PERIOD.category(), ErrorCategory::Syntax);
        assert_eq!(ErrorCode::INVALID_INLINE.category(), ErrorCategory::Syntax);
        assert_eq!(ErrorCode::NESTING_TOO_DEEP.category(), ErrorCategory::Syntax);
    }

    #[test]
    fn test_error_display() {
        let err = sample(ErrorCode::MISSING_PERIOD);
        assert_eq!(
            err.to_string(),
            "game.etl:1:11: E201 [syntax] expected '.' at end of sentence"
        );
    }

    #[test]
    fn test_error_with_suggestion() {
        let err = sample(ErrorCode::MISSING_PERIOD).with_suggestion("end the sentence with '.'");
        assert_eq!(err.suggestion.as_deref(), Some("end the sentence with '.'"));
    }

    #[test]
    fn test_error_json_shape() {
        let err = sample(ErrorCode::MISSING_PERIOD);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], 201);
        assert_eq!(json["category"], "syntax");
        assert_eq!(json["start_line"], 1);
        assert!(json.get("suggestion").is_none());
    }

    #[test]
    fn test_compile_errors_cap() {
        let mut errs = CompileErrors::empty();
        for _ in 0..25 {
            errs.push_error(sample(ErrorCode::UNEXPECTED_TOKEN));
        }
        assert_eq!(errs.errors.len(), MAX_ERRORS);
        assert_eq!(errs.total_errors, 25);
        assert!(errs.to_string().ends_with("... and 5 more"));
    }

    #[test]
    fn test_compile_errors_extend_keeps_totals() {
        let mut lexed = CompileErrors::empty();
        lexed.push_error(sample(ErrorCode::UNTERMINATED_TEXT));
        let mut parsed = CompileErrors::empty();
        for _ in 0..22 {
            parsed.push_error(sample(ErrorCode::UNEXPECTED_TOKEN));
        }
        lexed.extend(parsed);
        assert_eq!(lexed.total_errors, 23);
        assert_eq!(lexed.errors.len(), MAX_ERRORS);
    }
}
