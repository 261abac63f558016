//! Core ETL lexer: converts script text to a token stream.
//!
//! - Words are `[A-Za-z][A-Za-z-]*`; reserved words become keyword tokens
//! - Text literals keep their escapes raw; resolution happens at evaluation
//! - `--` line comments and `--[ ... ]--` block comments become tokens so
//!   the parser can keep them in the script
//! - Error recovery: collects up to [`etl_types::MAX_ERRORS`] errors

use etl_types::ast::CommentKind;
use etl_types::literal::normalize_trail;
use etl_types::{CompileErrors, ErrorCode, EtlError, SourceFile, Span};

use crate::token::{Token, TokenKind};

/// The ETL lexer.
pub struct Lexer<'src> {
    source: &'src [u8],
    source_file: &'src SourceFile,
    /// Current byte offset into `source`.
    pos: usize,
    /// Current line (1-based).
    line: u32,
    /// Current column (1-based).
    col: u32,
    errors: CompileErrors,
}

/// Result of lexing: tokens plus any errors collected.
pub struct LexResult {
    /// Always ends with [`TokenKind::Eof`].
    pub tokens: Vec<Token>,
    pub errors: CompileErrors,
}

impl<'src> Lexer<'src> {
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            source: source_file.source.as_bytes(),
            source_file,
            pos: 0,
            line: 1,
            col: 1,
            errors: CompileErrors::empty(),
        }
    }

    /// Lex the whole source file.
    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::new();

        loop {
            if self.errors.total_errors >= etl_types::MAX_ERRORS {
                break;
            }
            let token = self.scan();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            tokens.push(Token::new(TokenKind::Eof, self.current_span()));
        }

        LexResult {
            tokens,
            errors: self.errors,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else if ch & 0xC0 != 0x80 {
            // Continuation bytes of a UTF-8 sequence share their char's column.
            self.col += 1;
        }
        Some(ch)
    }

    fn current_span(&self) -> Span {
        Span::point(self.line, self.col)
    }

    fn span_from(&self, start_line: u32, start_col: u32) -> Span {
        Span::new(
            start_line,
            start_col,
            self.line,
            self.col.saturating_sub(1).max(1),
        )
    }

    /// Source text between a byte offset and the cursor.
    fn lexeme(&self, start: usize) -> &'src str {
        std::str::from_utf8(&self.source[start..self.pos]).unwrap_or("")
    }

    fn emit_error(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self
            .source_file
            .line(span.start_line)
            .unwrap_or("")
            .to_string();
        let err = EtlError::new(&self.source_file.name, code, message, span, source_line);
        self.errors.push_error(err);
    }

    // ─────────────────────────────────────────────────────────────
    // Scanning
    // ─────────────────────────────────────────────────────────────

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.advance();
        }
    }

    fn scan(&mut self) -> Token {
        self.skip_whitespace();

        let start_line = self.line;
        let start_col = self.col;
        let start = self.pos;

        let Some(ch) = self.advance() else {
            return Token::new(TokenKind::Eof, self.current_span());
        };

        let kind = match ch {
            b'"' => self.scan_text(start_line, start_col),
            b'0'..=b'9' => self.scan_number(start, start_line, start_col),
            b'a'..=b'z' | b'A'..=b'Z' => self.scan_word(start),

            b'-' if self.peek() == Some(b'-') => {
                self.advance();
                self.scan_comment(start_line, start_col)
            }

            b'\'' => {
                let ends_word = !matches!(self.peek_at(1), Some(b'a'..=b'z' | b'A'..=b'Z'));
                if self.peek() == Some(b's') && ends_word {
                    self.advance();
                    TokenKind::Possessive
                } else {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error(
                        ErrorCode::MISPLACED_APOSTROPHE,
                        "an apostrophe may only appear in a possessive ('s)",
                        span,
                    );
                    return self.scan();
                }
            }

            b'.' => TokenKind::Period,
            b',' => TokenKind::Comma,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'^' => TokenKind::Caret,

            _ => {
                // Swallow the rest of a multi-byte character.
                while matches!(self.peek(), Some(b) if b & 0xC0 == 0x80) {
                    self.advance();
                }
                let span = self.span_from(start_line, start_col);
                let found = self.lexeme(start).to_string();
                self.emit_error(
                    ErrorCode::UNEXPECTED_CHARACTER,
                    format!("unexpected character '{found}'"),
                    span,
                );
                return self.scan();
            }
        };

        Token::new(kind, self.span_from(start_line, start_col))
    }

    /// Digits, then optionally `.` and more digits. A `.` that is not
    /// followed by a digit ends the sentence instead.
    fn scan_number(&mut self, start: usize, start_line: u32, start_col: u32) -> TokenKind {
        while let Some(b'0'..=b'9') = self.peek() {
            self.advance();
        }
        let base_text = self.lexeme(start);

        let mut trail_text = "";
        if self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(b'0'..=b'9')) {
            self.advance();
            let trail_start = self.pos;
            while let Some(b'0'..=b'9') = self.peek() {
                self.advance();
            }
            trail_text = self.lexeme(trail_start);
        }

        let trail = normalize_trail(trail_text);
        match base_text.parse::<u64>() {
            Ok(base) => TokenKind::Number { base, trail },
            Err(_) => {
                let span = self.span_from(start_line, start_col);
                self.emit_error(
                    ErrorCode::NUMBER_OUT_OF_RANGE,
                    format!("number literal '{}' is too large", self.lexeme(start)),
                    span,
                );
                TokenKind::Number {
                    base: 0,
                    trail: "0".into(),
                }
            }
        }
    }

    /// A word may contain single hyphens between letters (`high-score`).
    fn scan_word(&mut self, start: usize) -> TokenKind {
        loop {
            match self.peek() {
                Some(b'a'..=b'z' | b'A'..=b'Z') => {
                    self.advance();
                }
                Some(b'-') if matches!(self.peek_at(1), Some(b'a'..=b'z' | b'A'..=b'Z')) => {
                    self.advance();
                }
                _ => break,
            }
        }

        let text = self.lexeme(start);
        TokenKind::from_keyword(text).unwrap_or_else(|| TokenKind::Word(text.to_string()))
    }

    /// Scan a text literal after its opening quote.
    fn scan_text(&mut self, start_line: u32, start_col: u32) -> TokenKind {
        let content_start = self.pos;

        loop {
            match self.peek() {
                None => {
                    let raw = self.lexeme(content_start).to_string();
                    let span = self.span_from(start_line, start_col);
                    self.emit_error(
                        ErrorCode::UNTERMINATED_TEXT,
                        "unterminated text literal",
                        span,
                    );
                    return TokenKind::Text(raw);
                }
                Some(b'"') => {
                    let raw = self.lexeme(content_start).to_string();
                    self.advance();
                    return TokenKind::Text(raw);
                }
                Some(b'\\') => {
                    // Keep the escape raw; only make sure `\"` does not end the text.
                    self.advance();
                    self.advance();
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    /// Scan a comment after its leading `--`.
    fn scan_comment(&mut self, start_line: u32, start_col: u32) -> TokenKind {
        if self.peek() == Some(b'[') {
            self.advance();
            let body_start = self.pos;
            loop {
                match self.peek() {
                    None => {
                        let text = self.lexeme(body_start).trim().to_string();
                        let span = self.span_from(start_line, start_col);
                        self.emit_error(
                            ErrorCode::UNTERMINATED_COMMENT,
                            "block comment is missing its closing ']--'",
                            span,
                        );
                        return TokenKind::Comment {
                            kind: CommentKind::Block,
                            text,
                        };
                    }
                    Some(b']') if self.peek_at(1) == Some(b'-') && self.peek_at(2) == Some(b'-') => {
                        let text = self.lexeme(body_start).trim().to_string();
                        self.advance();
                        self.advance();
                        self.advance();
                        return TokenKind::Comment {
                            kind: CommentKind::Block,
                            text,
                        };
                    }
                    Some(_) => {
                        self.advance();
                    }
                }
            }
        }

        let body_start = self.pos;
        while let Some(ch) = self.peek() {
            if ch == b'\n' {
                break;
            }
            self.advance();
        }
        TokenKind::Comment {
            kind: CommentKind::Line,
            text: self.lexeme(body_start).trim().to_string(),
        }
    }
}
