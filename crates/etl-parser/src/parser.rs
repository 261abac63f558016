//! Core parser infrastructure: token cursor, comment side-channel, errors.

use std::collections::VecDeque;

use etl_lexer::token::{Token, TokenKind};
use etl_types::ast::{Comment, Ident, Item, Script};
use etl_types::{CompileErrors, ErrorCode, EtlError, SourceFile, Span};

/// Deepest combined nesting of math groups, bracketed arguments, and `'s`
/// property chains.
pub const MAX_NESTING_DEPTH: u32 = 64;

/// The ETL parser.
///
/// Consumes the lexer's tokens and builds a [`Script`]. Collects errors
/// and resynchronises at the next sentence boundary.
pub struct Parser<'src> {
    /// Tokens with comments removed.
    tokens: Vec<Token>,
    pos: usize,
    /// Comments keyed by the number of non-comment tokens before them.
    comments: VecDeque<(usize, Comment)>,
    source_file: &'src SourceFile,
    errors: CompileErrors,
    depth: u32,
}

/// Result of parsing.
///
/// `script` is `None` when the source could not be parsed; `errors` then
/// explains why.
pub struct ParseResult {
    pub script: Option<Script>,
    pub errors: CompileErrors,
}

impl<'src> Parser<'src> {
    pub fn new(tokens: Vec<Token>, source_file: &'src SourceFile) -> Self {
        let mut code = Vec::with_capacity(tokens.len());
        let mut comments = VecDeque::new();
        for token in tokens {
            match token.kind {
                TokenKind::Comment { kind, text } => comments.push_back((
                    code.len(),
                    Comment {
                        kind,
                        text,
                        span: token.span,
                    },
                )),
                _ => code.push(token),
            }
        }
        if code.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            let span = code.last().map(|t| t.span).unwrap_or_default();
            code.push(Token::new(TokenKind::Eof, span));
        }

        Self {
            tokens: code,
            pos: 0,
            comments,
            source_file,
            errors: CompileErrors::empty(),
            depth: 0,
        }
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    pub(crate) fn peek(&self) -> &Token {
        // `new` guarantees a trailing Eof, and `advance` never moves past it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::default()
        }
    }

    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn look_ahead(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    pub(crate) fn expect(&mut self, expected: &TokenKind) -> Option<Token> {
        if self.check(expected) {
            Some(self.advance())
        } else {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected '{}', got '{}'", expected, self.peek_kind()),
            );
            None
        }
    }

    pub(crate) fn expect_word(&mut self, what: &str) -> Option<Ident> {
        match self.peek_kind().clone() {
            TokenKind::Word(name) => {
                let span = self.advance().span;
                Some(Ident::new(name, span))
            }
            other => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected {what}, got '{other}'"),
                );
                None
            }
        }
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    pub(crate) fn error_at_current(&mut self, code: ErrorCode, message: impl Into<String>) {
        let span = self.current_span();
        self.error_at(code, message, span);
    }

    pub(crate) fn error_at(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let error = self.make_error(code, message, span);
        self.errors.push_error(error);
    }

    pub(crate) fn make_error(&self, code: ErrorCode, message: impl Into<String>, span: Span) -> EtlError {
        let source_line = self
            .source_file
            .line(span.start_line)
            .unwrap_or("")
            .to_string();
        EtlError::new(&self.source_file.name, code, message, span, source_line)
    }

    pub(crate) fn push_error(&mut self, error: EtlError) {
        self.errors.push_error(error);
    }

    pub(crate) fn errors_reported(&self) -> bool {
        self.errors.has_errors()
    }

    pub(crate) fn too_many_errors(&self) -> bool {
        self.errors.total_errors >= etl_types::MAX_ERRORS
    }

    // ── Nesting ───────────────────────────────────────────────────────────────

    /// Run `parse` one nesting level deeper. Past [`MAX_NESTING_DEPTH`] it
    /// reports E204 instead, so the recursive descent stays bounded.
    pub(crate) fn nested<T>(
        &mut self,
        what: &str,
        parse: impl FnOnce(&mut Self) -> Option<T>,
    ) -> Option<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            self.error_at_current(
                ErrorCode::NESTING_TOO_DEEP,
                format!("{what} nested deeper than {MAX_NESTING_DEPTH} levels"),
            );
            return None;
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    // ── Synchronization ───────────────────────────────────────────────────────

    /// Skip past the next `.` so parsing can resume at the next sentence.
    pub(crate) fn synchronize(&mut self) {
        while !self.at_end() {
            if self.advance().kind == TokenKind::Period {
                return;
            }
        }
    }

    // ── Comments ──────────────────────────────────────────────────────────────

    /// Move every comment that precedes the cursor into `items`.
    pub(crate) fn flush_comments(&mut self, items: &mut Vec<Item>) {
        while self
            .comments
            .front()
            .is_some_and(|(at, _)| *at <= self.pos || self.at_end())
        {
            if let Some((_, comment)) = self.comments.pop_front() {
                items.push(Item::Comment(comment));
            }
        }
    }

    // ── Public API ────────────────────────────────────────────────────────────

    /// Parse the token stream into a [`Script`].
    pub fn parse(mut self) -> ParseResult {
        let script = self.parse_script();
        let script = if self.errors.has_errors() { None } else { script };
        ParseResult {
            script,
            errors: self.errors,
        }
    }
}
