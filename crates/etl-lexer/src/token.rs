//! Token types for the ETL lexer.

use etl_types::ast::{BuiltinKind, CommentKind};
use etl_types::Span;
use std::fmt;

/// Reserved words. They never lex as [`TokenKind::Word`].
pub const ALL_KEYWORDS: &[&str] = &[
    "and", "the", "a", "an", "of", "to", "as", "create", "it", "its",
    "number", "text", "struct", "verb",
];

/// A single token with its source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Every token kind in ETL.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ── Literals ──────────────────────────────────────────────
    /// `3.14` split into its integer base and trailing-digit run.
    Number { base: u64, trail: String },
    /// Text between the quotes, escapes left unresolved.
    Text(String),

    /// `[A-Za-z][A-Za-z-]*` that is not a keyword.
    Word(String),

    // ── Keywords ──────────────────────────────────────────────
    And,
    The,
    A,
    An,
    Of,
    To,
    As,
    Create,
    It,
    /// `its` or `it's`
    Its,
    Type(BuiltinKind),

    // ── Punctuation ───────────────────────────────────────────
    Period,
    Comma,
    LParen,
    RParen,
    LBracket,
    RBracket,
    /// `'s`
    Possessive,

    // ── Math operators ────────────────────────────────────────
    Plus,
    Minus,
    Star,
    Slash,
    Caret,

    /// `-- ...` or `--[ ... ]--`
    Comment { kind: CommentKind, text: String },

    Eof,
}

impl TokenKind {
    /// Map a reserved word to its keyword token.
    pub fn from_keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "and" => TokenKind::And,
            "the" => TokenKind::The,
            "a" => TokenKind::A,
            "an" => TokenKind::An,
            "of" => TokenKind::Of,
            "to" => TokenKind::To,
            "as" => TokenKind::As,
            "create" => TokenKind::Create,
            "it" => TokenKind::It,
            "its" => TokenKind::Its,
            _ => return BuiltinKind::from_keyword(word).map(TokenKind::Type),
        };
        Some(kind)
    }

    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::And
                | TokenKind::The
                | TokenKind::A
                | TokenKind::An
                | TokenKind::Of
                | TokenKind::To
                | TokenKind::As
                | TokenKind::Create
                | TokenKind::It
                | TokenKind::Its
                | TokenKind::Type(_)
        )
    }

    /// True for the five math operators.
    pub fn is_math_operator(&self) -> bool {
        matches!(
            self,
            TokenKind::Plus | TokenKind::Minus | TokenKind::Star | TokenKind::Slash | TokenKind::Caret
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number { base, trail } if trail == "0" => write!(f, "{base}"),
            TokenKind::Number { base, trail } => write!(f, "{base}.{trail}"),
            TokenKind::Text(raw) => write!(f, "\"{raw}\""),
            TokenKind::Word(w) => write!(f, "{w}"),
            TokenKind::And => write!(f, "and"),
            TokenKind::The => write!(f, "the"),
            TokenKind::A => write!(f, "a"),
            TokenKind::An => write!(f, "an"),
            TokenKind::Of => write!(f, "of"),
            TokenKind::To => write!(f, "to"),
            TokenKind::As => write!(f, "as"),
            TokenKind::Create => write!(f, "create"),
            TokenKind::It => write!(f, "it"),
            TokenKind::Its => write!(f, "its"),
            TokenKind::Type(kind) => write!(f, "{kind}"),
            TokenKind::Period => write!(f, "."),
            TokenKind::Comma => write!(f, ","),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::LBracket => write!(f, "["),
            TokenKind::RBracket => write!(f, "]"),
            TokenKind::Possessive => write!(f, "'s"),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::Caret => write!(f, "^"),
            TokenKind::Comment { .. } => write!(f, "comment"),
            TokenKind::Eof => write!(f, "end of file"),
        }
    }
}
