//! Argument parsing: inline statements, nouns, `it`, math, types, literals.

use etl_lexer::token::TokenKind;
use etl_types::ast::*;
use etl_types::ErrorCode;

use crate::parser::Parser;

impl<'src> Parser<'src> {
    /// True when the cursor can begin an argument.
    pub(crate) fn starts_argument(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::LBracket
                | TokenKind::LParen
                | TokenKind::Number { .. }
                | TokenKind::Text(_)
                | TokenKind::Type(_)
                | TokenKind::A
                | TokenKind::An
                | TokenKind::It
                | TokenKind::Its
                | TokenKind::The
                | TokenKind::Word(_)
        )
    }

    pub(crate) fn parse_argument(&mut self) -> Option<Argument> {
        let start = self.current_span();
        let kind = match self.peek_kind().clone() {
            TokenKind::LBracket => return self.parse_bracketed(),
            TokenKind::LParen => ArgumentKind::Math(self.parse_math()?),
            TokenKind::Number { base, trail } => {
                let span = self.advance().span;
                ArgumentKind::Number(Number { base, trail, span })
            }
            TokenKind::Text(raw) => {
                let span = self.advance().span;
                ArgumentKind::Text(Text { raw, span })
            }
            TokenKind::Type(kind)
                if !matches!(self.look_ahead(1), TokenKind::Word(_) | TokenKind::Of) =>
            {
                let span = self.advance().span;
                ArgumentKind::BuiltinType(BuiltinType { kind, span })
            }
            TokenKind::A | TokenKind::An => {
                self.advance();
                let name = self.expect_word("a struct name")?;
                let span = start.to(name.span);
                ArgumentKind::StructType(StructType {
                    strukt: Struct { name },
                    span,
                })
            }
            TokenKind::It | TokenKind::Its => ArgumentKind::It(self.parse_it()?),
            TokenKind::The | TokenKind::Word(_) | TokenKind::Type(_) => {
                ArgumentKind::Noun(self.parse_noun()?)
            }
            other => {
                let message = format!("expected an argument, got '{other}'");
                self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, message);
                return None;
            }
        };
        Some(Argument::new(kind, start.to(self.previous_span())))
    }

    /// `"[" (assignment | statement) "]"`
    fn parse_bracketed(&mut self) -> Option<Argument> {
        self.nested("bracketed argument", Self::parse_bracketed_body)
    }

    fn parse_bracketed_body(&mut self) -> Option<Argument> {
        let open = self.expect(&TokenKind::LBracket)?.span;
        let kind = match self.peek_kind().clone() {
            TokenKind::Word(_) if self.is_assignment_ahead() => {
                ArgumentKind::Assignment(Box::new(self.parse_assignment()?))
            }
            TokenKind::Word(_) => ArgumentKind::Inline(Box::new(self.parse_statement()?)),
            TokenKind::Create => {
                let error = self
                    .make_error(
                        ErrorCode::INVALID_INLINE,
                        "a creation cannot be used as an argument",
                        self.current_span(),
                    )
                    .with_suggestion("create the noun in its own clause, then refer to it");
                self.push_error(error);
                return None;
            }
            other => {
                let message = format!("expected a statement inside brackets, got '{other}'");
                self.error_at_current(ErrorCode::INVALID_INLINE, message);
                return None;
            }
        };
        let close = self.expect(&TokenKind::RBracket)?.span;
        Some(Argument::new(kind, open.to(close)))
    }

    /// `noun := "the"? ( type "of"? | word )? word ( "'s" noun )?`
    pub(crate) fn parse_noun(&mut self) -> Option<Noun> {
        self.nested("property chain", Self::parse_noun_body)
    }

    fn parse_noun_body(&mut self) -> Option<Noun> {
        let start = self.current_span();
        self.eat(&TokenKind::The);

        let ty = match self.peek_kind().clone() {
            TokenKind::Type(kind) => {
                let span = self.advance().span;
                self.eat(&TokenKind::Of);
                Some(TypeRef::Builtin(BuiltinType { kind, span }))
            }
            TokenKind::Word(name) if matches!(self.look_ahead(1), TokenKind::Word(_)) => {
                let span = self.advance().span;
                Some(TypeRef::Struct(StructType {
                    strukt: Struct {
                        name: Ident::new(name, span),
                    },
                    span,
                }))
            }
            _ => None,
        };

        let name = self.expect_word("a noun")?;
        let property = self.parse_property()?;

        Some(Noun {
            name,
            ty,
            property,
            span: start.to(self.previous_span()),
        })
    }

    /// Optional `'s noun` suffix.
    fn parse_property(&mut self) -> Option<Option<Box<Noun>>> {
        if self.eat(&TokenKind::Possessive) {
            Some(Some(Box::new(self.parse_noun()?)))
        } else {
            Some(None)
        }
    }

    /// `it := "it" ( "'s" noun )? | "its" noun`
    pub(crate) fn parse_it(&mut self) -> Option<It> {
        let start = self.current_span();
        let property = match self.advance().kind {
            TokenKind::Its => Some(Box::new(self.parse_noun()?)),
            _ => self.parse_property()?,
        };
        Some(It {
            property,
            span: start.to(self.previous_span()),
        })
    }

    /// `math := "(" term ( op term )* ")"`
    pub(crate) fn parse_math(&mut self) -> Option<Math> {
        self.nested("math", Self::parse_math_body)
    }

    fn parse_math_body(&mut self) -> Option<Math> {
        let open = self.expect(&TokenKind::LParen)?.span;
        let base = self.parse_math_term()?;
        let mut operations = Vec::new();

        while self.peek_kind().is_math_operator() {
            let token = self.advance();
            let op = match token.kind {
                TokenKind::Plus => MathOp::Add,
                TokenKind::Minus => MathOp::Subtract,
                TokenKind::Star => MathOp::Multiply,
                TokenKind::Slash => MathOp::Divide,
                _ => MathOp::Exponent,
            };
            let term = self.parse_math_term()?;
            operations.push(MathOperation {
                operator: MathOperator {
                    op,
                    span: token.span,
                },
                term,
            });
        }

        if !self.check(&TokenKind::RParen) {
            let message = format!("expected ')' or a math operator, got '{}'", self.peek_kind());
            self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, message);
            return None;
        }
        let close = self.advance().span;

        Some(Math {
            base,
            operations,
            span: open.to(close),
        })
    }

    fn parse_math_term(&mut self) -> Option<MathTerm> {
        match self.peek_kind().clone() {
            TokenKind::Number { base, trail } => {
                let span = self.advance().span;
                Some(MathTerm::Number(Number { base, trail, span }))
            }
            TokenKind::LParen => Some(MathTerm::Math(Box::new(self.parse_math()?))),
            TokenKind::It | TokenKind::Its => Some(MathTerm::It(self.parse_it()?)),
            TokenKind::The | TokenKind::Word(_) | TokenKind::Type(_) => {
                Some(MathTerm::Noun(self.parse_noun()?))
            }
            other => {
                let message = format!("expected a number or noun in math, got '{other}'");
                self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, message);
                None
            }
        }
    }
}
