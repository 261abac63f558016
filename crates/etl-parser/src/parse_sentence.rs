//! Script, sentence and clause parsing.

use etl_lexer::token::TokenKind;
use etl_types::ast::*;
use etl_types::ErrorCode;

use crate::parser::Parser;

impl<'src> Parser<'src> {
    /// `script := item+`
    pub(crate) fn parse_script(&mut self) -> Option<Script> {
        let start = self.current_span();
        let mut items = Vec::new();
        let mut sentences = 0usize;

        self.flush_comments(&mut items);
        while !self.at_end() && !self.too_many_errors() {
            match self.parse_sentence() {
                Some(sentence) => {
                    items.push(Item::Sentence(sentence));
                    sentences += 1;
                }
                None => self.synchronize(),
            }
            self.flush_comments(&mut items);
        }

        if sentences == 0 && !self.errors_reported() {
            let error = self
                .make_error(
                    ErrorCode::EMPTY_SCRIPT,
                    "a script needs at least one sentence",
                    start,
                )
                .with_suggestion("try: write \"hello\".");
            self.push_error(error);
            return None;
        }

        let span = start.to(self.previous_span());
        Some(Script { items, span })
    }

    /// `sentence := clause ( ","? "and" clause )* "."`
    pub(crate) fn parse_sentence(&mut self) -> Option<Sentence> {
        let start = self.current_span();
        let leading = self.parse_clause()?;
        let mut joined = Vec::new();

        loop {
            if self.check(&TokenKind::Comma) && *self.look_ahead(1) == TokenKind::And {
                self.advance();
                self.advance();
            } else if !self.eat(&TokenKind::And) {
                break;
            }
            joined.push(self.parse_clause()?);
        }

        if !self.check(&TokenKind::Period) {
            let error = self
                .make_error(
                    ErrorCode::MISSING_PERIOD,
                    format!("expected '.' at end of sentence, got '{}'", self.peek_kind()),
                    self.current_span(),
                )
                .with_suggestion("end every sentence with a period");
            self.push_error(error);
            return None;
        }
        let end = self.advance().span;

        Some(Sentence {
            leading,
            joined,
            span: start.to(end),
        })
    }

    /// `clause := creation | assignment | statement`
    pub(crate) fn parse_clause(&mut self) -> Option<Clause> {
        match self.peek_kind().clone() {
            TokenKind::Create => self.parse_creation().map(Clause::Creation),
            TokenKind::Word(_) if self.is_assignment_ahead() => {
                self.parse_assignment().map(Clause::Assignment)
            }
            TokenKind::Word(_) => self.parse_statement().map(Clause::Statement),
            other => {
                let message = format!("expected a verb or 'create', got '{other}'");
                self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, message);
                None
            }
        }
    }

    /// True when the verb under the cursor is followed by `noun to`.
    pub(crate) fn is_assignment_ahead(&self) -> bool {
        let mut n = 1;
        loop {
            match self.look_ahead(n) {
                TokenKind::To => return n > 1,
                TokenKind::Word(_)
                | TokenKind::The
                | TokenKind::Of
                | TokenKind::Possessive
                | TokenKind::Type(_)
                | TokenKind::It
                | TokenKind::Its => n += 1,
                _ => return false,
            }
        }
    }

    /// `statement := verb ( argument ( "," argument )* )?`
    pub(crate) fn parse_statement(&mut self) -> Option<Statement> {
        let verb = self.expect_word("a verb")?;
        let mut arguments = Vec::new();

        if self.starts_argument() {
            arguments.push(self.parse_argument()?);
            // A comma followed by "and" joins the next clause instead.
            while self.check(&TokenKind::Comma) && *self.look_ahead(1) != TokenKind::And {
                self.advance();
                arguments.push(self.parse_argument()?);
            }
        }

        let span = verb.span.to(self.previous_span());
        Some(Statement {
            verb,
            arguments,
            span,
        })
    }

    /// `assignment := verb noun "to" argument`
    pub(crate) fn parse_assignment(&mut self) -> Option<Assignment> {
        let verb = self.expect_word("a verb")?;
        let from = match self.peek_kind() {
            TokenKind::It | TokenKind::Its => Target::It(self.parse_it()?),
            _ => Target::Noun(self.parse_noun()?),
        };
        self.expect(&TokenKind::To)?;
        let to = self.parse_argument()?;
        let span = verb.span.to(to.span);
        Some(Assignment {
            verb,
            from,
            to: Box::new(to),
            span,
        })
    }

    /// `creation := "create" typed-noun ( "as" argument )?`
    pub(crate) fn parse_creation(&mut self) -> Option<Creation> {
        let start = self.expect(&TokenKind::Create)?.span;
        let noun = self.parse_typed_noun()?;
        let value = if self.eat(&TokenKind::As) {
            Some(Box::new(self.parse_argument()?))
        } else {
            None
        };
        Some(Creation {
            noun,
            value,
            span: start.to(self.previous_span()),
        })
    }

    /// `typed-noun := ("the" | "a" | "an")? type "of"? name ( "'s" noun )?`
    pub(crate) fn parse_typed_noun(&mut self) -> Option<TypedNoun> {
        let start = self.current_span();
        let _ = self.eat(&TokenKind::The) || self.eat(&TokenKind::A) || self.eat(&TokenKind::An);

        let ty = match self.peek_kind().clone() {
            TokenKind::Type(kind) => {
                let span = self.advance().span;
                TypeRef::Builtin(BuiltinType { kind, span })
            }
            TokenKind::Word(name) => {
                let span = self.advance().span;
                TypeRef::Struct(StructType {
                    strukt: Struct {
                        name: Ident::new(name, span),
                    },
                    span,
                })
            }
            other => {
                let message = format!("expected a type to create, got '{other}'");
                self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, message);
                return None;
            }
        };
        self.eat(&TokenKind::Of);

        let name = self.expect_word("a name for the new noun")?;
        let property = if self.eat(&TokenKind::Possessive) {
            Some(Box::new(self.parse_noun()?))
        } else {
            None
        };

        Some(TypedNoun {
            name,
            ty,
            property,
            span: start.to(self.previous_span()),
        })
    }
}
