//! Syntax tree to IR compiler.
//!
//! Mirrors the evaluator node for node, but only builds data: nothing here
//! can invoke a verb or touch a scope.

use etl_types::ast::*;
use etl_types::literal::{join_number, resolve_escapes};
use etl_types::Span;

use crate::error::{CodegenError, CodegenResult};
use crate::ir::{Instr, InstructionList, Special};

// ══════════════════════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════════════════════

/// Compile a parsed [`Script`] into its instruction list.
pub fn compile(script: &Script) -> CodegenResult<InstructionList> {
    script
        .items
        .iter()
        .map(|item| match item {
            Item::Sentence(sentence) => compile_sentence(sentence).map(Instr::List),
            Item::Comment(comment) => Ok(Instr::Special(Special::Comment {
                comment: comment.text.clone(),
            })),
        })
        .collect::<CodegenResult<Vec<_>>>()
        .map(InstructionList)
}

// ══════════════════════════════════════════════════════════════════════════════
// Sentences & clauses
// ══════════════════════════════════════════════════════════════════════════════

pub fn compile_sentence(sentence: &Sentence) -> CodegenResult<InstructionList> {
    sentence
        .clauses()
        .map(|clause| compile_clause(clause).map(Instr::List))
        .collect()
}

pub fn compile_clause(clause: &Clause) -> CodegenResult<InstructionList> {
    match clause {
        Clause::Statement(statement) => compile_statement(statement),
        Clause::Assignment(assignment) => compile_assignment(assignment),
        Clause::Creation(creation) => compile_creation(creation),
    }
}

/// `[verb, args...]`
pub fn compile_statement(statement: &Statement) -> CodegenResult<InstructionList> {
    let mut list = InstructionList::new();
    list.push(compile_verb(&statement.verb)?);
    for argument in &statement.arguments {
        list.push(compile_argument(argument)?);
    }
    Ok(list)
}

/// `[verb, ( from: .., to: .. )]`
pub fn compile_assignment(assignment: &Assignment) -> CodegenResult<InstructionList> {
    let from = match &assignment.from {
        Target::Noun(noun) => compile_noun(noun)?,
        Target::It(it) => compile_it(it)?,
    };
    let mut list = InstructionList::new();
    list.push(compile_verb(&assignment.verb)?);
    list.push(Special::Assign {
        from: Box::new(from),
        to: Box::new(compile_argument(&assignment.to)?),
    });
    Ok(list)
}

/// `[( create: ( noun: .., type: .. ), as: .. )]`
pub fn compile_creation(creation: &Creation) -> CodegenResult<InstructionList> {
    let typed = &creation.noun;
    let noun = Special::Noun {
        noun: ident(&typed.name)?,
        ty: Some(Box::new(compile_type(&typed.ty)?)),
        prop: compile_property(typed.property.as_deref())?,
    };
    let value = match &creation.value {
        Some(argument) => Some(Box::new(compile_argument(argument)?)),
        None => None,
    };
    let mut list = InstructionList::new();
    list.push(Special::Create {
        create: Box::new(noun),
        value,
    });
    Ok(list)
}

// ══════════════════════════════════════════════════════════════════════════════
// Arguments
// ══════════════════════════════════════════════════════════════════════════════

pub fn compile_argument(argument: &Argument) -> CodegenResult<Instr> {
    let instr = match &argument.kind {
        ArgumentKind::Inline(statement) => Special::Iexpr {
            iexpr: compile_statement(statement)?,
        }
        .into(),
        ArgumentKind::Assignment(assignment) => Special::Iexpr {
            iexpr: compile_assignment(assignment)?,
        }
        .into(),
        ArgumentKind::Noun(noun) => compile_noun(noun)?.into(),
        ArgumentKind::It(it) => compile_it(it)?.into(),
        ArgumentKind::Math(m) => compile_math(m)?.into(),
        ArgumentKind::BuiltinType(builtin) => compile_builtin(builtin).into(),
        ArgumentKind::StructType(struct_type) => compile_struct_type(struct_type)?.into(),
        ArgumentKind::Number(n) => Instr::Number(join_number(n.base, &n.trail)),
        ArgumentKind::Text(text) => Instr::Text(compile_text(text)?),
    };
    Ok(instr)
}

fn compile_verb(verb: &Ident) -> CodegenResult<Special> {
    Ok(Special::Verb { verb: ident(verb)? })
}

pub fn compile_noun(noun: &Noun) -> CodegenResult<Special> {
    let ty = match &noun.ty {
        Some(ty) => Some(Box::new(compile_type(ty)?)),
        None => None,
    };
    Ok(Special::Noun {
        noun: ident(&noun.name)?,
        ty,
        prop: compile_property(noun.property.as_deref())?,
    })
}

fn compile_it(it: &It) -> CodegenResult<Special> {
    Ok(Special::Noun {
        noun: "it".to_string(),
        ty: None,
        prop: compile_property(it.property.as_deref())?,
    })
}

fn compile_property(property: Option<&Noun>) -> CodegenResult<Option<Box<Special>>> {
    property
        .map(|noun| compile_noun(noun).map(Box::new))
        .transpose()
}

// ── Types ────────────────────────────────────────────────────────────────

fn compile_type(ty: &TypeRef) -> CodegenResult<Special> {
    match ty {
        TypeRef::Builtin(builtin) => Ok(compile_builtin(builtin)),
        TypeRef::Struct(struct_type) => compile_struct_type(struct_type),
    }
}

fn compile_builtin(builtin: &BuiltinType) -> Special {
    Special::Bit {
        bit: builtin.kind.keyword().to_string(),
    }
}

fn compile_struct_type(struct_type: &StructType) -> CodegenResult<Special> {
    Ok(Special::Srt {
        srt: Box::new(Special::Struct {
            name: ident(&struct_type.strukt.name)?,
        }),
    })
}

// ── Math ─────────────────────────────────────────────────────────────────

/// `( math: [base, op, term, ...] )`; operators keep their source symbol.
pub fn compile_math(m: &Math) -> CodegenResult<Special> {
    let mut math = InstructionList::new();
    math.push(compile_math_term(&m.base)?);
    for operation in &m.operations {
        math.push(Instr::Text(operation.operator.op.symbol().to_string()));
        math.push(compile_math_term(&operation.term)?);
    }
    Ok(Special::Math { math })
}

fn compile_math_term(term: &MathTerm) -> CodegenResult<Instr> {
    Ok(match term {
        MathTerm::Number(n) => Instr::Number(join_number(n.base, &n.trail)),
        MathTerm::Noun(noun) => compile_noun(noun)?.into(),
        MathTerm::It(it) => compile_it(it)?.into(),
        MathTerm::Math(inner) => compile_math(inner)?.into(),
    })
}

// ── Leaves ───────────────────────────────────────────────────────────────

fn compile_text(text: &Text) -> CodegenResult<String> {
    resolve_escapes(&text.raw).map_err(|e| CodegenError::InvalidEscape {
        sequence: e.sequence,
        span: text.span,
    })
}

/// Identifier text; the parser never produces an empty one.
fn ident(ident: &Ident) -> CodegenResult<String> {
    if ident.name.is_empty() {
        return Err(invariant("empty identifier", ident.span));
    }
    Ok(ident.name.clone())
}

fn invariant(message: &str, span: Span) -> CodegenError {
    CodegenError::InternalInvariantViolation {
        message: message.to_string(),
        span,
    }
}
