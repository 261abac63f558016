//! Evaluator tests: verbs and `it` chaining, creation and assignment,
//! struct templates and instances, math, text escapes, and failures.

use etl_eval::{
    CapturedOutput, ErrorKind, EvalError, EvalResult, Evaluator, Lookup, ScopeId, StructKind,
    Value, VerbBody, DEFAULT_GAS_LIMIT,
};
use etl_lexer::Lexer;
use etl_parser::Parser;
use etl_types::ast::{BuiltinKind, Script};
use etl_types::SourceFile;
use std::rc::Rc;

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

fn parse(source: &str) -> Script {
    let sf = SourceFile::new("test.etl", source);
    let lex = Lexer::new(&sf).lex();
    assert!(!lex.errors.has_errors(), "lex errors: {}", lex.errors);
    let result = Parser::new(lex.tokens, &sf).parse();
    assert!(!result.errors.has_errors(), "parse errors: {}", result.errors);
    result.script.expect("no script returned")
}

struct Harness {
    eval: Evaluator,
    root: ScopeId,
    out: CapturedOutput,
}

impl Harness {
    fn new() -> Self {
        Self::with_gas(DEFAULT_GAS_LIMIT)
    }

    fn with_gas(gas_limit: u64) -> Self {
        let out = CapturedOutput::new();
        let mut eval = Evaluator::new(gas_limit, Box::new(out.clone()));
        let builtins = eval.scopes.root();
        eval.scopes
            .define_verb(builtins, "write", vec![BuiltinKind::Text], VerbBody::Write)
            .unwrap();
        eval.scopes
            .define_verb(builtins, "set", vec![BuiltinKind::Text], VerbBody::Identity)
            .unwrap();
        let root = eval.scopes.new_scope(vec![builtins]).unwrap();
        Self { eval, root, out }
    }

    fn run(&mut self, source: &str) -> EvalResult<Value> {
        let script = parse(source);
        self.eval.reset_gas();
        self.eval.eval_script(&script, self.root)
    }

    fn run_ok(&mut self, source: &str) -> Value {
        match self.run(source) {
            Ok(value) => value,
            Err(e) => panic!("unexpected evaluation error: {e}"),
        }
    }

    fn noun(&self, name: &str) -> Option<Value> {
        self.eval.scopes.lookup_noun(self.root, name).found().cloned()
    }
}

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

// ─────────────────────────────────────────────────────────────────────
// Verbs and `it`
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_write_emits_once() {
    let mut h = Harness::new();
    let result = h.run_ok(r#"write "hi"."#);
    assert_eq!(h.out.lines(), vec!["hi"]);
    assert_eq!(result, text("hi"));
}

#[test]
fn test_and_chain_passes_it() {
    let mut h = Harness::new();
    h.run_ok(r#"write "hi", and write it."#);
    assert_eq!(h.out.lines(), vec!["hi", "hi"]);
}

#[test]
fn test_write_joins_arguments() {
    let mut h = Harness::new();
    h.run_ok(r#"write "score:", 5, "of", (2 * 5)."#);
    assert_eq!(h.out.lines(), vec!["score: 5.0 of 10.0"]);
}

#[test]
fn test_last_sentence_value_is_result() {
    let mut h = Harness::new();
    let result = h.run_ok("write 1. write 2.");
    assert_eq!(result, text("2.0"));
    assert_eq!(h.out.lines(), vec!["1.0", "2.0"]);
}

#[test]
fn test_it_before_any_value_is_undefined() {
    let mut h = Harness::new();
    let err = h.run("write it.").unwrap_err();
    assert!(matches!(err, EvalError::UndefinedNoun { ref name, .. } if name == "it"));
    assert!(h.out.is_empty());
}

#[test]
fn test_it_persists_across_sentences() {
    let mut h = Harness::new();
    h.run_ok(r#"write "one". write it."#);
    assert_eq!(h.out.lines(), vec!["one", "one"]);
}

#[test]
fn test_inline_statement_as_argument() {
    let mut h = Harness::new();
    h.run_ok(r#"write [write "inner"], "outer"."#);
    assert_eq!(h.out.lines(), vec!["inner", "inner outer"]);
}

#[test]
fn test_undefined_verb() {
    let mut h = Harness::new();
    let err = h.run("jump 5.").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UndefinedVerb);
    assert!(err.to_string().contains("'jump'"));
}

#[test]
fn test_clause_failure_stops_sentence() {
    let mut h = Harness::new();
    let err = h.run(r#"write "a", and jump, and write "b"."#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UndefinedVerb);
    assert_eq!(h.out.lines(), vec!["a"]);
}

#[test]
fn test_native_verb() {
    let mut h = Harness::new();
    let shout = VerbBody::Native(Rc::new(|args: &[Value]| match args.first() {
        Some(Value::Text(t)) => Ok(Value::Text(t.to_uppercase())),
        _ => Err("shout needs text".to_string()),
    }));
    h.eval
        .scopes
        .define_verb(h.root, "shout", vec![BuiltinKind::Text], shout)
        .unwrap();
    h.run_ok(r#"shout "hey", and write it."#);
    assert_eq!(h.out.lines(), vec!["HEY"]);

    let err = h.run("shout 3.").unwrap_err();
    match err {
        EvalError::VerbFailed { verb, message, .. } => {
            assert_eq!(verb, "shout");
            assert_eq!(message, "shout needs text");
        }
        other => panic!("expected VerbFailed, got {other:?}"),
    }
}

#[test]
fn test_bare_type_argument() {
    let mut h = Harness::new();
    h.run_ok("write number, and write verb.");
    assert_eq!(h.out.lines(), vec!["number", "verb"]);
}

// ─────────────────────────────────────────────────────────────────────
// Creation and assignment
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_create_with_zero_values() {
    let mut h = Harness::new();
    h.run_ok("create the number score. create the text title.");
    assert_eq!(h.noun("score"), Some(Value::Number(0.0)));
    assert_eq!(h.noun("title"), Some(text("")));
}

#[test]
fn test_create_with_initial_value() {
    let mut h = Harness::new();
    let result = h.run_ok("create the number score as 5, and write it.");
    assert_eq!(result, text("5.0"));
    assert_eq!(h.noun("score"), Some(Value::Number(5.0)));
}

#[test]
fn test_assignment_rebinds() {
    let mut h = Harness::new();
    h.run_ok(r#"create the text title. set title to "ETL". write title."#);
    assert_eq!(h.noun("title"), Some(text("ETL")));
    assert_eq!(h.out.lines(), vec!["ETL"]);
}

#[test]
fn test_assignment_result_is_it() {
    let mut h = Harness::new();
    h.run_ok("set x to (2 ^ 3), and write it.");
    assert_eq!(h.out.lines(), vec!["8.0"]);
}

#[test]
fn test_assignment_through_other_verb() {
    let mut h = Harness::new();
    h.run_ok(r#"write x to "shown"."#);
    assert_eq!(h.out.lines(), vec!["shown"]);
    assert_eq!(h.noun("x"), Some(text("shown")));
}

#[test]
fn test_set_it() {
    let mut h = Harness::new();
    h.run_ok(r#"write "a", and set it to "b", and write it."#);
    assert_eq!(h.out.lines(), vec!["a", "b"]);
}

#[test]
fn test_bracketed_assignment() {
    let mut h = Harness::new();
    h.run_ok(r#"write [set greeting to "hello"]. write greeting."#);
    assert_eq!(h.out.lines(), vec!["hello", "hello"]);
}

#[test]
fn test_create_verb_constant() {
    let mut h = Harness::new();
    h.run_ok(r#"create the verb greeting as "hi there". greeting, and write it."#);
    assert_eq!(h.out.lines(), vec!["hi there"]);
}

// ─────────────────────────────────────────────────────────────────────
// Structs
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_struct_template_and_instance() {
    let mut h = Harness::new();
    h.run_ok(
        r#"create the struct game.
           create the text game's description as "weird".
           create the game zuuup.
           write zuuup's description."#,
    );
    assert_eq!(h.out.lines(), vec!["weird"]);

    let zuuup = h.noun("zuuup").expect("zuuup bound");
    let instance = zuuup.as_struct().expect("zuuup is a struct");
    assert_eq!(instance.kind, StructKind::Instance);
    assert_eq!(instance.name, "game");
    let template = h.eval.scopes.lookup_struct(h.root, "game").found().unwrap();
    assert_eq!(h.eval.scopes.get(instance.scope).unwrap().parents(), &[template]);
}

#[test]
fn test_instance_override_does_not_touch_template() {
    let mut h = Harness::new();
    h.run_ok(
        r#"create the struct game.
           create the text game's description as "weird".
           create the game zuuup. create the game other.
           set zuuup's description to "wow".
           write zuuup's description, and write other's description."#,
    );
    assert_eq!(h.out.lines(), vec!["wow", "weird"]);
}

#[test]
fn test_its_property() {
    let mut h = Harness::new();
    h.run_ok(
        r#"create the struct game.
           create the game zuuup, and set its description to "fast".
           write zuuup's description."#,
    );
    assert_eq!(h.out.lines(), vec!["fast"]);
}

#[test]
fn test_struct_type_hint_and_argument() {
    let mut h = Harness::new();
    h.run_ok("create the struct game. write the struct game, and write a game.");
    assert_eq!(h.out.lines(), vec!["<struct game>", "<struct game>"]);
}

#[test]
fn test_undefined_struct() {
    let mut h = Harness::new();
    let err = h.run("create the game zuuup.").unwrap_err();
    assert!(matches!(err, EvalError::UndefinedStruct { ref name, .. } if name == "game"));
}

#[test]
fn test_property_of_non_struct() {
    let mut h = Harness::new();
    let err = h
        .run("create the number score as 3. write score's description.")
        .unwrap_err();
    match err {
        EvalError::NotAStruct { name, found, .. } => {
            assert_eq!(name, "score");
            assert_eq!(found, "number");
        }
        other => panic!("expected NotAStruct, got {other:?}"),
    }
}

#[test]
fn test_verb_hint_resolves_verb_table() {
    let mut h = Harness::new();
    h.run_ok("write the verb write.");
    assert_eq!(h.out.lines(), vec!["<verb write>"]);
}

#[test]
fn test_undefined_noun() {
    let mut h = Harness::new();
    let err = h.run("write score.").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UndefinedNoun);
    assert_eq!(err.span().map(|s| s.start_col), Some(7));
}

// ─────────────────────────────────────────────────────────────────────
// Math
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_math_is_left_to_right() {
    let mut h = Harness::new();
    h.run_ok("write (3 + 4 * 2).");
    assert_eq!(h.out.lines(), vec!["14.0"]);
}

#[test]
fn test_math_with_nouns_and_nesting() {
    let mut h = Harness::new();
    h.run_ok("create the number score as 10. write (score / (1 + 1) - 0.5).");
    assert_eq!(h.out.lines(), vec!["4.5"]);
}

#[test]
fn test_math_over_text_is_invalid() {
    let mut h = Harness::new();
    let err = h
        .run(r#"create the text title as "x". write (title + 1)."#)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidExpression);
}

#[test]
fn test_math_fails_at_first_bad_operator() {
    let mut h = Harness::new();
    // `ghost` is never looked up: the fold stops at the division.
    let err = h.run("write (1 / 0 + ghost).").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidExpression);
    assert_eq!(err.span().map(|s| s.start_col), Some(10));
}

#[test]
fn test_division_by_zero_is_invalid() {
    let mut h = Harness::new();
    let err = h.run("write (1 / 0).").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidExpression);
    assert!(h.out.is_empty());
}

#[test]
fn test_number_trail_is_an_integer_run() {
    let mut h = Harness::new();
    h.run_ok("write 3.14, and write 3.04.");
    assert_eq!(h.out.lines(), vec!["3.14", "3.4"]);
}

// ─────────────────────────────────────────────────────────────────────
// Text escapes
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_escapes_resolved() {
    let mut h = Harness::new();
    h.run_ok(r#"write "a\nb\x41\"q\"\\."#);
    assert_eq!(h.out.lines(), vec!["a\nbA\"q\"\\"]);
}

#[test]
fn test_invalid_escape_fails() {
    let mut h = Harness::new();
    let err = h.run(r#"write "bad \q"."#).unwrap_err();
    match err {
        EvalError::InvalidEscape { sequence, .. } => assert_eq!(sequence, "\\q"),
        other => panic!("expected InvalidEscape, got {other:?}"),
    }
    assert!(h.out.is_empty());
}

// ─────────────────────────────────────────────────────────────────────
// Gas and scopes
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_gas_exhausted() {
    let mut h = Harness::with_gas(5);
    let err = h
        .run("write 1. write 2. write 3. write 4. write 5.")
        .unwrap_err();
    assert_eq!(err, EvalError::GasExhausted);
}

#[test]
fn test_builtins_resolved_from_parent_scope() {
    let h = Harness::new();
    match h.eval.scopes.lookup_verb(h.root, "write") {
        Lookup::Found { scope, .. } => assert_ne!(scope, h.root),
        Lookup::NotFound => panic!("write should be visible from root"),
    }
}

#[test]
fn test_comments_are_skipped() {
    let mut h = Harness::new();
    let script = {
        let sf = SourceFile::new("c.etl", "-- just a note\nwrite 1.");
        let lex = Lexer::new(&sf).lex();
        Parser::new(lex.tokens, &sf).parse().script.unwrap()
    };
    let value = h.eval.eval_script(&script, h.root).unwrap();
    assert_eq!(value, text("1.0"));
}
