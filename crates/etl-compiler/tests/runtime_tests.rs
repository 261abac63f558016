//! End-to-end runtime tests: source text in, output lines and values out.

use etl_compiler::{
    CapturedOutput, ErrorKind, EvalError, RunError, Runtime, RuntimeConfig, Value,
};
use etl_types::ast::BuiltinKind;
use etl_types::ErrorCode;

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

fn runtime() -> (Runtime, CapturedOutput) {
    let out = CapturedOutput::new();
    (Runtime::with_output(out.clone()), out)
}

fn eval_error(result: Result<Value, RunError>) -> EvalError {
    match result {
        Err(RunError::Eval(e)) => e,
        other => panic!("expected an evaluation error, got {other:?}"),
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Basic runs
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn write_emits_text_once() {
    let (mut rt, out) = runtime();
    let value = rt.run(r#"write "hi"."#).unwrap();
    assert_eq!(out.lines(), vec!["hi"]);
    assert_eq!(value, Value::Text("hi".into()));
}

#[test]
fn and_chain_rewrites_it() {
    let (mut rt, out) = runtime();
    rt.run(r#"write "hi", and write it."#).unwrap();
    assert_eq!(out.lines(), vec!["hi", "hi"]);
}

#[test]
fn math_folds_left_to_right() {
    let (mut rt, out) = runtime();
    rt.run("write (3 + 4 * 2).").unwrap();
    assert_eq!(out.lines(), vec!["14.0"]);
}

#[test]
fn it_in_fresh_runtime_is_undefined() {
    let (mut rt, out) = runtime();
    let err = eval_error(rt.run("write it."));
    assert_eq!(err.kind(), ErrorKind::UndefinedNoun);
    assert!(out.is_empty());
    assert_eq!(rt.it(), None);
}

#[test]
fn state_persists_between_runs() {
    let (mut rt, out) = runtime();
    rt.run("create the number score as 41.").unwrap();
    rt.run("set score to (score + 1).").unwrap();
    rt.run("write score.").unwrap();
    assert_eq!(out.lines(), vec!["42.0"]);
    assert_eq!(rt.noun("score"), Some(&Value::Number(42.0)));
}

#[test]
fn struct_walkthrough() {
    let (mut rt, out) = runtime();
    rt.run(
        r#"
-- a game template with a default description
create the struct game.
create the text game's description as "some random weird game".
create the game zuuup, and write its description.
set zuuup's description to "not so weird", and write zuuup's description.
"#,
    )
    .unwrap();
    assert_eq!(
        out.lines(),
        vec!["some random weird game", "not so weird"]
    );
}

#[test]
fn builtins_live_in_parent_scope() {
    let (mut rt, out) = runtime();
    let root = rt.root();
    let parents = rt.scopes().get(root).unwrap().parents().to_vec();
    assert_eq!(parents, vec![rt.builtins()]);
    assert!(!rt.scopes().get(root).unwrap().has_verb("write"));

    // Shadowing `write` in the root leaves the builtin intact.
    rt.run(r#"create the verb write as "shadowed". write "ignored", and set x to it."#)
        .unwrap();
    assert!(out.is_empty());
    assert_eq!(rt.noun("x"), Some(&Value::Text("shadowed".into())));
    assert!(rt.scopes().get(rt.builtins()).unwrap().has_verb("write"));
}

// ══════════════════════════════════════════════════════════════════════════════
// Host verbs & configuration
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn host_verb_receives_arguments() {
    let (mut rt, out) = runtime();
    rt.define_verb("add", vec![BuiltinKind::Number, BuiltinKind::Number], |args| {
        let mut total = 0.0;
        for arg in args {
            total += arg.as_number().ok_or("add takes numbers")?;
        }
        Ok(Value::Number(total))
    })
    .unwrap();
    rt.run("add 1, 2.5, (2 * 2), and write it.").unwrap();
    assert_eq!(out.lines(), vec!["7.5"]);

    let err = eval_error(rt.run(r#"add 1, "two"."#));
    assert_eq!(err.kind(), ErrorKind::VerbFailed);
    assert!(err.to_string().contains("add takes numbers"));
}

#[test]
fn gas_limit_is_configurable() {
    let out = CapturedOutput::new();
    let config = RuntimeConfig {
        gas_limit: 10,
        ..RuntimeConfig::default()
    };
    let mut rt = Runtime::with_config(config, Box::new(out.clone()));
    rt.run("write 1.").unwrap();
    assert!(rt.gas_used() > 0);

    let err = eval_error(rt.run("write 1. write 2. write 3. write 4."));
    assert_eq!(err, EvalError::GasExhausted);
    assert_eq!(out.len(), 4);
}

#[test]
fn parse_errors_use_configured_file_name() {
    let out = CapturedOutput::new();
    let config = RuntimeConfig {
        file_name: "game.etl".into(),
        ..RuntimeConfig::default()
    };
    let mut rt = Runtime::with_config(config, Box::new(out.clone()));
    match rt.run(r#"write "hi""#) {
        Err(RunError::Parse(errors)) => {
            assert!(errors.has_errors());
            assert_eq!(errors.errors[0].file, "game.etl");
        }
        other => panic!("expected a parse error, got {other:?}"),
    }
    assert!(out.is_empty());
}

#[test]
fn run_error_display() {
    let (mut rt, _out) = runtime();
    let err = rt.run("jump.").unwrap_err();
    assert_eq!(err.to_string(), "1:1: undefined verb 'jump'");
}

#[test]
fn deep_nesting_is_a_parse_error() {
    let (mut rt, out) = runtime();
    let deep_math = format!("write {}1{}.", "(".repeat(1000), ")".repeat(1000));
    let long_chain = format!("write {}x.", "x's ".repeat(3000));
    for source in [deep_math, long_chain] {
        match rt.run(&source) {
            Err(RunError::Parse(errors)) => {
                assert_eq!(errors.errors[0].code, ErrorCode::NESTING_TOO_DEEP);
            }
            other => panic!("expected a parse error, got {other:?}"),
        }
    }
    assert!(out.is_empty());

    rt.run(&format!("write {}1{}.", "(".repeat(40), ")".repeat(40)))
        .unwrap();
    assert_eq!(out.lines(), vec!["1.0"]);
}

#[test]
fn long_number_trail_is_accepted() {
    let (mut rt, _out) = runtime();
    rt.run("create the number x as 1.1234567890123456789012345.")
        .unwrap();
    let expected: f64 = "1.1234567890123456789012345".parse().unwrap();
    assert_eq!(rt.noun("x"), Some(&Value::Number(expected)));
}
