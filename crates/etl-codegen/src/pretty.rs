//! Human-readable rendering of compiled IR.
//!
//! Specials render as `( key: value, ... )`, lists as `[a, b]`, text as a
//! quoted and escaped string. Each top-level item of a script goes on its
//! own line. The format is for reading only; it is never parsed back.

use std::fmt::Write;

use crate::ir::{Entry, Instr, InstructionList, Special};

/// Render a whole compiled script, one top-level item per line.
pub fn render(list: &InstructionList) -> String {
    let mut out = String::new();
    for instr in list {
        render_instr(&mut out, instr);
        out.push('\n');
    }
    out
}

/// Render a single instruction on one line.
pub fn render_inline(instr: &Instr) -> String {
    let mut out = String::new();
    render_instr(&mut out, instr);
    out
}

fn render_instr(out: &mut String, instr: &Instr) {
    match instr {
        Instr::Special(special) => render_special(out, special),
        Instr::List(list) => render_list(out, list),
        Instr::Number(n) => render_number(out, *n),
        // `{:?}` gives a quoted, escaped string.
        Instr::Text(text) => {
            let _ = write!(out, "{text:?}");
        }
    }
}

fn render_list(out: &mut String, list: &InstructionList) {
    out.push('[');
    for (i, instr) in list.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        render_instr(out, instr);
    }
    out.push(']');
}

fn render_special(out: &mut String, special: &Special) {
    out.push_str("( ");
    for (i, (key, entry)) in special.entries().into_iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(key);
        out.push_str(": ");
        match entry {
            Entry::Str(s) => {
                let _ = write!(out, "{s:?}");
            }
            Entry::Special(inner) => render_special(out, inner),
            Entry::Instr(instr) => render_instr(out, instr),
            Entry::List(list) => render_list(out, list),
        }
    }
    out.push_str(" )");
}

fn render_number(out: &mut String, n: f64) {
    let _ = if n.is_finite() && n.fract() == 0.0 {
        write!(out, "{n:.1}")
    } else {
        write!(out, "{n}")
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_statement() {
        let list: InstructionList = vec![
            Instr::Special(Special::Verb {
                verb: "write".into(),
            }),
            Instr::Text("hi\n".into()),
            Instr::Number(14.0),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            render_inline(&Instr::List(list)),
            r#"[( verb: "write" ), "hi\n", 14.0]"#
        );
    }

    #[test]
    fn test_render_math_sequence() {
        let math = Special::Math {
            math: vec![
                Instr::Number(3.0),
                Instr::Text("+".into()),
                Instr::Number(4.0),
                Instr::Text("*".into()),
                Instr::Number(2.5),
            ]
            .into_iter()
            .collect(),
        };
        assert_eq!(
            render_inline(&Instr::Special(math)),
            r#"( math: [3.0, "+", 4.0, "*", 2.5] )"#
        );
    }

    #[test]
    fn test_render_one_item_per_line() {
        let list: InstructionList = vec![
            Instr::Special(Special::Comment {
                comment: "note".into(),
            }),
            Instr::List(InstructionList::new()),
        ]
        .into_iter()
        .collect();
        assert_eq!(render(&list), "( comment: \"note\" )\n[]\n");
    }
}
