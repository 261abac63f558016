//! Literal conventions shared by the evaluator and the compiler.

use thiserror::Error;

/// Join a number literal's integer base and trailing-digit run textually.
///
/// This is not positional arithmetic: base `3` with trail `4` is `3.4`, and
/// so is `3.04`, because the trail is carried as an integer. The trail may be
/// any length; digits past `f64` precision are rounded away.
pub fn join_number(base: u64, trail: &str) -> f64 {
    format!("{base}.{trail}")
        .parse()
        .unwrap_or(base as f64)
}

/// Read a trailing-digit run as an integer would be: leading zeros dropped,
/// an all-zero or empty run becomes `"0"`.
pub fn normalize_trail(run: &str) -> String {
    let digits = run.trim_start_matches('0');
    if digits.is_empty() {
        "0".to_string()
    } else {
        digits.to_string()
    }
}

/// A backslash sequence that is not one of the recognised escapes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid escape sequence '{sequence}'")]
pub struct EscapeError {
    /// The offending sequence including its backslash.
    pub sequence: String,
    /// Character offset of the backslash within the raw text.
    pub offset: usize,
}

/// Resolve the escapes of a raw text literal.
///
/// Recognised: `\"`, `\\`, `\n`, `\e` (ESC), `\r`, `\0` followed by up to
/// three octal digits, and `\x` followed by one or two hex digits. Octal and
/// hex escapes denote a single byte, mapped to the char with that code.
pub fn resolve_escapes(raw: &str) -> Result<String, EscapeError> {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if ch != '\\' {
            out.push(ch);
            i += 1;
            continue;
        }

        let start = i;
        let invalid = |end: usize| EscapeError {
            sequence: chars[start..end.min(chars.len())].iter().collect(),
            offset: start,
        };

        let Some(&marker) = chars.get(i + 1) else {
            return Err(invalid(i + 1));
        };
        i += 2;

        match marker {
            '"' => out.push('"'),
            '\\' => out.push('\\'),
            'n' => out.push('\n'),
            'e' => out.push('\u{1b}'),
            'r' => out.push('\r'),
            '0' => {
                let digits = take_digits(&chars, i, 3, 8);
                let code = u32::from_str_radix(&digits, 8).unwrap_or(0);
                i += digits.len();
                let byte = u8::try_from(code).map_err(|_| invalid(i))?;
                out.push(char::from(byte));
            }
            'x' => {
                let digits = take_digits(&chars, i, 2, 16);
                if digits.is_empty() {
                    return Err(invalid(i));
                }
                i += digits.len();
                let byte = u8::from_str_radix(&digits, 16).map_err(|_| invalid(i))?;
                out.push(char::from(byte));
            }
            _ => return Err(invalid(i)),
        }
    }

    Ok(out)
}

fn take_digits(chars: &[char], from: usize, max: usize, radix: u32) -> String {
    chars[from.min(chars.len())..]
        .iter()
        .take(max)
        .take_while(|c| c.is_digit(radix))
        .collect()
}
