//! N-Triples string escaping

use std::borrow::Cow;
use std::fmt::Write;

use crate::error::MalformedTermError;

fn needs_escape(c: char) -> bool {
    matches!(c, '\\' | '"') || c.is_control()
}

/// Escapes backslash, quote and control characters.
pub fn escape(value: &str) -> Cow<'_, str> {
    if !value.chars().any(needs_escape) {
        return Cow::Borrowed(value);
    }
    let mut escaped = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(escaped, "\\u{:04X}", c as u32);
            }
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Reverses [`escape`], also accepting `\b`, `\f`, `\'` and `\UXXXXXXXX`.
pub fn unescape(value: &str) -> Result<Cow<'_, str>, MalformedTermError> {
    if !value.contains('\\') {
        return Ok(Cow::Borrowed(value));
    }
    let mut unescaped = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        let Some(escape) = chars.next() else {
            return Err(MalformedTermError::DanglingEscape(value.to_string()));
        };
        match escape {
            't' => unescaped.push('\t'),
            'b' => unescaped.push('\u{8}'),
            'n' => unescaped.push('\n'),
            'r' => unescaped.push('\r'),
            'f' => unescaped.push('\u{c}'),
            '"' => unescaped.push('"'),
            '\'' => unescaped.push('\''),
            '\\' => unescaped.push('\\'),
            'u' => unescaped.push(read_code_point(&mut chars, 4, value)?),
            'U' => unescaped.push(read_code_point(&mut chars, 8, value)?),
            other => {
                return Err(MalformedTermError::UnknownEscape {
                    escape: other,
                    value: value.to_string(),
                })
            }
        }
    }
    Ok(Cow::Owned(unescaped))
}

fn read_code_point(
    chars: &mut std::str::Chars<'_>,
    digits: usize,
    value: &str,
) -> Result<char, MalformedTermError> {
    let sequence: String = chars.by_ref().take(digits).collect();
    let bad = || MalformedTermError::BadUnicodeEscape {
        sequence: sequence.clone(),
        value: value.to_string(),
    };
    if sequence.len() != digits || !sequence.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(bad());
    }
    u32::from_str_radix(&sequence, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(bad)
}
