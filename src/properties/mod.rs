//! Reader and writer for Java-style `.properties` text.
//!
//! Eclipse stores workspace and project preferences in this format. The
//! reader follows the classic rules:
//! - `#` and `!` start a comment line
//! - keys are separated from values by `=`, `:` or whitespace
//! - a line ending in an odd number of backslashes continues on the next line
//! - `\t`, `\n`, `\r`, `\f` and `\uXXXX` escapes are decoded
//!
//! The writer emits pure ASCII: one `key=value` entry per line, sorted by
//! key, `\n` line endings, no timestamp comment. Sorting keeps regenerated
//! files byte-identical across runs.

use indexmap::IndexMap;
use std::fmt::Write;

/// Ordered key/value pairs as read from, or written to, a properties file.
pub type Properties = IndexMap<String, String>;

/// A malformed escape sequence in properties text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    /// 1-based line number where the offending logical line starts
    pub line: usize,
    /// What went wrong
    pub message: String,
}

/// Parse properties text into ordered key/value pairs.
///
/// Duplicate keys keep their first position and their last value.
pub fn parse(text: &str) -> Result<Properties, ParseError> {
    let mut props = Properties::new();

    for (line, logical) in logical_lines(text) {
        let (raw_key, raw_value) = split_key_value(&logical);
        let key = unescape(raw_key, line)?;
        let value = unescape(raw_value, line)?;
        props.insert(key, value);
    }

    Ok(props)
}

/// Serialize properties sorted by key.
pub fn to_string(props: &Properties) -> String {
    let mut sorted: Vec<(&String, &String)> = props.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let mut out = String::new();
    for (key, value) in sorted {
        let _ = writeln!(out, "{}={}", escape(key, true), escape(value, false));
    }
    out
}

/// Decode ISO-8859-1 bytes. Every byte maps to the char with the same code point.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Encode text as ISO-8859-1, replacing unmappable chars with `?`.
pub fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

/// Join natural lines into logical lines, dropping blanks and comments.
///
/// Returns `(first line number, logical line)` pairs with leading
/// whitespace already stripped.
fn logical_lines(text: &str) -> Vec<(usize, String)> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (idx, raw) in normalized.split('\n').enumerate() {
        let trimmed = raw.trim_start_matches([' ', '\t', '\x0c']);

        let (start, mut buf) = match pending.take() {
            Some(continued) => continued,
            None => {
                if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                    continue;
                }
                (idx + 1, String::new())
            }
        };

        let trailing_backslashes = trimmed.chars().rev().take_while(|c| *c == '\\').count();
        if trailing_backslashes % 2 == 1 {
            buf.push_str(&trimmed[..trimmed.len() - 1]);
            pending = Some((start, buf));
        } else {
            buf.push_str(trimmed);
            lines.push((start, buf));
        }
    }

    // A continuation on the last line of input simply ends there
    if let Some(last) = pending {
        lines.push(last);
    }

    lines
}

/// Split a logical line into its raw (still escaped) key and value.
fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    let mut hard_separator = false;

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                hard_separator = true;
                break;
            }
            ' ' | '\t' | '\x0c' => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    if key_end == line.len() {
        return (key, "");
    }

    let mut rest = &line[key_end + 1..];
    rest = rest.trim_start_matches([' ', '\t', '\x0c']);
    if !hard_separator {
        if let Some(stripped) = rest.strip_prefix(['=', ':']) {
            rest = stripped.trim_start_matches([' ', '\t', '\x0c']);
        }
    }

    (key, rest)
}

/// Decode backslash escapes.
fn unescape(raw: &str, line: usize) -> Result<String, ParseError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    // UTF-16 units from consecutive \u escapes, so surrogate pairs decode together
    let mut units: Vec<u16> = Vec::new();

    while let Some(c) = chars.next() {
        if c != '\\' {
            flush_units(&mut units, &mut out);
            out.push(c);
            continue;
        }

        let Some(next) = chars.next() else {
            // Lone trailing backslash is dropped
            break;
        };

        if next == 'u' {
            let hex: String = chars.by_ref().take(4).collect();
            // from_str_radix alone would accept a sign
            let unit = if hex.len() == 4 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
                u16::from_str_radix(&hex, 16).ok()
            } else {
                None
            };
            match unit {
                Some(unit) => units.push(unit),
                None => {
                    return Err(ParseError {
                        line,
                        message: format!("malformed \\uxxxx encoding: \\u{}", hex),
                    });
                }
            }
            continue;
        }

        flush_units(&mut units, &mut out);
        out.push(match next {
            't' => '\t',
            'n' => '\n',
            'r' => '\r',
            'f' => '\x0c',
            other => other,
        });
    }

    flush_units(&mut units, &mut out);
    Ok(out)
}

fn flush_units(units: &mut Vec<u16>, out: &mut String) {
    if units.is_empty() {
        return;
    }
    out.extend(char::decode_utf16(units.drain(..)).map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER)));
}

/// Escape a key or value for output.
///
/// Keys escape every space; values only a leading one.
fn escape(text: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(text.len());

    for (i, c) in text.chars().enumerate() {
        match c {
            ' ' if i == 0 || is_key => out.push_str("\\ "),
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x0c' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => {
                let mut buf = [0u16; 2];
                for unit in c.encode_utf16(&mut buf) {
                    let _ = write!(out, "\\u{:04X}", unit);
                }
            }
        }
    }

    out
}
