//! Response sanitizer.
//!
//! Models asked for a `{"response": "..."}` object reply with anything from
//! clean JSON to fenced JSON with literal escape sequences to plain markdown.
//! [`resolve`] classifies a raw reply into a [`ModelOutput`] exactly once;
//! every function here is total and never fails.

use serde_json::Value;

use tutorly_types::llm::ModelOutput;

const FENCE: &str = "```";

/// Resolve a raw model reply into its canonical shape.
///
/// 1. Fence markers (with an optional language tag) are removed and the
///    result trimmed.
/// 2. If that text is a JSON object with a string `response`, it wins.
///    JSON escapes may decode to control characters, so the extracted
///    response is stripped too.
/// 3. Otherwise literal escape sequences are decoded and control characters
///    stripped; an object with a string `response` yields `JsonWrapped`, any
///    other JSON value yields `RawText` of the decoded text.
/// 4. Text that is not JSON at all is returned as the raw reply with only
///    control characters removed, so markdown fences in prose survive.
pub fn resolve(raw: &str) -> ModelOutput {
    let unfenced = strip_fences(raw);
    let unfenced = unfenced.trim();

    let direct = parse_lenient(unfenced);
    if let Some(response) = direct.as_ref().and_then(wrapped_response) {
        return ModelOutput::JsonWrapped { response };
    }

    let decoded = strip_control_chars(&unescape_literals(unfenced));
    match parse_lenient(&decoded) {
        Some(value) => match wrapped_response(&value) {
            Some(response) => ModelOutput::JsonWrapped { response },
            None => ModelOutput::RawText(decoded),
        },
        None if direct.is_some() => ModelOutput::RawText(decoded),
        None => ModelOutput::RawText(strip_control_chars(raw)),
    }
}

/// The canonical answer string for a raw model reply.
pub fn sanitize(raw: &str) -> String {
    resolve(raw).into_text()
}

/// Remove control characters below U+0020 except `\n`, `\r` and `\t`.
pub fn strip_control_chars(text: &str) -> String {
    text.chars()
        .filter(|c| (*c as u32) >= 0x20 || matches!(c, '\n' | '\r' | '\t'))
        .collect()
}

/// Normalize one line of streamed text: strip control characters, collapse
/// internal whitespace runs to a single space and trim both ends.
pub fn clean_line(line: &str) -> String {
    strip_control_chars(line)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Remove every fence marker together with a directly attached language tag.
fn strip_fences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(FENCE) {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + FENCE.len()..];
        let tag_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-')))
            .unwrap_or(rest.len());
        rest = &rest[tag_len..];
    }
    out.push_str(rest);
    out
}

/// Best-effort decoding of literal backslash escapes.
///
/// Known sequences are decoded; anything else, including a trailing lone
/// backslash, is kept verbatim.
fn unescape_literals(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('n') => {
                chars.next();
                out.push('\n');
            }
            Some('t') => {
                chars.next();
                out.push('\t');
            }
            Some('r') => {
                chars.next();
                out.push('\r');
            }
            Some(esc @ ('"' | '\\' | '/')) => {
                chars.next();
                out.push(esc);
            }
            Some('u') => {
                let lookahead: String = chars.clone().skip(1).take(4).collect();
                match decode_unicode_escape(&lookahead, &mut chars) {
                    Some(decoded) => out.push(decoded),
                    None => out.push('\\'),
                }
            }
            _ => out.push('\\'),
        }
    }
    out
}

/// Decode `uXXXX` (and a following `\uXXXX` low surrogate when needed).
///
/// `chars` is positioned on the `u`. It is only advanced when decoding
/// succeeds.
fn decode_unicode_escape(
    hex: &str,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
) -> Option<char> {
    let high = parse_hex4(hex)?;

    if (0xD800..0xDC00).contains(&high) {
        let tail: String = chars.clone().skip(5).take(6).collect();
        let low = tail
            .strip_prefix("\\u")
            .and_then(parse_hex4)
            .filter(|low| (0xDC00..0xE000).contains(low))?;
        let combined = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
        let decoded = char::from_u32(combined)?;
        for _ in 0..11 {
            chars.next();
        }
        return Some(decoded);
    }

    let decoded = char::from_u32(high)?;
    for _ in 0..5 {
        chars.next();
    }
    Some(decoded)
}

/// Exactly four ASCII hex digits. `from_str_radix` alone would accept a sign.
fn parse_hex4(hex: &str) -> Option<u32> {
    if hex.len() != 4 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

/// Parse JSON, tolerating raw control characters inside string literals.
fn parse_lenient(text: &str) -> Option<Value> {
    serde_json::from_str(&escape_controls_in_strings(text)).ok()
}

/// Escape raw control characters that appear inside JSON string literals.
fn escape_controls_in_strings(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if in_string {
            if escaped {
                escaped = false;
                out.push(c);
                continue;
            }
            match c {
                '\\' => {
                    escaped = true;
                    out.push(c);
                }
                '"' => {
                    in_string = false;
                    out.push(c);
                }
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
                c => out.push(c),
            }
        } else {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
        }
    }
    out
}

fn wrapped_response(value: &Value) -> Option<String> {
    value
        .as_object()
        .and_then(|map| map.get("response"))
        .and_then(Value::as_str)
        .map(strip_control_chars)
}
