//! Best-effort parsing of a JSON document that is still being streamed.

use serde_json::Value;

/// How many truncation points to try before giving up.
const MAX_CUT_ATTEMPTS: usize = 8;

/// Parse `buffer` as JSON, closing any open strings, objects and arrays.
///
/// When the buffer ends inside a key, after a colon or in the middle of a
/// literal, the incomplete member is cut off and the rest is returned.
/// Returns `None` when nothing sensible can be recovered.
pub fn parse_partial(buffer: &str) -> Option<Value> {
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Some(value);
    }

    if let Some(value) = close_and_parse(trimmed) {
        return Some(value);
    }

    cut_points(trimmed)
        .into_iter()
        .rev()
        .take(MAX_CUT_ATTEMPTS)
        .find_map(|end| close_and_parse(trimmed[..end].trim_end()))
}

struct ScanState {
    stack: Vec<char>,
    in_string: bool,
    escaped: bool,
}

fn scan(text: &str) -> ScanState {
    let mut state = ScanState {
        stack: Vec::new(),
        in_string: false,
        escaped: false,
    };
    for ch in text.chars() {
        if state.in_string {
            if state.escaped {
                state.escaped = false;
            } else if ch == '\\' {
                state.escaped = true;
            } else if ch == '"' {
                state.in_string = false;
            }
            continue;
        }
        match ch {
            '"' => state.in_string = true,
            '{' => state.stack.push('}'),
            '[' => state.stack.push(']'),
            '}' | ']' => {
                state.stack.pop();
            }
            _ => {}
        }
    }
    state
}

fn close_and_parse(text: &str) -> Option<Value> {
    if text.is_empty() {
        return None;
    }
    let state = scan(text);
    let mut candidate = String::with_capacity(text.len() + state.stack.len() + 2);
    if state.in_string {
        candidate.push_str(text.strip_suffix('\\').filter(|_| state.escaped).unwrap_or(text));
        candidate.push('"');
    } else {
        candidate.push_str(text);
    }
    candidate.extend(state.stack.iter().rev());
    serde_json::from_str(&candidate).ok()
}

/// Byte offsets where the buffer can be truncated to drop a trailing
/// incomplete member: just before a separating comma, or just after an
/// opening bracket.
fn cut_points(text: &str) -> Vec<usize> {
    let mut points = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    for (index, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            ',' => points.push(index),
            '{' | '[' => points.push(index + 1),
            _ => {}
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn complete_documents_parse_as_is() {
        assert_eq!(parse_partial(r#"{"a":1}"#), Some(json!({ "a": 1 })));
    }

    #[test]
    fn closes_open_string_and_object() {
        assert_eq!(
            parse_partial(r#"{"city":"Par"#),
            Some(json!({ "city": "Par" }))
        );
    }

    #[test]
    fn closes_nested_containers() {
        assert_eq!(
            parse_partial(r#"{"tags":["a","b"#),
            Some(json!({ "tags": ["a", "b"] }))
        );
    }

    #[test]
    fn drops_dangling_key_and_colon() {
        assert_eq!(parse_partial(r#"{"a":1,"b"#), Some(json!({ "a": 1 })));
        assert_eq!(parse_partial(r#"{"a":1,"b":"#), Some(json!({ "a": 1 })));
        assert_eq!(parse_partial(r#"{"a":1,"#), Some(json!({ "a": 1 })));
    }

    #[test]
    fn drops_partial_literal() {
        assert_eq!(parse_partial(r#"{"a":1,"ok":tr"#), Some(json!({ "a": 1 })));
    }

    #[test]
    fn drops_pending_escape() {
        assert_eq!(parse_partial(r#"{"p":"C:\"#), Some(json!({ "p": "C:" })));
    }

    #[test]
    fn empty_or_opening_only() {
        assert_eq!(parse_partial(""), None);
        assert_eq!(parse_partial("{"), Some(json!({})));
    }
}
