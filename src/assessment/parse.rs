//! JSON extraction from free-form model output.
//!
//! Models routinely wrap their JSON in prose or markdown fences. This scans
//! for the first balanced `{...}` region that parses as a JSON object,
//! tracking string literals so braces inside them don't confuse the depth
//! count.

use serde_json::Value;

/// First brace-delimited substring of `text` that parses as a JSON object.
pub fn extract_json_object(text: &str) -> Option<Value> {
    let bytes = text.as_bytes();
    let mut start = 0;
    while let Some(offset) = text[start..].find('{') {
        let open = start + offset;
        if let Some(end) = balanced_end(bytes, open) {
            if let Ok(value) = serde_json::from_str::<Value>(&text[open..=end]) {
                if value.is_object() {
                    return Some(value);
                }
            }
        }
        start = open + 1;
    }
    None
}

/// Index of the `}` closing the `{` at `open`, or `None` if unbalanced.
fn balanced_end(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
