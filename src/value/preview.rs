//! Bounded, single-line value previews for diagnostics.
use super::{Value, format_number};

const DEFAULT_DEPTH: usize = 3;
const DEFAULT_LENGTH: isize = 30;

/// Preview with the default bounds (depth 3, roughly 30 characters).
pub fn preview(value: &Value) -> String {
    preview_bounded(value, DEFAULT_DEPTH, DEFAULT_LENGTH)
}

/// Nested containers collapse to `[Array]` / `{Object}` once `depth` runs out;
/// entries stop being printed once `length` characters have been emitted.
pub fn preview_bounded(value: &Value, depth: usize, length: isize) -> String {
    match value {
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => format_number(*number),
        Value::BigInt(big) => big.to_string(),
        Value::String(text) => quote(text),
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Function(_) => "function".to_string(),
        Value::Symbol(_) => "symbol".to_string(),
        Value::Array(array) => {
            if depth == 0 || length == 0 {
                return "[Array]".to_string();
            }
            let items = array.snapshot();
            let mut out = String::from("[");
            let mut shown = 0;
            while shown < items.len() && length > width(&out) {
                if shown != 0 {
                    out.push_str(", ");
                }
                out.push_str(&preview_bounded(&items[shown], depth - 1, length - width(&out)));
                shown += 1;
            }
            if shown < items.len() {
                out.push_str(" ... ");
            }
            out.push(']');
            out
        }
        Value::Object(object) => {
            if depth == 0 {
                return "{Object}".to_string();
            }
            let entries = object.snapshot();
            let mut out = String::from("{");
            let mut shown = 0;
            while shown < entries.len() && length > width(&out) {
                if shown != 0 {
                    out.push_str(", ");
                }
                let (key, item) = &entries[shown];
                if key.chars().any(char::is_whitespace) {
                    out.push_str(&quote(key));
                } else {
                    out.push_str(key);
                }
                out.push_str(": ");
                out.push_str(&preview_bounded(item, depth - 1, length - width(&out)));
                shown += 1;
            }
            if shown < entries.len() {
                out.push_str(" ... ");
            }
            out.push('}');
            out
        }
    }
}

fn width(text: &str) -> isize {
    text.chars().count() as isize
}

fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{text}\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn show(json: serde_json::Value) -> String {
        preview(&Value::from(json))
    }

    #[test]
    fn scalars() {
        assert_eq!(show(json!("hi")), "\"hi\"");
        assert_eq!(show(json!(5)), "5");
        assert_eq!(show(json!(null)), "null");
        assert_eq!(preview(&Value::Undefined), "undefined");
        assert_eq!(preview(&Value::BigInt(12)), "12");
        assert_eq!(preview(&Value::function("f")), "function");
    }

    #[test]
    fn containers() {
        assert_eq!(show(json!({"a": "A", "b": "B"})), "{a: \"A\", b: \"B\"}");
        assert_eq!(show(json!([2, {"size": 10}])), "[2, {size: 10}]");
        assert_eq!(show(json!({"two words": 1})), "{\"two words\": 1}");
        assert_eq!(show(json!([[[[1]]]])), "[[[[Array]]]]");
        assert_eq!(show(json!({"a": {"b": {"c": {}}}})), "{a: {b: {c: {Object}}}}");
    }

    #[test]
    fn long_values_are_truncated() {
        let rendered = show(json!([1111111111_i64, 2222222222_i64, 3333333333_i64, 4444444444_i64, 5555555555_i64]));
        assert_eq!(rendered, "[1111111111, 2222222222, 3333333333 ... ]");
    }
}
