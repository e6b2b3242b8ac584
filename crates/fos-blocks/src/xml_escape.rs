//! XML Escaping
//!
//! Used when block fields are written back into project XML.

use serde_json::Value;

use crate::cast;

/// Escape a value for use inside an XML tag.
///
/// Objects and arrays (hacked blocks can carry them) are stringified first.
/// Other non-string values are not expected here; they are logged and
/// returned in their plain string form.
pub fn xml_escape(unsafe_value: &Value) -> String {
    match unsafe_value {
        Value::String(s) => escape_str(s),
        Value::Object(_) | Value::Array(_) => escape_str(&cast::to_string(unsafe_value)),
        other => {
            tracing::error!("Unexpected input received in xml_escape: {}", other);
            cast::to_string(other)
        }
    }
}

/// Escape `< > & ' "`
pub fn escape_str(unsafe_str: &str) -> String {
    let mut out = String::with_capacity(unsafe_str.len());
    for c in unsafe_str.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_escape_all_specials() {
        assert_eq!(escape_str(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &apos;Jerry&apos;&lt;/a&gt;");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(escape_str("hello world"), "hello world");
        assert_eq!(escape_str(""), "");
    }

    #[test]
    fn test_already_escaped_is_escaped_again() {
        assert_eq!(escape_str("&amp;"), "&amp;amp;");
    }

    #[test]
    fn test_non_string_values() {
        assert_eq!(xml_escape(&json!("<b>")), "&lt;b&gt;");
        assert_eq!(xml_escape(&json!(["<"])), "[&quot;&lt;&quot;]");
        assert_eq!(xml_escape(&json!(5)), "5");
        assert_eq!(xml_escape(&json!(true)), "true");
    }
}
