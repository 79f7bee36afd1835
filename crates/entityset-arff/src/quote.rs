//! ARFF token quoting.

use std::borrow::Cow;

/// Quotes `value` the way Weka does: values containing whitespace,
/// separators, quotes, braces or `%`, the empty string and a lone `?` are
/// wrapped in single quotes with backslash escapes. Anything else is
/// returned unchanged.
pub fn quote(value: &str) -> Cow<'_, str> {
    if !needs_quotes(value) {
        return Cow::Borrowed(value);
    }
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for ch in value.chars() {
        match ch {
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            '"' => quoted.push_str("\\\""),
            '%' => quoted.push_str("\\%"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            other => quoted.push(other),
        }
    }
    quoted.push('\'');
    Cow::Owned(quoted)
}

fn needs_quotes(value: &str) -> bool {
    value.is_empty()
        || value == "?"
        || value.chars().any(|ch| {
            ch.is_whitespace()
                || matches!(ch, ',' | '\'' | '"' | '\\' | '{' | '}' | '%')
        })
}
