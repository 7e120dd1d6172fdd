//! Filter composition and placeholder substitution
//!
//! Both functions splice operator-authored text into SQL verbatim. This tool
//! runs locally against connections the operator registered themselves, so
//! predicates and placeholder values are trusted input; there is no quoting
//! or validation layer.

use serde_json::Value;
use std::collections::HashMap;

/// Compose a derived query applying `raw_filter` to `base_query`.
///
/// The filter is trimmed and may carry one leading `WHERE` keyword (any
/// case), which is stripped. An empty predicate returns the base query
/// unchanged, so an empty filter is byte-identical to no filter at all.
pub fn compose_filter(base_query: &str, raw_filter: &str) -> String {
    let mut predicate = raw_filter.trim();
    // get() rather than indexing: byte 5 may fall inside a multibyte char
    if predicate.get(..5).map_or(false, |k| k.eq_ignore_ascii_case("where"))
        && predicate[5..].chars().next().map_or(true, char::is_whitespace)
    {
        predicate = predicate[5..].trim_start();
    }
    let predicate = predicate.trim();

    if predicate.is_empty() {
        base_query.to_string()
    } else {
        format!("SELECT * FROM ({}) WHERE {}", base_query, predicate)
    }
}

/// Replace `:name` placeholders in the query text with rendered values.
///
/// This is a literal string replace, not parameter binding: each JSON value
/// is rendered to text (strings without quotes) and substituted everywhere
/// `:{key}` occurs.
pub fn substitute_args(sql: &str, args: &HashMap<String, Value>) -> String {
    let mut out = sql.to_string();
    for (key, value) in args {
        let rendered = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        out = out.replace(&format!(":{}", key), &rendered);
    }
    out
}
