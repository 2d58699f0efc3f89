/// First element of an upstream list field, or an empty string.
pub fn first_or_empty(values: &[String]) -> String {
    values.first().cloned().unwrap_or_default()
}

/// `value` when it has non-whitespace content, otherwise `fallback`.
pub fn non_empty_or(value: Option<&str>, fallback: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => fallback.to_string(),
    }
}

/// Whether a free-text location advertises remote work.
pub fn mentions_remote(location: &str) -> bool {
    location.to_lowercase().contains("remote")
}

/// Reverses the entity escaping some boards apply to HTML bodies.
/// `&amp;` goes last so that `&amp;lt;` decodes to the literal text `&lt;`.
pub fn unescape_html(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}
