use deunicode::deunicode;

/// URL-safe slug for a title.
///
/// Non-ASCII text is transliterated first ("Ingénieur" becomes "ingenieur").
/// Lowercase ASCII alphanumerics are kept, runs of whitespace, `-` and `_`
/// collapse into a single `-`, everything else is dropped.
pub fn slugify(title: &str) -> String {
    let ascii = deunicode(title);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_separator = false;

    for ch in ascii.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch.to_ascii_lowercase());
        } else if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_separator = true;
        }
    }

    slug
}
