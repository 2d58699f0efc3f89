use regex::Regex;
use std::sync::OnceLock;

/// Site name appended to synthesized email subjects.
pub const SITE_TAG: &str = "useWeb3";

static EMAIL_PATTERN: OnceLock<Regex> = OnceLock::new();

fn email_pattern() -> &'static Regex {
    EMAIL_PATTERN.get_or_init(|| {
        Regex::new(r"^[^\s@/:]+@[^\s@/:]+\.[A-Za-z]{2,}$").expect("email pattern compiles")
    })
}

pub fn is_email(value: &str) -> bool {
    email_pattern().is_match(value.trim())
}

/// Application link for a posting: email addresses become a `mailto:` URL
/// with a prefilled subject, anything else passes through verbatim.
pub fn application_url(raw: &str, title: &str) -> String {
    if is_email(raw) {
        format!(
            "mailto:{}?subject=Apply for {} ({})",
            raw.trim(),
            title,
            SITE_TAG
        )
    } else {
        raw.to_string()
    }
}
