/// Department used when neither the upstream nor any keyword gives a hint.
pub const DEFAULT_DEPARTMENT: &str = "Other";

/// Keyword → department table, checked in order against the lowercased title.
/// More specific keywords sit above broader ones ("product designer" is Design).
const DEPARTMENT_KEYWORDS: &[(&str, &str)] = &[
    ("design", "Design"),
    ("ux", "Design"),
    ("engineer", "Engineering"),
    ("developer", "Engineering"),
    ("devops", "Engineering"),
    ("architect", "Engineering"),
    ("solidity", "Engineering"),
    ("programmer", "Engineering"),
    ("sre", "Engineering"),
    ("security", "Engineering"),
    ("qa", "Engineering"),
    ("data", "Data"),
    ("analyst", "Data"),
    ("research", "Research"),
    ("scientist", "Research"),
    ("product", "Product"),
    ("marketing", "Marketing"),
    ("community", "Marketing"),
    ("content", "Marketing"),
    ("growth", "Marketing"),
    ("writer", "Marketing"),
    ("social", "Marketing"),
    ("sales", "Sales"),
    ("business development", "Sales"),
    ("accountant", "Finance"),
    ("account", "Sales"),
    ("partnership", "Sales"),
    ("support", "Support"),
    ("customer", "Support"),
    ("legal", "Legal"),
    ("counsel", "Legal"),
    ("compliance", "Legal"),
    ("finance", "Finance"),
    ("recruit", "People"),
    ("talent", "People"),
    ("people", "People"),
    ("hr", "People"),
    ("operations", "Operations"),
    ("office", "Operations"),
    ("manager", "Management"),
    ("director", "Management"),
    ("chief", "Management"),
    ("officer", "Management"),
];

/// Longer keywords that still only count as a whole word ("officer" is not an office).
const WHOLE_WORD_KEYWORDS: &[&str] = &["office"];

/// Best-effort department guess from keywords in a job title.
pub fn guess_department(title: &str) -> String {
    let lowered = title.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    DEPARTMENT_KEYWORDS
        .iter()
        .find(|(keyword, _)| matches_keyword(&lowered, &words, keyword))
        .map(|(_, department)| department.to_string())
        .unwrap_or_else(|| DEFAULT_DEPARTMENT.to_string())
}

/// Short keywords ("ux", "hr", "qa", "sre") must match a whole word so that
/// "three" never reads as HR; longer ones match as substrings ("engineering").
/// The table lists a longer keyword above any keyword it contains.
fn matches_keyword(lowered: &str, words: &[&str], keyword: &str) -> bool {
    if keyword.len() <= 3 || WHOLE_WORD_KEYWORDS.contains(&keyword) {
        words.iter().any(|w| *w == keyword)
    } else {
        lowered.contains(keyword)
    }
}

/// Upstream department when it has one, otherwise the title heuristic.
pub fn department_or_guess(department: Option<&str>, title: &str) -> String {
    match department.map(str::trim) {
        Some(dept) if !dept.is_empty() => dept.to_string(),
        _ => guess_department(title),
    }
}
