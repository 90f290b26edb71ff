//! Text normalization helpers shared by the scorers

use regex::Regex;
use std::sync::OnceLock;
use unicode_segmentation::UnicodeSegmentation;

fn punctuation_regex() -> &'static Regex {
    static PUNCT: OnceLock<Regex> = OnceLock::new();
    PUNCT.get_or_init(|| Regex::new(r"[^\w\s]").expect("Invalid punctuation regex"))
}

/// Lower-cased Unicode word tokens
pub fn tokenize(text: &str) -> Vec<String> {
    text.unicode_words().map(|w| w.to_lowercase()).collect()
}

/// Split a comma-separated user list into trimmed, lower-cased, non-empty items
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Normalize a list that already arrived as separate items
pub fn normalize_items<S: AsRef<str>>(items: &[S]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.as_ref().trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Lower-case, trim, replace punctuation with spaces, keep tokens longer than one char
pub fn role_keywords(role: &str) -> Vec<String> {
    let normalized = role.trim().to_lowercase();
    let cleaned = punctuation_regex().replace_all(&normalized, " ");

    let mut keywords: Vec<String> = Vec::new();
    for token in cleaned.split_whitespace() {
        if token.chars().count() > 1 && !keywords.iter().any(|k| k == token) {
            keywords.push(token.to_string());
        }
    }
    keywords
}

/// Capitalize the first letter of every alphabetic run, lower-case the rest
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_is_letter = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }
    out
}

/// Fill a `{skill}` URL template: each word percent-encoded, words joined with `+`
pub fn search_link(template: &str, skill: &str) -> String {
    let query = skill
        .split_whitespace()
        .map(|word| urlencoding::encode(word).into_owned())
        .collect::<Vec<_>>()
        .join("+");
    template.replace("{skill}", &query)
}

/// Truncate text to a maximum length with ellipsis, on a char boundary
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    match truncated.rfind(' ') {
        Some(last_space) if last_space > 0 => format!("{}...", &truncated[..last_space]),
        _ => format!("{}...", truncated),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_keywords() {
        assert_eq!(role_keywords("  Software Developer "), vec!["software", "developer"]);
        assert_eq!(role_keywords("AI/ML Engineer, (Cloud)"), vec!["ai", "ml", "engineer", "cloud"]);
        // single-character tokens are dropped
        assert_eq!(role_keywords("C developer"), vec!["developer"]);
        assert!(role_keywords("!!!").is_empty());
    }

    #[test]
    fn test_title_case_follows_word_runs() {
        assert_eq!(title_case("sql"), "Sql");
        assert_eq!(title_case("machine learning"), "Machine Learning");
        assert_eq!(title_case("node.js"), "Node.Js");
        assert_eq!(title_case("c++"), "C++");
        assert_eq!(title_case("3d modelling"), "3D Modelling");
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(" Python, ,SQL ,"), vec!["python", "sql"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_search_link() {
        let link = search_link("https://www.youtube.com/results?search_query=learn+{skill}+course", "machine learning");
        assert_eq!(link, "https://www.youtube.com/results?search_query=learn+machine+learning+course");
    }

    #[test]
    fn test_search_link_encodes_reserved_characters() {
        let template = "https://www.coursera.org/search?q={skill}";
        assert_eq!(search_link(template, "c#"), "https://www.coursera.org/search?q=c%23");
        assert_eq!(search_link(template, "c++"), "https://www.coursera.org/search?q=c%2B%2B");
        assert_eq!(
            search_link(template, "node.js & react"),
            "https://www.coursera.org/search?q=node.js+%26+react"
        );
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("income support for farmers", 12), "income...");
    }
}
