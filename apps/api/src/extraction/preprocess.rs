use once_cell::sync::Lazy;
use regex::Regex;

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?\S+|www\S+").expect("valid regex"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+@\S+").expect("valid regex"));
static SPECIAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s.,;!?\-:]").expect("valid regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Normalizes text before embedding: lowercase, no URLs or email addresses,
/// symbols other than basic punctuation replaced by spaces, whitespace collapsed.
pub fn preprocess(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let text = text.to_lowercase();
    let text = URL_RE.replace_all(&text, "");
    let text = EMAIL_RE.replace_all(&text, "");
    let text = SPECIAL_RE.replace_all(&text, " ");
    let text = WHITESPACE_RE.replace_all(&text, " ");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_collapses_whitespace() {
        assert_eq!(preprocess("  Senior   Rust\n\tEngineer  "), "senior rust engineer");
    }

    #[test]
    fn test_strips_urls_and_emails() {
        let out = preprocess("Contact jane.doe@example.com or see https://jane.dev and www.github.com/jane");
        assert_eq!(out, "contact or see and");
    }

    #[test]
    fn test_replaces_symbols_keeps_punctuation() {
        assert_eq!(preprocess("C++ & Rust (5 yrs), Python!"), "c rust 5 yrs , python!");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(preprocess(""), "");
        assert_eq!(preprocess("   "), "");
    }
}
