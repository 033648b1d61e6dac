//! Dictionary-based skill extraction.
//!
//! Coverage is deliberately limited to a fixed vocabulary of common technical
//! skills; anything outside it is invisible to the skill gate.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::candidate::SkillSet;

pub const SKILL_KEYWORDS: &[&str] = &[
    // Programming languages
    "python", "java", "javascript", "typescript", "c++", "c#", "go", "rust",
    "ruby", "php", "swift", "kotlin", "scala", "r", "matlab", "sql",
    // Frameworks & libraries
    "react", "angular", "vue", "node.js", "django", "flask", "fastapi",
    "spring", "express", "tensorflow", "pytorch", "keras", "pandas", "numpy",
    // Tools & platforms
    "docker", "kubernetes", "aws", "azure", "gcp", "git", "jenkins",
    "mongodb", "postgresql", "mysql", "redis", "elasticsearch",
    "linux", "unix", "bash", "powershell",
    // Data & analytics
    "machine learning", "deep learning", "data science", "data analysis",
    "big data", "hadoop", "spark", "tableau", "power bi",
    // Practices
    "agile", "scrum", "devops", "ci/cd", "microservices", "rest api",
    "graphql", "html", "css", "sass", "less", "webpack", "npm", "yarn",
];

static SKILL_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    SKILL_KEYWORDS
        .iter()
        .filter_map(|skill| {
            Regex::new(&format!(r"\b{}\b", regex::escape(skill)))
                .ok()
                .map(|re| (*skill, re))
        })
        .collect()
});

/// Skills from [`SKILL_KEYWORDS`] mentioned in `text`, title-cased.
///
/// Matching is case-insensitive on word boundaries, so `"go"` does not match
/// inside `"google"`. Keywords ending in a symbol (`c++`, `c#`) need a word
/// character right after them to match.
pub fn extract_skills(text: &str) -> SkillSet {
    if text.is_empty() {
        return SkillSet::new();
    }

    let lower = text.to_lowercase();
    SKILL_PATTERNS
        .iter()
        .filter(|(_, re)| re.is_match(&lower))
        .map(|(skill, _)| title_case(skill))
        .collect()
}

/// Uppercases the first letter of every letter run: `"node.js"` → `"Node.Js"`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_known_skills() {
        let skills = extract_skills("Built ETL in Python and SQL on AWS with Docker.");
        let expected: Vec<&str> = vec!["Aws", "Docker", "Python", "Sql"];
        assert_eq!(skills.iter().map(String::as_str).collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_word_boundaries() {
        let skills = extract_skills("Worked at Google on Gopher tooling");
        assert!(!skills.contains("Go"));
        let skills = extract_skills("Services written in Go.");
        assert!(skills.contains("Go"));
    }

    #[test]
    fn test_multi_word_and_punctuated_skills() {
        let skills = extract_skills("Machine Learning with Node.js, CI/CD pipelines and Power BI");
        assert!(skills.contains("Machine Learning"));
        assert!(skills.contains("Node.Js"));
        assert!(skills.contains("Ci/Cd"));
        assert!(skills.contains("Power Bi"));
    }

    #[test]
    fn test_duplicates_collapse() {
        let skills = extract_skills("rust Rust RUST");
        assert_eq!(skills.len(), 1);
    }

    #[test]
    fn test_empty_text() {
        assert!(extract_skills("").is_empty());
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("python"), "Python");
        assert_eq!(title_case("c++"), "C++");
        assert_eq!(title_case("rest api"), "Rest Api");
        assert_eq!(title_case("node.js"), "Node.Js");
    }

    #[test]
    fn test_every_keyword_compiles() {
        assert_eq!(SKILL_PATTERNS.len(), SKILL_KEYWORDS.len());
    }
}
