use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::candidate::Category;

/// Keyword dictionaries per category, in tie-break order.
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::DataScience,
        &[
            "data science", "data scientist", "data analyst", "data analysis",
            "machine learning", "deep learning", "ml engineer", "ai engineer",
            "statistics", "statistical", "predictive modeling", "data mining",
            "python", "r", "pandas", "numpy", "scikit-learn", "tensorflow", "pytorch",
            "jupyter", "sql", "data visualization", "tableau", "power bi",
            "big data", "hadoop", "spark", "data pipeline", "etl",
        ],
    ),
    (
        Category::SoftwareDevelopment,
        &[
            "software engineer", "software developer", "developer", "programmer",
            "full stack", "backend", "frontend", "web developer", "mobile developer",
            "java", "javascript", "typescript", "react", "angular", "vue", "node.js",
            "django", "flask", "spring", "api", "rest", "microservices",
            "git", "agile", "scrum", "code review", "testing", "debugging",
        ],
    ),
    (
        Category::Marketing,
        &[
            "marketing", "marketer", "digital marketing", "content marketing",
            "social media", "seo", "sem", "ppc", "google ads", "facebook ads",
            "brand management", "campaign", "analytics", "roi", "conversion",
            "email marketing", "marketing strategy", "advertising", "pr",
            "public relations", "market research", "customer acquisition",
        ],
    ),
    (
        Category::Design,
        &[
            "designer", "ui/ux", "user interface", "user experience", "graphic design",
            "figma", "adobe", "photoshop", "illustrator", "sketch", "prototyping",
            "wireframe", "visual design", "interaction design", "design system",
        ],
    ),
    (
        Category::Business,
        &[
            "business analyst", "product manager", "project manager", "consultant",
            "strategy", "operations", "finance", "accounting", "sales",
            "business development", "management", "leadership",
        ],
    ),
];

static CATEGORY_PATTERNS: Lazy<Vec<(Category, Vec<Regex>)>> = Lazy::new(|| {
    CATEGORY_KEYWORDS
        .iter()
        .map(|(category, keywords)| {
            let patterns = keywords
                .iter()
                .filter_map(|kw| Regex::new(&format!(r"\b{}\b", regex::escape(kw))).ok())
                .collect();
            (*category, patterns)
        })
        .collect()
});

/// Most likely category for `text`, by count of keyword occurrences.
///
/// Ties go to the category listed first. Returns `None` when no keyword
/// matches, which the scorer treats as "unknown" and never penalizes.
pub fn classify_category(text: &str) -> Option<Category> {
    if text.is_empty() {
        return None;
    }

    let lower = text.to_lowercase();
    let mut best: Option<(Category, usize)> = None;
    for (category, patterns) in CATEGORY_PATTERNS.iter() {
        let score: usize = patterns.iter().map(|re| re.find_iter(&lower).count()).sum();
        if score == 0 {
            continue;
        }
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((*category, score));
        }
    }
    best.map(|(category, _)| category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_science_text() {
        let text = "Data scientist with machine learning, pandas and statistics background";
        assert_eq!(classify_category(text), Some(Category::DataScience));
    }

    #[test]
    fn test_marketing_text() {
        let text = "Digital marketing manager running SEO campaigns and social media advertising";
        assert_eq!(classify_category(text), Some(Category::Marketing));
    }

    #[test]
    fn test_design_text() {
        let text = "Product designer: Figma prototyping, wireframe reviews, design system owner";
        assert_eq!(classify_category(text), Some(Category::Design));
    }

    #[test]
    fn test_no_keywords_is_unknown() {
        assert_eq!(classify_category("Licensed plumber and electrician"), None);
        assert_eq!(classify_category(""), None);
    }

    #[test]
    fn test_tie_goes_to_first_category() {
        // One data-science hit ("python") and one software hit ("java").
        assert_eq!(classify_category("python java"), Some(Category::DataScience));
    }

    #[test]
    fn test_repeated_mentions_count() {
        let text = "sales sales sales python";
        assert_eq!(classify_category(text), Some(Category::Business));
    }
}
