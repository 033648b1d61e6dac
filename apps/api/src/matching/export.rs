use crate::matching::ranking::sort_by_score;
use crate::models::candidate::Candidate;

const HEADER: [&str; 9] = [
    "Rank",
    "Resume ID",
    "Filename",
    "Similarity Score",
    "Semantic Similarity",
    "Skill Coverage",
    "Skills",
    "Cluster Label",
    "Flags",
];

/// Renders candidates as CSV, best score first, one row per candidate.
pub fn ranked_csv(candidates: &[Candidate]) -> String {
    let mut ranked = candidates.to_vec();
    sort_by_score(&mut ranked);

    let mut out = String::new();
    push_row(&mut out, HEADER.iter().map(|h| h.to_string()));

    for (i, candidate) in ranked.iter().enumerate() {
        let (semantic, coverage, flags) = match &candidate.score {
            Some(s) => (
                format!("{:.4}", s.semantic_similarity),
                format!("{:.4}", s.skill_coverage),
                s.flag_text(),
            ),
            None => (String::new(), String::new(), String::new()),
        };
        let skills: Vec<&str> = candidate.skills.iter().map(String::as_str).collect();

        push_row(
            &mut out,
            [
                (i + 1).to_string(),
                candidate.id.to_string(),
                candidate.filename.clone(),
                format!("{:.4}", candidate.final_score()),
                semantic,
                coverage,
                skills.join(", "),
                candidate.cluster_label.to_string(),
                flags,
            ],
        );
    }
    out
}

fn push_row(out: &mut String, fields: impl IntoIterator<Item = String>) {
    let row: Vec<String> = fields.into_iter().map(|f| escape_field(&f)).collect();
    out.push_str(&row.join(","));
    out.push_str("\r\n");
}

/// Quotes a field when it contains a delimiter, quote, or line break.
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::score::ScoreResult;

    fn candidate(filename: &str, final_score: Option<f64>) -> Candidate {
        let mut c = Candidate::new(filename.to_string(), "text".to_string());
        c.score = final_score.map(|s| ScoreResult {
            final_score: s,
            semantic_similarity: 0.5,
            skill_coverage: 0.25,
            skill_gate_passed: true,
            domain_penalty: 1.0,
            flags: vec![],
        });
        c
    }

    #[test]
    fn test_header_and_rank_order() {
        let low = candidate("low.pdf", Some(0.2));
        let high = candidate("high.pdf", Some(0.8));
        let csv = ranked_csv(&[low, high]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Rank,Resume ID,Filename,Similarity Score"));
        assert!(lines[1].starts_with("1,"));
        assert!(lines[1].contains("high.pdf,0.8000,0.5000,0.2500"));
        assert!(lines[2].contains("low.pdf,0.2000"));
    }

    #[test]
    fn test_skills_field_is_quoted() {
        let mut c = candidate("a.pdf", Some(0.5));
        c.skills = ["Python".to_string(), "Sql".to_string()].into_iter().collect();
        let csv = ranked_csv(&[c]);
        assert!(csv.contains(",\"Python, Sql\","));
    }

    #[test]
    fn test_unscored_candidate_has_blank_detail_columns() {
        let csv = ranked_csv(&[candidate("u.pdf", None)]);
        let row = csv.lines().nth(1).unwrap();
        assert!(row.contains("u.pdf,0.0000,,,,0,"));
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
