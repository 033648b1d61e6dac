//! Match Score: composite of semantic similarity and explicit skill overlap.
//!
//! `final = (0.7 · semantic + 0.3 · coverage) · skill_multiplier · domain_penalty`
//!
//! The skill gate is a soft penalty: a failed gate scales the score by
//! `skill_penalty` instead of rejecting the candidate. Every penalty that fires
//! leaves a human-readable flag on the result.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::candidate::{Category, SkillSet};

pub const SEMANTIC_WEIGHT: f64 = 0.7;
pub const SKILL_WEIGHT: f64 = 0.3;
/// Multiplier applied when resume and job categories are both known and differ.
pub const DOMAIN_MISMATCH_PENALTY: f64 = 0.2;

/// Semantic similarity above which low skill coverage is called out.
const HIGH_SEMANTIC_THRESHOLD: f64 = 0.5;
/// Coverage below which a semantically strong match is called out.
const LOW_COVERAGE_THRESHOLD: f64 = 0.1;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Tunable skill-gate parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringParams {
    /// Minimum coverage for the skill gate to pass.
    pub min_skill_overlap: f64,
    /// Multiplier applied when the gate fails.
    pub skill_penalty: f64,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            min_skill_overlap: 0.2,
            skill_penalty: 0.5,
        }
    }
}

/// Outcome of one scoring call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub final_score: f64,
    pub semantic_similarity: f64,
    pub skill_coverage: f64,
    pub skill_gate_passed: bool,
    pub domain_penalty: f64,
    pub flags: Vec<String>,
}

impl ScoreResult {
    /// Flags joined for single-line display.
    pub fn flag_text(&self) -> String {
        self.flags.join("; ")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Components
// ────────────────────────────────────────────────────────────────────────────

/// Fraction of JD skills present in the resume (case-insensitive).
/// An empty JD skill set counts as full coverage.
pub fn skill_coverage(resume_skills: &SkillSet, jd_skills: &SkillSet) -> f64 {
    let jd: HashSet<String> = jd_skills.iter().map(|s| s.to_lowercase()).collect();
    if jd.is_empty() {
        return 1.0;
    }
    let resume: HashSet<String> = resume_skills.iter().map(|s| s.to_lowercase()).collect();
    let shared = jd.intersection(&resume).count();
    shared as f64 / jd.len() as f64
}

/// Threshold test on a [`skill_coverage`] value. Vacuously passes for an empty
/// JD, whose coverage is always `1.0`.
pub fn skill_gate(coverage: f64, min_skill_overlap: f64) -> bool {
    coverage >= min_skill_overlap
}

/// `0.2` when both categories are known and differ, `1.0` otherwise.
pub fn domain_penalty(resume_category: Option<Category>, job_category: Option<Category>) -> f64 {
    match (resume_category, job_category) {
        (Some(r), Some(j)) if r != j => DOMAIN_MISMATCH_PENALTY,
        _ => 1.0,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Composite score
// ────────────────────────────────────────────────────────────────────────────

/// Scores one resume against one job description.
///
/// `semantic_similarity` must already be in [0, 1] (see
/// [`crate::matching::similarity::cosine_similarity`]).
pub fn score(
    semantic_similarity: f64,
    resume_skills: &SkillSet,
    jd_skills: &SkillSet,
    resume_category: Option<Category>,
    job_category: Option<Category>,
    params: &ScoringParams,
) -> ScoreResult {
    let coverage = skill_coverage(resume_skills, jd_skills);
    let gate_passed = skill_gate(coverage, params.min_skill_overlap);
    let skill_multiplier = if gate_passed { 1.0 } else { params.skill_penalty };
    let domain = domain_penalty(resume_category, job_category);

    let weighted = SEMANTIC_WEIGHT * semantic_similarity + SKILL_WEIGHT * coverage;
    let final_score = (weighted * skill_multiplier * domain).clamp(0.0, 1.0);

    let mut flags = Vec::new();
    if !gate_passed {
        flags.push(format!(
            "low skill overlap ({:.0}%) — {:.0}% penalty applied",
            coverage * 100.0,
            (1.0 - params.skill_penalty) * 100.0
        ));
    }
    if semantic_similarity > HIGH_SEMANTIC_THRESHOLD && coverage < LOW_COVERAGE_THRESHOLD {
        flags.push("high semantic similarity but low skill relevance".to_string());
    }
    if let (Some(r), Some(j)) = (resume_category, job_category) {
        if domain < 1.0 {
            flags.push(format!("domain mismatch: {r} vs {j}"));
        }
    }

    ScoreResult {
        final_score,
        semantic_similarity,
        skill_coverage: coverage,
        skill_gate_passed: gate_passed,
        domain_penalty: domain,
        flags,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
