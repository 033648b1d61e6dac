// Candidate matching: similarity, composite scoring, ranking and CSV export.

pub mod export;
pub mod handlers;
pub mod ranking;
pub mod score;
pub mod similarity;
