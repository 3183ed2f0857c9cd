//! Candidate matches computed by the backend.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// A candidate's resume scored against one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMatch {
    /// Candidate name
    pub name: String,
    /// Resume identifier
    pub resume: String,
    /// Aggregate (weighted) score
    pub score: f64,
    /// Per-criterion rating breakdown
    #[serde(default)]
    pub ratings: Map<String, Value>,
}

impl CandidateMatch {
    /// Numeric rating for a criterion, if the backend reported one.
    pub fn rating(&self, criterion: &str) -> Option<f64> {
        match self.ratings.get(criterion)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Order matches best first. NaN scores sink to the bottom.
pub fn sort_by_score(matches: &mut [CandidateMatch]) {
    matches.sort_by(|a, b| match (a.score.is_nan(), b.score.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal),
    });
}
