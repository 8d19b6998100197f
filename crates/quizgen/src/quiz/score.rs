//! Score aggregation over grading results

use serde::Serialize;

use crate::quiz::types::GradeResult;

/// Totals for a graded quiz
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub earned: f64,
    pub max: f64,
    /// `earned / max * 100`, or 0 when there are no available marks
    pub percentage: f64,
}

impl ScoreSummary {
    pub fn from_results(results: &[GradeResult]) -> Self {
        let earned: f64 = results.iter().map(|r| r.earned_marks).sum();
        let max: f64 = results.iter().map(|r| r.max_marks).sum();
        let percentage = if max > 0.0 { earned / max * 100.0 } else { 0.0 };

        Self {
            earned,
            max,
            percentage,
        }
    }
}

/// Aggregate percentage for a set of grading results.
pub fn percentage(results: &[GradeResult]) -> f64 {
    ScoreSummary::from_results(results).percentage
}
