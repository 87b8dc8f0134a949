//! Learner-facing summaries built from stored feedback and progress rows.

mod feedback;
mod progress;

pub use feedback::{feedback_history, FeedbackEntry, FeedbackHistory, FeedbackStatistics};
pub use progress::{
    progress_report, AreaEntry, LetterProgressEntry, LetterTrend, OverallStatistics,
    ProgressReport, TrendDirection, TREND_THRESHOLD, TREND_WINDOW,
};

/// Rounds to two decimal places for display.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Integer percentage of `part` over `whole`, 0 when `whole` is 0.
pub(crate) fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        0
    } else {
        (part as f64 / whole as f64 * 100.0).round() as u32
    }
}
