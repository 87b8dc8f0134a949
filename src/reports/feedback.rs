use super::{percentage, round2};
use crate::letters::{LetterInfo, LetterTable};
use crate::store::{PronunciationFeedback, SUCCESS_THRESHOLD};
use serde::Serialize;

/// A stored feedback row with its letter resolved.
#[derive(Serialize, Debug, Clone)]
pub struct FeedbackEntry {
    #[serde(flatten)]
    pub feedback: PronunciationFeedback,
    /// `None` when the letter is no longer in the table.
    pub letter_info: Option<LetterInfo>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FeedbackStatistics {
    pub total_attempts: usize,
    pub average_accuracy: f64,
    pub high_accuracy_count: usize,
    /// Newest accuracy minus oldest accuracy of the page.
    pub improvement_rate: f64,
    pub success_rate: u32,
}

#[derive(Serialize, Debug, Clone)]
pub struct FeedbackHistory {
    pub feedback: Vec<FeedbackEntry>,
    pub statistics: FeedbackStatistics,
}

/// Builds the feedback page. `rows` must be ordered newest first.
pub fn feedback_history(letters: &LetterTable, rows: Vec<PronunciationFeedback>) -> FeedbackHistory {
    let statistics = statistics(&rows);
    let feedback = rows
        .into_iter()
        .map(|feedback| FeedbackEntry {
            letter_info: letters.info(feedback.letter_id),
            feedback,
        })
        .collect();

    FeedbackHistory {
        feedback,
        statistics,
    }
}

fn statistics(rows: &[PronunciationFeedback]) -> FeedbackStatistics {
    let total = rows.len();
    let sum: f64 = rows.iter().map(|f| f.pronunciation_accuracy).sum();
    let average = if total > 0 { sum / total as f64 } else { 0.0 };
    let high_accuracy_count = rows
        .iter()
        .filter(|f| f.pronunciation_accuracy >= SUCCESS_THRESHOLD)
        .count();

    let improvement_rate = match (rows.first(), rows.last()) {
        (Some(newest), Some(oldest)) if total > 1 => {
            newest.pronunciation_accuracy - oldest.pronunciation_accuracy
        }
        _ => 0.0,
    };

    FeedbackStatistics {
        total_attempts: total,
        average_accuracy: round2(average),
        high_accuracy_count,
        improvement_rate: round2(improvement_rate),
        success_rate: percentage(high_accuracy_count, total),
    }
}
