use super::models::PronunciationProgress;
use chrono::{DateTime, Utc};

/// An attempt is successful at or above this accuracy.
pub const SUCCESS_THRESHOLD: f64 = 80.0;
/// Mastery is reached once the running average gets here.
pub const MASTERY_THRESHOLD: f64 = 90.0;

/// One scored attempt applied to a progress row.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate<'a> {
    pub user_id: &'a str,
    pub letter_id: u32,
    pub score: f64,
    pub at: DateTime<Utc>,
}

impl ProgressUpdate<'_> {
    /// Returns the row after this attempt. `previous` is `None` for the
    /// first attempt on a user and letter pair.
    pub fn apply(&self, previous: Option<&PronunciationProgress>) -> PronunciationProgress {
        let score = if self.score.is_finite() {
            self.score.clamp(0.0, 100.0)
        } else {
            0.0
        };
        let successful = u32::from(score >= SUCCESS_THRESHOLD);

        let Some(previous) = previous else {
            return PronunciationProgress {
                user_id: self.user_id.to_string(),
                letter_id: self.letter_id,
                total_attempts: 1,
                successful_attempts: successful,
                average_accuracy: score,
                best_accuracy: score,
                last_accuracy: score,
                improvement_rate: 0.0,
                first_attempt_at: self.at,
                last_attempt_at: self.at,
                mastery_achieved_at: (score >= MASTERY_THRESHOLD).then_some(self.at),
            };
        };

        let old_count = previous.total_attempts as f64;
        let total_attempts = previous.total_attempts + 1;
        let average_accuracy =
            (previous.average_accuracy * old_count + score) / total_attempts as f64;
        let mastery_achieved_at = previous
            .mastery_achieved_at
            .or_else(|| (average_accuracy >= MASTERY_THRESHOLD).then_some(self.at));

        PronunciationProgress {
            user_id: previous.user_id.clone(),
            letter_id: previous.letter_id,
            total_attempts,
            successful_attempts: previous.successful_attempts + successful,
            average_accuracy,
            best_accuracy: previous.best_accuracy.max(score),
            last_accuracy: score,
            improvement_rate: average_accuracy - previous.average_accuracy,
            first_attempt_at: previous.first_attempt_at,
            last_attempt_at: self.at,
            mastery_achieved_at,
        }
    }
}
