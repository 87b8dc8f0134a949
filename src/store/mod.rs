mod models;
mod progress;
mod schema;
mod sqlite_store;

pub use models::*;
pub use progress::{ProgressUpdate, MASTERY_THRESHOLD, SUCCESS_THRESHOLD};
pub use schema::PRONUNCIATION_VERSIONED_SCHEMAS;
pub use sqlite_store::SqlitePronunciationStore;

use anyhow::Result;
use chrono::{DateTime, Utc};

#[cfg_attr(test, mockall::automock)]
pub trait PronunciationStore: Send + Sync {
    /// Appends a feedback row and returns its id.
    fn insert_feedback(&self, feedback: &NewFeedback) -> Result<String>;

    /// Applies one attempt to the user's progress on a letter and returns
    /// the updated row.
    fn record_attempt(
        &self,
        user_id: &str,
        letter_id: u32,
        score: f64,
        at: DateTime<Utc>,
    ) -> Result<PronunciationProgress>;

    fn get_progress(&self, user_id: &str, letter_id: u32)
        -> Result<Option<PronunciationProgress>>;

    /// Progress rows of a user, ordered by letter id.
    fn list_progress(
        &self,
        user_id: &str,
        letter_id: Option<u32>,
    ) -> Result<Vec<PronunciationProgress>>;

    /// Feedback rows matching the query, newest first.
    fn list_feedback(&self, query: &FeedbackQuery) -> Result<Vec<PronunciationFeedback>>;
}
