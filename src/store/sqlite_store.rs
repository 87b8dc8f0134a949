use super::models::{FeedbackQuery, NewFeedback, PronunciationFeedback, PronunciationProgress};
use super::progress::ProgressUpdate;
use super::schema::PRONUNCIATION_VERSIONED_SCHEMAS;
use super::PronunciationStore;
use crate::sqlite_persistence::prepare_schema;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, TransactionBehavior};
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const PROGRESS_COLUMNS: &str = "user_id, letter_id, total_attempts, successful_attempts, \
     average_accuracy, best_accuracy, last_accuracy, improvement_rate, first_attempt_at, \
     last_attempt_at, mastery_achieved_at";

const FEEDBACK_COLUMNS: &str = "id, user_id, letter_id, session_id, recorded_text, \
     expected_text, confidence_score, pronunciation_accuracy, makhraj_analysis, sifat_analysis, \
     detected_errors, correction_suggestions, audio_features, ai_model_used, processing_time_ms, \
     audio_quality_score, background_noise_level, created_at";

pub struct SqlitePronunciationStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePronunciationStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let path = db_path.as_ref();
        let is_new_db = !path.exists();

        let mut conn =
            Connection::open(path).context("Failed to open pronunciation database")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        if is_new_db {
            info!("Creating new pronunciation database at {:?}", path);
        }

        let tx = conn.transaction()?;
        prepare_schema(&tx, PRONUNCIATION_VERSIONED_SCHEMAS)
            .with_context(|| format!("Failed to prepare database schema at {:?}", path))?;
        tx.commit()?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Pronunciation database lock poisoned"))
    }

    fn format_datetime(dt: &DateTime<Utc>) -> String {
        dt.to_rfc3339()
    }

    fn parse_datetime(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    }

    fn parse_json(s: &str) -> Value {
        serde_json::from_str(s).unwrap_or(Value::Null)
    }

    fn row_to_progress(row: &rusqlite::Row) -> rusqlite::Result<PronunciationProgress> {
        let first_attempt_at: String = row.get("first_attempt_at")?;
        let last_attempt_at: String = row.get("last_attempt_at")?;
        let mastery_achieved_at: Option<String> = row.get("mastery_achieved_at")?;

        Ok(PronunciationProgress {
            user_id: row.get("user_id")?,
            letter_id: row.get("letter_id")?,
            total_attempts: row.get("total_attempts")?,
            successful_attempts: row.get("successful_attempts")?,
            average_accuracy: row.get("average_accuracy")?,
            best_accuracy: row.get("best_accuracy")?,
            last_accuracy: row.get("last_accuracy")?,
            improvement_rate: row.get("improvement_rate")?,
            first_attempt_at: Self::parse_datetime(&first_attempt_at),
            last_attempt_at: Self::parse_datetime(&last_attempt_at),
            mastery_achieved_at: mastery_achieved_at.map(|s| Self::parse_datetime(&s)),
        })
    }

    fn row_to_feedback(row: &rusqlite::Row) -> rusqlite::Result<PronunciationFeedback> {
        let created_at: String = row.get("created_at")?;
        let processing_time_ms: i64 = row.get("processing_time_ms")?;
        let json = |column: &str| -> rusqlite::Result<Value> {
            let raw: String = row.get(column)?;
            Ok(Self::parse_json(&raw))
        };

        Ok(PronunciationFeedback {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            letter_id: row.get("letter_id")?,
            session_id: row.get("session_id")?,
            recorded_text: row.get("recorded_text")?,
            expected_text: row.get("expected_text")?,
            confidence_score: row.get("confidence_score")?,
            pronunciation_accuracy: row.get("pronunciation_accuracy")?,
            makhraj_analysis: json("makhraj_analysis")?,
            sifat_analysis: json("sifat_analysis")?,
            detected_errors: json("detected_errors")?,
            correction_suggestions: json("correction_suggestions")?,
            audio_features: json("audio_features")?,
            ai_model_used: row.get("ai_model_used")?,
            processing_time_ms: processing_time_ms.max(0) as u64,
            audio_quality_score: row.get("audio_quality_score")?,
            background_noise_level: row.get("background_noise_level")?,
            created_at: Self::parse_datetime(&created_at),
        })
    }

    fn select_progress(
        conn: &Connection,
        user_id: &str,
        letter_id: u32,
    ) -> Result<Option<PronunciationProgress>> {
        let progress = conn
            .query_row(
                &format!(
                    "SELECT {} FROM pronunciation_progress WHERE user_id = ?1 AND letter_id = ?2",
                    PROGRESS_COLUMNS
                ),
                params![user_id, letter_id],
                Self::row_to_progress,
            )
            .optional()?;
        Ok(progress)
    }
}

impl PronunciationStore for SqlitePronunciationStore {
    fn insert_feedback(&self, feedback: &NewFeedback) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let conn = self.lock()?;

        conn.execute(
            &format!(
                "INSERT INTO pronunciation_feedback ({}) VALUES \
                 (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
                FEEDBACK_COLUMNS
            ),
            params![
                id,
                feedback.user_id,
                feedback.letter_id,
                feedback.session_id,
                feedback.recorded_text,
                feedback.expected_text,
                feedback.confidence_score,
                feedback.pronunciation_accuracy,
                feedback.makhraj_analysis.to_string(),
                feedback.sifat_analysis.to_string(),
                feedback.detected_errors.to_string(),
                feedback.correction_suggestions.to_string(),
                feedback.audio_features.to_string(),
                feedback.ai_model_used,
                feedback.processing_time_ms as i64,
                feedback.audio_quality_score,
                feedback.background_noise_level,
                Self::format_datetime(&feedback.created_at),
            ],
        )
        .context("Failed to insert pronunciation feedback")?;

        debug!(feedback_id = %id, user_id = %feedback.user_id, "Stored pronunciation feedback");
        Ok(id)
    }

    fn record_attempt(
        &self,
        user_id: &str,
        letter_id: u32,
        score: f64,
        at: DateTime<Utc>,
    ) -> Result<PronunciationProgress> {
        let mut conn = self.lock()?;
        // IMMEDIATE takes the write lock up front, so concurrent writers on
        // the same file cannot interleave between the read and the upsert.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let previous = Self::select_progress(&tx, user_id, letter_id)?;
        let updated = ProgressUpdate {
            user_id,
            letter_id,
            score,
            at,
        }
        .apply(previous.as_ref());

        tx.execute(
            &format!(
                "INSERT INTO pronunciation_progress ({}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11) \
                 ON CONFLICT(user_id, letter_id) DO UPDATE SET \
                 total_attempts = ?3, successful_attempts = ?4, average_accuracy = ?5, \
                 best_accuracy = ?6, last_accuracy = ?7, improvement_rate = ?8, \
                 first_attempt_at = ?9, last_attempt_at = ?10, mastery_achieved_at = ?11",
                PROGRESS_COLUMNS
            ),
            params![
                updated.user_id,
                updated.letter_id,
                updated.total_attempts,
                updated.successful_attempts,
                updated.average_accuracy,
                updated.best_accuracy,
                updated.last_accuracy,
                updated.improvement_rate,
                Self::format_datetime(&updated.first_attempt_at),
                Self::format_datetime(&updated.last_attempt_at),
                updated.mastery_achieved_at.as_ref().map(Self::format_datetime),
            ],
        )
        .context("Failed to upsert pronunciation progress")?;
        tx.commit()?;

        debug!(
            user_id = %user_id,
            letter_id,
            total_attempts = updated.total_attempts,
            average_accuracy = updated.average_accuracy,
            "Updated pronunciation progress"
        );
        Ok(updated)
    }

    fn get_progress(
        &self,
        user_id: &str,
        letter_id: u32,
    ) -> Result<Option<PronunciationProgress>> {
        let conn = self.lock()?;
        Self::select_progress(&conn, user_id, letter_id)
    }

    fn list_progress(
        &self,
        user_id: &str,
        letter_id: Option<u32>,
    ) -> Result<Vec<PronunciationProgress>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM pronunciation_progress \
             WHERE user_id = ?1 AND (?2 IS NULL OR letter_id = ?2) \
             ORDER BY letter_id",
            PROGRESS_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![user_id, letter_id], Self::row_to_progress)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn list_feedback(&self, query: &FeedbackQuery) -> Result<Vec<PronunciationFeedback>> {
        let mut sql = format!(
            "SELECT {} FROM pronunciation_feedback WHERE user_id = ?",
            FEEDBACK_COLUMNS
        );
        let mut args: Vec<rusqlite::types::Value> = vec![query.user_id.clone().into()];
        if let Some(letter_id) = query.letter_id {
            sql.push_str(" AND letter_id = ?");
            args.push(i64::from(letter_id).into());
        }
        if let Some(session_id) = &query.session_id {
            sql.push_str(" AND session_id = ?");
            args.push(session_id.clone().into());
        }
        sql.push_str(" ORDER BY created_at DESC, rowid DESC LIMIT ?");
        args.push((query.limit as i64).into());

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(args), Self::row_to_feedback)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}
