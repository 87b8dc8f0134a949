use crate::analysis::AnalysisReport;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_FEEDBACK_LIMIT: usize = 10;
pub const MAX_FEEDBACK_LIMIT: usize = 100;

/// A scored attempt about to be written to the feedback log.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFeedback {
    pub user_id: String,
    pub letter_id: u32,
    pub session_id: String,
    pub recorded_text: Option<String>,
    pub expected_text: String,
    pub confidence_score: f64,
    pub pronunciation_accuracy: f64,
    pub makhraj_analysis: Value,
    pub sifat_analysis: Value,
    pub detected_errors: Value,
    pub correction_suggestions: Value,
    pub audio_features: Value,
    pub ai_model_used: String,
    pub processing_time_ms: u64,
    pub audio_quality_score: f64,
    pub background_noise_level: f64,
    pub created_at: DateTime<Utc>,
}

impl NewFeedback {
    /// Snapshot of a primary-path report.
    pub fn from_report(
        user_id: &str,
        session_id: &str,
        report: &AnalysisReport,
        model: &str,
        processing_time_ms: u64,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        Ok(Self {
            user_id: user_id.to_string(),
            letter_id: report.letter.id,
            session_id: session_id.to_string(),
            recorded_text: report.transcription.as_ref().map(|t| t.text.clone()),
            expected_text: report.letter.glyph.clone(),
            confidence_score: report.confidence as f64,
            pronunciation_accuracy: report.scores.overall as f64,
            makhraj_analysis: to_json(&report.makhraj)?,
            sifat_analysis: to_json(&report.sifat)?,
            detected_errors: to_json(&report.detected_errors)?,
            correction_suggestions: to_json(&report.correction_suggestions)?,
            audio_features: to_json(&report.features)?,
            ai_model_used: model.to_string(),
            processing_time_ms,
            audio_quality_score: report.audio_quality.score as f64,
            background_noise_level: report.audio_quality.background_noise,
            created_at,
        })
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).context("Failed to serialize feedback snapshot")
}

/// A stored feedback row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PronunciationFeedback {
    pub id: String,
    pub user_id: String,
    pub letter_id: u32,
    pub session_id: String,
    pub recorded_text: Option<String>,
    pub expected_text: String,
    pub confidence_score: f64,
    pub pronunciation_accuracy: f64,
    pub makhraj_analysis: Value,
    pub sifat_analysis: Value,
    pub detected_errors: Value,
    pub correction_suggestions: Value,
    pub audio_features: Value,
    pub ai_model_used: String,
    pub processing_time_ms: u64,
    pub audio_quality_score: f64,
    pub background_noise_level: f64,
    pub created_at: DateTime<Utc>,
}

/// Rolling per user and letter statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PronunciationProgress {
    pub user_id: String,
    pub letter_id: u32,
    pub total_attempts: u32,
    pub successful_attempts: u32,
    pub average_accuracy: f64,
    pub best_accuracy: f64,
    pub last_accuracy: f64,
    /// New running average minus the previous one.
    pub improvement_rate: f64,
    pub first_attempt_at: DateTime<Utc>,
    pub last_attempt_at: DateTime<Utc>,
    /// Set the first time the average reaches the mastery threshold, never cleared.
    pub mastery_achieved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackQuery {
    pub user_id: String,
    pub letter_id: Option<u32>,
    pub session_id: Option<String>,
    pub limit: usize,
}

impl FeedbackQuery {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            letter_id: None,
            session_id: None,
            limit: DEFAULT_FEEDBACK_LIMIT,
        }
    }

    pub fn with_letter(mut self, letter_id: u32) -> Self {
        self.letter_id = Some(letter_id);
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.clamp(1, MAX_FEEDBACK_LIMIT);
        self
    }
}
