//! Optional speech-to-text for submitted recordings.
//!
//! Transcriptions are informational. They are shown to the learner next to
//! the score and compared against the target glyph, but they never change
//! the primary score.

mod huggingface;
mod similarity;

pub use huggingface::{HuggingFaceConfig, HuggingFaceTranscriber};
pub use similarity::{levenshtein_distance, normalize_text, similarity};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    pub text: String,
    pub model: String,
}

#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Request timed out")]
    Timeout,

    #[error("Recording too short to transcribe ({0} bytes)")]
    Silence(usize),

    #[error("Transcription disabled")]
    Disabled,

    #[error("All models failed, last error: {0}")]
    AllModelsFailed(Box<TranscriptionError>),
}

impl TranscriptionError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            TranscriptionError::Connection(_) => "connection",
            TranscriptionError::Api { .. } => "api",
            TranscriptionError::InvalidResponse(_) => "invalid_response",
            TranscriptionError::RateLimited => "rate_limited",
            TranscriptionError::Timeout => "timeout",
            TranscriptionError::Silence(_) => "silence",
            TranscriptionError::Disabled => "disabled",
            TranscriptionError::AllModelsFailed(inner) => inner.kind(),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transcriber: Send + Sync {
    fn name(&self) -> &'static str;

    async fn transcribe(
        &self,
        audio: &[u8],
        language: &str,
    ) -> Result<Transcription, TranscriptionError>;
}

/// Used when no speech-to-text service is configured.
#[derive(Debug, Default)]
pub struct NoopTranscriber;

#[async_trait]
impl Transcriber for NoopTranscriber {
    fn name(&self) -> &'static str {
        "none"
    }

    async fn transcribe(
        &self,
        _audio: &[u8],
        _language: &str,
    ) -> Result<Transcription, TranscriptionError> {
        Err(TranscriptionError::Disabled)
    }
}
