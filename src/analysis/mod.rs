//! Pronunciation scoring pipeline.
//!
//! Features are extracted from the uploaded audio, scored against the
//! target letter's pattern by the makhraj and sifat scorers, and combined
//! into an [`AnalysisReport`]. When the primary path fails the caller gets a
//! heuristic [`FallbackReport`] instead, see [`AnalysisOutcome`].

mod aggregate;
pub mod fallback;
mod features;
mod makhraj;
mod outcome;
mod pipeline;
mod sifat;
mod wav;

pub use aggregate::{finalize, AnalysisReport, AudioQuality, Scores};
pub use fallback::FallbackReport;
pub use features::{
    AudioFeatures, FeatureExtractor, FixedFeatureExtractor, PlaceholderFeatureExtractor,
};
pub use makhraj::{score_makhraj, MakhrajAnalysis};
pub use outcome::{AnalysisOutcome, Tier};
pub use pipeline::{PronunciationAnalyzer, DEFAULT_TRANSCRIPTION_TIMEOUT};
pub use sifat::{score_sifat, SifatAnalysis, SifatCheck};
pub use wav::WavFeatureExtractor;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// A single problem found in an attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedError {
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: Severity,
    pub description: String,
    pub expected: String,
    pub actual: String,
}

/// Failures of the primary scoring path.
#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    #[error("Invalid letter ID: {0:?}")]
    InvalidLetterId(String),

    #[error("Letter pattern not found for ID {0}")]
    PatternNotFound(u32),
}

/// Clamps a score into `[0, 100]`; NaN maps to 0.
pub(crate) fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// Rounds a `[0, 100]` score for display.
pub(crate) fn round_score(value: f64) -> u8 {
    clamp_score(value).round() as u8
}

/// Resolves the string-encoded `letterId` form field.
pub fn parse_letter_id(raw: &str) -> Result<u32, AnalysisError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| AnalysisError::InvalidLetterId(raw.to_string()))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::AudioFeatures;
    use crate::letters::{builtin_patterns, LetterPattern};

    pub fn letter(id: u32) -> LetterPattern {
        builtin_patterns()
            .into_iter()
            .find(|p| p.id == id)
            .unwrap()
    }

    pub fn ba() -> LetterPattern {
        letter(2)
    }

    /// Neutral features with the given frequency and duration.
    pub fn features(frequency_hz: f64, duration_ms: f64) -> AudioFeatures {
        AudioFeatures {
            duration_ms,
            dominant_frequency_hz: frequency_hz,
            amplitude: 0.5,
            voicing_strength: 0.9,
            spectral_centroid_hz: 1500.0,
            zero_crossing_rate: 0.08,
            has_echo: true,
            background_noise: 0.1,
            clarity_score: 0.9,
        }
    }
}
