use super::features::AudioFeatures;
use super::makhraj::MakhrajAnalysis;
use super::sifat::SifatAnalysis;
use super::{round_score, DetectedError};
use crate::letters::{LetterInfo, LetterPattern};
use crate::transcription::{similarity, Transcription};
use serde::{Deserialize, Serialize};

pub const MAX_IMMEDIATE_RECOMMENDATIONS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub overall: u8,
    pub makhraj: u8,
    pub sifat: u8,
    pub duration: u8,
    pub clarity: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AudioQuality {
    pub score: u8,
    pub background_noise: f64,
    pub duration: f64,
}

impl AudioQuality {
    pub fn from_features(features: &AudioFeatures) -> Self {
        Self {
            score: round_score(features.clarity_score * 100.0),
            background_noise: features.background_noise,
            duration: features.duration_ms,
        }
    }
}

/// Result of the primary scoring path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub letter: LetterInfo,
    pub scores: Scores,
    pub confidence: u8,
    pub transcription: Option<Transcription>,
    pub transcription_similarity: Option<u8>,
    pub features: AudioFeatures,
    pub audio_quality: AudioQuality,
    pub makhraj: MakhrajAnalysis,
    pub sifat: SifatAnalysis,
    pub detected_errors: Vec<DetectedError>,
    pub correction_suggestions: Vec<String>,
    pub immediate_recommendations: Vec<String>,
    pub practice_tips: Vec<String>,
    pub common_errors: Vec<String>,
}

/// Combines the scorer outputs into one report.
///
/// The headline score is the makhraj accuracy alone. The sifat accuracy is
/// reported next to it but does not contribute to `overall`.
pub fn finalize(
    pattern: &LetterPattern,
    features: &AudioFeatures,
    makhraj: MakhrajAnalysis,
    sifat: SifatAnalysis,
    transcription: Option<Transcription>,
) -> AnalysisReport {
    let scores = Scores {
        overall: round_score(makhraj.accuracy),
        makhraj: round_score(makhraj.accuracy),
        sifat: round_score(sifat.accuracy),
        duration: round_score(makhraj.duration_accuracy),
        clarity: round_score(features.clarity_score * 100.0),
    };
    let confidence =
        round_score(features.clarity_score * (1.0 - features.background_noise) * 100.0);

    let detected_errors: Vec<DetectedError> = makhraj
        .errors
        .iter()
        .chain(sifat.errors.iter())
        .cloned()
        .collect();
    let correction_suggestions: Vec<String> = makhraj
        .suggestions
        .iter()
        .chain(sifat.recommendations.iter())
        .cloned()
        .collect();

    let immediate_recommendations = if correction_suggestions.is_empty() {
        vec![format!(
            "Excellent pronunciation of {}. Keep practicing to stay consistent.",
            pattern.latin_name
        )]
    } else {
        correction_suggestions
            .iter()
            .take(MAX_IMMEDIATE_RECOMMENDATIONS)
            .cloned()
            .collect()
    };

    let transcription_similarity = transcription
        .as_ref()
        .map(|t| similarity(&t.text, &pattern.glyph));

    AnalysisReport {
        letter: LetterInfo::from(pattern),
        scores,
        confidence,
        transcription,
        transcription_similarity,
        features: *features,
        audio_quality: AudioQuality::from_features(features),
        makhraj,
        sifat,
        detected_errors,
        correction_suggestions,
        immediate_recommendations,
        practice_tips: pattern.remediation_tips.clone(),
        common_errors: pattern.common_errors.clone(),
    }
}
