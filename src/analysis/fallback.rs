//! Heuristic scores used when the primary path cannot produce a report.
//!
//! The secondary tier still knows the target letter (when it resolved) and
//! may have a transcription to compare against. The emergency tier knows
//! nothing about the request and scores from a fixed band.

use super::aggregate::Scores;
use crate::letters::{LetterInfo, LetterPattern};
use crate::transcription::{normalize_text, Transcription};
use rand::Rng;
use serde::Serialize;
use std::ops::Range;

/// Band used when nothing is known about the attempt.
pub const UNKNOWN_BAND: Range<f64> = 55.0..85.0;
pub const GLYPH_MATCH_BAND: Range<f64> = 85.0..95.0;
pub const PHONEME_MATCH_BAND: Range<f64> = 75.0..85.0;
pub const TEXT_ONLY_BAND: Range<f64> = 60.0..75.0;
pub const TRANSCRIPTION_BONUS: f64 = 5.0;

const JITTER: f64 = 6.0;
const MIN_SUB_SCORE: f64 = 30.0;
const MAX_SUB_SCORE: f64 = 98.0;

const RETRY_RECOMMENDATION: &str =
    "The recording could not be fully analyzed. Try again in a quiet place, close to the microphone.";

/// Degraded result of the secondary and emergency tiers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallbackReport {
    pub letter: Option<LetterInfo>,
    pub scores: Scores,
    pub confidence: u8,
    pub transcription: Option<Transcription>,
    pub error: String,
    pub immediate_recommendations: Vec<String>,
    pub practice_tips: Vec<String>,
}

fn base_band(
    pattern: Option<&LetterPattern>,
    transcription: Option<&Transcription>,
) -> (Range<f64>, f64) {
    let (Some(pattern), Some(transcription)) = (pattern, transcription) else {
        return (UNKNOWN_BAND, 0.0);
    };

    let text = normalize_text(&transcription.text);
    let phoneme = normalize_text(&pattern.phoneme);
    let band = if text.contains(pattern.glyph.as_str()) {
        GLYPH_MATCH_BAND
    } else if !phoneme.is_empty() && text.contains(phoneme.as_str()) {
        PHONEME_MATCH_BAND
    } else if !text.is_empty() {
        TEXT_ONLY_BAND
    } else {
        UNKNOWN_BAND
    };
    (band, TRANSCRIPTION_BONUS)
}

fn jittered<R: Rng + ?Sized>(base: f64, rng: &mut R) -> f64 {
    (base + rng.random_range(-JITTER..=JITTER)).clamp(MIN_SUB_SCORE, MAX_SUB_SCORE)
}

fn breakdown<R: Rng + ?Sized>(base: f64, rng: &mut R) -> Scores {
    let makhraj = jittered(base, rng);
    let sifat = jittered(base, rng);
    let duration = jittered(base, rng);
    let clarity = jittered(base, rng);
    let overall = (makhraj + sifat + duration + clarity) / 4.0;

    Scores {
        overall: overall.round() as u8,
        makhraj: makhraj.round() as u8,
        sifat: sifat.round() as u8,
        duration: duration.round() as u8,
        clarity: clarity.round() as u8,
    }
}

/// Secondary tier: the primary path failed after the request was accepted.
pub fn secondary<R: Rng + ?Sized>(
    pattern: Option<&LetterPattern>,
    transcription: Option<&Transcription>,
    error: impl Into<String>,
    rng: &mut R,
) -> FallbackReport {
    let (band, bonus) = base_band(pattern, transcription);
    let base = rng.random_range(band) + bonus;
    let scores = breakdown(base, rng);

    let mut immediate_recommendations = vec![RETRY_RECOMMENDATION.to_string()];
    if let Some(pattern) = pattern {
        immediate_recommendations.push(format!(
            "Focus on the articulation point of {} ({}): {}",
            pattern.latin_name, pattern.glyph, pattern.articulation_point
        ));
    }

    FallbackReport {
        letter: pattern.map(LetterInfo::from),
        scores,
        confidence: base.round().clamp(0.0, 100.0) as u8,
        transcription: transcription.cloned(),
        error: error.into(),
        immediate_recommendations,
        practice_tips: pattern
            .map(|p| p.remediation_tips.clone())
            .unwrap_or_default(),
    }
}

/// Emergency tier: nothing about the request could be trusted.
pub fn emergency<R: Rng + ?Sized>(error: impl Into<String>, rng: &mut R) -> FallbackReport {
    let base = rng.random_range(UNKNOWN_BAND);
    FallbackReport {
        letter: None,
        scores: breakdown(base, rng),
        confidence: base.round() as u8,
        transcription: None,
        error: error.into(),
        immediate_recommendations: vec![RETRY_RECOMMENDATION.to_string()],
        practice_tips: Vec::new(),
    }
}
