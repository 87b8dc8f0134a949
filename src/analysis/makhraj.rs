//! Articulation point (makhraj) scoring.

use super::features::AudioFeatures;
use super::{clamp_score, DetectedError, Severity};
use crate::letters::{FrequencyRange, LetterPattern};
use serde::Serialize;

const FREQUENCY_MISMATCH_PENALTY: f64 = 25.0;
const DURATION_PENALTY: f64 = 15.0;
/// Duration deviation tolerated without penalty.
const DURATION_TOLERANCE_MS: f64 = 50.0;
/// Each this many Hz outside the band costs one frequency-match point.
const FREQUENCY_MATCH_HZ_PER_POINT: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MakhrajAnalysis {
    pub accuracy: f64,
    pub frequency_match: f64,
    pub duration_accuracy: f64,
    pub articulation_point: String,
    pub expected_frequency_range: FrequencyRange,
    pub actual_frequency_hz: f64,
    pub expected_duration_ms: f64,
    pub actual_duration_ms: f64,
    pub errors: Vec<DetectedError>,
    pub suggestions: Vec<String>,
}

pub fn score_makhraj(features: &AudioFeatures, pattern: &LetterPattern) -> MakhrajAnalysis {
    let range = pattern.frequency_range;
    let frequency = features.dominant_frequency_hz;
    let duration = features.duration_ms;
    let expected_duration = pattern.expected_duration_ms;

    let mut accuracy = 100.0;
    let mut errors = Vec::new();
    let mut suggestions = Vec::new();

    let in_range = range.contains(frequency);
    if !in_range {
        accuracy -= FREQUENCY_MISMATCH_PENALTY;
        errors.push(DetectedError {
            kind: "makhraj_mismatch".to_string(),
            severity: Severity::High,
            description: format!(
                "The sound of {} does not come from its articulation point",
                pattern.latin_name
            ),
            expected: range.to_string(),
            actual: format!("{:.0} Hz", frequency),
        });
        suggestions.push(format!(
            "Focus on the articulation point of {} ({}): {}",
            pattern.latin_name, pattern.glyph, pattern.articulation_point
        ));
    }

    let duration_diff = (duration - expected_duration).abs();
    if duration_diff > DURATION_TOLERANCE_MS {
        accuracy -= DURATION_PENALTY;
        let too_short = duration < expected_duration;
        errors.push(DetectedError {
            kind: "duration_error".to_string(),
            severity: Severity::Medium,
            description: if too_short {
                format!("{} was pronounced too briefly", pattern.latin_name)
            } else {
                format!("{} was held for too long", pattern.latin_name)
            },
            expected: format!("{:.0} ms", expected_duration),
            actual: format!("{:.0} ms", duration),
        });
        suggestions.push(if too_short {
            format!(
                "Lengthen the sound of {} slightly, aim for about {:.0} ms",
                pattern.latin_name, expected_duration
            )
        } else {
            format!(
                "Shorten the sound of {}, aim for about {:.0} ms",
                pattern.latin_name, expected_duration
            )
        });
    }

    let frequency_match = if in_range {
        100.0
    } else {
        (100.0 - range.distance_to(frequency) / FREQUENCY_MATCH_HZ_PER_POINT).max(0.0)
    };
    let duration_accuracy = (100.0 - duration_diff / expected_duration * 100.0).max(0.0);

    MakhrajAnalysis {
        accuracy: clamp_score(accuracy),
        frequency_match: clamp_score(frequency_match),
        duration_accuracy: clamp_score(duration_accuracy),
        articulation_point: pattern.articulation_point.clone(),
        expected_frequency_range: range,
        actual_frequency_hz: frequency,
        expected_duration_ms: expected_duration,
        actual_duration_ms: duration,
        errors,
        suggestions,
    }
}
