//! Phonetic attribute (sifat) scoring.
//!
//! Three independent checks run against the same feature vector:
//! voicing (jahr/hams), plosive weight (syiddah/rakhawah) and, for qalqalah
//! letters only, the echo release.

use super::features::AudioFeatures;
use super::{clamp_score, DetectedError, Severity};
use crate::letters::{LetterPattern, PhoneticAttribute};
use serde::Serialize;

const VOICING_THRESHOLD: f64 = 0.5;
const PLOSIVE_MAX_DURATION_MS: f64 = 120.0;
const PLOSIVE_MIN_AMPLITUDE: f64 = 0.7;

const VOICING_PENALTY: f64 = 20.0;
const PLOSIVE_PENALTY: f64 = 15.0;
const ECHO_PENALTY: f64 = 10.0;

/// Outcome of one attribute check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SifatCheck {
    pub attribute: String,
    pub expected: String,
    pub detected: String,
    pub matched: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SifatAnalysis {
    pub accuracy: f64,
    pub detected_attributes: Vec<String>,
    pub checks: Vec<SifatCheck>,
    pub errors: Vec<DetectedError>,
    pub recommendations: Vec<String>,
}

fn label(attribute: PhoneticAttribute) -> String {
    let plain = match attribute {
        PhoneticAttribute::Voiced => "voiced",
        PhoneticAttribute::Unvoiced => "unvoiced",
        PhoneticAttribute::PlosiveEcho => "echo",
        PhoneticAttribute::Plosive => "plosive",
        PhoneticAttribute::Continuant => "continuant",
    };
    format!("{} ({})", attribute.traditional_name(), plain)
}

pub fn score_sifat(features: &AudioFeatures, pattern: &LetterPattern) -> SifatAnalysis {
    let mut accuracy = 100.0;
    let mut detected_attributes = Vec::new();
    let mut checks = Vec::new();
    let mut errors = Vec::new();
    let mut recommendations = Vec::new();

    // Voicing
    let has_voicing = features.voicing_strength > VOICING_THRESHOLD;
    let expects_voiced = pattern.has_attribute(PhoneticAttribute::Voiced);
    let detected = if has_voicing {
        PhoneticAttribute::Voiced
    } else {
        PhoneticAttribute::Unvoiced
    };
    let expected = if expects_voiced {
        PhoneticAttribute::Voiced
    } else {
        PhoneticAttribute::Unvoiced
    };
    detected_attributes.push(label(detected));
    checks.push(SifatCheck {
        attribute: "voicing".to_string(),
        expected: label(expected),
        detected: label(detected),
        matched: has_voicing == expects_voiced,
    });
    if has_voicing != expects_voiced {
        accuracy -= VOICING_PENALTY;
        errors.push(DetectedError {
            kind: "voicing_error".to_string(),
            severity: Severity::Medium,
            description: format!("{} should be {}", pattern.latin_name, label(expected)),
            expected: label(expected),
            actual: label(detected),
        });
        recommendations.push(if expects_voiced {
            "Let the vocal folds vibrate while pronouncing the letter (jahr)".to_string()
        } else {
            "Reduce the vocal fold vibration and let the breath flow out (hams)".to_string()
        });
    }

    // Plosive weight
    let is_short = features.duration_ms < PLOSIVE_MAX_DURATION_MS;
    let is_strong = features.amplitude > PLOSIVE_MIN_AMPLITUDE;
    let is_plosive = is_short && is_strong;
    let expects_plosive = pattern.has_attribute(PhoneticAttribute::Plosive);
    let detected = if is_plosive {
        PhoneticAttribute::Plosive
    } else {
        PhoneticAttribute::Continuant
    };
    let expected = if expects_plosive {
        PhoneticAttribute::Plosive
    } else {
        PhoneticAttribute::Continuant
    };
    detected_attributes.push(label(detected));
    checks.push(SifatCheck {
        attribute: "plosive".to_string(),
        expected: label(expected),
        detected: label(detected),
        matched: is_plosive == expects_plosive,
    });
    if is_plosive != expects_plosive {
        accuracy -= PLOSIVE_PENALTY;
        errors.push(DetectedError {
            kind: "plosive_error".to_string(),
            severity: Severity::Medium,
            description: if expects_plosive {
                format!("{} needs a short, strong release", pattern.latin_name)
            } else {
                format!("{} should flow without a hard stop", pattern.latin_name)
            },
            expected: label(expected),
            actual: label(detected),
        });
        recommendations.push(if expects_plosive {
            "Block the airflow completely and release it quickly and firmly (syiddah)"
                .to_string()
        } else {
            "Keep the airflow running instead of stopping it abruptly (rakhawah)".to_string()
        });
    }

    // Echo, only for qalqalah letters
    if pattern.has_attribute(PhoneticAttribute::PlosiveEcho) {
        let echo = label(PhoneticAttribute::PlosiveEcho);
        checks.push(SifatCheck {
            attribute: "echo".to_string(),
            expected: echo.clone(),
            detected: if features.has_echo {
                echo.clone()
            } else {
                "none".to_string()
            },
            matched: features.has_echo,
        });
        if features.has_echo {
            detected_attributes.push(echo);
        } else {
            accuracy -= ECHO_PENALTY;
            errors.push(DetectedError {
                kind: "qalqalah_missing".to_string(),
                severity: Severity::Low,
                description: format!("{} is missing its echo release", pattern.latin_name),
                expected: echo,
                actual: "none".to_string(),
            });
            recommendations.push(
                "Add a light bouncing echo at the end of the letter (qalqalah)".to_string(),
            );
        }
    }

    SifatAnalysis {
        accuracy: clamp_score(accuracy),
        detected_attributes,
        checks,
        errors,
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::{ba, features, letter};

    #[test]
    fn voiced_qalqalah_letter_with_echo() {
        let mut f = features(300.0, 120.0);
        f.amplitude = 0.8;
        f.voicing_strength = 0.9;
        f.has_echo = true;

        let result = score_sifat(&f, &ba());
        assert_eq!(result.accuracy, 100.0);
        assert!(result.detected_attributes.contains(&"Jahr (voiced)".to_string()));
        assert!(result.detected_attributes.contains(&"Qalqalah (echo)".to_string()));
        assert!(result.errors.is_empty());
        assert_eq!(result.checks.len(), 3);
        assert!(result.checks.iter().all(|c| c.matched));
    }

    #[test]
    fn missing_voicing_and_echo_are_penalized() {
        let mut f = features(300.0, 200.0);
        f.voicing_strength = 0.2;
        f.has_echo = false;

        let result = score_sifat(&f, &ba());
        assert_eq!(result.accuracy, 70.0);
        let kinds: Vec<&str> = result.errors.iter().map(|e| e.kind.as_str()).collect();
        assert_eq!(kinds, vec!["voicing_error", "qalqalah_missing"]);
        assert_eq!(result.recommendations.len(), 2);
        assert!(result.detected_attributes.contains(&"Hams (unvoiced)".to_string()));
    }

    #[test]
    fn plosive_letter_requires_short_strong_burst() {
        let ta = letter(3);
        let mut f = features(2000.0, 90.0);
        f.voicing_strength = 0.1;
        f.amplitude = 0.9;
        let result = score_sifat(&f, &ta);
        assert_eq!(result.accuracy, 100.0);
        assert!(result.detected_attributes.contains(&"Syiddah (plosive)".to_string()));

        f.amplitude = 0.5;
        let result = score_sifat(&f, &ta);
        assert_eq!(result.accuracy, 85.0);
        assert_eq!(result.errors[0].kind, "plosive_error");
    }

    #[test]
    fn continuant_letter_penalizes_plosive_burst() {
        let sin = letter(12);
        let mut f = features(5000.0, 60.0);
        f.voicing_strength = 0.1;
        f.amplitude = 0.95;
        let result = score_sifat(&f, &sin);
        assert_eq!(result.accuracy, 85.0);
        // No echo check for letters without qalqalah
        assert_eq!(result.checks.len(), 2);
    }

    #[test]
    fn echo_check_is_gated_by_pattern() {
        let mim = letter(24);
        let mut f = features(300.0, 150.0);
        f.voicing_strength = 0.9;
        f.has_echo = false;
        let result = score_sifat(&f, &mim);
        assert!(result.errors.iter().all(|e| e.kind != "qalqalah_missing"));
    }

    #[test]
    fn all_penalties_stay_in_bounds() {
        let mut f = features(300.0, 50.0);
        f.voicing_strength = 0.0;
        f.amplitude = 1.0;
        f.has_echo = false;
        // Ba: voicing -20, plosive -15, echo -10
        let result = score_sifat(&f, &ba());
        assert_eq!(result.accuracy, 55.0);
        assert!((0.0..=100.0).contains(&result.accuracy));
    }
}
