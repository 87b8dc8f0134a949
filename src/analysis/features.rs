//! Acoustic features extracted from a recorded attempt.

use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Scalar features of one recording. Ratios are in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub duration_ms: f64,
    pub dominant_frequency_hz: f64,
    pub amplitude: f64,
    pub voicing_strength: f64,
    pub spectral_centroid_hz: f64,
    pub zero_crossing_rate: f64,
    pub has_echo: bool,
    pub background_noise: f64,
    pub clarity_score: f64,
}

impl AudioFeatures {
    /// Features of an empty or undecodable recording.
    pub fn silent() -> Self {
        Self {
            duration_ms: 0.0,
            dominant_frequency_hz: 0.0,
            amplitude: 0.0,
            voicing_strength: 0.0,
            spectral_centroid_hz: 0.0,
            zero_crossing_rate: 0.0,
            has_echo: false,
            background_noise: 0.0,
            clarity_score: 0.0,
        }
    }

    /// Replaces non-finite values with zero and clips ratios into `[0, 1]`
    /// and physical quantities to be non-negative.
    pub fn sanitized(self) -> Self {
        fn non_negative(v: f64) -> f64 {
            if v.is_finite() {
                v.max(0.0)
            } else {
                0.0
            }
        }
        fn ratio(v: f64) -> f64 {
            if v.is_finite() {
                v.clamp(0.0, 1.0)
            } else {
                0.0
            }
        }

        Self {
            duration_ms: non_negative(self.duration_ms),
            dominant_frequency_hz: non_negative(self.dominant_frequency_hz),
            amplitude: ratio(self.amplitude),
            voicing_strength: ratio(self.voicing_strength),
            spectral_centroid_hz: non_negative(self.spectral_centroid_hz),
            zero_crossing_rate: ratio(self.zero_crossing_rate),
            has_echo: self.has_echo,
            background_noise: ratio(self.background_noise),
            clarity_score: ratio(self.clarity_score),
        }
    }
}

/// Turns raw uploaded bytes into [`AudioFeatures`].
///
/// Implementations must be total: a recording that cannot be analyzed still
/// yields a feature vector (typically [`AudioFeatures::silent`]).
pub trait FeatureExtractor: Send + Sync {
    fn name(&self) -> &'static str;
    fn extract(&self, audio: &[u8]) -> AudioFeatures;
}

/// Placeholder extractor that samples plausible values at random.
///
/// It does not look at the audio at all. It keeps the rest of the pipeline
/// usable until a real signal-processing extractor is configured.
#[derive(Debug, Default)]
pub struct PlaceholderFeatureExtractor;

impl PlaceholderFeatureExtractor {
    const DURATION_MEAN_MS: f64 = 140.0;
    const DURATION_STD_MS: f64 = 40.0;

    pub fn new() -> Self {
        Self
    }

    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> AudioFeatures {
        let z: f64 = rng.sample(StandardNormal);
        let duration_ms =
            (Self::DURATION_MEAN_MS + z * Self::DURATION_STD_MS).clamp(40.0, 400.0);

        AudioFeatures {
            duration_ms,
            dominant_frequency_hz: rng.random_range(80.0..4000.0),
            amplitude: rng.random_range(0.3..1.0),
            voicing_strength: rng.random_range(0.0..1.0),
            spectral_centroid_hz: rng.random_range(500.0..5000.0),
            zero_crossing_rate: rng.random_range(0.01..0.3),
            has_echo: rng.random_bool(0.5),
            background_noise: rng.random_range(0.0..0.4),
            clarity_score: rng.random_range(0.5..1.0),
        }
    }
}

impl FeatureExtractor for PlaceholderFeatureExtractor {
    fn name(&self) -> &'static str {
        "random-placeholder"
    }

    fn extract(&self, audio: &[u8]) -> AudioFeatures {
        debug!(
            bytes = audio.len(),
            "Sampling placeholder features, audio content is ignored"
        );
        Self::sample(&mut rand::rng())
    }
}

/// Deterministic extractor returning the same features for every input.
#[derive(Debug, Clone)]
pub struct FixedFeatureExtractor {
    features: AudioFeatures,
}

impl FixedFeatureExtractor {
    pub fn new(features: AudioFeatures) -> Self {
        Self { features }
    }
}

impl FeatureExtractor for FixedFeatureExtractor {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn extract(&self, _audio: &[u8]) -> AudioFeatures {
        self.features
    }
}
