//! Signal-based feature extraction for PCM WAV recordings.

use super::features::{AudioFeatures, FeatureExtractor};
use std::io::Cursor;
use tracing::{debug, warn};

/// Frame length used for energy tracking.
const FRAME_MS: f64 = 20.0;
/// Pitch search band for the voicing estimate.
const MIN_PITCH_HZ: f64 = 70.0;
const MAX_PITCH_HZ: f64 = 400.0;
/// Frames quieter than this fraction of the loudest frame count as a gap.
const ECHO_GAP_RATIO: f64 = 0.15;
/// A frame louder than this fraction after a gap counts as a second release.
const ECHO_RELEASE_RATIO: f64 = 0.3;
const MIN_NOISE_FLOOR: f64 = 1e-5;
/// SNR in dB that maps to a clarity score of 1.0.
const FULL_CLARITY_SNR_DB: f64 = 40.0;

/// Extracts features from 16/24/32-bit integer or float WAV data.
///
/// Anything `hound` cannot decode yields [`AudioFeatures::silent`].
#[derive(Debug, Default)]
pub struct WavFeatureExtractor;

impl WavFeatureExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FeatureExtractor for WavFeatureExtractor {
    fn name(&self) -> &'static str {
        "wav-signal"
    }

    fn extract(&self, audio: &[u8]) -> AudioFeatures {
        match decode_mono(audio) {
            Ok((samples, sample_rate)) => {
                debug!(
                    samples = samples.len(),
                    sample_rate, "Decoded WAV recording"
                );
                analyze_samples(&samples, sample_rate)
            }
            Err(e) => {
                warn!("Could not decode recording as WAV, using silent features: {}", e);
                AudioFeatures::silent()
            }
        }
    }
}

fn decode_mono(audio: &[u8]) -> Result<(Vec<f32>, u32), hound::Error> {
    let reader = hound::WavReader::new(Cursor::new(audio))?;
    let spec = reader.spec();

    // The header's data length is not trusted: a truncated upload can claim
    // billions of samples, and the reader reports one error per missing one.
    let bytes_per_sample = usize::from(spec.bits_per_sample.div_ceil(8)).max(1);
    let max_samples = audio.len() / bytes_per_sample;

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .take(max_samples)
            .map_while(Result::ok)
            .collect(),
        hound::SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .into_samples::<i32>()
                .take(max_samples)
                .map_while(Result::ok)
                .map(|s| s as f32 / max_val)
                .collect()
        }
    };

    let channels = spec.channels.max(1) as usize;
    let mono = if channels > 1 {
        samples
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    } else {
        samples
    };

    Ok((mono, spec.sample_rate))
}

/// Computes the feature vector for mono samples in `[-1, 1]`.
pub fn analyze_samples(samples: &[f32], sample_rate: u32) -> AudioFeatures {
    if samples.is_empty() || sample_rate == 0 {
        return AudioFeatures::silent();
    }
    let rate = sample_rate as f64;

    let duration_ms = samples.len() as f64 / rate * 1000.0;
    let amplitude = samples
        .iter()
        .fold(0.0f64, |peak, s| peak.max(s.abs() as f64));

    let zero_crossings = samples
        .windows(2)
        .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
        .count();
    let zero_crossing_rate = zero_crossings as f64 / samples.len() as f64;
    // Two crossings per period for a dominant sinusoid
    let dominant_frequency_hz = zero_crossing_rate * rate / 2.0;

    let energy: f64 = samples.iter().map(|s| (*s as f64).powi(2)).sum();
    let diff_energy: f64 = samples
        .windows(2)
        .map(|w| ((w[1] - w[0]) as f64).powi(2))
        .sum();
    // Mean-frequency estimate from the first-difference energy ratio
    let spectral_centroid_hz = if energy > 0.0 {
        let ratio = (diff_energy / energy).sqrt().min(2.0);
        2.0 * (ratio / 2.0).asin() * rate / (2.0 * std::f64::consts::PI)
    } else {
        0.0
    };

    let frame_len = ((rate * FRAME_MS / 1000.0) as usize).max(1);
    let frame_rms: Vec<f64> = samples.chunks(frame_len).map(rms).collect();

    let (background_noise, clarity_score) = noise_and_clarity(&frame_rms);
    let voicing_strength = voicing(samples, &frame_rms, frame_len, rate);
    let has_echo = detect_echo(&frame_rms);

    AudioFeatures {
        duration_ms,
        dominant_frequency_hz,
        amplitude,
        voicing_strength,
        spectral_centroid_hz,
        zero_crossing_rate,
        has_echo,
        background_noise,
        clarity_score,
    }
    .sanitized()
}

fn rms(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|s| (*s as f64).powi(2)).sum();
    (sum / samples.len() as f64).sqrt()
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((sorted.len() - 1) as f64 * p).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

/// Background noise as the noise floor relative to the speech level, and
/// clarity as the SNR mapped onto `[0, 1]`.
fn noise_and_clarity(frame_rms: &[f64]) -> (f64, f64) {
    let mut sorted = frame_rms.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let noise_floor = percentile(&sorted, 0.1).max(MIN_NOISE_FLOOR);
    let speech_level = percentile(&sorted, 0.9);
    if speech_level <= MIN_NOISE_FLOOR {
        return (0.0, 0.0);
    }

    let snr_db = 20.0 * (speech_level / noise_floor).log10();
    let background_noise = (noise_floor / speech_level).clamp(0.0, 1.0);
    let clarity = (snr_db / FULL_CLARITY_SNR_DB).clamp(0.0, 1.0);
    (background_noise, clarity)
}

/// Peak normalized autocorrelation of the loudest frame within the pitch band.
fn voicing(samples: &[f32], frame_rms: &[f64], frame_len: usize, rate: f64) -> f64 {
    let loudest = frame_rms
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap_or(0);

    // Use two frames so the longest pitch period fits
    let start = loudest * frame_len;
    let end = (start + frame_len * 2).min(samples.len());
    let window = &samples[start..end];

    let min_lag = (rate / MAX_PITCH_HZ) as usize;
    let max_lag = ((rate / MIN_PITCH_HZ) as usize).min(window.len().saturating_sub(1));
    if min_lag == 0 || min_lag >= max_lag {
        return 0.0;
    }

    let energy: f64 = window.iter().map(|s| (*s as f64).powi(2)).sum();
    if energy <= 0.0 {
        return 0.0;
    }

    (min_lag..=max_lag)
        .map(|lag| {
            let corr: f64 = window
                .iter()
                .zip(&window[lag..])
                .map(|(a, b)| *a as f64 * *b as f64)
                .sum();
            corr / energy
        })
        .fold(0.0f64, f64::max)
        .clamp(0.0, 1.0)
}

/// A burst, a quiet gap, then a second release.
fn detect_echo(frame_rms: &[f64]) -> bool {
    let peak = frame_rms.iter().cloned().fold(0.0f64, f64::max);
    if peak <= MIN_NOISE_FLOOR {
        return false;
    }
    let Some(peak_idx) = frame_rms.iter().position(|r| *r == peak) else {
        return false;
    };

    let mut seen_gap = false;
    for r in &frame_rms[peak_idx + 1..] {
        if *r < peak * ECHO_GAP_RATIO {
            seen_gap = true;
        } else if seen_gap && *r >= peak * ECHO_RELEASE_RATIO {
            return true;
        }
    }
    false
}
