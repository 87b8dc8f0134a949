//! Test fixtures: audio payloads and analyzer features

use makhraj_server::analysis::AudioFeatures;
use std::f32::consts::PI;
use std::io::Cursor;

const SAMPLE_RATE: u32 = 16_000;

/// Features matching the Ba pattern exactly, so the primary path scores 100.
pub fn perfect_ba_features() -> AudioFeatures {
    AudioFeatures {
        duration_ms: 120.0,
        dominant_frequency_hz: 300.0,
        amplitude: 0.8,
        voicing_strength: 0.9,
        spectral_centroid_hz: 1500.0,
        zero_crossing_rate: 0.08,
        has_echo: true,
        background_noise: 0.1,
        clarity_score: 0.9,
    }
}

/// Encodes a mono 16-bit sine tone as a WAV file.
pub fn sine_wav(frequency_hz: f32, duration_ms: u32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).expect("Failed to create WAV writer");
        let sample_count = SAMPLE_RATE * duration_ms / 1000;
        for i in 0..sample_count {
            let t = i as f32 / SAMPLE_RATE as f32;
            let sample = (2.0 * PI * frequency_hz * t).sin() * 0.6;
            writer
                .write_sample((sample * i16::MAX as f32) as i16)
                .expect("Failed to write WAV sample");
        }
        writer.finalize().expect("Failed to finalize WAV");
    }
    cursor.into_inner()
}

/// A short recording usable with any extractor.
pub fn test_audio() -> Vec<u8> {
    sine_wav(300.0, 120)
}
