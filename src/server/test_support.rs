use super::state::{GuardedPronunciationStore, ServerState};
use super::{RequestsLoggingLevel, ServerConfig};
use crate::analysis::{AudioFeatures, FixedFeatureExtractor, PronunciationAnalyzer};
use crate::letters::LetterTable;
use crate::store::SqlitePronunciationStore;
use crate::transcription::NoopTranscriber;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use std::sync::Arc;
use std::time::Instant;
use tempfile::TempDir;

const BOUNDARY: &str = "makhraj-test-boundary";

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

pub fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, file_name, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: audio/wav\r\n\r\n",
                        name, file_name
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(uri: &str, parts: &[Part]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Features matching Ba exactly, so the primary path scores 100.
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

pub struct TestStore {
    pub store: Arc<SqlitePronunciationStore>,
    _temp_dir: TempDir,
}

impl TestStore {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let store =
            SqlitePronunciationStore::new(temp_dir.path().join("pronunciation.db")).unwrap();
        Self {
            store: Arc::new(store),
            _temp_dir: temp_dir,
        }
    }
}

pub fn test_state(store: GuardedPronunciationStore) -> ServerState {
    let letters = Arc::new(LetterTable::builtin().unwrap());
    let analyzer = PronunciationAnalyzer::new(
        letters.clone(),
        Arc::new(FixedFeatureExtractor::new(perfect_ba_features())),
        Arc::new(NoopTranscriber),
    );

    ServerState {
        config: ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            ..ServerConfig::default()
        },
        start_time: Instant::now(),
        hash: "test".to_string(),
        analyzer: Arc::new(analyzer),
        store,
        letters,
    }
}
