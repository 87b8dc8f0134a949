//! Hugging Face Inference API client.

use super::{Transcriber, Transcription, TranscriptionError};
use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co/models";

/// Arabic-capable models tried in order.
pub const DEFAULT_MODELS: &[&str] = &[
    "facebook/wav2vec2-large-xlsr-53-arabic",
    "jonatasgrosman/wav2vec2-large-xlsr-53-arabic",
    "openai/whisper-small",
];

/// Recordings smaller than this are treated as silence.
pub const DEFAULT_MIN_AUDIO_BYTES: usize = 10_000;

#[derive(Debug, Clone)]
pub struct HuggingFaceConfig {
    pub base_url: String,
    pub api_token: String,
    pub models: Vec<String>,
    pub request_timeout: Duration,
    pub min_audio_bytes: usize,
}

impl HuggingFaceConfig {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_token: api_token.into(),
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            request_timeout: Duration::from_secs(5),
            min_audio_bytes: DEFAULT_MIN_AUDIO_BYTES,
        }
    }
}

pub struct HuggingFaceTranscriber {
    client: Client,
    config: HuggingFaceConfig,
}

impl HuggingFaceTranscriber {
    pub fn new(config: HuggingFaceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client, config })
    }

    async fn transcribe_with_model(
        &self,
        model: &str,
        audio: &[u8],
        language: &str,
    ) -> Result<Transcription, TranscriptionError> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), model);

        debug!(
            model = %model,
            bytes = audio.len(),
            "Sending transcription request"
        );

        // Whisper takes a JSON envelope with a language hint, CTC models take raw audio
        let request = if model.contains("whisper") {
            let encoded = base64::engine::general_purpose::STANDARD.encode(audio);
            self.client.post(&url).json(&json!({
                "inputs": encoded,
                "parameters": { "task": "transcribe", "language": language },
            }))
        } else {
            self.client
                .post(&url)
                .header("Content-Type", "audio/wav")
                .body(audio.to_vec())
        };

        let response = request
            .header("Authorization", format!("Bearer {}", self.config.api_token))
            .timeout(self.config.request_timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TranscriptionError::Timeout
                } else {
                    TranscriptionError::Connection(e.to_string())
                }
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(TranscriptionError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranscriptionError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let value: Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                TranscriptionError::Timeout
            } else {
                TranscriptionError::InvalidResponse(format!("Failed to parse response: {}", e))
            }
        })?;

        let text = extract_text(&value)?;
        Ok(Transcription {
            text,
            model: model.to_string(),
        })
    }
}

/// Pulls the transcribed text out of the shapes the inference API returns.
fn extract_text(value: &Value) -> Result<String, TranscriptionError> {
    if let Some(error) = value.get("error") {
        let message = error
            .as_str()
            .map(|s| s.to_string())
            .unwrap_or_else(|| error.to_string());
        return Err(TranscriptionError::InvalidResponse(message));
    }

    let text = match value {
        Value::String(s) => Some(s.as_str()),
        Value::Array(items) => items
            .first()
            .and_then(|item| item.get("text"))
            .and_then(Value::as_str),
        Value::Object(_) => value
            .get("text")
            .or_else(|| value.get("transcription"))
            .and_then(Value::as_str),
        _ => None,
    };

    match text.map(str::trim) {
        Some(t) if !t.is_empty() => Ok(t.to_string()),
        Some(_) => Err(TranscriptionError::InvalidResponse(
            "Empty transcription".to_string(),
        )),
        None => Err(TranscriptionError::InvalidResponse(format!(
            "Unexpected response shape: {}",
            value
        ))),
    }
}

#[async_trait]
impl Transcriber for HuggingFaceTranscriber {
    fn name(&self) -> &'static str {
        "huggingface"
    }

    async fn transcribe(
        &self,
        audio: &[u8],
        language: &str,
    ) -> Result<Transcription, TranscriptionError> {
        if audio.len() < self.config.min_audio_bytes {
            return Err(TranscriptionError::Silence(audio.len()));
        }

        let mut last_error = TranscriptionError::InvalidResponse("No models configured".into());
        for model in &self.config.models {
            match self.transcribe_with_model(model, audio, language).await {
                Ok(transcription) => {
                    info!(model = %model, "Transcription succeeded");
                    return Ok(transcription);
                }
                Err(e) => {
                    warn!(model = %model, error = %e, "Transcription model failed");
                    last_error = e;
                }
            }
        }
        Err(TranscriptionError::AllModelsFailed(Box::new(last_error)))
    }
}
