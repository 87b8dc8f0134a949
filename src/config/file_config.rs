use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub db_dir: Option<String>,
    pub port: Option<u16>,
    pub metrics_port: Option<u16>,
    pub logging_level: Option<String>,
    pub letters_file: Option<String>,
    pub upload_dir: Option<String>,
    pub feature_extractor: Option<String>,
    pub max_upload_bytes: Option<usize>,
    pub cors_origins: Option<Vec<String>>,

    pub transcription: Option<TranscriptionConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct TranscriptionConfig {
    pub hf_token: Option<String>,
    pub base_url: Option<String>,
    /// Models tried in order until one returns text.
    pub models: Option<Vec<String>>,
    pub request_timeout_sec: Option<u64>,
    /// Upper bound for the whole transcription step, all models included.
    pub overall_timeout_sec: Option<u64>,
    pub min_audio_bytes: Option<usize>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
