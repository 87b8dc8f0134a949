mod file_config;

pub use file_config::{FileConfig, TranscriptionConfig};

use crate::analysis::DEFAULT_TRANSCRIPTION_TIMEOUT;
use crate::server::{RequestsLoggingLevel, ServerConfig};
use crate::transcription::HuggingFaceConfig;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

pub const PRONUNCIATION_DB_FILE: &str = "pronunciation.db";

/// Source of the acoustic features fed to the scorers.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum FeatureExtractorKind {
    /// Random plausible features, the historical behavior of the service.
    #[default]
    Placeholder,
    /// Features computed from the PCM samples of a WAV upload.
    Wav,
}

impl std::fmt::Display for FeatureExtractorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Settings for the optional external transcription step
#[derive(Debug, Clone)]
pub struct TranscriptionSettings {
    pub hf_token: String,
    pub base_url: Option<String>,
    pub models: Option<Vec<String>>,
    pub request_timeout: Option<Duration>,
    pub overall_timeout: Duration,
    pub min_audio_bytes: Option<usize>,
}

impl TranscriptionSettings {
    pub fn hugging_face_config(&self) -> HuggingFaceConfig {
        let mut config = HuggingFaceConfig::new(self.hf_token.clone());
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(models) = &self.models {
            config.models = models.clone();
        }
        if let Some(timeout) = self.request_timeout {
            config.request_timeout = timeout;
        }
        if let Some(min_audio_bytes) = self.min_audio_bytes {
            config.min_audio_bytes = min_audio_bytes;
        }
        config
    }
}

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub letters_file: Option<PathBuf>,
    pub upload_dir: Option<PathBuf>,
    pub feature_extractor: FeatureExtractorKind,
    pub hf_token: Option<String>,
    pub max_upload_bytes: usize,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub letters_file: Option<PathBuf>,
    pub upload_dir: Option<PathBuf>,
    pub feature_extractor: FeatureExtractorKind,
    pub max_upload_bytes: usize,
    pub cors_origins: Vec<String>,

    /// `None` when no token is configured, transcription is then disabled.
    pub transcription: Option<TranscriptionSettings>,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let letters_file = file
            .letters_file
            .map(PathBuf::from)
            .or_else(|| cli.letters_file.clone());
        if let Some(path) = &letters_file {
            if !path.is_file() {
                bail!("Letters file does not exist: {:?}", path);
            }
        }

        let upload_dir = file
            .upload_dir
            .map(PathBuf::from)
            .or_else(|| cli.upload_dir.clone());
        if let Some(dir) = &upload_dir {
            if !dir.is_dir() {
                bail!("upload_dir is not an existing directory: {:?}", dir);
            }
        }

        // Unlike logging_level, an unknown name is rejected
        let feature_extractor = match file.feature_extractor {
            Some(name) => match parse_feature_extractor(&name) {
                Some(kind) => kind,
                None => bail!(
                    "Unknown feature_extractor '{}', expected 'placeholder' or 'wav'",
                    name
                ),
            },
            None => cli.feature_extractor,
        };

        let max_upload_bytes = file.max_upload_bytes.unwrap_or(cli.max_upload_bytes);
        if max_upload_bytes == 0 {
            bail!("max_upload_bytes must be greater than 0");
        }

        let cors_origins = file
            .cors_origins
            .unwrap_or_else(|| cli.cors_origins.clone());

        let tr_file = file.transcription.unwrap_or_default();
        let transcription = tr_file
            .hf_token
            .or_else(|| cli.hf_token.clone())
            .filter(|token| !token.trim().is_empty())
            .map(|hf_token| TranscriptionSettings {
                hf_token,
                base_url: tr_file.base_url,
                models: tr_file.models,
                request_timeout: tr_file.request_timeout_sec.map(Duration::from_secs),
                overall_timeout: tr_file
                    .overall_timeout_sec
                    .map(Duration::from_secs)
                    .unwrap_or(DEFAULT_TRANSCRIPTION_TIMEOUT),
                min_audio_bytes: tr_file.min_audio_bytes,
            });

        Ok(AppConfig {
            db_dir,
            port,
            metrics_port,
            logging_level,
            letters_file,
            upload_dir,
            feature_extractor,
            max_upload_bytes,
            cors_origins,
            transcription,
        })
    }

    pub fn pronunciation_db_path(&self) -> PathBuf {
        self.db_dir.join(PRONUNCIATION_DB_FILE)
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            port: self.port,
            metrics_port: self.metrics_port,
            max_upload_bytes: self.max_upload_bytes,
            upload_dir: self.upload_dir.clone(),
            cors_origins: self.cors_origins.clone(),
        }
    }
}

fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}

fn parse_feature_extractor(s: &str) -> Option<FeatureExtractorKind> {
    FeatureExtractorKind::from_str(s, true).ok()
}
