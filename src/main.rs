use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use makhraj_server::analysis::{
    FeatureExtractor, PlaceholderFeatureExtractor, PronunciationAnalyzer, WavFeatureExtractor,
    DEFAULT_TRANSCRIPTION_TIMEOUT,
};
use makhraj_server::config::{self, FeatureExtractorKind};
use makhraj_server::letters::LetterTable;
use makhraj_server::server::config::DEFAULT_MAX_UPLOAD_BYTES;
use makhraj_server::server::state::ServerState;
use makhraj_server::server::{metrics, run_server, RequestsLoggingLevel};
use makhraj_server::store::SqlitePronunciationStore;
use makhraj_server::transcription::{HuggingFaceTranscriber, NoopTranscriber, Transcriber};

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path '{}': {}", s, msg));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(original_path))
}

fn parse_dir(s: &str) -> Result<PathBuf, String> {
    let path = parse_path(s)?;
    if !path.exists() {
        return Err(format!("Directory does not exist: {}", s));
    }
    if !path.is_dir() {
        return Err(format!("Path is not a directory: {}", s));
    }
    Ok(path)
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory containing the pronunciation database.
    /// Can also be specified in config file.
    #[clap(long, value_parser = parse_dir)]
    pub db_dir: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// TOML file with a `[[letters]]` table replacing the built-in letter patterns.
    #[clap(long, value_parser = parse_path)]
    pub letters_file: Option<PathBuf>,

    /// Directory where uploads are spooled while analyzed. Defaults to the system temp dir.
    #[clap(long, value_parser = parse_dir)]
    pub upload_dir: Option<PathBuf>,

    /// Where acoustic features come from.
    #[clap(long, default_value = "placeholder")]
    pub feature_extractor: FeatureExtractorKind,

    /// Hugging Face API token. Transcription is disabled without one.
    #[clap(long, env = "HF_TOKEN", hide_env_values = true)]
    pub hf_token: Option<String>,

    /// Largest accepted audio upload in bytes.
    #[clap(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    /// Browser origin allowed by CORS, may be repeated. Any origin when omitted.
    #[clap(long = "cors-origin")]
    pub cors_origins: Vec<String>,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            db_dir: args.db_dir.clone(),
            port: args.port,
            metrics_port: args.metrics_port,
            logging_level: args.logging_level.clone(),
            letters_file: args.letters_file.clone(),
            upload_dir: args.upload_dir.clone(),
            feature_extractor: args.feature_extractor,
            hf_token: args.hf_token.clone(),
            max_upload_bytes: args.max_upload_bytes,
            cors_origins: args.cors_origins.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  db_dir: {:?}", app_config.db_dir);
    info!("  port: {}", app_config.port);
    info!("  metrics_port: {}", app_config.metrics_port);
    info!("  feature_extractor: {}", app_config.feature_extractor);
    info!(
        "  transcription: {}",
        if app_config.transcription.is_some() {
            "enabled"
        } else {
            "disabled"
        }
    );

    let letters = match &app_config.letters_file {
        Some(path) => {
            info!("Loading letter patterns from {:?}", path);
            LetterTable::load(path)?
        }
        None => LetterTable::builtin()?,
    };
    info!("Loaded {} letter patterns", letters.len());
    let letters = Arc::new(letters);

    let extractor: Arc<dyn FeatureExtractor> = match app_config.feature_extractor {
        FeatureExtractorKind::Placeholder => Arc::new(PlaceholderFeatureExtractor::new()),
        FeatureExtractorKind::Wav => Arc::new(WavFeatureExtractor::new()),
    };

    let transcriber: Arc<dyn Transcriber> = match &app_config.transcription {
        Some(settings) => Arc::new(HuggingFaceTranscriber::new(
            settings.hugging_face_config(),
        )?),
        None => Arc::new(NoopTranscriber),
    };
    let transcription_timeout = app_config
        .transcription
        .as_ref()
        .map(|settings| settings.overall_timeout)
        .unwrap_or(DEFAULT_TRANSCRIPTION_TIMEOUT);

    let analyzer = PronunciationAnalyzer::new(letters.clone(), extractor, transcriber)
        .with_transcription_timeout(transcription_timeout);

    let store = Arc::new(SqlitePronunciationStore::new(
        app_config.pronunciation_db_path(),
    )?);

    // Initialize metrics system
    info!("Initializing metrics...");
    metrics::init_metrics();

    let state = ServerState {
        config: app_config.server_config(),
        start_time: Instant::now(),
        hash: env!("GIT_HASH").to_string(),
        analyzer: Arc::new(analyzer),
        store,
        letters,
    };

    run_server(state).await
}
