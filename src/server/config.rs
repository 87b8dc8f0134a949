use super::RequestsLoggingLevel;
use std::path::PathBuf;

/// Largest accepted audio upload.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub metrics_port: u16,
    pub max_upload_bytes: usize,
    /// Where uploads are spooled while they are analyzed. `None` uses the
    /// system temp dir.
    pub upload_dir: Option<PathBuf>,
    /// Browser origins allowed by CORS. Empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 3001,
            metrics_port: 9091,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            upload_dir: None,
            cors_origins: Vec::new(),
        }
    }
}
