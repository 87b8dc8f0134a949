//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own database and upload dir.

use super::constants::*;
use super::fixtures::perfect_ba_features;
use makhraj_server::analysis::{
    FeatureExtractor, FixedFeatureExtractor, PronunciationAnalyzer, WavFeatureExtractor,
};
use makhraj_server::letters::LetterTable;
use makhraj_server::server::state::ServerState;
use makhraj_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use makhraj_server::store::{PronunciationStore, SqlitePronunciationStore};
use makhraj_server::transcription::NoopTranscriber;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with an isolated database
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Store for direct database access in tests
    pub store: Arc<dyn PronunciationStore>,

    /// Directory uploads are spooled into
    pub upload_dir: PathBuf,

    // Private fields - keep resources alive until drop
    _temp_db_dir: TempDir,
    _temp_upload_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a server whose extractor always returns features matching Ba
    pub async fn spawn() -> Self {
        Self::spawn_with_extractor(Arc::new(FixedFeatureExtractor::new(perfect_ba_features())))
            .await
    }

    /// Spawns a server that computes features from the uploaded WAV samples
    #[allow(dead_code)]
    pub async fn spawn_with_wav_extractor() -> Self {
        Self::spawn_with_extractor(Arc::new(WavFeatureExtractor::new())).await
    }

    /// Spawns a new test server on a random port
    ///
    /// # Panics
    ///
    /// Panics if:
    /// - Database creation fails
    /// - Port binding fails
    /// - Server doesn't become ready within timeout
    pub async fn spawn_with_extractor(extractor: Arc<dyn FeatureExtractor>) -> Self {
        let temp_db_dir = TempDir::new().expect("Failed to create temp db dir");
        let temp_upload_dir = TempDir::new().expect("Failed to create temp upload dir");

        let store: Arc<dyn PronunciationStore> = Arc::new(
            SqlitePronunciationStore::new(temp_db_dir.path().join("pronunciation.db"))
                .expect("Failed to open pronunciation store"),
        );

        let letters = Arc::new(LetterTable::builtin().expect("Failed to build letter table"));
        let analyzer =
            PronunciationAnalyzer::new(letters.clone(), extractor, Arc::new(NoopTranscriber));

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            max_upload_bytes: TEST_MAX_UPLOAD_BYTES,
            upload_dir: Some(temp_upload_dir.path().to_path_buf()),
            ..ServerConfig::default()
        };

        let state = ServerState {
            config,
            start_time: Instant::now(),
            hash: "e2e".to_string(),
            analyzer: Arc::new(analyzer),
            store: store.clone(),
            letters,
        };

        let app = make_app(state).expect("Failed to build app");

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            store,
            upload_dir: temp_upload_dir.path().to_path_buf(),
            _temp_db_dir: temp_db_dir,
            _temp_upload_dir: temp_upload_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the / endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
        // TempDirs will be cleaned up automatically
    }
}
