//! Common test infrastructure
//!
//! This module provides all the infrastructure needed for end-to-end tests.
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestServer, TestClient, LETTER_BA_ID, TEST_USER_ID};
//! use reqwest::StatusCode;
//!
//! #[tokio::test]
//! async fn test_analyze() {
//!     let server = TestServer::spawn().await;
//!     let client = TestClient::new(server.base_url.clone());
//!
//!     let response = client.analyze(b"audio", LETTER_BA_ID, TEST_USER_ID).await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```

mod client;
mod constants;
mod fixtures;
mod server;

// Public API - this is what tests import
pub use client::{AnalyzeForm, TestClient};
pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::{sine_wav, test_audio};
pub use server::TestServer;
