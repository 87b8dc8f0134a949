//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all makhraj-server endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use std::time::Duration;

/// Fields of an analyze request. `None` leaves the field out of the form.
#[derive(Default, Clone)]
pub struct AnalyzeForm<'a> {
    pub audio: Option<&'a [u8]>,
    pub letter_id: Option<&'a str>,
    pub user_id: Option<&'a str>,
    pub session_id: Option<&'a str>,
}

impl<'a> AnalyzeForm<'a> {
    fn into_multipart(self) -> Form {
        let mut form = Form::new();
        if let Some(audio) = self.audio {
            let part = Part::bytes(audio.to_vec())
                .file_name("recording.wav")
                .mime_str("audio/wav")
                .expect("Invalid mime type");
            form = form.part("audio", part);
        }
        if let Some(letter_id) = self.letter_id {
            form = form.text("letterId", letter_id.to_string());
        }
        if let Some(user_id) = self.user_id {
            form = form.text("userId", user_id.to_string());
        }
        if let Some(session_id) = self.session_id {
            form = form.text("sessionId", session_id.to_string());
        }
        form
    }
}

/// HTTP test client
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    // ========================================================================
    // Server Info
    // ========================================================================

    /// GET /
    pub async fn home(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Home request failed")
    }

    // ========================================================================
    // Analysis Endpoints
    // ========================================================================

    /// POST /api/analyze-pronunciation with all required fields
    pub async fn analyze(&self, audio: &[u8], letter_id: &str, user_id: &str) -> Response {
        self.analyze_form(AnalyzeForm {
            audio: Some(audio),
            letter_id: Some(letter_id),
            user_id: Some(user_id),
            session_id: None,
        })
        .await
    }

    /// POST /api/analyze-pronunciation with an arbitrary subset of fields
    pub async fn analyze_form(&self, form: AnalyzeForm<'_>) -> Response {
        self.client
            .post(format!("{}/api/analyze-pronunciation", self.base_url))
            .multipart(form.into_multipart())
            .send()
            .await
            .expect("Analyze request failed")
    }

    /// POST /api/analyze-pronunciation with a raw, non-multipart body
    pub async fn analyze_raw(&self, content_type: &str, body: Vec<u8>) -> Response {
        self.client
            .post(format!("{}/api/analyze-pronunciation", self.base_url))
            .header("content-type", content_type)
            .body(body)
            .send()
            .await
            .expect("Analyze request failed")
    }

    // ========================================================================
    // Report Endpoints
    // ========================================================================

    /// GET /api/pronunciation-feedback
    pub async fn get_feedback(&self, query: &[(&str, &str)]) -> Response {
        self.client
            .get(format!("{}/api/pronunciation-feedback", self.base_url))
            .query(query)
            .send()
            .await
            .expect("Feedback request failed")
    }

    /// GET /api/pronunciation-progress
    pub async fn get_progress(&self, query: &[(&str, &str)]) -> Response {
        self.client
            .get(format!("{}/api/pronunciation-progress", self.base_url))
            .query(query)
            .send()
            .await
            .expect("Progress request failed")
    }

    // ========================================================================
    // Letter Endpoints
    // ========================================================================

    /// GET /api/letters
    pub async fn get_letters(&self) -> Response {
        self.client
            .get(format!("{}/api/letters", self.base_url))
            .send()
            .await
            .expect("Letters request failed")
    }

    /// GET /api/letters/{id}
    pub async fn get_letter(&self, id: &str) -> Response {
        self.client
            .get(format!("{}/api/letters/{}", self.base_url, id))
            .send()
            .await
            .expect("Letter request failed")
    }
}
