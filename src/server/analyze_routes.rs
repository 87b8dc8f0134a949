//! `POST /api/analyze-pronunciation`
//!
//! Apart from the three missing-field cases every request gets a 200 with a
//! usable score. Multipart failures, oversize uploads and panics all map to
//! the emergency tier. Persistence is best effort.

use super::metrics;
use super::state::ServerState;
use crate::analysis::{
    fallback, AnalysisOutcome, AudioQuality, DetectedError, FallbackReport, MakhrajAnalysis,
    Scores, SifatAnalysis, Tier,
};
use crate::store::NewFeedback;
use axum::extract::multipart::{Field, MultipartError, MultipartRejection};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde::Serialize;
use serde_json::json;
use std::io::Write;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::time::Instant;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Room for boundaries and the text fields on top of the audio limit.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

const NO_TRANSCRIPTION: &str = "No transcription available";
const EMERGENCY_TRANSCRIPTION: &str = "System error - using basic evaluation";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Invalid multipart request: {0}")]
    Rejected(#[from] MultipartRejection),

    #[error("Failed to read multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Failed to spool upload: {0}")]
    Io(#[from] std::io::Error),

    #[error("Audio upload exceeds {limit} bytes")]
    TooLarge { limit: usize },
}

/// An uploaded recording, backed by a temp file that is removed on drop.
struct SpooledAudio {
    _file: NamedTempFile,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct AnalyzeForm {
    audio: Option<SpooledAudio>,
    letter_id: Option<String>,
    user_id: Option<String>,
    session_id: Option<String>,
}

/// A request that passed field validation.
struct AnalyzeRequest {
    audio: SpooledAudio,
    letter_id: String,
    user_id: String,
    session_id: String,
}

#[derive(Serialize, Debug)]
struct AnalysisData {
    accuracy: u8,
    confidence: u8,
    scores: Scores,
    transcription: String,
    transcription_similarity: Option<u8>,
    target_letter: Option<String>,
    target_latin: Option<String>,
    makhraj_name: Option<String>,
    makhraj_analysis: Option<MakhrajAnalysis>,
    sifat_analysis: Option<SifatAnalysis>,
    detected_errors: Vec<DetectedError>,
    correction_suggestions: Vec<String>,
    audio_quality: Option<AudioQuality>,
    processing_time: u64,
    model: &'static str,
    tier: &'static str,
    feedback_id: Option<String>,
    session_id: String,
    timestamp: DateTime<Utc>,
    immediate_recommendations: Vec<String>,
    practice_tips: Vec<String>,
    error: Option<String>,
}

#[derive(Serialize, Debug)]
struct AnalyzeResponse {
    success: bool,
    data: AnalysisData,
}

pub(super) fn make_analyze_routes(state: ServerState) -> Router {
    let body_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;
    Router::new()
        .route("/analyze-pronunciation", post(analyze_pronunciation))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

fn generated_session_id(now: DateTime<Utc>) -> String {
    format!("session_{}", now.timestamp_millis())
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

async fn spool_audio(
    mut field: Field<'_>,
    upload_dir: Option<&Path>,
    limit: usize,
) -> Result<SpooledAudio, UploadError> {
    let mut file = match upload_dir {
        Some(dir) => tempfile::Builder::new().prefix("upload_").tempfile_in(dir)?,
        None => tempfile::Builder::new().prefix("upload_").tempfile()?,
    };

    let mut bytes = Vec::new();
    while let Some(chunk) = field.chunk().await? {
        if bytes.len() + chunk.len() > limit {
            return Err(UploadError::TooLarge { limit });
        }
        file.write_all(&chunk)?;
        bytes.extend_from_slice(&chunk);
    }
    file.flush()?;

    debug!(
        path = ?file.path(),
        size = %format!("{:#}", byte_unit::Byte::from(bytes.len())),
        "Spooled audio upload"
    );
    Ok(SpooledAudio { _file: file, bytes })
}

async fn read_form(
    mut multipart: Multipart,
    upload_dir: Option<&Path>,
    limit: usize,
) -> Result<AnalyzeForm, UploadError> {
    let mut form = AnalyzeForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("audio") => form.audio = Some(spool_audio(field, upload_dir, limit).await?),
            Some("letterId") => form.letter_id = Some(field.text().await?),
            Some("userId") => form.user_id = Some(field.text().await?),
            Some("sessionId") => form.session_id = Some(field.text().await?),
            other => debug!("Ignoring multipart field {:?}", other),
        }
    }

    Ok(form)
}

/// Checks the required fields in the order audio, letter, user.
fn validate(form: AnalyzeForm, now: DateTime<Utc>) -> Result<AnalyzeRequest, Response> {
    let audio = form
        .audio
        .ok_or_else(|| bad_request("No audio file provided"))?;
    let letter_id =
        non_blank(form.letter_id).ok_or_else(|| bad_request("No letter ID provided"))?;
    let user_id = non_blank(form.user_id).ok_or_else(|| bad_request("No user ID provided"))?;
    let session_id = non_blank(form.session_id).unwrap_or_else(|| generated_session_id(now));

    Ok(AnalyzeRequest {
        audio,
        letter_id: letter_id.trim().to_string(),
        user_id,
        session_id,
    })
}

/// Writes the feedback row and the progress update. Returns the feedback
/// id when the row was stored.
fn persist(
    state: &ServerState,
    request: &AnalyzeRequest,
    outcome: &AnalysisOutcome,
    processing_time_ms: u64,
    now: DateTime<Utc>,
) -> Option<String> {
    let report = outcome.report()?;

    let feedback_id = NewFeedback::from_report(
        &request.user_id,
        &request.session_id,
        report,
        outcome.model(),
        processing_time_ms,
        now,
    )
    .and_then(|feedback| state.store.insert_feedback(&feedback));
    let feedback_id = match feedback_id {
        Ok(id) => Some(id),
        Err(e) => {
            metrics::record_persistence_error("insert_feedback");
            warn!(user_id = %request.user_id, error = %e, "Failed to store pronunciation feedback");
            None
        }
    };

    if let Err(e) = state.store.record_attempt(
        &request.user_id,
        report.letter.id,
        f64::from(report.scores.overall),
        now,
    ) {
        metrics::record_persistence_error("record_attempt");
        warn!(user_id = %request.user_id, error = %e, "Failed to update pronunciation progress");
    }

    feedback_id
}

fn fallback_data(
    report: FallbackReport,
    tier: Tier,
    session_id: String,
    processing_time: u64,
    now: DateTime<Utc>,
) -> AnalysisData {
    let placeholder = match tier {
        Tier::Emergency => EMERGENCY_TRANSCRIPTION,
        _ => NO_TRANSCRIPTION,
    };
    AnalysisData {
        accuracy: report.scores.overall,
        confidence: report.confidence,
        scores: report.scores,
        transcription: report
            .transcription
            .map(|t| t.text)
            .unwrap_or_else(|| placeholder.to_string()),
        transcription_similarity: None,
        target_letter: report.letter.as_ref().map(|l| l.glyph.clone()),
        target_latin: report.letter.as_ref().map(|l| l.latin_name.clone()),
        makhraj_name: report.letter.map(|l| l.articulation_point),
        makhraj_analysis: None,
        sifat_analysis: None,
        detected_errors: Vec::new(),
        correction_suggestions: Vec::new(),
        audio_quality: None,
        processing_time,
        model: tier.model(),
        tier: tier.as_str(),
        feedback_id: None,
        session_id,
        timestamp: now,
        immediate_recommendations: report.immediate_recommendations,
        practice_tips: report.practice_tips,
        error: Some(report.error),
    }
}

fn outcome_data(
    outcome: AnalysisOutcome,
    feedback_id: Option<String>,
    session_id: String,
    processing_time: u64,
    now: DateTime<Utc>,
) -> AnalysisData {
    let tier = outcome.tier();
    let report = match outcome {
        AnalysisOutcome::Advanced(report) => *report,
        AnalysisOutcome::Fallback(report) | AnalysisOutcome::Emergency(report) => {
            return fallback_data(report, tier, session_id, processing_time, now)
        }
    };

    AnalysisData {
        accuracy: report.scores.overall,
        confidence: report.confidence,
        scores: report.scores,
        transcription: report
            .transcription
            .map(|t| t.text)
            .unwrap_or_else(|| NO_TRANSCRIPTION.to_string()),
        transcription_similarity: report.transcription_similarity,
        target_letter: Some(report.letter.glyph),
        target_latin: Some(report.letter.latin_name),
        makhraj_name: Some(report.letter.articulation_point),
        makhraj_analysis: Some(report.makhraj),
        sifat_analysis: Some(report.sifat),
        detected_errors: report.detected_errors,
        correction_suggestions: report.correction_suggestions,
        audio_quality: Some(report.audio_quality),
        processing_time,
        model: tier.model(),
        tier: tier.as_str(),
        feedback_id,
        session_id,
        timestamp: now,
        immediate_recommendations: report.immediate_recommendations,
        practice_tips: report.practice_tips,
        error: None,
    }
}

fn respond(data: AnalysisData, start: Instant) -> Response {
    metrics::record_analysis(data.tier, start.elapsed());
    Json(AnalyzeResponse {
        success: true,
        data,
    })
    .into_response()
}

fn emergency_response(error: impl Into<String>, start: Instant) -> Response {
    let now = Utc::now();
    let report = fallback::emergency(error, &mut rand::rng());
    let data = fallback_data(
        report,
        Tier::Emergency,
        generated_session_id(now),
        start.elapsed().as_millis() as u64,
        now,
    );
    respond(data, start)
}

async fn handle_analysis(
    state: &ServerState,
    multipart: Result<Multipart, MultipartRejection>,
    start: Instant,
) -> Response {
    let form = match multipart {
        Ok(multipart) => {
            read_form(
                multipart,
                state.config.upload_dir.as_deref(),
                state.config.max_upload_bytes,
            )
            .await
        }
        Err(rejection) => Err(UploadError::from(rejection)),
    };
    let form = match form {
        Ok(form) => form,
        Err(e) => {
            metrics::record_upload_rejection();
            warn!(error = %e, "Could not read upload, returning emergency scores");
            return emergency_response(e.to_string(), start);
        }
    };

    let request = match validate(form, Utc::now()) {
        Ok(request) => request,
        Err(response) => return response,
    };

    if let Some(kind) = infer::get(&request.audio.bytes) {
        debug!(mime = kind.mime_type(), "Detected upload type");
    } else {
        debug!(bytes = request.audio.bytes.len(), "Upload type not recognized");
    }

    let outcome = state
        .analyzer
        .run(&request.letter_id, &request.audio.bytes)
        .await;

    let now = Utc::now();
    let processing_time = start.elapsed().as_millis() as u64;
    let feedback_id = persist(state, &request, &outcome, processing_time, now);

    info!(
        letter_id = %request.letter_id,
        user_id = %request.user_id,
        tier = %outcome.tier(),
        model = outcome.model(),
        overall = outcome.overall(),
        "Pronunciation analyzed"
    );

    let data = outcome_data(
        outcome,
        feedback_id,
        request.session_id,
        processing_time,
        now,
    );
    respond(data, start)
}

async fn analyze_pronunciation(
    State(state): State<ServerState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let start = Instant::now();
    match AssertUnwindSafe(handle_analysis(&state, multipart, start))
        .catch_unwind()
        .await
    {
        Ok(response) => response,
        Err(_) => {
            error!("Analysis panicked, returning emergency scores");
            emergency_response("Internal analysis error", start)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::make_app;
    use crate::server::test_support::{body_json, multipart_request, test_state, Part, TestStore};
    use crate::store::{
        FeedbackQuery, MockPronunciationStore, PronunciationFeedback, PronunciationProgress,
        PronunciationStore,
    };
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Arc;
    use tower::ServiceExt;

    const URI: &str = "/api/analyze-pronunciation";

    fn full_request(letter_id: &str) -> Request<Body> {
        multipart_request(
            URI,
            &[
                Part::File("audio", "attempt.wav", b"RIFF0000WAVEfmt "),
                Part::Text("letterId", letter_id),
                Part::Text("userId", "user-1"),
                Part::Text("sessionId", "session-abc"),
            ],
        )
    }

    #[tokio::test]
    async fn scores_and_persists_a_known_letter() {
        let test = TestStore::new();
        let app = make_app(test_state(test.store.clone())).unwrap();

        let response = app.oneshot(full_request("2")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let data = &json["data"];
        assert_eq!(json["success"], true);
        assert_eq!(data["accuracy"], 100);
        assert_eq!(data["scores"]["overall"], 100);
        assert_eq!(data["model"], "advanced-nlp-makhraj-v1");
        assert_eq!(data["target_latin"], "Ba");
        assert_eq!(data["session_id"], "session-abc");
        assert_eq!(data["transcription"], NO_TRANSCRIPTION);
        assert!(data["error"].is_null());
        assert!(data["feedback_id"].is_string());
        assert_eq!(data["makhraj_analysis"]["accuracy"], 100.0);

        let stored = test
            .store
            .list_feedback(&FeedbackQuery::for_user("user-1"))
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(Some(stored[0].id.as_str()), data["feedback_id"].as_str());
        assert_eq!(stored[0].ai_model_used, "advanced-nlp-makhraj-v1");

        let progress = test.store.get_progress("user-1", 2).unwrap().unwrap();
        assert_eq!(progress.total_attempts, 1);
        assert_eq!(progress.average_accuracy, 100.0);
    }

    #[tokio::test]
    async fn missing_fields_are_rejected_in_order() {
        let test = TestStore::new();
        let app = make_app(test_state(test.store.clone())).unwrap();

        let cases = [
            (
                vec![Part::Text("letterId", "2"), Part::Text("userId", "u")],
                "No audio file provided",
            ),
            (
                vec![Part::File("audio", "a.wav", b"x"), Part::Text("userId", "u")],
                "No letter ID provided",
            ),
            (
                vec![Part::File("audio", "a.wav", b"x"), Part::Text("letterId", "2")],
                "No user ID provided",
            ),
            (
                vec![
                    Part::File("audio", "a.wav", b"x"),
                    Part::Text("letterId", " "),
                    Part::Text("userId", "u"),
                ],
                "No letter ID provided",
            ),
        ];

        for (parts, message) in cases {
            let response = app
                .clone()
                .oneshot(multipart_request(URI, &parts))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(body_json(response).await["error"], message);
        }
    }

    #[tokio::test]
    async fn unknown_letter_gets_fallback_scores_without_persisting() {
        let test = TestStore::new();
        let app = make_app(test_state(test.store.clone())).unwrap();

        let response = app.oneshot(full_request("99")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let data = body_json(response).await["data"].clone();
        assert_eq!(data["model"], "fallback-system");
        let overall = data["scores"]["overall"].as_u64().unwrap();
        assert!((30..=98).contains(&overall));
        assert!(data["feedback_id"].is_null());
        assert!(data["error"].as_str().unwrap().contains("99"));
        assert!(test
            .store
            .list_feedback(&FeedbackQuery::for_user("user-1"))
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn store_failures_still_return_scores() {
        let mut store = MockPronunciationStore::new();
        store
            .expect_insert_feedback()
            .returning(|_| Err(anyhow::anyhow!("disk full")));
        store
            .expect_record_attempt()
            .returning(|_, _, _, _| Err(anyhow::anyhow!("disk full")));
        let app = make_app(test_state(Arc::new(store))).unwrap();

        let response = app.oneshot(full_request("2")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let data = body_json(response).await["data"].clone();
        assert_eq!(data["scores"]["overall"], 100);
        assert_eq!(data["model"], "advanced-nlp-makhraj-v1");
        assert!(data["feedback_id"].is_null());
    }

    #[tokio::test]
    async fn non_multipart_body_gets_emergency_scores() {
        let test = TestStore::new();
        let app = make_app(test_state(test.store.clone())).unwrap();

        let request = Request::builder()
            .method("POST")
            .uri(URI)
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let data = body_json(response).await["data"].clone();
        assert_eq!(data["model"], "emergency-fallback");
        assert_eq!(data["transcription"], EMERGENCY_TRANSCRIPTION);
        assert!(data["scores"]["overall"].is_u64());
        assert!(data["session_id"].as_str().unwrap().starts_with("session_"));
    }

    #[tokio::test]
    async fn oversize_upload_gets_emergency_scores() {
        let test = TestStore::new();
        let mut state = test_state(test.store.clone());
        state.config.max_upload_bytes = 16;
        let app = make_app(state).unwrap();

        let audio = vec![0u8; 64];
        let request = multipart_request(
            URI,
            &[
                Part::File("audio", "big.wav", &audio),
                Part::Text("letterId", "2"),
                Part::Text("userId", "user-1"),
            ],
        );
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["data"]["model"], "emergency-fallback");
    }

    struct PanickingStore;

    impl PronunciationStore for PanickingStore {
        fn insert_feedback(&self, _feedback: &NewFeedback) -> anyhow::Result<String> {
            panic!("store exploded")
        }

        fn record_attempt(
            &self,
            _user_id: &str,
            _letter_id: u32,
            _score: f64,
            _at: DateTime<Utc>,
        ) -> anyhow::Result<PronunciationProgress> {
            panic!("store exploded")
        }

        fn get_progress(
            &self,
            _user_id: &str,
            _letter_id: u32,
        ) -> anyhow::Result<Option<PronunciationProgress>> {
            Ok(None)
        }

        fn list_progress(
            &self,
            _user_id: &str,
            _letter_id: Option<u32>,
        ) -> anyhow::Result<Vec<PronunciationProgress>> {
            Ok(Vec::new())
        }

        fn list_feedback(
            &self,
            _query: &FeedbackQuery,
        ) -> anyhow::Result<Vec<PronunciationFeedback>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn panics_map_to_emergency_scores() {
        let app = make_app(test_state(Arc::new(PanickingStore))).unwrap();

        let response = app.oneshot(full_request("2")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let data = body_json(response).await["data"].clone();
        assert_eq!(data["model"], "emergency-fallback");
        assert_eq!(data["error"], "Internal analysis error");
    }

    #[tokio::test]
    async fn generates_a_session_id_when_missing() {
        let test = TestStore::new();
        let app = make_app(test_state(test.store.clone())).unwrap();

        let request = multipart_request(
            URI,
            &[
                Part::File("audio", "a.wav", b"audio"),
                Part::Text("letterId", "2"),
                Part::Text("userId", "user-1"),
            ],
        );
        let response = app.oneshot(request).await.unwrap();
        let data = body_json(response).await["data"].clone();
        assert!(data["session_id"].as_str().unwrap().starts_with("session_"));
    }

    #[test]
    fn uploads_are_removed_when_dropped() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = tempfile::Builder::new()
            .prefix("upload_")
            .tempfile_in(dir.path())
            .unwrap();
        let path = file.path().to_path_buf();
        let audio = SpooledAudio {
            _file: file,
            bytes: vec![1, 2, 3],
        };
        assert!(path.exists());
        drop(audio);
        assert!(!path.exists());
    }
}
