use super::state::{GuardedLetterTable, GuardedPronunciationStore, ServerState};
use crate::reports::{feedback_history, progress_report, TREND_WINDOW};
use crate::store::FeedbackQuery;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

#[derive(Deserialize, Debug)]
struct FeedbackParams {
    user_id: Option<String>,
    letter_id: Option<u32>,
    session_id: Option<String>,
    limit: Option<usize>,
}

#[derive(Deserialize, Debug)]
struct ProgressParams {
    user_id: Option<String>,
    letter_id: Option<u32>,
}

fn missing_user_id() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "User ID is required" })),
    )
        .into_response()
}

fn store_error(message: &str, e: anyhow::Error) -> Response {
    error!("{}: {:#}", message, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "error": message,
            "details": e.to_string(),
        })),
    )
        .into_response()
}

async fn get_feedback(
    State(store): State<GuardedPronunciationStore>,
    State(letters): State<GuardedLetterTable>,
    Query(params): Query<FeedbackParams>,
) -> Response {
    let Some(user_id) = params.user_id.filter(|u| !u.is_empty()) else {
        return missing_user_id();
    };

    let mut query = FeedbackQuery::for_user(user_id);
    if let Some(letter_id) = params.letter_id {
        query = query.with_letter(letter_id);
    }
    if let Some(session_id) = params.session_id.filter(|s| !s.is_empty()) {
        query = query.with_session(session_id);
    }
    if let Some(limit) = params.limit {
        query = query.with_limit(limit);
    }

    match store.list_feedback(&query) {
        Ok(rows) => Json(json!({
            "success": true,
            "data": feedback_history(&letters, rows),
        }))
        .into_response(),
        Err(e) => store_error("Failed to fetch pronunciation feedback", e),
    }
}

async fn get_progress(
    State(store): State<GuardedPronunciationStore>,
    State(letters): State<GuardedLetterTable>,
    Query(params): Query<ProgressParams>,
) -> Response {
    let Some(user_id) = params.user_id.filter(|u| !u.is_empty()) else {
        return missing_user_id();
    };

    let progress = match store.list_progress(&user_id, params.letter_id) {
        Ok(progress) => progress,
        Err(e) => return store_error("Failed to fetch pronunciation progress", e),
    };

    // Trends are a bonus, a failing history read only drops them
    let recent = store
        .list_feedback(&FeedbackQuery::for_user(&user_id).with_limit(TREND_WINDOW))
        .unwrap_or_else(|e| {
            error!("Failed to fetch recent feedback for trends: {:#}", e);
            Vec::new()
        });

    Json(json!({
        "success": true,
        "data": progress_report(&letters, progress, &recent),
    }))
    .into_response()
}

pub(super) fn make_report_routes(state: ServerState) -> Router {
    Router::new()
        .route("/pronunciation-feedback", get(get_feedback))
        .route("/pronunciation-progress", get(get_progress))
        .with_state(state)
}
