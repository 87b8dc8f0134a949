use super::state::{GuardedLetterTable, ServerState};
use crate::letters::LetterPattern;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

async fn get_letters(State(letters): State<GuardedLetterTable>) -> Json<Vec<LetterPattern>> {
    Json(letters.iter().cloned().collect())
}

async fn get_letter(State(letters): State<GuardedLetterTable>, Path(id): Path<u32>) -> Response {
    match letters.get(id) {
        Some(pattern) => Json(pattern).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub(super) fn make_letter_routes(state: ServerState) -> Router {
    Router::new()
        .route("/letters", get(get_letters))
        .route("/letters/{id}", get(get_letter))
        .with_state(state)
}
