//! Free-text notes matching endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{MatchNotesRequest, NotesResponse};

/// POST /match-notes - match plain-text notes to previous year questions
pub async fn match_notes(
    State(state): State<AppState>,
    payload: std::result::Result<Json<MatchNotesRequest>, JsonRejection>,
) -> Result<Json<NotesResponse>> {
    let Json(request) = payload?;
    if request.text.trim().is_empty() {
        return Err(Error::invalid_input("Notes text is empty"));
    }
    if request.max_sentences == Some(0) {
        return Err(Error::invalid_input("max_sentences must be at least 1"));
    }

    let subject = request.subject.as_deref().unwrap_or("");
    tracing::info!(
        "Matching {} bytes of notes (subject: {:?})",
        request.text.len(),
        subject
    );

    let chunks = state
        .pipeline()
        .match_notes(&request.text, subject, request.max_sentences)
        .await;

    Ok(Json(NotesResponse {
        success: true,
        chunks,
    }))
}
