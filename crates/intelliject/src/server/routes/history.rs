//! Upload history endpoint

use axum::{extract::State, Json};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{HistoryItem, HistoryResponse};

/// GET /history - uploaded PDFs, newest first
pub async fn get_history(State(state): State<AppState>) -> Result<Json<HistoryResponse>> {
    let store = state.store().clone();
    let uploads = tokio::task::spawn_blocking(move || store.list_uploads()).await??;

    Ok(Json(HistoryResponse {
        success: true,
        history: uploads.iter().map(HistoryItem::from).collect(),
    }))
}
