//! API routes for the IntelliJect server

pub mod history;
pub mod notes;
pub mod pdf;

use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::error::Result;
use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/history", get(history::get_history))
        // PDF uploads get the configured body limit
        .route(
            "/upload-pdf",
            post(pdf::upload_pdf).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route(
            "/process-pdf",
            post(pdf::process_pdf).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/match-notes", post(notes::match_notes))
        .route("/api/info", get(info))
}

/// GET / - liveness message for the front end
async fn root() -> Json<Value> {
    Json(json!({ "message": "IntelliJect API is running" }))
}

/// GET /api/info - service, backend and store summary
async fn info(State(state): State<AppState>) -> Result<Json<Value>> {
    let store = state.store().clone();
    let (stats, subjects) =
        tokio::task::spawn_blocking(move || -> Result<_> { Ok((store.stats()?, store.subjects()?)) })
            .await??;
    let config = state.config();

    Ok(Json(json!({
        "name": "intelliject",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Matches study-note pages to previous year exam questions and highlights the answers",
        "backend": config.backend,
        "providers": {
            "generation": {
                "name": state.llm_provider().name(),
                "model": config.generation_model(),
            },
            "embedding": {
                "name": state.embedding_provider().name(),
                "model": config.embedding_model(),
            },
        },
        "renderer": state.pipeline().renderer().name(),
        "store": stats,
        "subjects": subjects,
        "endpoints": {
            "GET /history": "List uploaded PDFs, newest first",
            "POST /upload-pdf": "Upload a PDF (multipart: file, subject) and count its chunks",
            "POST /process-pdf": "Match every page of a PDF to previous year questions",
            "POST /match-notes": "Match free-text notes to previous year questions",
            "GET /api/info": "This document"
        }
    })))
}
