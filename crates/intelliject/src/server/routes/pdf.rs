//! PDF upload and processing endpoints

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use std::sync::Arc;
use std::time::Instant;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{PdfResponse, ProcessedPdfResponse};

/// A PDF upload with its subject
#[derive(Debug)]
pub struct PdfUpload {
    pub filename: String,
    pub subject: String,
    pub data: Arc<[u8]>,
}

fn is_pdf_filename(filename: &str) -> bool {
    filename.to_ascii_lowercase().ends_with(".pdf")
}

/// Read the `file` and `subject` fields of a PDF upload form
async fn read_pdf_upload(mut multipart: Multipart) -> Result<PdfUpload> {
    let mut file: Option<(String, Arc<[u8]>)> = None;
    let mut subject: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::invalid_input(format!("Failed to read multipart field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("").to_string();
                if !is_pdf_filename(&filename) {
                    return Err(Error::invalid_input("Only PDF files are allowed"));
                }
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| Error::invalid_input(format!("Failed to read file: {}", e)))?;
                file = Some((filename, Arc::from(data.as_ref())));
            }
            "subject" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| Error::invalid_input(format!("Failed to read subject: {}", e)))?;
                subject = Some(text.trim().to_string());
            }
            other => {
                tracing::debug!("Ignoring multipart field {:?}", other);
            }
        }
    }

    let (filename, data) = file.ok_or_else(|| Error::invalid_input("Missing form field: file"))?;
    let subject = subject.ok_or_else(|| Error::invalid_input("Missing form field: subject"))?;

    Ok(PdfUpload {
        filename,
        subject,
        data,
    })
}

/// POST /upload-pdf - record the upload and count its chunks
pub async fn upload_pdf(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<PdfResponse>> {
    let upload = read_pdf_upload(multipart?).await?;
    tracing::info!(
        "Upload: {} ({} bytes, subject: {:?})",
        upload.filename,
        upload.data.len(),
        upload.subject
    );

    let store = state.store().clone();
    let (filename, subject) = (upload.filename.clone(), upload.subject.clone());
    tokio::task::spawn_blocking(move || store.record_upload(&filename, &subject)).await??;

    let chunks = state.pipeline().page_texts(upload.data).await?;
    if chunks.is_empty() {
        return Err(Error::NoContent);
    }

    Ok(Json(PdfResponse {
        success: true,
        message: format!("PDF '{}' uploaded successfully", upload.filename),
        chunks_count: chunks.len(),
    }))
}

/// POST /process-pdf - match every page and return highlighted results
pub async fn process_pdf(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<ProcessedPdfResponse>> {
    let start = Instant::now();
    let upload = read_pdf_upload(multipart?).await?;
    tracing::info!(
        "Processing {} ({} bytes, subject: {:?})",
        upload.filename,
        upload.data.len(),
        upload.subject
    );

    let chunk_data = state
        .pipeline()
        .process_pdf(upload.data, &upload.subject)
        .await?;

    tracing::info!(
        "Processed {} chunk(s) of {} in {:?}",
        chunk_data.len(),
        upload.filename,
        start.elapsed()
    );

    Ok(Json(ProcessedPdfResponse {
        success: true,
        message: "PDF processed successfully".to_string(),
        total_chunks: chunk_data.len(),
        chunk_data,
    }))
}
