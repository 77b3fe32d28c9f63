//! Axum route handlers for the resume analysis API.

use std::path::Path;

use axum::{
    extract::{multipart::Field, rejection::JsonRejection, Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::analysis::request::{AnalysisRequest, ResumeData};
use crate::errors::{AnalysisError, InvalidInput};
use crate::models::resume::AnalysisResult;
use crate::state::AppState;

pub const SUCCESS_MESSAGE: &str = "Resume analyzed and saved successfully";

/// Multipart field carrying the PDF.
const RESUME_FIELD: &str = "resume";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResumeRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub resume_text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub message: &'static str,
    pub data: AnalysisResult,
}

impl AnalysisResponse {
    fn new(data: AnalysisResult) -> Self {
        Self {
            message: SUCCESS_MESSAGE,
            data,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/resume
///
/// Analyzes inline resume text.
pub async fn handle_submit_text(
    State(state): State<AppState>,
    payload: Result<Json<SubmitResumeRequest>, JsonRejection>,
) -> Result<Json<AnalysisResponse>, AnalysisError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected resume submission body: {}", rejection.body_text());
        InvalidInput::MalformedRequest
    })?;

    let data = state
        .analyzer
        .analyze(AnalysisRequest {
            name: request.name,
            email: request.email,
            resume_data: Some(ResumeData {
                file_path: None,
                text: request.resume_text,
            }),
        })
        .await?;

    Ok(Json(AnalysisResponse::new(data)))
}

/// POST /api/resume/upload
///
/// Accepts a multipart form with a `resume` PDF part plus `name` and `email`
/// fields. A `resumeText` field is used when no file part is sent. The upload
/// is spooled to a temp file that is removed once the request finishes.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisResponse>, AnalysisError> {
    let mut request = SubmitResumeRequest::default();
    let mut upload: Option<NamedTempFile> = None;

    while let Some(mut field) = multipart.next_field().await.map_err(malformed)? {
        let field_name = field.name().map(str::to_owned);
        match field_name.as_deref() {
            Some(RESUME_FIELD) => {
                // An empty file input still sends the part, with no filename.
                if field.file_name() == Some("") {
                    continue;
                }
                upload = spool_upload(&mut field, &state.config.upload_dir).await?;
            }
            Some("name") => request.name = Some(field.text().await.map_err(malformed)?),
            Some("email") => request.email = Some(field.text().await.map_err(malformed)?),
            Some("resumeText") => {
                request.resume_text = Some(field.text().await.map_err(malformed)?)
            }
            _ => {}
        }
    }

    let file_path = upload.as_ref().map(|file| file.path().display().to_string());
    if let Some(path) = &file_path {
        info!("Received resume upload at {path}");
    }

    let data = state
        .analyzer
        .analyze(AnalysisRequest {
            name: request.name,
            email: request.email,
            resume_data: Some(ResumeData {
                file_path,
                text: request.resume_text,
            }),
        })
        .await?;

    Ok(Json(AnalysisResponse::new(data)))
}

fn malformed(err: axum::extract::multipart::MultipartError) -> AnalysisError {
    warn!("Rejected multipart upload: {}", err.body_text());
    InvalidInput::MalformedRequest.into()
}

/// Streams one multipart part into a fresh temp file under `dir`. A part with
/// no bytes yields `None` and leaves nothing behind.
async fn spool_upload(
    field: &mut Field<'_>,
    dir: &Path,
) -> Result<Option<NamedTempFile>, AnalysisError> {
    let unexpected = |e: std::io::Error| AnalysisError::Unexpected(format!("upload spool: {e}"));

    tokio::fs::create_dir_all(dir).await.map_err(unexpected)?;
    let temp = tempfile::Builder::new()
        .prefix("resume-")
        .suffix(".pdf")
        .tempfile_in(dir)
        .map_err(unexpected)?;

    let mut file = tokio::fs::File::from_std(temp.reopen().map_err(unexpected)?);
    let mut written = 0usize;
    while let Some(chunk) = next_chunk(field).await? {
        file.write_all(&chunk).await.map_err(unexpected)?;
        written += chunk.len();
    }
    file.flush().await.map_err(unexpected)?;

    Ok((written > 0).then_some(temp))
}

async fn next_chunk(field: &mut Field<'_>) -> Result<Option<Bytes>, AnalysisError> {
    field.chunk().await.map_err(malformed)
}
