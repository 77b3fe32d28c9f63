use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Error returned by the resume analysis pipeline.
///
/// Every variant renders a fixed, user-safe message. The variant is chosen
/// where the failure happens; nothing downstream inspects message text.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AnalysisError>`.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),

    #[error("Error reading file: {path}.")]
    Io { path: String },

    #[error("Error parsing PDF file. Please ensure it is a valid PDF.")]
    Extraction,

    #[error(transparent)]
    AiService(#[from] AiServiceError),

    #[error("Error processing AI response. Could not parse analysis data.")]
    Parse,

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The detail is logged, never rendered.
    #[error("An unexpected error occurred during resume analysis. Please check logs for details.")]
    Unexpected(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInput {
    #[error("Name and email are required.")]
    MissingIdentity,

    #[error("resumeData is required.")]
    MissingResumeData,

    #[error("Either filePath or text must be provided in resumeData.")]
    MissingSource,

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Extracted resume text is empty.")]
    EmptyText,

    #[error("Invalid request body.")]
    MalformedRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AiServiceError {
    #[error("Error communicating with AI service (Status: {0}). Please try again later.")]
    Status(u16),

    #[error("Error communicating with AI service (Code: {0}). Please try again later.")]
    Code(String),

    #[error("Error communicating with AI service. Please try again later.")]
    Unavailable,

    #[error("Invalid response structure from AI service.")]
    InvalidResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("Error saving analysis results: Validation failed. {0}")]
    Validation(String),

    #[error("Error saving analysis results: Database connection error.")]
    Connection,

    #[error("Error saving analysis results. Please try again later.")]
    Other,
}

impl AnalysisError {
    /// Short label used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::InvalidInput(_) => "invalid_input",
            AnalysisError::Io { .. } => "io",
            AnalysisError::Extraction => "extraction",
            AnalysisError::AiService(_) => "ai_service",
            AnalysisError::Parse => "parse",
            AnalysisError::Storage(_) => "storage",
            AnalysisError::Unexpected(_) => "unexpected",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AnalysisError::InvalidInput(_)
            | AnalysisError::Extraction
            | AnalysisError::Storage(StorageError::Validation(_)) => StatusCode::BAD_REQUEST,
            AnalysisError::AiService(_) | AnalysisError::Parse => StatusCode::BAD_GATEWAY,
            AnalysisError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
            AnalysisError::Io { .. } | AnalysisError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        if let AnalysisError::Unexpected(detail) = &self {
            tracing::error!("Unexpected error: {detail}");
        }

        let body = Json(json!({ "error": self.to_string() }));

        (self.status_code(), body).into_response()
    }
}
