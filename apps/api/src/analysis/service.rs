//! Resume analysis pipeline: validate → acquire text → prompt → AI call →
//! parse → persist.
//!
//! Every stage converts its own failure into an [`AnalysisError`] variant and
//! logs the underlying cause. No stage retries.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info};

use crate::analysis::ports::{
    AiAnalyzer, AiServiceFailure, ExtractionFailure, ResumeStore, StoreFailure, TextExtractor,
};
use crate::analysis::prompts::build_analysis_prompt;
use crate::analysis::request::{AnalysisRequest, ResumeSource, ValidatedRequest};
use crate::errors::{AiServiceError, AnalysisError, InvalidInput, StorageError};
use crate::llm_client::strip_json_fences;
use crate::models::resume::{AnalysisResult, ResumeRecord};

/// Runs one resume through extraction, AI analysis and persistence.
/// Holds no per-request state, so one instance is shared by all handlers.
pub struct ResumeAnalyzer {
    extractor: Arc<dyn TextExtractor>,
    ai: Arc<dyn AiAnalyzer>,
    store: Arc<dyn ResumeStore>,
}

impl ResumeAnalyzer {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        ai: Arc<dyn AiAnalyzer>,
        store: Arc<dyn ResumeStore>,
    ) -> Self {
        Self {
            extractor,
            ai,
            store,
        }
    }

    pub async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        let result = self.run(request).await;
        if let Err(err) = &result {
            error!("Resume analysis failed ({}): {err:?}", err.kind());
        }
        result
    }

    async fn run(&self, request: AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        let ValidatedRequest {
            name,
            email,
            source,
        } = request.validate()?;

        let resume_text = self.acquire_text(&source).await?;
        if resume_text.trim().is_empty() {
            return Err(InvalidInput::EmptyText.into());
        }

        let prompt = build_analysis_prompt(&resume_text);
        let completion = self.ai.complete(&prompt, true).await.map_err(|failure| {
            error!(
                status = ?failure.status,
                code = ?failure.code,
                "AI completion call failed: {failure}"
            );
            AnalysisError::from(classify_ai_failure(&failure))
        })?;

        let content = completion.first_content().ok_or_else(|| {
            error!("Invalid response structure from AI service: {completion:?}");
            AnalysisError::from(AiServiceError::InvalidResponse)
        })?;

        let (analysis, full_analysis) = parse_analysis(content)?;
        debug!(skills = analysis.skills.len(), "AI analysis parsed");

        let record = ResumeRecord::new(name, email, &analysis, resume_text, full_analysis);
        self.store.insert(&record).await.map_err(|failure| {
            error!("Database save error: {failure}");
            AnalysisError::from(classify_store_failure(failure))
        })?;

        info!(email = %record.email, "Resume analyzed and saved");
        Ok(analysis)
    }

    async fn acquire_text(&self, source: &ResumeSource) -> Result<String, AnalysisError> {
        match source {
            ResumeSource::Text(text) => Ok(text.clone()),
            ResumeSource::FilePath(path) => self.extract_file(path).await,
        }
    }

    async fn extract_file(&self, path: &Path) -> Result<String, AnalysisError> {
        let shown = path.display().to_string();

        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(InvalidInput::FileNotFound(shown).into());
        }

        let bytes = tokio::fs::read(path).await.map_err(|e| {
            error!("Error reading file {shown}: {e}");
            AnalysisError::Io {
                path: shown.clone(),
            }
        })?;

        self.extractor
            .extract(&bytes)
            .await
            .map_err(|failure| match failure {
                ExtractionFailure::Malformed(detail) => {
                    error!("Error parsing PDF {shown}: {detail}");
                    AnalysisError::Extraction
                }
                ExtractionFailure::Aborted(detail) => AnalysisError::Unexpected(detail),
            })
    }
}

/// Status beats code beats the generic message.
fn classify_ai_failure(failure: &AiServiceFailure) -> AiServiceError {
    match (failure.status, &failure.code) {
        (Some(status), _) => AiServiceError::Status(status),
        (None, Some(code)) => AiServiceError::Code(code.clone()),
        (None, None) => AiServiceError::Unavailable,
    }
}

fn classify_store_failure(failure: StoreFailure) -> StorageError {
    match failure {
        StoreFailure::Validation(detail) => StorageError::Validation(detail),
        StoreFailure::Connection(_) => StorageError::Connection,
        StoreFailure::Other(_) => StorageError::Other,
    }
}

/// Parses completion text into the typed result plus the raw JSON document.
/// Only text that is not JSON at all is an error; the shape is read loosely.
fn parse_analysis(content: &str) -> Result<(AnalysisResult, Value), AnalysisError> {
    let document: Value = serde_json::from_str(strip_json_fences(content)).map_err(|e| {
        error!("Error parsing JSON response from AI service: {e}");
        error!("AI response string for parsing: {content}");
        AnalysisError::Parse
    })?;

    let analysis = AnalysisResult::from_document(&document);
    Ok((analysis, document))
}
