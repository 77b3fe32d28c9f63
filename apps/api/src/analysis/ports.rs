//! Capability traits for the three external collaborators of the analysis
//! pipeline. Production adapters live in `extractor`, `store` and
//! `llm_client`; tests substitute in-memory fakes.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::resume::ResumeRecord;

// ────────────────────────────────────────────────────────────────────────────
// Text extraction
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Error)]
pub enum ExtractionFailure {
    #[error("malformed document: {0}")]
    Malformed(String),

    /// The extractor itself crashed (e.g. a panic inside the PDF library).
    #[error("extraction aborted: {0}")]
    Aborted(String),
}

/// Turns raw document bytes into plain text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionFailure>;
}

// ────────────────────────────────────────────────────────────────────────────
// AI completion
// ────────────────────────────────────────────────────────────────────────────

/// One candidate completion. `content` is `None` when the remote omitted it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    pub candidates: Vec<Candidate>,
}

impl Completion {
    /// Content of the first candidate, if it is present and non-empty.
    pub fn first_content(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_deref())
            .filter(|content| !content.is_empty())
    }
}

/// A failed completion call.
///
/// `status` is the remote HTTP status when a response was received; `code` is
/// a remote or transport error code when one is known.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AiServiceFailure {
    pub status: Option<u16>,
    pub code: Option<String>,
    pub message: String,
}

#[async_trait]
pub trait AiAnalyzer: Send + Sync {
    /// Sends `prompt` as a single user message. When `expect_json` is set the
    /// remote is asked to answer with a JSON object.
    async fn complete(&self, prompt: &str, expect_json: bool)
        -> Result<Completion, AiServiceFailure>;
}

// ────────────────────────────────────────────────────────────────────────────
// Persistence
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Error)]
pub enum StoreFailure {
    #[error("record rejected: {0}")]
    Validation(String),

    #[error("store unavailable: {0}")]
    Connection(String),

    #[error("store error: {0}")]
    Other(String),
}

#[async_trait]
pub trait ResumeStore: Send + Sync {
    async fn insert(&self, record: &ResumeRecord) -> Result<(), StoreFailure>;
}
