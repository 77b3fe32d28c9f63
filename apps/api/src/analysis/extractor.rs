use async_trait::async_trait;

use crate::analysis::ports::{ExtractionFailure, TextExtractor};

/// `pdf-extract` backed extractor. Parsing is CPU-bound, so it runs on the
/// blocking pool; a panic inside the library surfaces as `Aborted`.
pub struct PdfTextExtractor;

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionFailure> {
        let owned = bytes.to_vec();

        tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&owned))
            .await
            .map_err(|e| ExtractionFailure::Aborted(e.to_string()))?
            .map_err(|e| ExtractionFailure::Malformed(e.to_string()))
    }
}
