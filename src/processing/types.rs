//! Core data types and error definitions for the analysis pipeline.

use crate::inference::InferenceError;
use crate::processing::extract::ExtractionError;
use thiserror::Error;

/// Errors emitted by the document analysis pipeline.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Extraction backend failed or the format is unsupported.
    #[error("Failed to extract document text: {0}")]
    Extraction(#[from] ExtractionError),
    /// The inference endpoint reported a failure that aborted the analysis.
    #[error("Inference request failed: {0}")]
    Inference(#[from] InferenceError),
    /// The uploaded document contained no analyzable text.
    #[error("the document appears empty or unreadable")]
    EmptyDocument,
    /// The request payload could not be decoded.
    #[error("invalid request payload: {0}")]
    InvalidRequest(String),
}

/// Parameters supplied to the analysis pipeline.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    /// Optional jurisdiction scoping the analyst persona.
    pub jurisdiction: Option<String>,
    /// Skip the result cache for this request.
    pub bypass_cache: bool,
}

/// An uploaded document after text extraction.
///
/// Created once per upload and immutable afterwards; discarded when the
/// request completes.
#[derive(Debug, Clone)]
pub struct Document {
    /// Source filename as declared by the uploader.
    pub filename: String,
    /// Full extracted text.
    pub text: String,
    /// Heuristic page count from the extraction backend.
    pub approx_pages: usize,
    /// Detected language tag (`"ar"` or `"en"`).
    pub language: String,
}

/// Result of a completed analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    /// Aggregated analysis text across all chunks.
    pub analysis: String,
    /// Analysis translated back to the document language, when that
    /// language is not English.
    pub translated_analysis: Option<String>,
    /// Detected document language tag.
    pub language: String,
    /// Number of chunks submitted to the inference endpoint.
    pub chunk_count: usize,
    /// Chunks skipped after soft failures under the lenient policy.
    pub skipped_chunks: usize,
    /// Characters of (possibly translated) text that were analyzed.
    pub characters: usize,
    /// Page estimate, present when the input came from an uploaded file.
    pub approx_pages: Option<usize>,
}
