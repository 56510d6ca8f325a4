//! Document analysis pipeline.

/// Character-budget chunking with natural-boundary preference.
pub mod chunking;
/// Document text extraction seam.
pub mod extract;
/// Heuristic document language detection.
pub mod language;
/// Legal-analysis prompt template rendering.
pub mod prompt;
mod service;
mod types;

pub use service::{AnalysisApi, AnalysisService};
pub use types::{AnalysisError, AnalysisOutcome, AnalysisRequest, Document};
