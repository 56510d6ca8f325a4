//! Document text extraction seam.
//!
//! Format parsing is delegated: deployments plug a [`TextExtractor`] backend
//! for PDF and DOCX, while plain text (and anything with an unknown
//! extension) is decoded permissively in-process. Page counts are heuristic
//! estimates in the same spirit as the formats themselves: text documents
//! estimate one page per forty lines, DOCX backends one page per twenty
//! paragraphs; PDF backends report real page counts.

use thiserror::Error;

/// Lines per estimated page for plain-text documents.
const LINES_PER_PAGE: usize = 40;

/// Declared document format, derived from the uploaded filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Portable Document Format.
    Pdf,
    /// Office Open XML word-processing document.
    Docx,
    /// Plain text, including every unrecognized extension.
    Text,
}

impl DocumentKind {
    /// Classify a filename by extension; unknown extensions are plain text.
    pub fn from_filename(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.ends_with(".pdf") {
            Self::Pdf
        } else if lower.ends_with(".docx") || lower.ends_with(".doc") {
            Self::Docx
        } else {
            Self::Text
        }
    }
}

/// Text and page estimate produced from one uploaded document.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// Full extracted plain text.
    pub text: String,
    /// Approximate page count; at least 1 for any document.
    pub approx_pages: usize,
}

/// Errors raised by extraction backends.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The configured backend cannot handle the declared format.
    #[error("no extraction backend configured for {kind:?} documents")]
    UnsupportedFormat {
        /// Format the caller declared.
        kind: DocumentKind,
    },
    /// The backend failed while parsing the document.
    #[error("failed to extract document text: {0}")]
    Backend(String),
}

/// Interface implemented by document extraction backends.
pub trait TextExtractor: Send + Sync {
    /// Turn raw uploaded bytes into plain text and a page estimate.
    fn extract(&self, bytes: &[u8], kind: DocumentKind)
    -> Result<ExtractedDocument, ExtractionError>;
}

/// Built-in extractor for plain-text uploads.
///
/// Decodes permissively (invalid byte sequences are replaced, never fatal)
/// and rejects binary formats, which require an external backend.
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(
        &self,
        bytes: &[u8],
        kind: DocumentKind,
    ) -> Result<ExtractedDocument, ExtractionError> {
        match kind {
            DocumentKind::Text => {
                let text = String::from_utf8_lossy(bytes).into_owned();
                let approx_pages = text.lines().count() / LINES_PER_PAGE + 1;
                Ok(ExtractedDocument { text, approx_pages })
            }
            kind => Err(ExtractionError::UnsupportedFormat { kind }),
        }
    }
}
