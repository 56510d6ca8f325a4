//! Error taxonomy and request parameters for the inference client.

use reqwest::StatusCode;
use thiserror::Error;

/// Maximum response body length carried in diagnostics.
pub(crate) const BODY_SNIPPET_LIMIT: usize = 400;

/// Errors surfaced by the inference client.
///
/// Hard failures ([`InferenceError::is_hard`]) cannot be fixed by retrying
/// and abort multi-chunk aggregation immediately; everything else is either
/// retried internally or reported once the retry budget runs out.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// No bearer token is configured; no network call was made.
    #[error("no inference API token configured")]
    MissingCredential,
    /// The endpoint rejected the configured credential.
    #[error("inference endpoint rejected the credential (HTTP {status})")]
    AuthenticationFailed {
        /// Status returned by the endpoint (401 or 403).
        status: StatusCode,
    },
    /// The requested model does not exist on the endpoint.
    #[error("model '{model}' not found on the inference endpoint")]
    ModelNotFound {
        /// Model identifier that was requested.
        model: String,
    },
    /// The endpoint returned an unexpected non-success status.
    #[error("inference endpoint returned HTTP {status}: {body}")]
    UpstreamError {
        /// Status returned by the endpoint.
        status: StatusCode,
        /// Truncated response body kept for diagnostics.
        body: String,
    },
    /// The response parsed as JSON but matched none of the known shapes.
    #[error("unrecognized inference response schema: {0}")]
    UnrecognizedSchema(String),
    /// The request failed at the network level on every attempt.
    #[error("network error reaching the inference endpoint: {0}")]
    Network(String),
    /// The endpoint kept throttling or loading past the attempt ceiling.
    #[error("inference retries exhausted after {attempts} attempts")]
    RetriesExhausted {
        /// Number of attempts made before giving up.
        attempts: usize,
    },
}

impl InferenceError {
    /// Whether retrying (or falling back to another model) cannot help.
    pub fn is_hard(&self) -> bool {
        matches!(
            self,
            Self::MissingCredential | Self::AuthenticationFailed { .. } | Self::ModelNotFound { .. }
        )
    }
}

/// Generation parameters forwarded to the endpoint per request.
#[derive(Debug, Clone, Copy)]
pub struct GenerationParams {
    /// Maximum number of new tokens the model may produce.
    pub max_new_tokens: u32,
}

/// Truncate a response body for inclusion in error diagnostics.
pub(crate) fn body_snippet(body: &str) -> String {
    if body.len() <= BODY_SNIPPET_LIMIT {
        return body.to_string();
    }
    let mut end = BODY_SNIPPET_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &body[..end])
}
