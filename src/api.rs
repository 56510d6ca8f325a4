//! HTTP surface for Lexiscan.
//!
//! This module exposes a compact Axum router with a handful of endpoints:
//!
//! - `POST /analyze` – Analyze raw contract text. Accepts an optional
//!   `jurisdiction` to scope the analyst persona and a `bypass_cache` flag.
//! - `POST /analyze/document` – Analyze an uploaded document (base64 content
//!   plus the original filename); text is extracted before analysis.
//! - `POST /chat` – Answer a follow-up question given the chat transcript.
//! - `GET /metrics` – Observe analysis counters and cache activity.
//! - `GET /commands` – Machine-readable command catalog for quick discovery
//!   by tools/hosts.

use crate::chat::{ChatError, ChatMessage};
use crate::processing::{AnalysisApi, AnalysisError, AnalysisOutcome, AnalysisRequest};
use crate::processing::extract::ExtractionError;
use crate::inference::InferenceError;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Build the HTTP router exposing the analysis API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: AnalysisApi + 'static,
{
    Router::new()
        .route("/analyze", post(analyze_text::<S>))
        .route("/analyze/document", post(analyze_document::<S>))
        .route("/chat", post(chat::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .with_state(service)
}

/// Request body for the `POST /analyze` endpoint.
#[derive(Deserialize)]
struct AnalyzeTextRequest {
    /// Raw contract text to analyze.
    text: String,
    /// Optional source filename, recorded for traceability only.
    #[serde(default)]
    filename: Option<String>,
    /// Optional jurisdiction scoping the analyst persona.
    #[serde(default)]
    jurisdiction: Option<String>,
    /// Skip the result cache for this request.
    #[serde(default)]
    bypass_cache: bool,
}

/// Request body for the `POST /analyze/document` endpoint.
#[derive(Deserialize)]
struct AnalyzeDocumentRequest {
    /// Original filename, used to classify the document format.
    filename: String,
    /// Base64-encoded document bytes.
    content: String,
    #[serde(default)]
    jurisdiction: Option<String>,
    #[serde(default)]
    bypass_cache: bool,
}

/// Success response for both analysis endpoints.
#[derive(Serialize)]
struct AnalyzeResponse {
    /// Aggregated analysis text across all chunks.
    analysis: String,
    /// Analysis translated back to the document language, when applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    translated_analysis: Option<String>,
    /// Detected document language tag (`"ar"` or `"en"`).
    language: String,
    /// Number of chunks submitted for inference.
    chunk_count: usize,
    /// Chunks skipped after soft failures.
    skipped_chunks: usize,
    /// Characters of analyzed text.
    characters: usize,
    /// Page estimate, present for uploaded documents.
    #[serde(skip_serializing_if = "Option::is_none")]
    approx_pages: Option<usize>,
}

impl From<AnalysisOutcome> for AnalyzeResponse {
    fn from(outcome: AnalysisOutcome) -> Self {
        Self {
            analysis: outcome.analysis,
            translated_analysis: outcome.translated_analysis,
            language: outcome.language,
            chunk_count: outcome.chunk_count,
            skipped_chunks: outcome.skipped_chunks,
            characters: outcome.characters,
            approx_pages: outcome.approx_pages,
        }
    }
}

/// Analyze raw contract text.
async fn analyze_text<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<AnalyzeTextRequest>,
) -> Result<Json<AnalyzeResponse>, AppError>
where
    S: AnalysisApi,
{
    let AnalyzeTextRequest {
        text,
        filename,
        jurisdiction,
        bypass_cache,
    } = request;
    let outcome = service
        .analyze_text(
            text,
            AnalysisRequest {
                jurisdiction,
                bypass_cache,
            },
        )
        .await?;
    tracing::info!(
        filename = filename.as_deref().unwrap_or("<inline>"),
        chunks = outcome.chunk_count,
        skipped = outcome.skipped_chunks,
        language = %outcome.language,
        "Analyze request completed"
    );
    Ok(Json(outcome.into()))
}

/// Analyze an uploaded document after extracting its text.
async fn analyze_document<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<AnalyzeDocumentRequest>,
) -> Result<Json<AnalyzeResponse>, AppError>
where
    S: AnalysisApi,
{
    let AnalyzeDocumentRequest {
        filename,
        content,
        jurisdiction,
        bypass_cache,
    } = request;
    let bytes = BASE64.decode(content.as_bytes()).map_err(|_| {
        AppError::from(AnalysisError::InvalidRequest(
            "document content is not valid base64".into(),
        ))
    })?;
    let outcome = service
        .analyze_document(
            filename,
            bytes,
            AnalysisRequest {
                jurisdiction,
                bypass_cache,
            },
        )
        .await?;
    Ok(Json(outcome.into()))
}

/// Request body for the `POST /chat` endpoint.
#[derive(Deserialize)]
struct ChatRequest {
    /// Transcript of prior turns, oldest first.
    messages: Vec<ChatMessage>,
}

/// Response body for `POST /chat`.
#[derive(Serialize)]
struct ChatResponse {
    reply: String,
}

/// Answer a follow-up question against the chat completion service.
async fn chat<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError>
where
    S: AnalysisApi,
{
    let reply = service.chat_reply(request.messages).await?;
    Ok(Json(ChatResponse { reply }))
}

/// Return a concise metrics snapshot with analysis and cache counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<serde_json::Value>
where
    S: AnalysisApi,
{
    let snapshot = service.metrics_snapshot();
    Json(json!({
        "documents_analyzed": snapshot.documents_analyzed,
        "chunks_analyzed": snapshot.chunks_analyzed,
        "chunks_skipped": snapshot.chunks_skipped,
        "cache_hits": snapshot.cache_hits,
    }))
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery/UX in hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "analyze",
                method: "POST",
                path: "/analyze",
                description: "Analyze raw contract text chunk by chunk and return the aggregated analysis.",
                request_example: Some(json!({
                    "text": "This agreement is made between...",
                    "jurisdiction": "Qatar",
                    "bypass_cache": false
                })),
            },
            CommandDescriptor {
                name: "analyze_document",
                method: "POST",
                path: "/analyze/document",
                description: "Extract text from an uploaded document (base64 content) and analyze it.",
                request_example: Some(json!({
                    "filename": "lease.txt",
                    "content": "VGhpcyBhZ3JlZW1lbnQ...",
                    "jurisdiction": "Qatar"
                })),
            },
            CommandDescriptor {
                name: "chat",
                method: "POST",
                path: "/chat",
                description: "Answer a follow-up question about an analyzed contract.",
                request_example: Some(json!({
                    "messages": [
                        { "role": "user", "content": "What is the notice period?" }
                    ]
                })),
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return analysis counters useful for observability dashboards.",
                request_example: None,
            },
        ],
    })
}

enum AppError {
    Analysis(AnalysisError),
    Chat(ChatError),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Analysis(AnalysisError::InvalidRequest(_)) => StatusCode::BAD_REQUEST,
            Self::Analysis(AnalysisError::EmptyDocument) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Analysis(AnalysisError::Extraction(
                ExtractionError::UnsupportedFormat { .. },
            )) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Analysis(AnalysisError::Extraction(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Analysis(AnalysisError::Inference(InferenceError::MissingCredential))
            | Self::Chat(ChatError::MissingCredential) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Analysis(AnalysisError::Inference(_)) | Self::Chat(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Analysis(error) => error.to_string(),
            Self::Chat(error) => error.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        if status.is_server_error() {
            tracing::error!(%status, message, "Request failed");
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<AnalysisError> for AppError {
    fn from(inner: AnalysisError) -> Self {
        Self::Analysis(inner)
    }
}

impl From<ChatError> for AppError {
    fn from(inner: ChatError) -> Self {
        Self::Chat(inner)
    }
}
