//! Analysis service coordinating extraction, translation, chunking, and inference.

use crate::{
    cache::ResultCache,
    chat::{ChatClient, ChatError, ChatMessage},
    config::Config,
    inference::{GenerationParams, InferenceClient, InferenceError},
    metrics::{AnalysisMetrics, MetricsSnapshot},
    processing::{
        chunking::chunk_text,
        extract::{DocumentKind, PlainTextExtractor, TextExtractor},
        language::detect_language,
        prompt::build_analysis_prompt,
        types::{AnalysisError, AnalysisOutcome, AnalysisRequest, Document},
    },
    translation::{Translator, get_translator},
};
use async_trait::async_trait;
use std::sync::Arc;

const ANALYSIS_CACHE_NS: &str = "analysis";
const TRANSLATION_CACHE_NS: &str = "translation";

/// Coordinates the full analysis pipeline: extraction, language handling,
/// chunking, per-chunk inference with fallback, and aggregation.
///
/// The service owns long-lived handles to the inference client, translator,
/// chat client, result cache, and metrics registry. Construct it once near
/// process start and share it through an `Arc`.
pub struct AnalysisService {
    config: Arc<Config>,
    inference: InferenceClient,
    translator: Option<Box<dyn Translator>>,
    chat: ChatClient,
    extractor: Box<dyn TextExtractor>,
    cache: ResultCache,
    metrics: Arc<AnalysisMetrics>,
}

/// Abstraction over the analysis pipeline used by the HTTP surface.
#[async_trait]
pub trait AnalysisApi: Send + Sync {
    /// Analyze already-extracted contract text.
    async fn analyze_text(
        &self,
        text: String,
        request: AnalysisRequest,
    ) -> Result<AnalysisOutcome, AnalysisError>;

    /// Extract text from uploaded bytes, then analyze it.
    async fn analyze_document(
        &self,
        filename: String,
        bytes: Vec<u8>,
        request: AnalysisRequest,
    ) -> Result<AnalysisOutcome, AnalysisError>;

    /// Produce an assistant reply for a follow-up chat transcript.
    async fn chat_reply(&self, messages: Vec<ChatMessage>) -> Result<String, ChatError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl AnalysisService {
    /// Build a new analysis service from configuration.
    pub fn new(config: Arc<Config>) -> Result<Self, AnalysisError> {
        let inference = InferenceClient::new(&config)?;
        let translator = get_translator(&config);
        let chat = ChatClient::new(&config);
        Ok(Self::assemble(
            config,
            inference,
            translator,
            chat,
            Box::new(PlainTextExtractor),
        ))
    }

    /// Assemble a service from explicit components; used for tests and for
    /// deployments that plug a binary-format extraction backend.
    pub fn assemble(
        config: Arc<Config>,
        inference: InferenceClient,
        translator: Option<Box<dyn Translator>>,
        chat: ChatClient,
        extractor: Box<dyn TextExtractor>,
    ) -> Self {
        let cache = ResultCache::new(config.cache_capacity);
        Self {
            config,
            inference,
            translator,
            chat,
            extractor,
            cache,
            metrics: Arc::new(AnalysisMetrics::new()),
        }
    }

    /// Analyze already-extracted contract text.
    pub async fn analyze_text(
        &self,
        text: String,
        request: AnalysisRequest,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        self.analyze_inner(text, None, request).await
    }

    /// Extract text from an uploaded document, then analyze it.
    pub async fn analyze_document(
        &self,
        filename: String,
        bytes: Vec<u8>,
        request: AnalysisRequest,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        let kind = DocumentKind::from_filename(&filename);
        let extracted = self.extractor.extract(&bytes, kind)?;
        if extracted.text.trim().is_empty() {
            return Err(AnalysisError::EmptyDocument);
        }
        let document = Document {
            language: detect_language(&extracted.text).to_string(),
            filename,
            text: extracted.text,
            approx_pages: extracted.approx_pages,
        };
        tracing::info!(
            filename = %document.filename,
            pages = document.approx_pages,
            language = %document.language,
            "Document extracted"
        );
        self.analyze_inner(document.text, Some(document.approx_pages), request)
            .await
    }

    async fn analyze_inner(
        &self,
        text: String,
        approx_pages: Option<usize>,
        request: AnalysisRequest,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        let language = detect_language(&text).to_string();

        // Arabic documents are analyzed in English and the result carried back.
        let text = if language == "ar" {
            self.translate_lenient(&text, "en", request.bypass_cache).await
        } else {
            text
        };

        let (analysis, chunk_count, skipped) = self
            .aggregate_chunks(&text, request.jurisdiction.as_deref(), request.bypass_cache)
            .await?;

        let translated_analysis = if language == "ar" && self.translator.is_some() {
            Some(
                self.translate_lenient(&analysis, &language, request.bypass_cache)
                    .await,
            )
        } else {
            None
        };

        self.metrics
            .record_analysis(chunk_count as u64, skipped as u64);
        tracing::info!(
            chunks = chunk_count,
            skipped,
            language = %language,
            characters = text.len(),
            "Analysis completed"
        );

        Ok(AnalysisOutcome {
            analysis,
            translated_analysis,
            language,
            chunk_count,
            skipped_chunks: skipped,
            characters: text.chars().count(),
            approx_pages,
        })
    }

    /// Run every chunk through the inference endpoint, preserving order.
    ///
    /// Hard failures abort immediately: attributing a partial legal analysis
    /// is worse than producing none. Soft failures skip the chunk with a
    /// warning when the lenient policy is configured.
    async fn aggregate_chunks(
        &self,
        text: &str,
        jurisdiction: Option<&str>,
        bypass_cache: bool,
    ) -> Result<(String, usize, usize), AnalysisError> {
        let chunks: Vec<&str> = chunk_text(text, self.config.max_chunk_chars).collect();
        let labeled = chunks.len() > 1;
        let mut sections = Vec::with_capacity(chunks.len());
        let mut skipped = 0usize;

        for (index, chunk) in chunks.iter().enumerate() {
            let prompt = build_analysis_prompt(chunk, jurisdiction);
            match self.analyze_chunk(&prompt, bypass_cache).await {
                Ok(section) => {
                    if labeled {
                        sections.push(format!("--- Section {} ---\n{section}", index + 1));
                    } else {
                        sections.push(section);
                    }
                }
                Err(error) if error.is_hard() => {
                    tracing::error!(chunk = index + 1, error = %error, "Aborting analysis");
                    return Err(error.into());
                }
                Err(error) if self.config.continue_on_chunk_failure => {
                    tracing::warn!(chunk = index + 1, error = %error, "Skipping failed chunk");
                    skipped += 1;
                }
                Err(error) => return Err(error.into()),
            }
        }

        Ok((sections.join("\n\n"), chunks.len(), skipped))
    }

    /// Analyze one rendered prompt, consulting the cache and falling back to
    /// the secondary model when the primary fails entirely for this chunk.
    async fn analyze_chunk(
        &self,
        prompt: &str,
        bypass_cache: bool,
    ) -> Result<String, InferenceError> {
        let model = self.config.hf_model_id.as_str();
        if !bypass_cache {
            if let Some(cached) = self.cache.get(ANALYSIS_CACHE_NS, model, prompt) {
                self.metrics.record_cache_hit();
                return Ok(cached);
            }
        }

        let params = GenerationParams {
            max_new_tokens: self.config.max_new_tokens,
        };

        let primary = self.inference.generate(model, prompt, params).await;
        let (section, produced_by) = match primary {
            Ok(section) => (section, model),
            // Credential problems apply to every model; fallback cannot help.
            Err(error @ (InferenceError::MissingCredential
            | InferenceError::AuthenticationFailed { .. })) => return Err(error),
            Err(error) => match self.config.hf_fallback_model_id.as_deref() {
                Some(fallback) => {
                    tracing::warn!(
                        model,
                        fallback,
                        error = %error,
                        "Primary model failed; trying fallback"
                    );
                    if !bypass_cache {
                        if let Some(cached) = self.cache.get(ANALYSIS_CACHE_NS, fallback, prompt) {
                            self.metrics.record_cache_hit();
                            return Ok(cached);
                        }
                    }
                    let section = self.inference.generate(fallback, prompt, params).await?;
                    (section, fallback)
                }
                None => return Err(error),
            },
        };

        self.cache
            .insert(ANALYSIS_CACHE_NS, produced_by, prompt, section.clone());
        Ok(section)
    }

    /// Translate text, degrading to the untranslated input when no
    /// translator is configured or the provider fails.
    async fn translate_lenient(&self, text: &str, to_language: &str, bypass_cache: bool) -> String {
        let Some(translator) = self.translator.as_deref() else {
            return text.to_string();
        };

        if !bypass_cache {
            if let Some(cached) = self.cache.get(TRANSLATION_CACHE_NS, to_language, text) {
                self.metrics.record_cache_hit();
                return cached;
            }
        }

        match translator.translate(text, to_language).await {
            Ok(translated) => {
                self.cache
                    .insert(TRANSLATION_CACHE_NS, to_language, text, translated.clone());
                translated
            }
            Err(error) => {
                tracing::warn!(to_language, error = %error, "Translation failed; using original text");
                text.to_string()
            }
        }
    }

    /// Produce an assistant reply for a follow-up chat transcript.
    pub async fn chat_reply(&self, messages: Vec<ChatMessage>) -> Result<String, ChatError> {
        self.chat.reply(&messages).await
    }

    /// Return the current analysis metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[async_trait]
impl AnalysisApi for AnalysisService {
    async fn analyze_text(
        &self,
        text: String,
        request: AnalysisRequest,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        AnalysisService::analyze_text(self, text, request).await
    }

    async fn analyze_document(
        &self,
        filename: String,
        bytes: Vec<u8>,
        request: AnalysisRequest,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        AnalysisService::analyze_document(self, filename, bytes, request).await
    }

    async fn chat_reply(&self, messages: Vec<ChatMessage>) -> Result<String, ChatError> {
        AnalysisService::chat_reply(self, messages).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        AnalysisService::metrics_snapshot(self)
    }
}
