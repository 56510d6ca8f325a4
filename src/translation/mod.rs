//! Machine translation for Arabic documents and analysis results.
//!
//! Translation is optional: when no translator credentials are configured
//! the factory returns `None` and the pipeline passes text through
//! untranslated. A configured translator that fails at runtime degrades the
//! same way, with a warning, rather than failing the analysis.

use crate::config::Config;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by translation providers.
#[derive(Debug, Error)]
pub enum TranslationError {
    /// The provider was unreachable or returned an error response.
    #[error("translation request failed: {0}")]
    RequestFailed(String),
    /// The provider response could not be parsed.
    #[error("malformed translation response: {0}")]
    InvalidResponse(String),
}

/// Interface implemented by translation providers.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate text into the given ISO-639-1 target language.
    async fn translate(&self, text: &str, to_language: &str)
    -> Result<String, TranslationError>;
}

/// Build a translator from configuration, or `None` when credentials are
/// absent (callers treat that as a passthrough, never an error).
pub fn get_translator(config: &Config) -> Option<Box<dyn Translator>> {
    let key = config.translator_key.clone()?;
    let endpoint = config.translator_endpoint.clone()?;
    Some(Box::new(AzureTranslatorClient::new(
        endpoint,
        key,
        config.translator_region.clone(),
    )))
}

/// REST client for the Azure Translator text API (v3.0).
pub struct AzureTranslatorClient {
    http: Client,
    endpoint: String,
    key: String,
    region: Option<String>,
}

impl AzureTranslatorClient {
    /// Construct a client for the given endpoint and subscription key.
    pub fn new(endpoint: String, key: String, region: Option<String>) -> Self {
        let http = Client::builder()
            .user_agent(concat!("lexiscan/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to construct reqwest::Client for translation");
        Self {
            http,
            endpoint,
            key,
            region,
        }
    }

    fn translate_url(&self) -> String {
        format!(
            "{}/translate?api-version=3.0",
            self.endpoint.trim_end_matches('/')
        )
    }
}

#[derive(Debug, Deserialize)]
struct TranslateItem {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    text: String,
}

#[async_trait]
impl Translator for AzureTranslatorClient {
    async fn translate(
        &self,
        text: &str,
        to_language: &str,
    ) -> Result<String, TranslationError> {
        let mut request = self
            .http
            .post(self.translate_url())
            .query(&[("to", to_language)])
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .json(&json!([{ "Text": text }]));
        if let Some(region) = &self.region {
            request = request.header("Ocp-Apim-Subscription-Region", region);
        }

        let response = request
            .send()
            .await
            .map_err(|err| TranslationError::RequestFailed(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TranslationError::RequestFailed(format!(
                "translator returned {status}: {body}"
            )));
        }

        let items: Vec<TranslateItem> = response
            .json()
            .await
            .map_err(|err| TranslationError::InvalidResponse(err.to_string()))?;

        items
            .first()
            .and_then(|item| item.translations.first())
            .map(|translation| translation.text.clone())
            .ok_or_else(|| {
                TranslationError::InvalidResponse("response contained no translations".into())
            })
    }
}
