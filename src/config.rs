use serde::Deserialize;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Default Hugging Face inference host used when `HF_API_URL` is unset.
pub const DEFAULT_HF_API_URL: &str = "https://api-inference.huggingface.co";
/// Default analysis model used when `HF_MODEL_ID` is unset.
pub const DEFAULT_HF_MODEL_ID: &str = "meta-llama/Llama-3.2-3B-Instruct";
/// Default OpenAI-compatible base URL for the chat endpoint.
pub const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1";
/// Default chat model for follow-up questions.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

const DEFAULT_MAX_CHUNK_CHARS: usize = 4000;
const DEFAULT_MAX_NEW_TOKENS: u32 = 1024;
const DEFAULT_RETRY_MAX_ATTEMPTS: usize = 4;
const DEFAULT_RETRY_BASE_BACKOFF_SECS: u64 = 3;
const DEFAULT_CACHE_CAPACITY: usize = 128;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the Lexiscan server.
///
/// Constructed once at startup and passed by reference into the analysis
/// pipeline; tests build it directly to substitute fake endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the text-generation inference host.
    pub hf_api_url: String,
    /// Primary analysis model identifier.
    pub hf_model_id: String,
    /// Optional secondary model tried when the primary fails for a chunk.
    pub hf_fallback_model_id: Option<String>,
    /// Bearer credential for the inference host. Absent means every
    /// inference call fails fast without touching the network.
    pub hf_token: Option<String>,
    /// API key for the conversational completion service.
    pub openai_api_key: Option<String>,
    /// Base URL for the conversational completion service.
    pub openai_api_url: String,
    /// Chat model used for follow-up questions.
    pub chat_model: String,
    /// Subscription key for the translation service.
    pub translator_key: Option<String>,
    /// Endpoint for the translation service.
    pub translator_endpoint: Option<String>,
    /// Region header value for the translation service.
    pub translator_region: Option<String>,
    /// Maximum characters per analysis chunk.
    pub max_chunk_chars: usize,
    /// Generation budget forwarded to the inference endpoint.
    pub max_new_tokens: u32,
    /// Retry attempt ceiling for transient inference failures.
    pub retry_max_attempts: usize,
    /// Base backoff applied to throttled requests, doubling per attempt.
    pub retry_base_backoff: Duration,
    /// Whether per-chunk soft failures are skipped instead of aborting.
    pub continue_on_chunk_failure: bool,
    /// Capacity of the bounded inference/translation result cache.
    pub cache_capacity: usize,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
    /// Optional log file path; unset falls back to `logs/lexiscan.log`.
    pub log_file: Option<String>,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            hf_api_url: load_env_or("HF_API_URL", DEFAULT_HF_API_URL),
            hf_model_id: load_env_or("HF_MODEL_ID", DEFAULT_HF_MODEL_ID),
            hf_fallback_model_id: load_env_optional("HF_FALLBACK_MODEL_ID"),
            hf_token: load_env_optional("HF_TOKEN"),
            openai_api_key: load_env_optional("OPENAI_API_KEY"),
            openai_api_url: load_env_or("OPENAI_API_URL", DEFAULT_OPENAI_API_URL),
            chat_model: load_env_or("CHAT_MODEL", DEFAULT_CHAT_MODEL),
            translator_key: load_env_optional("AZURE_TRANSLATOR_KEY"),
            translator_endpoint: load_env_optional("AZURE_TRANSLATOR_ENDPOINT"),
            translator_region: load_env_optional("AZURE_TRANSLATOR_REGION"),
            max_chunk_chars: parse_env_or("MAX_CHUNK_CHARS", DEFAULT_MAX_CHUNK_CHARS)?,
            max_new_tokens: parse_env_or("MAX_NEW_TOKENS", DEFAULT_MAX_NEW_TOKENS)?,
            retry_max_attempts: parse_env_or("RETRY_MAX_ATTEMPTS", DEFAULT_RETRY_MAX_ATTEMPTS)?,
            retry_base_backoff: Duration::from_secs(parse_env_or(
                "RETRY_BASE_BACKOFF_SECS",
                DEFAULT_RETRY_BASE_BACKOFF_SECS,
            )?),
            continue_on_chunk_failure: parse_env_or("CONTINUE_ON_CHUNK_FAILURE", true)?,
            cache_capacity: parse_env_or("CACHE_CAPACITY", DEFAULT_CACHE_CAPACITY)?,
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
            log_file: load_env_optional("LEXISCAN_LOG_FILE"),
        })
    }

    /// Load `.env` (when present) and then read configuration from the environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }
}

fn load_env_or(key: &str, default: &str) -> String {
    load_env_optional(key).unwrap_or_else(|| default.to_string())
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match load_env_optional(key) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration pointed at nothing in particular, for unit tests.
#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        hf_api_url: "http://127.0.0.1:0".into(),
        hf_model_id: "test-model".into(),
        hf_fallback_model_id: None,
        hf_token: Some("token".into()),
        openai_api_key: None,
        openai_api_url: DEFAULT_OPENAI_API_URL.into(),
        chat_model: DEFAULT_CHAT_MODEL.into(),
        translator_key: None,
        translator_endpoint: None,
        translator_region: None,
        max_chunk_chars: 4000,
        max_new_tokens: 256,
        retry_max_attempts: 4,
        retry_base_backoff: Duration::from_millis(10),
        continue_on_chunk_failure: true,
        cache_capacity: 16,
        server_port: None,
        log_file: None,
    }
}
