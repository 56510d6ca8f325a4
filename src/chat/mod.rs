//! Follow-up chat against an OpenAI-style completion endpoint.

use crate::config::Config;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

const SYSTEM_PROMPT: &str = "You are a helpful legal assistant.";

/// Errors surfaced by the chat completion client.
#[derive(Debug, Error)]
pub enum ChatError {
    /// No API key is configured; no network call was made.
    #[error("no chat API key configured")]
    MissingCredential,
    /// The completion endpoint was unreachable or returned an error.
    #[error("chat completion request failed: {0}")]
    RequestFailed(String),
    /// The completion response could not be parsed.
    #[error("malformed chat completion response: {0}")]
    InvalidResponse(String),
}

/// One message in a chat transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Speaker role (`user` or `assistant`).
    pub role: String,
    /// Message text.
    pub content: String,
}

/// Client for the conversational completion service.
pub struct ChatClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl ChatClient {
    /// Construct a client from the server configuration.
    pub fn new(config: &Config) -> Self {
        let http = Client::builder()
            .user_agent(concat!("lexiscan/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to construct reqwest::Client for chat");
        Self {
            http,
            base_url: config.openai_api_url.clone(),
            api_key: config.openai_api_key.clone(),
            model: config.chat_model.clone(),
        }
    }

    /// Construct a client against an explicit endpoint, for tests.
    pub fn with_endpoint(base_url: String, api_key: Option<String>, model: String) -> Self {
        Self {
            http: Client::new(),
            base_url,
            api_key,
            model,
        }
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.base_url.trim_end_matches('/')
        )
    }

    /// Produce a single assistant reply for the given transcript.
    ///
    /// The legal-assistant system prompt is prepended before the caller's
    /// messages.
    pub async fn reply(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ChatError::MissingCredential)?;

        let mut payload_messages = vec![json!({ "role": "system", "content": SYSTEM_PROMPT })];
        payload_messages.extend(
            messages
                .iter()
                .map(|message| json!({ "role": message.role, "content": message.content })),
        );

        let response = self
            .http
            .post(self.completions_url())
            .bearer_auth(api_key)
            .json(&json!({ "model": self.model, "messages": payload_messages }))
            .send()
            .await
            .map_err(|err| ChatError::RequestFailed(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::RequestFailed(format!(
                "completion endpoint returned {status}: {body}"
            )));
        }

        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|err| ChatError::InvalidResponse(err.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ChatError::InvalidResponse("response contained no choices".into()))
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: ChatMessage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};

    #[tokio::test]
    async fn reply_prepends_system_prompt_and_extracts_content() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/chat/completions")
                    .header("authorization", "Bearer sk-test")
                    .json_body_partial(
                        r#"{"messages": [{"role": "system", "content": "You are a helpful legal assistant."}]}"#,
                    );
                then.status(200).json_body(serde_json::json!({
                    "choices": [
                        { "message": { "role": "assistant", "content": "The notice period is 30 days." } }
                    ]
                }));
            })
            .await;

        let client =
            ChatClient::with_endpoint(server.base_url(), Some("sk-test".into()), "gpt-4o-mini".into());
        let reply = client
            .reply(&[ChatMessage {
                role: "user".into(),
                content: "What is the notice period?".into(),
            }])
            .await
            .expect("chat reply");

        mock.assert_async().await;
        assert_eq!(reply, "The notice period is 30 days.");
    }

    #[tokio::test]
    async fn missing_key_fails_without_network_call() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).json_body(serde_json::json!({"choices": []}));
            })
            .await;

        let client = ChatClient::with_endpoint(server.base_url(), None, "gpt-4o-mini".into());
        let error = client.reply(&[]).await.unwrap_err();

        assert!(matches!(error, ChatError::MissingCredential));
        assert_eq!(mock.hits_async().await, 0);
    }

    #[tokio::test]
    async fn empty_choice_lists_are_invalid() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).json_body(serde_json::json!({"choices": []}));
            })
            .await;

        let client =
            ChatClient::with_endpoint(server.base_url(), Some("sk".into()), "gpt-4o-mini".into());
        let error = client.reply(&[]).await.unwrap_err();
        assert!(matches!(error, ChatError::InvalidResponse(_)));
    }
}
