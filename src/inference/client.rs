//! HTTP client for Hugging Face-style text-generation endpoints.

use crate::config::Config;
use crate::inference::response::extract_generated_text;
use crate::inference::retry::RetryPolicy;
use crate::inference::types::{GenerationParams, InferenceError, body_snippet};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

/// Client issuing generation requests against a remote inference host.
///
/// One instance is shared across all chunks and models; the model identifier
/// is supplied per call so that the aggregator can fall back to a secondary
/// model without constructing a second client.
pub struct InferenceClient {
    http: Client,
    base_url: String,
    token: Option<String>,
    policy: RetryPolicy,
}

impl InferenceClient {
    /// Construct a client from the server configuration.
    pub fn new(config: &Config) -> Result<Self, InferenceError> {
        let http = Client::builder()
            .user_agent(concat!("lexiscan/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| InferenceError::Network(err.to_string()))?;
        Ok(Self::with_endpoint(
            http,
            config.hf_api_url.clone(),
            config.hf_token.clone(),
            RetryPolicy::new(config.retry_max_attempts, config.retry_base_backoff),
        ))
    }

    /// Construct a client against an explicit endpoint. Used by tests to
    /// point at a local stub server.
    pub fn with_endpoint(
        http: Client,
        base_url: String,
        token: Option<String>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            http,
            base_url,
            token,
            policy,
        }
    }

    fn model_endpoint(&self, model: &str) -> String {
        format!("{}/models/{model}", self.base_url.trim_end_matches('/'))
    }

    /// Run one prompt through the given model and return the generated text.
    ///
    /// Cold starts (503) and throttling (429) are retried with backoff up to
    /// the policy's attempt ceiling; credential and routing failures return
    /// immediately. With no token configured, no network call is made.
    pub async fn generate(
        &self,
        model: &str,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<String, InferenceError> {
        let token = self
            .token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
            .ok_or(InferenceError::MissingCredential)?;

        let url = self.model_endpoint(model);
        let payload = json!({
            "inputs": prompt,
            "parameters": { "max_new_tokens": params.max_new_tokens }
        });

        let max_attempts = self.policy.max_attempts();
        let mut last_network_error = None;

        for attempt in 1..=max_attempts {
            let sent = self
                .http
                .post(&url)
                .bearer_auth(token)
                .json(&payload)
                .send()
                .await;

            let response = match sent {
                Ok(response) => response,
                Err(err) => {
                    tracing::warn!(model, attempt, error = %err, "Inference request failed to send");
                    last_network_error = Some(err.to_string());
                    if attempt < max_attempts {
                        tokio::time::sleep(self.policy.backoff_for_attempt(attempt)).await;
                    }
                    continue;
                }
            };
            last_network_error = None;

            match response.status() {
                StatusCode::OK => {
                    let body = response
                        .text()
                        .await
                        .map_err(|err| InferenceError::Network(err.to_string()))?;
                    let value: Value = serde_json::from_str(&body)
                        .map_err(|_| InferenceError::UnrecognizedSchema(body_snippet(&body)))?;
                    return extract_generated_text(&value);
                }
                status @ (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
                    return Err(InferenceError::AuthenticationFailed { status });
                }
                StatusCode::NOT_FOUND => {
                    return Err(InferenceError::ModelNotFound {
                        model: model.to_string(),
                    });
                }
                StatusCode::SERVICE_UNAVAILABLE => {
                    let estimated = response
                        .json::<Value>()
                        .await
                        .ok()
                        .as_ref()
                        .and_then(|value| value.get("estimated_time"))
                        .and_then(Value::as_f64);
                    let wait = self.policy.cold_start_wait(estimated);
                    tracing::info!(
                        model,
                        attempt,
                        wait_secs = wait.as_secs_f64(),
                        estimated,
                        "Model is loading; waiting before retry"
                    );
                    if attempt < max_attempts {
                        tokio::time::sleep(wait).await;
                    }
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    let backoff = self.policy.backoff_for_attempt(attempt);
                    tracing::warn!(
                        model,
                        attempt,
                        backoff_secs = backoff.as_secs_f64(),
                        "Inference endpoint throttled the request"
                    );
                    if attempt < max_attempts {
                        tokio::time::sleep(backoff).await;
                    }
                }
                status => {
                    let body = response.text().await.unwrap_or_default();
                    let error = InferenceError::UpstreamError {
                        status,
                        body: body_snippet(&body),
                    };
                    tracing::error!(model, error = %error, "Inference request failed");
                    return Err(error);
                }
            }
        }

        match last_network_error {
            Some(detail) => Err(InferenceError::Network(detail)),
            None => Err(InferenceError::RetriesExhausted {
                attempts: max_attempts,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    fn test_client(base_url: String, token: Option<&str>, policy: RetryPolicy) -> InferenceClient {
        InferenceClient::with_endpoint(
            Client::builder()
                .user_agent("lexiscan-test")
                .build()
                .expect("client"),
            base_url,
            token.map(str::to_string),
            policy,
        )
    }

    fn params() -> GenerationParams {
        GenerationParams {
            max_new_tokens: 128,
        }
    }

    #[tokio::test]
    async fn missing_credential_makes_no_network_call() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/models/demo");
                then.status(200).json_body(serde_json::json!("ok"));
            })
            .await;

        let client = test_client(
            server.base_url(),
            None,
            RetryPolicy::new(4, Duration::from_millis(10)),
        );
        let error = client.generate("demo", "prompt", params()).await.unwrap_err();

        assert!(matches!(error, InferenceError::MissingCredential));
        assert_eq!(mock.hits_async().await, 0);
    }

    #[tokio::test]
    async fn successful_response_is_normalized() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/models/demo")
                    .header("authorization", "Bearer secret")
                    .json_body_partial(r#"{"parameters": {"max_new_tokens": 128}}"#);
                then.status(200)
                    .json_body(serde_json::json!([{"generated_text": "analysis"}]));
            })
            .await;

        let client = test_client(
            server.base_url(),
            Some("secret"),
            RetryPolicy::new(4, Duration::from_millis(10)),
        );
        let text = client
            .generate("demo", "prompt", params())
            .await
            .expect("generation");

        mock.assert_async().await;
        assert_eq!(text, "analysis");
    }

    #[tokio::test]
    async fn authentication_failure_is_not_retried() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/models/demo");
                then.status(401).body("unauthorized");
            })
            .await;

        let client = test_client(
            server.base_url(),
            Some("bad-token"),
            RetryPolicy::new(4, Duration::from_millis(10)),
        );
        let error = client.generate("demo", "prompt", params()).await.unwrap_err();

        assert!(matches!(
            error,
            InferenceError::AuthenticationFailed { status } if status == StatusCode::UNAUTHORIZED
        ));
        assert_eq!(mock.hits_async().await, 1);
    }

    #[tokio::test]
    async fn unknown_model_fails_immediately() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/models/nope");
                then.status(404).body("Not Found");
            })
            .await;

        let client = test_client(
            server.base_url(),
            Some("token"),
            RetryPolicy::new(4, Duration::from_millis(10)),
        );
        let error = client.generate("nope", "prompt", params()).await.unwrap_err();

        assert!(matches!(error, InferenceError::ModelNotFound { model } if model == "nope"));
    }

    #[tokio::test]
    async fn throttling_retries_to_the_attempt_ceiling() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/models/demo");
                then.status(429).body("rate limited");
            })
            .await;

        let client = test_client(
            server.base_url(),
            Some("token"),
            RetryPolicy::new(4, Duration::from_millis(20)),
        );
        let started = Instant::now();
        let error = client.generate("demo", "prompt", params()).await.unwrap_err();

        assert!(matches!(
            error,
            InferenceError::RetriesExhausted { attempts: 4 }
        ));
        assert_eq!(mock.hits_async().await, 4);
        // 20 + 40 + 80 ms of backoff precede the final attempt.
        assert!(started.elapsed() >= Duration::from_millis(140));
    }

    #[tokio::test]
    async fn other_statuses_surface_as_upstream_errors() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/models/demo");
                then.status(500).body("internal error");
            })
            .await;

        let client = test_client(
            server.base_url(),
            Some("token"),
            RetryPolicy::new(4, Duration::from_millis(10)),
        );
        let error = client.generate("demo", "prompt", params()).await.unwrap_err();

        assert!(matches!(
            error,
            InferenceError::UpstreamError { status, ref body }
                if status == StatusCode::INTERNAL_SERVER_ERROR && body == "internal error"
        ));
        assert_eq!(mock.hits_async().await, 1);
    }

    #[tokio::test]
    async fn non_json_success_body_is_unrecognized() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/models/demo");
                then.status(200).body("<html>not json</html>");
            })
            .await;

        let client = test_client(
            server.base_url(),
            Some("token"),
            RetryPolicy::new(4, Duration::from_millis(10)),
        );
        let error = client.generate("demo", "prompt", params()).await.unwrap_err();

        assert!(matches!(error, InferenceError::UnrecognizedSchema(_)));
    }

    #[tokio::test]
    async fn network_failure_is_retried_then_reported() {
        // Discard-port connection attempts fail fast with refusal.
        let client = test_client(
            "http://127.0.0.1:9".into(),
            Some("token"),
            RetryPolicy::new(3, Duration::from_millis(10)),
        );
        let error = client.generate("demo", "prompt", params()).await.unwrap_err();
        assert!(matches!(error, InferenceError::Network(_)));
    }

    /// Stub server returning 503 with an estimated wait on the first call
    /// and a valid generation payload on the second.
    async fn cold_start_stub() -> (String, Arc<AtomicUsize>) {
        use axum::{Json, Router, extract::State, http::StatusCode as AxumStatus, routing::post};

        let hits = Arc::new(AtomicUsize::new(0));
        let state = hits.clone();
        let app = Router::new()
            .route(
                "/models/demo",
                post(
                    |State(hits): State<Arc<AtomicUsize>>| async move {
                        if hits.fetch_add(1, Ordering::SeqCst) == 0 {
                            (
                                AxumStatus::SERVICE_UNAVAILABLE,
                                Json(serde_json::json!({"estimated_time": 5.0})),
                            )
                        } else {
                            (
                                AxumStatus::OK,
                                Json(serde_json::json!([{"generated_text": "warmed up"}])),
                            )
                        }
                    },
                ),
            )
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub");
        let addr = listener.local_addr().expect("stub addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub server");
        });
        (format!("http://{addr}"), hits)
    }

    #[tokio::test]
    async fn cold_start_waits_then_succeeds() {
        let (base_url, hits) = cold_start_stub().await;
        let client = test_client(
            base_url,
            Some("token"),
            RetryPolicy::new(4, Duration::from_millis(10)),
        );

        let started = Instant::now();
        let text = client
            .generate("demo", "prompt", params())
            .await
            .expect("generation after warm-up");

        assert_eq!(text, "warmed up");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        // Exactly one cold-start sleep, at least the 4s clamp floor.
        assert!(started.elapsed() >= Duration::from_secs(4));
    }
}
