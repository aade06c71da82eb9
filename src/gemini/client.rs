use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use super::types::{ApiError, GenerateContentRequest, GenerateContentResponse};
use crate::config::{ApiKey, Config};

#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("API rate limit exceeded")]
    RateLimited,

    #[error("API quota exhausted: {0}")]
    QuotaExhausted(String),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("no response within {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
}

/// Single-shot text completion.
/// Implemented by `GeminiClient` for production; mock implementations used in tests.
pub trait CompletionClient {
    /// Returns the model's reply text, or `None` when the model produced no text.
    async fn complete(&self, prompt: &str) -> Result<Option<String>, GeminiError>;
}

#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: ApiKey,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(http: Client, config: &Config) -> Self {
        Self {
            http,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.api_base.clone(),
            timeout: config.timeout,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        let config = Config::from_lookup(
            |key| (key == "GEMINI_API_KEY").then(|| "test-key".to_string()),
            &Default::default(),
        )
        .expect("test config");
        Self {
            base_url: base_url.to_string(),
            ..Self::new(http, &config)
        }
    }

    #[cfg(test)]
    pub(crate) fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn generate(&self, prompt: &str) -> Result<GenerateContentResponse, GeminiError> {
        let url = format!("{}/{}:generateContent", self.base_url, self.model);

        debug_assert!(
            url.starts_with("https://") || cfg!(test),
            "API key must only be sent over HTTPS"
        );

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose())
            .header("User-Agent", crate::USER_AGENT)
            .json(&GenerateContentRequest::single_turn(prompt))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.classify_transport(e))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Gemini API rate limited");
            return Err(GeminiError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            if let Ok(body) = serde_json::from_str::<GenerateContentResponse>(&text)
                && let Some(err) = &body.error
            {
                let classified = classify_api_error(err);
                warn!(error = %classified, "Gemini API error");
                return Err(classified);
            }
            let end = text.floor_char_boundary(200);
            warn!(status = %status, "Gemini API error (no structured body)");
            return Err(GeminiError::Api {
                code: status.as_u16(),
                message: format!("HTTP {status}: {}", &text[..end]),
            });
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| self.classify_transport(e))?;
        debug!(model = %self.model, "gemini completion received");

        if let Some(err) = &body.error {
            let classified = classify_api_error(err);
            warn!(error = %classified, "Gemini API error in 200 response");
            return Err(classified);
        }

        Ok(body)
    }

    fn classify_transport(&self, e: reqwest::Error) -> GeminiError {
        if e.is_timeout() {
            warn!(timeout_secs = self.timeout.as_secs(), "Gemini request timed out");
            GeminiError::Timeout(self.timeout)
        } else {
            warn!(error = %e, "Gemini request failed");
            GeminiError::Network(e)
        }
    }
}

impl CompletionClient for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<Option<String>, GeminiError> {
        let response = self.generate(prompt).await?;
        let text = response.first_text();
        if text.is_none() {
            warn!(
                block_reason = response.block_reason().unwrap_or("none"),
                finish_reason = response.finish_reason().unwrap_or("none"),
                "Gemini returned empty answer (safety filter or empty response)"
            );
        }
        Ok(text)
    }
}

fn classify_api_error(err: &ApiError) -> GeminiError {
    let message = err
        .message
        .clone()
        .unwrap_or_else(|| "Unknown error".to_string());

    match err.code {
        Some(429) => GeminiError::RateLimited,
        Some(403) => GeminiError::QuotaExhausted(message),
        Some(code) => GeminiError::Api { code, message },
        None => GeminiError::Api {
            code: 0,
            message: format!("Unknown error (no status code): {message}"),
        },
    }
}


#[cfg(test)]
mod http_tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ENDPOINT: &str = "/gemini-2.5-flash:generateContent";

    fn reply(text: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": text}], "role": "model"},
                "finishReason": "STOP"
            }]
        }))
    }

    #[tokio::test]
    async fn complete_sends_key_and_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{"parts": [{"text": "extract this"}]}]
            })))
            .respond_with(reply("{\"ok\": true}"))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url(Client::new(), &server.uri());
        let text = client.complete("extract this").await.unwrap();
        assert_eq!(text.as_deref(), Some("{\"ok\": true}"));
    }

    #[tokio::test]
    async fn complete_empty_candidates_returns_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url(Client::new(), &server.uri());
        assert!(client.complete("q").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn complete_429_returns_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(429))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url(Client::new(), &server.uri());
        let result = client.complete("q").await;
        assert!(matches!(result, Err(GeminiError::RateLimited)));
    }

    #[tokio::test]
    async fn complete_500_with_error_body_classified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error": {"code": 500, "message": "Internal server error"}
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url(Client::new(), &server.uri());
        match client.complete("q").await {
            Err(GeminiError::Api { code: 500, message }) => {
                assert!(message.contains("Internal server error"));
            }
            other => panic!("expected Api(500) with body message, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn complete_503_with_plain_body_keeps_snippet() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url(Client::new(), &server.uri());
        match client.complete("q").await {
            Err(GeminiError::Api { code: 503, message }) => {
                assert!(message.contains("upstream down"), "got: {message}");
            }
            other => panic!("expected Api(503), got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn complete_200_with_error_field_returns_classified_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": {"code": 403, "message": "Quota exceeded"}
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url(Client::new(), &server.uri());
        let result = client.complete("q").await;
        assert!(matches!(result, Err(GeminiError::QuotaExhausted(_))));
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(reply("{}").set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url(Client::new(), &server.uri())
            .with_timeout(Duration::from_millis(50));
        let result = client.complete("q").await;
        assert!(matches!(result, Err(GeminiError::Timeout(_))), "got: {result:?}");
    }
}
