//! OpenAI Responses API provider (`/v1/responses`).
//!
//! One `respond` call is one HTTP round-trip. Conversation continuity is
//! server-side via `previous_response_id`; hosted tools (web search) run on
//! the service and come back as output items. Error envelopes are decoded into
//! a readable [`ProviderError::Request`].

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, trace};

use crate::llm::{ModelResponse, ProviderError, ResponseRequest};

/// Adapter for the hosted `/v1/responses` endpoint.
///
/// Constructed once at startup, then cheaply cloned because `reqwest::Client`
/// is an `Arc` internally.
#[derive(Clone)]
pub struct OpenAiResponsesProvider {
    client: Client,
    api_base_url: String,
    api_key: String,
}

// Keep the key out of debug output.
impl std::fmt::Debug for OpenAiResponsesProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiResponsesProvider")
            .field("api_base_url", &self.api_base_url)
            .finish_non_exhaustive()
    }
}

impl OpenAiResponsesProvider {
    pub fn new(api_base_url: String, timeout_seconds: u64, api_key: String) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| ProviderError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, api_base_url, api_key })
    }

    pub async fn respond(&self, request: &ResponseRequest) -> Result<ModelResponse, ProviderError> {
        debug!(
            model = %request.model,
            chained = request.previous_response_id.is_some(),
            tools = request.tools.len(),
            "sending model request"
        );
        if tracing::enabled!(tracing::Level::TRACE) {
            let json = serde_json::to_string_pretty(request)
                .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
            trace!(payload = %json, "full model request payload");
        }

        let response = self
            .client
            .post(&self.api_base_url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!(url = %self.api_base_url, error = %e, timeout = e.is_timeout(), "model HTTP request failed (transport)");
                ProviderError::Request(e.to_string())
            })?;

        let response = check_status(response).await?;

        let parsed = response.json::<ModelResponse>().await.map_err(|e| {
            error!(error = %e, "failed to deserialize model response");
            ProviderError::Decode(format!("failed to parse response body: {e}"))
        })?;

        debug!(
            response_id = %parsed.id,
            items = parsed.output.len(),
            input_tokens = parsed.usage.map(|u| u.input_tokens).unwrap_or(0),
            output_tokens = parsed.usage.map(|u| u.output_tokens).unwrap_or(0),
            "received model response"
        );
        if tracing::enabled!(tracing::Level::TRACE) {
            let json = serde_json::to_string_pretty(&parsed)
                .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
            trace!(response = %json, "full model response payload");
        }

        Ok(parsed)
    }
}

// Error envelope used by OpenAI and compatible APIs.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

/// Consume the response and return it if successful, or a structured error.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());

    let message = error_message(status, &body);
    error!(%status, %message, "model request returned HTTP error");
    Err(ProviderError::Request(message))
}

fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) => {
            let code = env
                .error
                .code
                .map(|v| match v {
                    serde_json::Value::String(s) => format!(" [code={s}]"),
                    serde_json::Value::Null => String::new(),
                    other => format!(" [code={other}]"),
                })
                .unwrap_or_default();
            format!("HTTP {status}{code}: {}", env.error.message)
        }
        Err(_) => format!("HTTP {status}: {body}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn error_envelope_is_decoded() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error", "code": "invalid_api_key"}}"#;
        let msg = error_message(StatusCode::UNAUTHORIZED, body);
        assert!(msg.starts_with("HTTP 401"));
        assert!(msg.contains("[code=invalid_api_key]"));
        assert!(msg.contains("Incorrect API key provided"));
    }

    #[test]
    fn null_code_is_omitted() {
        let body = r#"{"error": {"message": "overloaded", "code": null}}"#;
        let msg = error_message(StatusCode::SERVICE_UNAVAILABLE, body);
        assert!(!msg.contains("code="));
        assert!(msg.contains("overloaded"));
    }

    #[test]
    fn non_json_body_is_passed_through() {
        let msg = error_message(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert_eq!(msg, "HTTP 502 Bad Gateway: <html>bad gateway</html>");
    }

    #[test]
    fn debug_hides_api_key() {
        let p = OpenAiResponsesProvider::new("http://localhost:0/v1/responses".into(), 1, "sk-secret".into())
            .unwrap();
        assert!(!format!("{p:?}").contains("sk-secret"));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_request_error() {
        let p = OpenAiResponsesProvider::new("http://127.0.0.1:9/v1/responses".into(), 1, "k".into())
            .unwrap();
        let req = ResponseRequest::new("m", crate::llm::ResponseInput::Text("hi".into()));
        let err = p.respond(&req).await.unwrap_err();
        assert!(matches!(err, ProviderError::Request(_)));
    }
}
