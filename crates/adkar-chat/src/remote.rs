//! Remote text-generation resolver.
//!
//! Posts `{"inputs": <text>}` to an inference endpoint and extracts
//! `generated_text` from the response. Accepts the array shape returned by
//! text-generation models and the object shape returned by
//! text2text-generation models.

use std::time::Duration;

use adkar_core::config::InferenceConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::error::ChatError;
use crate::resolver::ReplyResolver;

/// Longest slice of an unexpected body quoted in error messages.
const BODY_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

/// Resolver backed by a remote inference endpoint.
#[derive(Clone)]
pub struct RemoteResolver {
    client: Client,
    endpoint: String,
    api_token: Option<String>,
}

impl std::fmt::Debug for RemoteResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteResolver")
            .field("endpoint", &self.endpoint)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl RemoteResolver {
    /// Create a resolver for `endpoint`. `None` disables the per-request
    /// timeout.
    pub fn new(
        endpoint: impl Into<String>,
        api_token: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, ChatError> {
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(ChatError::Config(
                "inference endpoint cannot be empty".to_string(),
            ));
        }
        let client = http_client(timeout)?;
        Ok(Self {
            client,
            endpoint,
            api_token,
        })
    }

    /// Build from configuration, reading the token from the configured
    /// environment variable.
    pub fn from_config(config: &InferenceConfig) -> Result<Self, ChatError> {
        let token = config.api_token();
        if token.is_none() {
            tracing::warn!(
                env = %config.api_token_env,
                "No inference token set; calling endpoint without authorization"
            );
        }
        Self::new(config.endpoint.clone(), token, config.timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ReplyResolver for RemoteResolver {
    fn name(&self) -> &str {
        "remote"
    }

    async fn resolve(&self, input: &str) -> Result<String, ChatError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&InferenceRequest { inputs: input });
        if let Some(ref token) = self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ChatError::Backend(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Backend(format!(
                "endpoint returned {}: {}",
                status,
                truncate(&body)
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ChatError::Backend(format!("failed to read response: {}", e)))?;
        let data: Value = serde_json::from_str(&body)
            .map_err(|_| ChatError::MalformedResponse(truncate(&body)))?;

        let text = generated_text(&data)
            .ok_or_else(|| ChatError::MalformedResponse(truncate(&data.to_string())))?;
        tracing::debug!(reply_len = text.len(), "Remote reply received");
        Ok(text)
    }
}

/// Build an HTTP client, with a request timeout when one is given.
pub(crate) fn http_client(timeout: Option<Duration>) -> Result<Client, ChatError> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

/// Extract `generated_text` from either response shape.
///
/// `[{"generated_text": ...}, ...]` uses the first element;
/// `{"generated_text": ...}` uses the top-level field.
pub fn generated_text(data: &Value) -> Option<String> {
    let field = match data {
        Value::Array(items) => items.first()?.get("generated_text")?,
        Value::Object(map) => map.get("generated_text")?,
        _ => return None,
    };
    field.as_str().map(str::to_string)
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= BODY_PREVIEW_CHARS {
        text.to_string()
    } else {
        let head: String = text.chars().take(BODY_PREVIEW_CHARS).collect();
        format!("{}...", head)
    }
}
