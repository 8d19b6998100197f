//! HTTP plumbing shared by the adapters

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::HttpConfig;
use crate::error::{QuizError, Result};

/// Longest error body excerpt carried in an error message
const MAX_MESSAGE_LEN: usize = 500;

/// Phrases that indicate a context overflow regardless of provider
const OVERFLOW_PHRASES: &[&str] = &[
    "context length",
    "context window",
    "maximum context",
    "too many tokens",
];

/// Build the HTTP client shared by all adapters.
///
/// Timeouts are only set when configured; otherwise the transport defaults
/// apply.
pub fn build_http_client(config: &HttpConfig) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    if let Some(secs) = config.connect_timeout_secs {
        builder = builder.connect_timeout(Duration::from_secs(secs));
    }

    builder
        .build()
        .map_err(|e| QuizError::Config(format!("Failed to build HTTP client: {e}")))
}

/// Best-effort fields pulled from a provider error body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ErrorDetails {
    /// `error.code` (string or number)
    pub code: Option<String>,
    /// `error.type`
    pub kind: Option<String>,
    pub message: String,
}

impl ErrorDetails {
    /// Understands `{"error": {...}}`, `{"error": "..."}` and flat
    /// `{"message", "type", "code"}` bodies; anything else becomes the
    /// message verbatim.
    pub fn parse(body: &str) -> Self {
        let fallback = || Self {
            message: excerpt(body),
            ..Self::default()
        };

        let Ok(value) = serde_json::from_str::<Value>(body) else {
            return fallback();
        };

        let source = match value.get("error") {
            Some(Value::String(message)) => {
                return Self {
                    message: excerpt(message),
                    ..Self::default()
                };
            }
            Some(obj @ Value::Object(_)) => obj,
            _ => &value,
        };

        let text = |key: &str| match source.get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        match text("message") {
            Some(message) => Self {
                code: text("code"),
                kind: text("type"),
                message: excerpt(&message),
            },
            None => fallback(),
        }
    }

    pub fn message_contains(&self, needle: &str) -> bool {
        self.message.to_lowercase().contains(needle)
    }

    pub fn code_is(&self, code: &str) -> bool {
        self.code.as_deref() == Some(code)
    }

    pub fn kind_is(&self, kind: &str) -> bool {
        self.kind.as_deref() == Some(kind)
    }
}

fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= MAX_MESSAGE_LEN {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(MAX_MESSAGE_LEN).collect();
        format!("{cut}...")
    }
}

/// Generic overflow phrasing, checked after the provider's own signature.
pub(crate) fn mentions_context_overflow(message: &str) -> bool {
    let lower = message.to_lowercase();
    OVERFLOW_PHRASES.iter().any(|p| lower.contains(p))
}

/// Error text with the request URL removed.
///
/// Some providers authenticate with a query-string key, and `reqwest`
/// includes the full URL in its `Display` output.
pub(crate) fn redacted(err: reqwest::Error) -> String {
    err.without_url().to_string()
}

pub(crate) fn transport_error(provider: &str, err: reqwest::Error) -> QuizError {
    let is_timeout = err.is_timeout();
    let is_connect = err.is_connect();
    let message = redacted(err);
    warn!(
        provider = provider,
        error = %message,
        is_timeout = is_timeout,
        is_connect = is_connect,
        "LLM request failed"
    );
    QuizError::Transport(message)
}

/// Turn a provider response into `T`, mapping error statuses.
///
/// Non-success bodies become `ContextLengthExceeded` when `is_overflow` or
/// the generic phrasing matches, and `ProviderHttp` otherwise.
pub(crate) async fn read_response<T: DeserializeOwned>(
    provider: &str,
    response: Response,
    is_overflow: fn(&ErrorDetails) -> bool,
) -> Result<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(provider, e))?;

    if !status.is_success() {
        let details = ErrorDetails::parse(&body);

        if is_overflow(&details) || mentions_context_overflow(&details.message) {
            warn!(
                provider = provider,
                status = status.as_u16(),
                "Provider rejected prompt as too long"
            );
            return Err(QuizError::ContextLengthExceeded {
                message: details.message,
            });
        }

        warn!(
            provider = provider,
            status = status.as_u16(),
            message = %details.message,
            "LLM API returned error status"
        );
        let message = if details.message.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        } else {
            details.message
        };
        return Err(QuizError::ProviderHttp {
            status: status.as_u16(),
            message,
            body,
        });
    }

    debug!(provider = provider, bytes = body.len(), "LLM response received");
    serde_json::from_str(&body).map_err(|e| {
        QuizError::MalformedResponse(format!("{provider} returned unexpected JSON: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_details_nested_object() {
        let details = ErrorDetails::parse(
            r#"{"error":{"message":"Bad key","type":"invalid_request_error","code":"invalid_api_key"}}"#,
        );
        assert_eq!(details.message, "Bad key");
        assert!(details.kind_is("invalid_request_error"));
        assert!(details.code_is("invalid_api_key"));
    }

    #[test]
    fn test_error_details_numeric_code() {
        let details = ErrorDetails::parse(
            r#"{"error":{"code":400,"message":"Invalid","status":"INVALID_ARGUMENT"}}"#,
        );
        assert!(details.code_is("400"));
        assert_eq!(details.message, "Invalid");
    }

    #[test]
    fn test_error_details_string_error() {
        let details = ErrorDetails::parse(r#"{"error":"model 'x' not found"}"#);
        assert_eq!(details.message, "model 'x' not found");
        assert_eq!(details.code, None);
    }

    #[test]
    fn test_error_details_flat_object() {
        let details = ErrorDetails::parse(
            r#"{"object":"error","message":"Too large","type":"invalid_request_message_order","code":"3051"}"#,
        );
        assert_eq!(details.message, "Too large");
        assert!(details.kind_is("invalid_request_message_order"));
    }

    #[test]
    fn test_error_details_plain_text_is_truncated() {
        let body = "x".repeat(MAX_MESSAGE_LEN + 50);
        let details = ErrorDetails::parse(&body);
        assert_eq!(details.message.len(), MAX_MESSAGE_LEN + 3);
        assert!(details.message.ends_with("..."));
    }

    #[test]
    fn test_mentions_context_overflow() {
        assert!(mentions_context_overflow(
            "This model's maximum context length is 8192 tokens"
        ));
        assert!(mentions_context_overflow("Input exceeds the Context Window"));
        assert!(!mentions_context_overflow("Invalid API key"));
    }

    #[test]
    fn test_build_http_client_with_timeouts() {
        let config = HttpConfig {
            timeout_secs: Some(5),
            connect_timeout_secs: Some(1),
        };
        assert!(build_http_client(&config).is_ok());
        assert!(build_http_client(&HttpConfig::default()).is_ok());
    }
}
