//! Backend transport
//!
//! The [`Backend`] trait is the seam between cached reads and the StayHub
//! REST API; [`HttpBackend`] is the reqwest implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};

/// Read access to the backend API.
#[async_trait]
pub trait Backend: Send + Sync {
    /// GETs `path` (relative to the API root) and returns the response data.
    async fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<Value>;
}

/// Type-erased backend, as held by the HTTP layer.
pub type DynBackend = Arc<dyn Backend>;

#[async_trait]
impl<B: Backend + ?Sized> Backend for Arc<B> {
    async fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<Value> {
        (**self).get_json(path, query).await
    }
}

// == HTTP Backend ==
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    token: Option<String>,
    http_client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, token: Option<String>, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            http_client,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.api_base_url.clone(),
            config.api_token.clone(),
            config.request_timeout(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<Value> {
        let url = self.url(path);
        debug!(url = %url, params = query.len(), "Backend request");

        let mut request = self.http_client.get(&url).query(query);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Error::Backend {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        unwrap_envelope(status, serde_json::from_str(&body)?)
    }
}

/// Unwraps `{success, message, data}` bodies. Anything else passes through.
pub(crate) fn unwrap_envelope(status: StatusCode, body: Value) -> Result<Value> {
    let Value::Object(mut map) = body else {
        return Ok(body);
    };

    match map.get("success").and_then(Value::as_bool) {
        Some(true) => Ok(map.remove("data").unwrap_or(Value::Null)),
        Some(false) => Err(Error::Backend {
            status: status.as_u16(),
            message: map
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Request failed")
                .to_string(),
        }),
        None => Ok(Value::Object(map)),
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .filter(|m| !m.is_empty())
        .or_else(|| Some(body.trim().to_string()).filter(|b| !b.is_empty()))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_success_yields_data() {
        let body = json!({"success": true, "message": "ok", "data": [1, 2]});
        assert_eq!(unwrap_envelope(StatusCode::OK, body).unwrap(), json!([1, 2]));
    }

    #[test]
    fn test_envelope_success_without_data_is_null() {
        let body = json!({"success": true});
        assert_eq!(unwrap_envelope(StatusCode::OK, body).unwrap(), Value::Null);
    }

    #[test]
    fn test_envelope_failure_is_backend_error() {
        let body = json!({"success": false, "message": "Hotel not found"});
        match unwrap_envelope(StatusCode::OK, body) {
            Err(Error::Backend { status, message }) => {
                assert_eq!(status, 200);
                assert_eq!(message, "Hotel not found");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_plain_bodies_pass_through() {
        assert_eq!(
            unwrap_envelope(StatusCode::OK, json!({"content": []})).unwrap(),
            json!({"content": []})
        );
        assert_eq!(unwrap_envelope(StatusCode::OK, json!([3])).unwrap(), json!([3]));
    }

    #[test]
    fn test_error_message_sources() {
        assert_eq!(
            error_message(StatusCode::FORBIDDEN, r#"{"message":"Access denied"}"#),
            "Access denied"
        );
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, "upstream down"), "upstream down");
        assert_eq!(error_message(StatusCode::NOT_FOUND, ""), "Not Found");
    }

    #[test]
    fn test_url_joining() {
        let backend = HttpBackend::new("http://api.local/api/", None, Duration::from_secs(1)).unwrap();
        assert_eq!(backend.base_url(), "http://api.local/api");
        assert_eq!(backend.url("/host/hotels"), "http://api.local/api/host/hotels");
        assert_eq!(backend.url("host/hotels"), "http://api.local/api/host/hotels");
    }
}
