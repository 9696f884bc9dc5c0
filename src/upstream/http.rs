//! HTTP transport for the upstream memory API
//!
//! Owns path construction (including the deployment's prefix convention) and
//! failure classification: a received non-success response becomes
//! `Error::Api` with the body's diagnostic retained verbatim, a send failure
//! becomes `Error::Network`, and a success body that does not decode as JSON
//! becomes `Error::UnknownFormat`.

use super::{create_envelope, MemoryTransport};
use crate::config::{PathStyle, UpstreamConfig};
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// reqwest-backed transport
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    path_style: PathStyle,
}

impl HttpTransport {
    /// Create a transport from upstream configuration
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            path_style: config.path_style,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, self.path_style.prefix(), path)
    }

    /// Send failure: the request never produced a response
    fn classify_send_error(err: reqwest::Error, target: &str) -> Error {
        tracing::debug!("request to {} failed: {}", target, err);
        Error::Network {
            target: target.to_string(),
        }
    }

    /// Check the status, extracting the body's diagnostic on failure
    async fn expect_success(response: reqwest::Response, target: &str) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::Api {
            status: status.as_u16(),
            detail: extract_detail(&body, target),
        })
    }

    /// Decode a success body; undecodable bodies are an unrecognized format,
    /// a transfer failure while reading is a network error
    async fn decode_json(response: reqwest::Response, target: &str) -> Result<Value> {
        response.json::<Value>().await.map_err(|e| {
            if e.is_decode() {
                tracing::warn!("response from {} is not valid JSON", target);
                Error::UnknownFormat
            } else {
                Self::classify_send_error(e, target)
            }
        })
    }
}

/// Pull the most specific diagnostic out of an error body: the upstream's
/// `detail` or `message` field when present, the raw text otherwise
fn extract_detail(body: &str, target: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<Value>(body) {
        for field in ["detail", "message"] {
            if let Some(text) = parsed.get(field).and_then(Value::as_str) {
                return text.to_string();
            }
        }
    }
    if body.is_empty() {
        format!("no diagnostic body from {}", target)
    } else {
        body.to_string()
    }
}

#[async_trait]
impl MemoryTransport for HttpTransport {
    async fn list_memories(&self, user_id: &str) -> Result<Value> {
        let url = self.endpoint("/memories");
        tracing::debug!("listing memories for {} via {}", user_id, url);

        let response = self
            .client
            .get(&url)
            .query(&[("user_id", user_id)])
            .send()
            .await
            .map_err(|e| Self::classify_send_error(e, &url))?;

        let response = Self::expect_success(response, &url).await?;
        Self::decode_json(response, &url).await
    }

    async fn search_memories(&self, query: &str, user_id: &str) -> Result<Value> {
        let url = self.endpoint("/search");
        tracing::debug!("searching memories for {} via {}", user_id, url);

        let payload = serde_json::json!({
            "query": query,
            "user_id": user_id,
        });

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Self::classify_send_error(e, &url))?;

        let response = Self::expect_success(response, &url).await?;
        Self::decode_json(response, &url).await
    }

    async fn create_memory(&self, user_id: &str, text: &str) -> Result<()> {
        let url = self.endpoint("/memories");
        tracing::debug!("creating memory for {} via {}", user_id, url);

        let response = self
            .client
            .post(&url)
            .json(&create_envelope(user_id, text))
            .send()
            .await
            .map_err(|e| Self::classify_send_error(e, &url))?;

        Self::expect_success(response, &url).await?;
        Ok(())
    }

    async fn get_memory(&self, memory_id: &str) -> Result<Value> {
        let url = self.endpoint(&format!("/memories/{}", memory_id));
        tracing::debug!("fetching memory {} via {}", memory_id, url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::classify_send_error(e, &url))?;

        let response = Self::expect_success(response, &url).await?;
        Self::decode_json(response, &url).await
    }

    async fn update_memory(&self, memory_id: &str, content: &str) -> Result<()> {
        let url = self.endpoint(&format!("/memories/{}", memory_id));
        tracing::debug!("updating memory {} via {}", memory_id, url);

        let payload = serde_json::json!({ "memory": content });

        let response = self
            .client
            .put(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Self::classify_send_error(e, &url))?;

        Self::expect_success(response, &url).await?;
        Ok(())
    }

    async fn delete_memory(&self, memory_id: &str) -> Result<()> {
        let url = self.endpoint(&format!("/memories/{}", memory_id));
        tracing::debug!("deleting memory {} via {}", memory_id, url);

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| Self::classify_send_error(e, &url))?;

        Self::expect_success(response, &url).await?;
        Ok(())
    }
}
