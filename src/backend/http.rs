//! reqwest implementation of [`TtsBackend`] for GPT-SoVITS `api_v2`.

use super::TtsBackend;
use crate::config::SovitsConfig;
use crate::types::{ModelSlot, TtsRequest};
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use tracing::{debug, error, info};

/// HTTP client for the GPT-SoVITS api_v2 endpoints.
#[derive(Clone)]
pub struct HttpBackend {
    http_client: reqwest::Client,
    config: SovitsConfig,
}

impl HttpBackend {
    pub fn builder() -> HttpBackendBuilder {
        HttpBackendBuilder::new()
    }

    pub fn config(&self) -> &SovitsConfig {
        &self.config
    }

    fn weights_endpoint(&self, slot: ModelSlot) -> String {
        match slot {
            ModelSlot::Gpt => self.config.endpoint(&self.config.gpt_weights_path),
            ModelSlot::Sovits => self.config.endpoint(&self.config.sovits_weights_path),
        }
    }
}

#[async_trait]
impl TtsBackend for HttpBackend {
    async fn set_weights(&self, slot: ModelSlot, weights_id: &str) -> Result<()> {
        let endpoint = self.weights_endpoint(slot);
        debug!(slot = slot.as_str(), weights_path = weights_id, endpoint = %endpoint, "setting weights");
        let response = self
            .http_client
            .get(&endpoint)
            .query(&[("weights_path", weights_id)])
            .send()
            .await
            .map_err(|e| Error::switch(slot, format!("request failed: {}", e)))?;
        let status = response.status();
        if !status.is_success() {
            let detail = switch_failure_detail(status, response.text().await);
            error!(slot = slot.as_str(), status = status.as_u16(), "failed to switch model: {}", detail);
            return Err(Error::switch(slot, detail));
        }
        info!(slot = slot.as_str(), weights_path = weights_id, "model switched");
        Ok(())
    }

    async fn synthesize(&self, request: &TtsRequest) -> Result<Bytes> {
        let endpoint = self.config.endpoint(&self.config.tts_path);
        debug!(endpoint = %endpoint, payload = ?request, "sending TTS request");
        let response = self
            .http_client
            .post(&endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                Error::network_with_context(
                    format!("TTS request failed: {}", e),
                    ErrorContext::new().with_source("http_backend"),
                )
            })?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            Error::network_with_context(
                format!("Failed to read TTS response: {}", e),
                ErrorContext::new().with_source("http_backend"),
            )
        })?;
        if !status.is_success() {
            let detail = error_detail(status, &bytes);
            error!(status = status.as_u16(), "TTS generation failed: {}", detail);
            return Err(Error::synthesis(status.as_u16(), detail));
        }
        if bytes.is_empty() {
            return Err(Error::synthesis(
                status.as_u16(),
                "backend returned an empty audio payload",
            ));
        }
        Ok(bytes)
    }

    fn queue_key(&self) -> Option<String> {
        Some(self.config.base_url.trim_end_matches('/').to_string())
    }
}

// Weight endpoints answer with plain text; keep a failed body read visible.
fn switch_failure_detail<E: std::fmt::Display>(
    status: StatusCode,
    body: std::result::Result<String, E>,
) -> String {
    match body {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => format!("HTTP error status: {}", status.as_u16()),
        Err(e) => format!(
            "HTTP error status: {} (failed to read response body: {})",
            status.as_u16(),
            e
        ),
    }
}

/// Human-readable failure detail from an error response body.
///
/// JSON bodies yield `message`, then `detail`, then the whole document; other bodies are
/// returned as text; an empty body falls back to the status code.
pub fn error_detail(status: StatusCode, body: &[u8]) -> String {
    if let Ok(json) = serde_json::from_slice::<serde_json::Value>(body) {
        for key in ["message", "detail"] {
            match json.get(key) {
                Some(v) if is_falsy(v) => {}
                Some(serde_json::Value::String(s)) => return s.clone(),
                Some(v) => return v.to_string(),
                None => {}
            }
        }
        return json.to_string();
    }
    let text = String::from_utf8_lossy(body);
    if text.trim().is_empty() {
        format!("HTTP error status: {}", status.as_u16())
    } else {
        text.into_owned()
    }
}

// `null`, `false`, `0` and `""` count as absent.
fn is_falsy(v: &serde_json::Value) -> bool {
    match v {
        serde_json::Value::Null => true,
        serde_json::Value::Bool(b) => !b,
        serde_json::Value::Number(n) => n.as_f64() == Some(0.0),
        serde_json::Value::String(s) => s.is_empty(),
        _ => false,
    }
}

pub struct HttpBackendBuilder {
    config: Option<SovitsConfig>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    http_client: Option<reqwest::Client>,
}

impl HttpBackendBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            base_url: None,
            timeout_secs: None,
            http_client: None,
        }
    }
    pub fn config(mut self, config: SovitsConfig) -> Self {
        self.config = Some(config);
        self
    }
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
    /// Use a preconfigured client (proxies, custom TLS). The timeout setting is then ignored.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn build(self) -> Result<HttpBackend> {
        let mut config = self.config.unwrap_or_default();
        if let Some(url) = self.base_url {
            config.base_url = url;
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout_secs = secs;
        }
        config.validate()?;
        let http_client = match self.http_client {
            Some(c) => c,
            None => {
                let mut builder = reqwest::Client::builder();
                if let Some(timeout) = config.timeout() {
                    builder = builder.timeout(timeout);
                }
                builder.build().map_err(|e| {
                    Error::configuration(format!("Failed to create HTTP client: {}", e))
                })?
            }
        };
        Ok(HttpBackend {
            http_client,
            config,
        })
    }
}

impl Default for HttpBackendBuilder {
    fn default() -> Self {
        Self::new()
    }
}
