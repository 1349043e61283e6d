// Outbound webhook delivery.
//
// Posts an already-encoded JSON body to an arbitrary caller-supplied URL
// and hands back the downstream status and body text untouched. Non-2xx
// answers are data, not errors: only transport failures surface as `Err`.

use reqwest::header::{CONTENT_TYPE, HeaderValue};
use tracing::debug;
use url::Url;

use crate::Error;
use crate::transport::TransportConfig;

/// What a webhook destination answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookResponse {
    pub status: u16,
    /// Canonical reason phrase for `status`; empty for unregistered codes.
    pub status_text: String,
    /// Response body as text. Never re-parsed, so any content type works.
    pub body: String,
}

impl WebhookResponse {
    /// Same rule as a browser `Response.ok`: status in 200..=299.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Thin POST-only client for webhook destinations.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    http: reqwest::Client,
}

impl WebhookClient {
    /// Build a client from the shared transport config (timeout, TLS).
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
        })
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// POST `body` to `url` with `Content-Type: application/json`.
    ///
    /// `body` is sent byte-for-byte; the caller owns the encoding.
    pub async fn post_json(&self, url: &str, body: Vec<u8>) -> Result<WebhookResponse, Error> {
        let url = Url::parse(url)?;
        debug!("POST {url} ({} bytes)", body.len());

        let resp = self
            .http
            .post(url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        Ok(WebhookResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_owned(),
            body,
        })
    }
}
