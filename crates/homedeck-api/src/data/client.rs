// Async HTTP client for the generic data service (PostgREST dialect).
//
// Base path: /rest/v1/
// Auth: `apikey` + `Authorization: Bearer` headers carrying the service key

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::models::DataServiceError;
use crate::Error;
use crate::transport::TransportConfig;

const REST_PREFIX: &str = "/rest/v1";

/// Async client for the data service's record collections.
///
/// All writes use `Prefer: return=minimal`, so the service answers with an
/// empty 2xx body on success and a structured error body otherwise. Rows
/// are addressed by their `id` column.
pub struct DataClient {
    http: reqwest::Client,
    base_url: Url,
}

impl DataClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a service key and transport config.
    ///
    /// Injects `apikey` and `Authorization: Bearer <key>` as default headers
    /// on every request. The key carries elevated privileges, so both header
    /// values are marked sensitive.
    pub fn from_service_key(
        base_url: &str,
        service_key: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();

        let mut key_value = HeaderValue::from_str(service_key.expose_secret()).map_err(|e| {
            Error::InvalidServiceKey {
                message: format!("invalid header value: {e}"),
            }
        })?;
        key_value.set_sensitive(true);

        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", service_key.expose_secret()))
            .map_err(|e| Error::InvalidServiceKey {
                message: format!("invalid header value: {e}"),
            })?;
        bearer.set_sensitive(true);

        headers.insert("apikey", key_value);
        headers.insert(AUTHORIZATION, bearer);

        let http = transport.build_client_with_headers(headers)?;
        let base_url = Self::normalize_base_url(base_url)?;

        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// The normalized `.../rest/v1/` base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append `/rest/v1/` unless the caller already pointed at it.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;

        let path = url.path().trim_end_matches('/').to_owned();

        if path.ends_with(REST_PREFIX) {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}{REST_PREFIX}/"));
        }

        Ok(url)
    }

    // ── URL builder ──────────────────────────────────────────────────

    fn table_url(&self, table: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(table)?)
    }

    fn eq(value: &str) -> String {
        format!("eq.{value}")
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Insert one row into `table`.
    pub async fn insert<B: Serialize + Sync>(&self, table: &str, row: &B) -> Result<(), Error> {
        let url = self.table_url(table)?;
        debug!("POST {url}");

        let resp = self
            .http
            .post(url)
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await?;
        Self::handle_empty(resp).await
    }

    /// Patch the row whose `id` equals `id`.
    ///
    /// Matching zero rows is not an error, mirroring the service itself.
    pub async fn update<B: Serialize + Sync>(
        &self,
        table: &str,
        id: &str,
        patch: &B,
    ) -> Result<(), Error> {
        let url = self.table_url(table)?;
        debug!("PATCH {url} id={id}");

        let resp = self
            .http
            .patch(url)
            .query(&[("id", Self::eq(id))])
            .header("Prefer", "return=minimal")
            .json(patch)
            .send()
            .await?;
        Self::handle_empty(resp).await
    }

    /// Delete the row whose `id` equals `id`.
    pub async fn delete(&self, table: &str, id: &str) -> Result<(), Error> {
        let url = self.table_url(table)?;
        debug!("DELETE {url} id={id}");

        let resp = self
            .http
            .delete(url)
            .query(&[("id", Self::eq(id))])
            .send()
            .await?;
        Self::handle_empty(resp).await
    }

    /// Select every row of `table` where `column` equals `value`.
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        column: &str,
        value: &str,
    ) -> Result<Vec<T>, Error> {
        let url = self.table_url(table)?;
        debug!("GET {url} {column}={value}");

        let resp = self
            .http
            .get(url)
            .query(&[("select", "*".to_owned()), (column, Self::eq(value))])
            .send()
            .await?;
        Self::handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn handle_empty(resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();

        match serde_json::from_str::<DataServiceError>(&raw) {
            Ok(err) => Error::DataService {
                status: status.as_u16(),
                message: err.message.unwrap_or_else(|| status.to_string()),
                code: err.code,
                details: err.details,
                hint: err.hint,
            },
            Err(_) => Error::DataService {
                status: status.as_u16(),
                message: if raw.is_empty() { status.to_string() } else { raw },
                code: None,
                details: None,
                hint: None,
            },
        }
    }
}
