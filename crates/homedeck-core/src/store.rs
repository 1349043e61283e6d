// ── Data-service seam ──
//
// The gateway talks to the record store through `DataService` so it can be
// exercised against an in-memory double. `DataClient` is the production
// implementation.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use homedeck_api::DataClient;

use crate::config::DataServiceConfig;
use crate::error::CoreError;
use crate::model::Table;

/// Generic read/write access to named record collections.
///
/// Rows travel as JSON objects; every operation is independently fallible.
#[async_trait]
pub trait DataService: Send + Sync {
    async fn insert(&self, table: Table, row: Value) -> Result<(), CoreError>;

    /// Patch the row whose `id` equals `id`.
    async fn update(&self, table: Table, id: &str, patch: Value) -> Result<(), CoreError>;

    async fn delete(&self, table: Table, id: &str) -> Result<(), CoreError>;

    /// All rows of `table` where `column` equals `value`.
    async fn select(
        &self,
        table: Table,
        column: &str,
        value: &str,
    ) -> Result<Vec<Value>, CoreError>;
}

#[async_trait]
impl DataService for DataClient {
    async fn insert(&self, table: Table, row: Value) -> Result<(), CoreError> {
        Ok(DataClient::insert(self, table.as_ref(), &row).await?)
    }

    async fn update(&self, table: Table, id: &str, patch: Value) -> Result<(), CoreError> {
        Ok(DataClient::update(self, table.as_ref(), id, &patch).await?)
    }

    async fn delete(&self, table: Table, id: &str) -> Result<(), CoreError> {
        Ok(DataClient::delete(self, table.as_ref(), id).await?)
    }

    async fn select(
        &self,
        table: Table,
        column: &str,
        value: &str,
    ) -> Result<Vec<Value>, CoreError> {
        Ok(DataClient::select(self, table.as_ref(), column, value).await?)
    }
}

/// Build the production data-service client from runtime config.
pub fn connect(config: &DataServiceConfig) -> Result<Arc<dyn DataService>, CoreError> {
    let transport = config.tls.transport(config.timeout);
    let client = DataClient::from_service_key(config.url.as_str(), &config.service_key, &transport)?;
    Ok(Arc::new(client))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn config(url: &str) -> DataServiceConfig {
        DataServiceConfig {
            url: url.parse().unwrap(),
            service_key: SecretString::from("svc-key".to_owned()),
            tls: crate::TlsVerification::SystemDefaults,
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn connect_builds_an_authenticated_client() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/rest/v1/devices"))
            .and(query_param("id", "eq.dev-1"))
            .and(header("apikey", "svc-key"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let store = connect(&config(&server.uri())).unwrap();
        store.delete(Table::Devices, "dev-1").await.unwrap();
    }

    #[tokio::test]
    async fn store_errors_keep_the_service_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": "22P02",
                "message": "invalid input value for enum device_type: \"toaster\""
            })))
            .mount(&server)
            .await;

        let store = connect(&config(&server.uri())).unwrap();
        let err = store
            .insert(Table::Devices, json!({ "type": "toaster" }))
            .await
            .unwrap_err();

        match err {
            CoreError::Store { message, code, status } => {
                assert_eq!(message, "invalid input value for enum device_type: \"toaster\"");
                assert_eq!(code.as_deref(), Some("22P02"));
                assert_eq!(status, Some(400));
            }
            other => panic!("expected Store error, got: {other:?}"),
        }
    }
}
