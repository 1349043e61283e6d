use serde::Deserialize;

/// Error body returned by the data service on non-2xx responses.
///
/// PostgREST shape: `{"code":"23505","message":"...","details":"...","hint":null}`.
/// Every field is optional because proxies in front of the service may
/// answer with their own, sparser bodies.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataServiceError {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}
