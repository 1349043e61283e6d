//! Configuration for the homedeck server and CLI.
//!
//! TOML file + `HOMEDECK_*` environment layering, service-key resolution
//! (named env var, then `SUPABASE_SERVICE_ROLE_KEY`, then plaintext), and
//! translation to the runtime types in `homedeck_core`.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use homedeck_core::{DataServiceConfig, RelayConfig, TlsVerification};

/// Environment variable consulted for the data service URL when the
/// config file leaves it unset.
pub const URL_ENV: &str = "SUPABASE_URL";
/// Environment variable consulted for the service key when neither
/// `service_key_env` nor the config file provide one.
pub const SERVICE_KEY_ENV: &str = "SUPABASE_SERVICE_ROLE_KEY";

const REDACTED: &str = "********";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub data: DataSection,

    #[serde(default)]
    pub relay: RelaySection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerSection {
    /// Listen address, `host:port`.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Where the record store lives and how to authenticate to it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DataSection {
    /// Project base URL (falls back to `SUPABASE_URL`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Service-role key (plaintext, prefer an env var).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_key: Option<String>,

    /// Environment variable name containing the service key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_key_env: Option<String>,

    /// Path to a custom CA certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    #[serde(default = "default_data_timeout")]
    pub timeout_secs: u64,
}

impl Default for DataSection {
    fn default() -> Self {
        Self {
            url: None,
            service_key: None,
            service_key_env: None,
            ca_cert: None,
            timeout_secs: default_data_timeout(),
        }
    }
}

/// Bounds for outbound webhook deliveries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RelaySection {
    #[serde(default = "default_relay_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,

    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_secs: u64,

    /// Accept invalid TLS certificates from webhook destinations.
    #[serde(default)]
    pub insecure: bool,
}

impl Default for RelaySection {
    fn default() -> Self {
        Self {
            timeout_secs: default_relay_timeout(),
            max_in_flight: default_max_in_flight(),
            shutdown_grace_secs: default_shutdown_grace(),
            insecure: false,
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8787".into()
}
fn default_data_timeout() -> u64 {
    10
}
fn default_relay_timeout() -> u64 {
    15
}
fn default_max_in_flight() -> usize {
    32
}
fn default_shutdown_grace() -> u64 {
    30
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "homedeck", "homedeck").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("homedeck");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load defaults, then the TOML file, then `HOMEDECK_*` env overrides.
///
/// `path` names an explicit file which must exist. Without it the
/// platform config file is used if present.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(p) if !p.exists() => {
            return Err(ConfigError::NotFound {
                path: p.to_path_buf(),
            });
        }
        Some(p) => p.to_path_buf(),
        None => config_path(),
    };

    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&file))
        .merge(Env::prefixed("HOMEDECK_").split("__"))
        .extract()?;
    Ok(config)
}

// ── Translation to runtime config ───────────────────────────────────

impl Config {
    /// Parsed listen address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server
            .bind
            .parse()
            .map_err(|e| ConfigError::Validation {
                field: "server.bind".into(),
                reason: format!("'{}': {e}", self.server.bind),
            })
    }

    /// Resolve the data service from config and the process environment.
    ///
    /// `Ok(None)` when the URL or key is absent: the host runs with the
    /// gateway unconfigured.
    pub fn data_service(&self) -> Result<Option<DataServiceConfig>, ConfigError> {
        self.data_service_with(|name| std::env::var(name).ok())
    }

    /// [`Config::data_service`] with an explicit environment lookup.
    pub fn data_service_with(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Option<DataServiceConfig>, ConfigError> {
        let Some(raw_url) = non_empty(self.data.url.clone()).or_else(|| non_empty(env(URL_ENV)))
        else {
            return Ok(None);
        };
        let Some(service_key) = self.resolve_service_key(&env) else {
            return Ok(None);
        };

        let url = Url::parse(&raw_url).map_err(|e| ConfigError::Validation {
            field: "data.url".into(),
            reason: format!("'{raw_url}': {e}"),
        })?;

        let tls = self
            .data
            .ca_cert
            .clone()
            .map_or(TlsVerification::SystemDefaults, TlsVerification::CustomCa);

        Ok(Some(DataServiceConfig {
            url,
            service_key,
            tls,
            timeout: Duration::from_secs(self.data.timeout_secs),
        }))
    }

    fn resolve_service_key(&self, env: &impl Fn(&str) -> Option<String>) -> Option<SecretString> {
        // 1. Named env var
        let named = self
            .data
            .service_key_env
            .as_deref()
            .and_then(|name| non_empty(env(name)));
        // 2. Conventional env var, 3. plaintext
        named
            .or_else(|| non_empty(env(SERVICE_KEY_ENV)))
            .or_else(|| non_empty(self.data.service_key.clone()))
            .map(SecretString::from)
    }

    /// Relay bounds. `max_in_flight` below one is raised to one.
    pub fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            timeout: Duration::from_secs(self.relay.timeout_secs),
            max_in_flight: self.relay.max_in_flight.max(1),
            shutdown_grace: Duration::from_secs(self.relay.shutdown_grace_secs),
            tls: if self.relay.insecure {
                TlsVerification::DangerAcceptInvalid
            } else {
                TlsVerification::SystemDefaults
            },
        }
    }

    /// Copy with secrets masked, for display.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut cfg = self.clone();
        if cfg.data.service_key.is_some() {
            cfg.data.service_key = Some(REDACTED.into());
        }
        cfg
    }

    /// Pretty TOML rendering.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use figment::Jail;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn with_data(data: DataSection) -> Config {
        Config {
            data,
            ..Config::default()
        }
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "homedeck.toml",
                r#"
                [server]
                bind = "127.0.0.1:9000"

                [relay]
                max_in_flight = 8
                "#,
            )?;
            jail.set_env("HOMEDECK_RELAY__MAX_IN_FLIGHT", "4");
            jail.set_env("HOMEDECK_DATA__URL", "https://abc.supabase.co");

            let cfg = load_config(Some(Path::new("homedeck.toml"))).map_err(|e| e.to_string())?;
            assert_eq!(cfg.server.bind, "127.0.0.1:9000");
            assert_eq!(cfg.relay.max_in_flight, 4);
            assert_eq!(cfg.relay.timeout_secs, 15);
            assert_eq!(cfg.data.url.as_deref(), Some("https://abc.supabase.co"));
            Ok(())
        });
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        Jail::expect_with(|_| {
            let err = load_config(Some(Path::new("nope.toml"))).unwrap_err();
            assert!(matches!(err, ConfigError::NotFound { .. }));
            Ok(())
        });
    }

    #[test]
    fn named_env_var_wins_over_conventional_and_plaintext() {
        let cfg = with_data(DataSection {
            url: Some("https://abc.supabase.co".into()),
            service_key: Some("plain".into()),
            service_key_env: Some("HD_KEY".into()),
            ..DataSection::default()
        });

        let env = env_of(&[("HD_KEY", "named"), (SERVICE_KEY_ENV, "conventional")]);
        let ds = cfg.data_service_with(env).unwrap().unwrap();
        assert_eq!(ds.service_key.expose_secret(), "named");

        let env = env_of(&[(SERVICE_KEY_ENV, "conventional")]);
        let ds = cfg.data_service_with(env).unwrap().unwrap();
        assert_eq!(ds.service_key.expose_secret(), "conventional");

        let ds = cfg.data_service_with(env_of(&[])).unwrap().unwrap();
        assert_eq!(ds.service_key.expose_secret(), "plain");
    }

    #[test]
    fn url_falls_back_to_env() {
        let cfg = with_data(DataSection {
            service_key: Some("k".into()),
            ..DataSection::default()
        });

        let ds = cfg
            .data_service_with(env_of(&[(URL_ENV, "https://xyz.supabase.co")]))
            .unwrap()
            .unwrap();
        assert_eq!(ds.url.as_str(), "https://xyz.supabase.co/");
        assert_eq!(ds.tls, TlsVerification::SystemDefaults);
        assert_eq!(ds.timeout, Duration::from_secs(10));
    }

    #[test]
    fn missing_url_or_key_is_unconfigured() {
        let cfg = Config::default();
        assert!(cfg.data_service_with(env_of(&[])).unwrap().is_none());

        let env = env_of(&[(URL_ENV, "https://abc.supabase.co"), (SERVICE_KEY_ENV, "  ")]);
        assert!(cfg.data_service_with(env).unwrap().is_none());

        let env = env_of(&[(SERVICE_KEY_ENV, "k")]);
        assert!(cfg.data_service_with(env).unwrap().is_none());
    }

    #[test]
    fn bad_url_is_a_validation_error() {
        let cfg = with_data(DataSection {
            url: Some("not a url".into()),
            service_key: Some("k".into()),
            ..DataSection::default()
        });
        let err = cfg.data_service_with(env_of(&[])).unwrap_err();
        assert!(err.to_string().starts_with("invalid data.url"));
    }

    #[test]
    fn relay_config_translation() {
        let mut cfg = Config::default();
        assert_eq!(cfg.relay_config(), RelayConfig::default());

        cfg.relay.max_in_flight = 0;
        cfg.relay.insecure = true;
        let relay = cfg.relay_config();
        assert_eq!(relay.max_in_flight, 1);
        assert_eq!(relay.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn redacted_masks_service_key() {
        let cfg = with_data(DataSection {
            service_key: Some("super-secret".into()),
            ..DataSection::default()
        });
        let shown = cfg.redacted().to_toml().unwrap();
        assert!(!shown.contains("super-secret"));
        assert!(shown.contains(REDACTED));
    }

    #[test]
    fn bind_addr_parses() {
        assert_eq!(
            Config::default().bind_addr().unwrap(),
            "0.0.0.0:8787".parse::<SocketAddr>().unwrap()
        );

        let mut cfg = Config::default();
        cfg.server.bind = "localhost".into();
        assert!(cfg.bind_addr().is_err());
    }
}
