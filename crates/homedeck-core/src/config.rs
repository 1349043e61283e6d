// ── Runtime configuration ──
//
// These types describe how to reach the data service and how to bound
// outbound deliveries. They carry credential data and tuning, but never
// touch disk. The binary builds them from its config layer and hands them in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use homedeck_api::{TlsMode, TransportConfig};

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// Bundled root store (strict).
    #[default]
    SystemDefaults,
    /// Also trust a custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

impl TlsVerification {
    pub(crate) fn transport(&self, timeout: Duration) -> TransportConfig {
        let tls = match self {
            Self::SystemDefaults => TlsMode::System,
            Self::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            Self::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig { tls, timeout }
    }
}

/// Location and elevated credentials of the data service.
///
/// Both values are required; hosts that cannot resolve either keep the
/// gateway unconfigured so it fails closed.
#[derive(Debug, Clone)]
pub struct DataServiceConfig {
    /// Project URL (e.g. `https://abc.supabase.co`); `/rest/v1/` is appended.
    pub url: Url,
    /// Service-role key. Bypasses row-level security.
    pub service_key: SecretString,
    pub tls: TlsVerification,
    pub timeout: Duration,
}

/// Bounds for outbound webhook deliveries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Per-delivery timeout, applied in both modes.
    pub timeout: Duration,
    /// Maximum deliveries in flight at once, across both modes.
    pub max_in_flight: usize,
    /// How long a shutting-down host waits for background deliveries.
    pub shutdown_grace: Duration,
    pub tls: TlsVerification,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            max_in_flight: 32,
            shutdown_grace: Duration::from_secs(30),
            tls: TlsVerification::SystemDefaults,
        }
    }
}
