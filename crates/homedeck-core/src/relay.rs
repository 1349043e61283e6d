// ── Webhook relay ──
//
// Delivers a caller-supplied JSON payload to a caller-supplied URL with a
// single POST. Two timing modes:
//
//   sync        the caller waits and receives the downstream status/body
//   background  the caller gets an immediate acknowledgement; the outcome
//               is only ever logged
//
// No retries in either mode. Every delivery holds a permit from a shared
// semaphore for its duration, and background deliveries run on a
// `TaskTracker` the host drains before exiting.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio_util::task::TaskTracker;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use homedeck_api::{WebhookClient, WebhookResponse};

use crate::config::RelayConfig;
use crate::error::CoreError;

// ── Request / outcome types ──────────────────────────────────────────

/// A validated relay request.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayRequest {
    pub url: String,
    /// Delivered as the POST body. `{}` when the caller sent none.
    pub payload: Value,
    pub background: bool,
}

#[derive(Deserialize)]
struct WireRelayRequest {
    url: Option<String>,
    payload: Option<Value>,
    background: Option<bool>,
}

impl RelayRequest {
    pub fn new(url: impl Into<String>, payload: Value) -> Self {
        Self {
            url: url.into(),
            payload,
            background: false,
        }
    }

    pub fn in_background(mut self) -> Self {
        self.background = true;
        self
    }

    /// Parse a raw request body. Fails before any network activity.
    pub fn from_json(body: &[u8]) -> Result<Self, RelayError> {
        // A bare `null` body carries no url, same as `{}`.
        let wire: Option<WireRelayRequest> =
            serde_json::from_slice(body).map_err(|e| RelayError::InvalidBody {
                reason: e.to_string(),
            })?;
        let Some(wire) = wire else {
            return Err(RelayError::MissingUrl);
        };

        let url = wire
            .url
            .filter(|u| !u.is_empty())
            .ok_or(RelayError::MissingUrl)?;

        Ok(Self {
            url,
            payload: wire
                .payload
                .unwrap_or_else(|| Value::Object(Map::new())),
            background: wire.background.unwrap_or(false),
        })
    }
}

/// Result of a synchronous delivery, as reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    /// The destination's own success flag (2xx).
    pub ok: bool,
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl From<WebhookResponse> for Delivery {
    fn from(resp: WebhookResponse) -> Self {
        Self {
            ok: resp.is_success(),
            status: resp.status,
            status_text: resp.status_text,
            body: resp.body,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Sync mode: the destination answered (any status).
    Delivered(Delivery),
    /// Background mode: scheduled, outcome unknown to the caller.
    Accepted { delivery_id: Uuid },
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Missing url")]
    MissingUrl,

    #[error("Invalid request body: {reason}")]
    InvalidBody { reason: String },

    /// The destination never answered: DNS, refused connection, TLS,
    /// timeout, or an unusable URL.
    #[error("{0}")]
    Transport(#[from] homedeck_api::Error),

    #[error("Relay is shutting down")]
    ShuttingDown,
}

// ── Relay ────────────────────────────────────────────────────────────

/// Outbound webhook dispatcher. Cheap to clone; clones share the
/// concurrency cap and the background task tracker.
#[derive(Clone)]
pub struct Relay {
    client: WebhookClient,
    permits: Arc<Semaphore>,
    tracker: TaskTracker,
}

impl Relay {
    /// Build a relay with its own HTTP client bounded by `config.timeout`.
    pub fn new(config: &RelayConfig) -> Result<Self, CoreError> {
        let transport = config.tls.transport(config.timeout);
        let client = WebhookClient::new(&transport)?;
        Ok(Self::with_client(client, config.max_in_flight))
    }

    pub fn with_client(client: WebhookClient, max_in_flight: usize) -> Self {
        Self {
            client,
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
            tracker: TaskTracker::new(),
        }
    }

    /// Handle a request in whichever mode it asks for.
    pub async fn relay(&self, request: RelayRequest) -> Result<RelayOutcome, RelayError> {
        if request.background {
            let delivery_id = self.schedule(request.url, &request.payload)?;
            Ok(RelayOutcome::Accepted { delivery_id })
        } else {
            self.deliver(&request.url, &request.payload)
                .await
                .map(RelayOutcome::Delivered)
        }
    }

    /// POST `payload` to `url` and wait for the answer.
    ///
    /// Any HTTP status is a `Delivery`; only transport failures are `Err`.
    pub async fn deliver(&self, url: &str, payload: &Value) -> Result<Delivery, RelayError> {
        self.ensure_open()?;
        let delivery_id = Uuid::new_v4();
        let body = encode(payload)?;

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| RelayError::ShuttingDown)?;

        debug!(%delivery_id, url, "delivering webhook");
        match self.client.post_json(url, body).await {
            Ok(resp) => {
                let delivery = Delivery::from(resp);
                info!(%delivery_id, url, status = delivery.status, ok = delivery.ok, "webhook delivered");
                Ok(delivery)
            }
            Err(e) => {
                error!(%delivery_id, url, error = %e, "webhook delivery failed");
                Err(RelayError::Transport(e))
            }
        }
    }

    /// Spawn a fire-and-forget delivery and return its id immediately.
    ///
    /// The payload is encoded before returning so a bad payload is still
    /// reported to the caller. The task waits for a permit on its own time.
    pub fn schedule(&self, url: String, payload: &Value) -> Result<Uuid, RelayError> {
        self.ensure_open()?;
        let delivery_id = Uuid::new_v4();
        let body = encode(payload)?;
        let client = self.client.clone();
        let permits = Arc::clone(&self.permits);

        let task = async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                warn!(url = %url, "relay closed before background delivery started");
                return;
            };

            match client.post_json(&url, body).await {
                Ok(resp) if resp.is_success() => {
                    info!(url = %url, status = resp.status, body = %resp.body, "background delivery completed");
                }
                Ok(resp) => {
                    warn!(
                        url = %url,
                        status = resp.status,
                        status_text = %resp.status_text,
                        body = %resp.body,
                        "background delivery rejected by destination"
                    );
                }
                Err(e) => error!(url = %url, error = %e, "background delivery failed"),
            }
        };

        self.tracker
            .spawn(task.instrument(info_span!("background_delivery", %delivery_id)));
        debug!(%delivery_id, "background delivery scheduled");
        Ok(delivery_id)
    }

    /// New deliveries are refused once [`Relay::drain`] has started.
    /// Background deliveries already scheduled keep their place.
    fn ensure_open(&self) -> Result<(), RelayError> {
        if self.tracker.is_closed() {
            Err(RelayError::ShuttingDown)
        } else {
            Ok(())
        }
    }

    /// Background deliveries not yet finished.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Stop accepting deliveries and wait up to `grace` for background ones.
    /// Returns `true` if all of them finished.
    ///
    /// Deliveries still running after `grace` are abandoned, not cancelled;
    /// they end when the runtime does.
    pub async fn drain(&self, grace: Duration) -> bool {
        self.tracker.close();
        let pending = self.tracker.len();
        if pending > 0 {
            info!(pending, "waiting for background deliveries");
        }
        tokio::time::timeout(grace, self.tracker.wait()).await.is_ok()
    }
}

/// Serialize once; the bytes on the wire are exactly these.
fn encode(payload: &Value) -> Result<Vec<u8>, RelayError> {
    serde_json::to_vec(payload).map_err(|e| RelayError::InvalidBody {
        reason: e.to_string(),
    })
}
