//! `homedeck serve`: resolve config, wire the gateway and relay, run.

use tokio::net::TcpListener;
use tracing::{info, warn};

use homedeck_config::load_config;
use homedeck_core::{AdminGateway, Relay, store};
use homedeck_server::{AppState, serve, shutdown_signal};

use crate::cli::{GlobalOpts, ServeArgs};
use crate::error::CliError;

pub async fn handle(args: ServeArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = load_config(global.config.as_deref())?;
    if let Some(bind) = args.bind {
        cfg.server.bind = bind;
    }
    let addr = cfg.bind_addr()?;

    let gateway = match cfg.data_service()? {
        Some(data) => {
            info!(url = %data.url, "data service configured");
            Some(AdminGateway::new(store::connect(&data)?))
        }
        None => {
            warn!("data service not configured; /device-admin will answer 500");
            None
        }
    };

    let relay_config = cfg.relay_config();
    let relay = Relay::new(&relay_config)?;
    info!(
        timeout_secs = relay_config.timeout.as_secs(),
        max_in_flight = relay_config.max_in_flight,
        "relay ready"
    );

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| CliError::Bind {
            addr: addr.to_string(),
            source,
        })?;

    serve(
        listener,
        AppState::new(gateway, relay),
        shutdown_signal(),
        relay_config.shutdown_grace,
    )
    .await?;
    Ok(())
}
