//! One-shot synchronous delivery, for re-triggering a webhook by hand.

use serde_json::{Map, Value};

use homedeck_config::load_config;
use homedeck_core::Relay;

use crate::cli::{GlobalOpts, OutputFormat, RelayArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(args: &RelayArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = load_config(global.config.as_deref())?;
    let relay_config = cfg.relay_config();
    let relay = Relay::new(&relay_config)?;

    let payload = read_payload(args)?;
    let delivery = relay
        .deliver(&args.url, &payload)
        .await
        .map_err(|e| CliError::from_relay(e, &args.url, relay_config.timeout.as_secs()))?;

    if !delivery.ok {
        tracing::warn!(status = delivery.status, "destination answered with an error status");
    }
    let format = global.output.unwrap_or(OutputFormat::Json);
    output::print_output(&output::render(format, &delivery)?);
    Ok(())
}

fn read_payload(args: &RelayArgs) -> Result<Value, CliError> {
    let raw = match (&args.payload, &args.payload_file) {
        (Some(inline), _) => inline.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)?,
        (None, None) => return Ok(Value::Object(Map::new())),
    };
    Ok(serde_json::from_str(&raw)?)
}
