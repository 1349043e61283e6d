// homedeck-api: async HTTP clients for the data service and outbound webhooks

pub mod data;
pub mod error;
pub mod transport;
pub mod webhook;

pub use data::DataClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
pub use webhook::{WebhookClient, WebhookResponse};
