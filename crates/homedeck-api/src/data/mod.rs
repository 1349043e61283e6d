// Data-service (PostgREST-compatible) REST surface.

pub mod client;
pub mod models;

pub use client::DataClient;
pub use models::DataServiceError;
