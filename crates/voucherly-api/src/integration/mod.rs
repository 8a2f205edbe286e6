// Integration API
//
// Hand-written client for the hotspot voucher and site endpoints of the
// UniFi Network Integration API (`/integration/v1/`, `X-API-KEY` auth).

pub mod client;
pub mod types;

pub use client::IntegrationClient;
