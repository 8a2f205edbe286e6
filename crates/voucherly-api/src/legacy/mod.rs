// Session-authenticated controller API: login/logout plus the hotspot
// voucher and guest endpoints.

pub mod client;
pub mod hotspot;
pub mod models;
pub mod session;

pub use client::LegacyClient;
