// voucherly-api: async clients for the hotspot voucher endpoints of a
// UniFi controller, over the Integration API (API key) or the legacy
// session API (username/password).

pub mod error;
pub mod integration;
pub mod legacy;
pub mod platform;
pub mod transport;

pub use error::Error;
pub use integration::IntegrationClient;
pub use integration::types as integration_types;
pub use legacy::LegacyClient;
pub use platform::ControllerPlatform;
pub use transport::{TlsMode, TransportConfig};
