// poectl-api: Async client for the UniFi controller legacy API
//
// Only the surface needed to drive PoE port modes: platform detection,
// session login/logout, device listing and the `port_overrides` write.

pub mod auth;
pub mod error;
pub mod legacy;
pub mod transport;

pub use auth::ControllerPlatform;
pub use error::Error;
pub use legacy::{LegacyClient, PoeTarget};
pub use legacy::models::{LegacyDevice, LegacyPort, PortOverride};
pub use transport::{TlsMode, TransportConfig};
