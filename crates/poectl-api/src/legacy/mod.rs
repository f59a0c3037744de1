// Legacy API client modules
//
// Hand-written client for the controller's session-authenticated endpoints,
// all wrapped in the `{ meta: { rc, msg }, data: [...] }` envelope.

pub mod auth;
pub mod client;
pub mod devices;
pub mod models;

pub use client::LegacyClient;
pub use devices::PoeTarget;
