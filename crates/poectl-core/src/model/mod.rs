// ── Domain model ──

pub mod mac;
pub mod port;
pub mod state;

pub use mac::MacAddress;
pub use port::{DeviceRecord, PortRecord, PortStatus, extract_port_statuses};
pub use state::{Action, DesiredState};
