// ── Port-state model ──
//
// A `DeviceRecord` is what the gateway hands back for one device; a
// `PortStatus` is the immutable per-port snapshot the resolver works on.
// Verification takes a fresh snapshot rather than mutating an old one.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use poectl_api::PortOverride;

use super::mac::MacAddress;
use super::state::MODE_OFF;
use crate::error::CoreError;

/// A device as listed by the controller.
#[derive(Debug, Clone)]
pub struct DeviceRecord {
    pub id: String,
    pub mac: MacAddress,
    pub name: Option<String>,
    pub model: Option<String>,
    /// `None` when the device has no switch ports at all.
    pub ports: Option<Vec<PortRecord>>,
    /// Current persisted overrides, needed to write PoE changes back.
    pub port_overrides: Vec<PortOverride>,
}

impl DeviceRecord {
    /// Human label: the configured name, falling back to the MAC.
    pub fn label(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.mac.to_string())
    }

    /// Profile of port `index` as reported by the port table.
    pub fn port_profile(&self, index: u32) -> Option<&str> {
        self.ports
            .as_deref()?
            .iter()
            .find(|p| p.port_index == Some(index))?
            .profile
            .as_deref()
    }
}

/// Raw per-port record from the device's port table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortRecord {
    pub port_index: Option<u32>,
    pub name: Option<String>,
    pub mode: Option<String>,
    pub enabled: bool,
    pub capabilities: u32,
    /// Assigned port profile, if any.
    pub profile: Option<String>,
}

/// Point-in-time PoE status of one switch port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortStatus {
    pub port_index: u32,
    pub name: String,
    pub current_mode: String,
    pub poe_enabled: bool,
    /// Capability bitmask; 0 means the port cannot source power.
    pub poe_capabilities: u32,
}

impl PortStatus {
    pub fn supports_poe(&self) -> bool {
        self.poe_capabilities != 0
    }

    /// Only an explicit `off` is off; `auto`, `pasv24`, `passthrough` and
    /// unknown modes all count as on.
    pub fn is_on(&self) -> bool {
        self.current_mode != MODE_OFF
    }
}

/// Extract the status of each requested port present in the device's table.
///
/// Requested indexes missing from the table are left out. The result is
/// ordered by port index. A device without a port table is not a switch.
pub fn extract_port_statuses(
    device: &DeviceRecord,
    requested: &[u32],
) -> Result<Vec<PortStatus>, CoreError> {
    let table = match device.ports.as_deref() {
        Some(ports) if !ports.is_empty() => ports,
        _ => {
            return Err(CoreError::NotASwitch {
                device: device.label(),
            });
        }
    };

    let mut found = BTreeMap::new();
    for port in table {
        let Some(idx) = port.port_index else {
            continue;
        };
        if !requested.contains(&idx) {
            continue;
        }
        found.insert(
            idx,
            PortStatus {
                port_index: idx,
                name: port.name.clone().unwrap_or_else(|| format!("Port {idx}")),
                current_mode: port.mode.clone().unwrap_or_else(|| "unknown".into()),
                poe_enabled: port.enabled,
                poe_capabilities: port.capabilities,
            },
        );
    }

    Ok(found.into_values().collect())
}
