// Wire shapes for the `/api/s/{site}` endpoints
//
// Every reply is a `{meta, data}` envelope. Firmware versions disagree on
// which fields are present, so nearly everything is defaulted.

use serde::{Deserialize, Serialize};

// ── Envelope ─────────────────────────────────────────────────────────

/// Wrapper around every reply.
///
/// ```json
/// { "meta": { "rc": "ok", "msg": "optional" }, "data": [...] }
/// ```
#[derive(Debug, Deserialize)]
pub struct LegacyResponse<T> {
    pub meta: Meta,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// `rc` is `"ok"` on success; `msg` carries the controller's error key.
#[derive(Debug, Deserialize)]
pub struct Meta {
    pub rc: String,
    #[serde(default)]
    pub msg: Option<String>,
}

// ── Device ───────────────────────────────────────────────────────────

/// Device object from `stat/device`.
///
/// Only the identity fields and the switch port tables are modeled;
/// everything else lands in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyDevice {
    #[serde(rename = "_id")]
    pub id: String,
    pub mac: String,
    #[serde(default, rename = "type")]
    pub device_type: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub adopted: bool,
    /// 0=offline, 1=online, 2=pending, 4=upgrading, 5=provisioning
    #[serde(default)]
    pub state: i32,
    /// Live per-port state. Absent on access points and gateways without a switch.
    #[serde(default)]
    pub port_table: Option<Vec<LegacyPort>>,
    /// Persisted per-port configuration, written back wholesale on change.
    #[serde(default)]
    pub port_overrides: Vec<PortOverride>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One entry of a switch's `port_table`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LegacyPort {
    #[serde(default)]
    pub port_idx: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
    /// `auto`, `pasv24`, `passthrough`, `off`.
    #[serde(default)]
    pub poe_mode: Option<String>,
    #[serde(default)]
    pub poe_enable: Option<bool>,
    /// Capability bitmask. 0 means the port cannot source power.
    #[serde(default)]
    pub poe_caps: Option<u32>,
    #[serde(default)]
    pub up: Option<bool>,
    /// Port profile assigned on the controller.
    #[serde(default)]
    pub portconf_id: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One entry of a device's `port_overrides`.
///
/// Overrides carry many unrelated settings (profile, VLAN, name); only
/// `port_idx` and `poe_mode` are interpreted, the rest round-trips untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortOverride {
    pub port_idx: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poe_mode: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PortOverride {
    /// A fresh override that only sets the PoE mode.
    pub fn poe(port_idx: u32, mode: impl Into<String>) -> Self {
        Self {
            port_idx,
            poe_mode: Some(mode.into()),
            extra: serde_json::Map::new(),
        }
    }
}
