// ── API-to-domain type conversions ──
//
// Bridges raw `poectl_api` response types into `poectl_core::model` types,
// filling defaults for fields older firmware leaves out.

use poectl_api::{LegacyDevice, LegacyPort};

use crate::model::{DeviceRecord, MacAddress, PortRecord};

impl From<&LegacyPort> for PortRecord {
    fn from(p: &LegacyPort) -> Self {
        Self {
            port_index: p.port_idx,
            name: p.name.clone(),
            mode: p.poe_mode.clone(),
            enabled: p.poe_enable.unwrap_or(false),
            capabilities: p.poe_caps.unwrap_or(0),
            profile: p.portconf_id.clone(),
        }
    }
}

impl From<LegacyDevice> for DeviceRecord {
    fn from(d: LegacyDevice) -> Self {
        Self {
            mac: MacAddress::new(&d.mac),
            ports: d
                .port_table
                .as_ref()
                .map(|table| table.iter().map(PortRecord::from).collect()),
            id: d.id,
            name: d.name,
            model: d.model,
            port_overrides: d.port_overrides,
        }
    }
}
