// Legacy API device endpoints
//
// Device listing via stat/device and PoE mode changes written through
// the device's `port_overrides` on rest/device/{id}.

use serde_json::json;
use tracing::debug;

use crate::error::Error;
use crate::legacy::client::LegacyClient;
use crate::legacy::models::{LegacyDevice, PortOverride};

impl LegacyClient {
    /// List all devices with full statistics.
    ///
    /// `GET /api/s/{site}/stat/device`
    pub async fn list_devices(&self) -> Result<Vec<LegacyDevice>, Error> {
        let url = self.site_url("stat/device")?;
        debug!("listing devices");
        self.get(url).await
    }

    /// Set the PoE mode of one or more ports in a single request.
    ///
    /// `existing` is the device's current `port_overrides`; the targets are
    /// merged into it so unrelated per-port settings survive the write.
    ///
    /// `PUT /api/s/{site}/rest/device/{device_id}` with `{"port_overrides": [...]}`
    pub async fn set_poe_modes(
        &self,
        device_id: &str,
        existing: &[PortOverride],
        targets: &[PoeTarget<'_>],
    ) -> Result<(), Error> {
        let url = self.site_url(&format!("rest/device/{device_id}"))?;
        let overrides = merge_poe_overrides(existing, targets);
        debug!(device_id, ports = targets.len(), "setting PoE port modes");
        let _: Vec<serde_json::Value> = self
            .put(url, &json!({ "port_overrides": overrides }))
            .await?;
        Ok(())
    }
}

/// One port's requested PoE mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoeTarget<'a> {
    pub port_idx: u32,
    pub mode: &'a str,
    /// The profile the port runs under (`port_table[].portconf_id`). A new
    /// override without it would detach the port from that profile.
    pub portconf_id: Option<&'a str>,
}

impl<'a> PoeTarget<'a> {
    pub fn new(port_idx: u32, mode: &'a str) -> Self {
        Self {
            port_idx,
            mode,
            portconf_id: None,
        }
    }

    pub fn with_profile(self, portconf_id: Option<&'a str>) -> Self {
        Self {
            portconf_id,
            ..self
        }
    }
}

/// Apply targets on top of a device's overrides.
///
/// An existing override for the same port gets its `poe_mode` replaced;
/// ports without one get a new override appended, carrying the port's
/// profile when known. Order of the existing entries is preserved.
pub fn merge_poe_overrides(
    existing: &[PortOverride],
    targets: &[PoeTarget<'_>],
) -> Vec<PortOverride> {
    let mut merged = existing.to_vec();
    for target in targets {
        match merged.iter_mut().find(|o| o.port_idx == target.port_idx) {
            Some(ovr) => ovr.poe_mode = Some(target.mode.to_owned()),
            None => {
                let mut ovr = PortOverride::poe(target.port_idx, target.mode);
                if let Some(profile) = target.portconf_id {
                    ovr.extra.insert("portconf_id".into(), profile.into());
                }
                merged.push(ovr);
            }
        }
    }
    merged
}
