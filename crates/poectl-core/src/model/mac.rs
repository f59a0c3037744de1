// ── Hardware address ──

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// MAC address, normalized to bare lowercase hex (`aabbccddeeff`).
///
/// Separators (`:`, `-`, `.`) are stripped so that `AA:BB:..`, `aa-bb-..`
/// and Cisco-style `aabb.ccdd.eeff` all compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MacAddress(String);

impl MacAddress {
    pub fn new(raw: impl AsRef<str>) -> Self {
        let normalized = raw
            .as_ref()
            .trim()
            .chars()
            .filter(|c| !matches!(c, ':' | '-' | '.'))
            .collect::<String>()
            .to_ascii_lowercase();
        Self(normalized)
    }

    /// The normalized, separator-free form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.len() == 12 && self.0.is_ascii() {
            let bytes = self.0.as_bytes();
            for (i, pair) in bytes.chunks(2).enumerate() {
                if i > 0 {
                    f.write_str(":")?;
                }
                f.write_str(std::str::from_utf8(pair).map_err(|_| fmt::Error)?)?;
            }
            Ok(())
        } else {
            f.write_str(&self.0)
        }
    }
}

impl FromStr for MacAddress {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}
