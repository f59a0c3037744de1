// ── Desired state and per-port actions ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::CoreError;

/// Mode written to enable PoE on a port.
pub const MODE_AUTO: &str = "auto";
/// Mode written to disable PoE on a port. The only mode that counts as "off".
pub const MODE_OFF: &str = "off";

/// The on/off state the operator wants the selected ports in.
///
/// Parsed case-insensitively from the usual spellings of yes/no.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum DesiredState {
    #[strum(
        to_string = "enable",
        serialize = "on",
        serialize = "enabled",
        serialize = "true",
        serialize = "1"
    )]
    Enable,
    #[strum(
        to_string = "disable",
        serialize = "off",
        serialize = "disabled",
        serialize = "false",
        serialize = "0"
    )]
    Disable,
}

impl DesiredState {
    /// Normalize a free-form token (`on`, `Disable`, `1`, ...).
    pub fn parse_token(token: &str) -> Result<Self, CoreError> {
        token
            .trim()
            .parse()
            .map_err(|_| CoreError::InvalidState {
                token: token.to_owned(),
            })
    }

    /// The controller mode string that realizes this state.
    pub fn target_mode(self) -> &'static str {
        match self {
            Self::Enable => MODE_AUTO,
            Self::Disable => MODE_OFF,
        }
    }

    pub fn is_on(self) -> bool {
        matches!(self, Self::Enable)
    }
}

/// One port change the run intends to make.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub port_index: u32,
    pub port_name: String,
    /// Mode the port is in before the change.
    pub from_mode: String,
    pub target_mode: String,
    pub direction: DesiredState,
}
