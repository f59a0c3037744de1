// ── Desired-state resolver ──
//
// Pure diff of port snapshots against the desired on/off state. No I/O,
// no logging: skipped ports are returned alongside the actions so the
// caller decides how to report them.

use serde::Serialize;

use crate::error::CoreError;
use crate::model::{Action, DesiredState, PortStatus};

/// Why a requested port produced no action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// `poe_caps == 0`: the port cannot source power.
    NoPoeSupport,
    /// The port's derived on/off state already matches.
    AlreadySatisfied { mode: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedPort {
    pub port_index: u32,
    pub name: String,
    pub reason: SkipReason,
}

/// Outcome of resolving a snapshot against a desired state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub desired: DesiredState,
    /// Ordered by port index.
    pub actions: Vec<Action>,
    pub skipped: Vec<SkippedPort>,
}

impl Plan {
    pub fn is_noop(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Work out which ports need their mode changed.
pub fn plan(statuses: &[PortStatus], desired: DesiredState) -> Plan {
    let mut actions = Vec::new();
    let mut skipped = Vec::new();

    for status in statuses {
        if !status.supports_poe() {
            skipped.push(SkippedPort {
                port_index: status.port_index,
                name: status.name.clone(),
                reason: SkipReason::NoPoeSupport,
            });
            continue;
        }

        if status.is_on() == desired.is_on() {
            skipped.push(SkippedPort {
                port_index: status.port_index,
                name: status.name.clone(),
                reason: SkipReason::AlreadySatisfied {
                    mode: status.current_mode.clone(),
                },
            });
            continue;
        }

        actions.push(Action {
            port_index: status.port_index,
            port_name: status.name.clone(),
            from_mode: status.current_mode.clone(),
            target_mode: desired.target_mode().to_owned(),
            direction: desired,
        });
    }

    actions.sort_by_key(|a| a.port_index);
    skipped.sort_by_key(|s| s.port_index);

    Plan {
        desired,
        actions,
        skipped,
    }
}

/// The actions needed to bring `statuses` to `desired`.
pub fn resolve(statuses: &[PortStatus], desired: DesiredState) -> Vec<Action> {
    plan(statuses, desired).actions
}

/// [`resolve`] for a free-form state token (`on`, `disable`, `1`, ...).
pub fn resolve_token(statuses: &[PortStatus], token: &str) -> Result<Vec<Action>, CoreError> {
    let desired = DesiredState::parse_token(token)?;
    Ok(resolve(statuses, desired))
}
