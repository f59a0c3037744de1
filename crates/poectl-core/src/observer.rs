// ── Run observer ──
//
// Everything the orchestrator has to say goes through a `RunObserver`
// instead of a process-wide logger. `TracingObserver` turns the events
// into log lines; tests record them.

use tracing::{debug, info, warn};

use crate::model::{Action, DesiredState, PortStatus};
use crate::orchestrator::RunState;
use crate::resolve::{SkipReason, SkippedPort};

/// Progress and diagnostics emitted during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    Transition { from: RunState, to: RunState },
    Connecting { endpoint: String },
    Connected,
    LookingForDevice { mac: String },
    DeviceFound { name: String, model: Option<String> },
    PortsRead { statuses: Vec<PortStatus> },
    PortSkipped(SkippedPort),
    ActionPlanned(Action),
    NothingToDo { desired: DesiredState },
    Cancelled,
    Applying { count: usize },
    Applied,
    Verifying { attempt: u32, of: u32 },
    PortVerified { port_index: u32, name: String, mode: String, direction: DesiredState },
    PortMismatch { port_index: u32, name: String, expected: String, actual: String },
    PortMissing { port_index: u32 },
    VerificationUnavailable { reason: String },
    SessionReleased,
    SessionReleaseFailed { error: String },
    Completed,
}

pub trait RunObserver: Send + Sync {
    fn on_event(&self, event: &RunEvent);
}

impl<T: RunObserver + ?Sized> RunObserver for &T {
    fn on_event(&self, event: &RunEvent) {
        (**self).on_event(event);
    }
}

/// Reports run events as `tracing` log lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RunObserver for TracingObserver {
    #[allow(clippy::cognitive_complexity)]
    fn on_event(&self, event: &RunEvent) {
        match event {
            RunEvent::Transition { from, to } => debug!(%from, %to, "state transition"),
            RunEvent::Connecting { endpoint } => {
                info!("Connecting to UniFi controller at {endpoint}");
            }
            RunEvent::Connected => info!("Successfully connected to UniFi controller"),
            RunEvent::LookingForDevice { mac } => info!("Looking for switch with MAC: {mac}"),
            RunEvent::DeviceFound { name, model } => {
                info!("Found switch: {name} ({})", model.as_deref().unwrap_or("unknown model"));
            }
            RunEvent::PortsRead { statuses } => {
                info!("Current PoE status for {} ports:", statuses.len());
                for s in statuses {
                    info!("  Port {} ({}): {}", s.port_index, s.name, s.current_mode);
                }
            }
            RunEvent::PortSkipped(skip) => match &skip.reason {
                SkipReason::NoPoeSupport => {
                    warn!("Port {} ({}) does not support PoE", skip.port_index, skip.name);
                }
                SkipReason::AlreadySatisfied { mode } => {
                    info!(
                        "Port {} ({}) is already in the desired state ({mode})",
                        skip.port_index, skip.name
                    );
                }
            },
            RunEvent::ActionPlanned(a) => info!(
                "Will {} PoE on port {} ({}): {} -> {}",
                a.direction, a.port_index, a.port_name, a.from_mode, a.target_mode
            ),
            RunEvent::NothingToDo { desired } => {
                info!("All specified ports are already in the desired state ({desired})");
            }
            RunEvent::Cancelled => info!("Operation cancelled by user"),
            RunEvent::Applying { count } => {
                info!("Sending PoE configuration request for {count} ports...");
            }
            RunEvent::Applied => info!("PoE configuration request completed successfully"),
            RunEvent::Verifying { attempt, of } => {
                info!("Verifying PoE configuration changes (attempt {attempt}/{of})...");
            }
            RunEvent::PortVerified { port_index, name, mode, direction } => {
                info!("✓ Port {port_index} ({name}): PoE {direction}d successfully ({mode})");
            }
            RunEvent::PortMismatch { port_index, name, expected, actual } => {
                warn!("⚠ Port {port_index} ({name}): Expected {expected}, got {actual}");
            }
            RunEvent::PortMissing { port_index } => {
                warn!("⚠ Port {port_index}: not present in refreshed port table");
            }
            RunEvent::VerificationUnavailable { reason } => {
                warn!("Could not verify PoE changes: {reason}");
            }
            RunEvent::SessionReleased => debug!("controller session released"),
            RunEvent::SessionReleaseFailed { error } => {
                warn!("Failed to release controller session: {error}");
            }
            RunEvent::Completed => info!("PoE configuration operation completed"),
        }
    }
}
