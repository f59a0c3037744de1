// ── Run orchestration ──
//
// One run: connect → locate device → read ports → resolve → confirm →
// apply → verify. Every step is awaited before the next; the session is
// released on every path once acquired, including interruption.

use std::collections::BTreeMap;

use serde::Serialize;
use strum::Display;
use tokio_util::sync::CancellationToken;

use crate::config::VerifyPolicy;
use crate::confirm::Confirmer;
use crate::error::CoreError;
use crate::gateway::ControllerGateway;
use crate::model::{Action, DesiredState, DeviceRecord, MacAddress, extract_port_statuses};
use crate::observer::{RunEvent, RunObserver};
use crate::resolve::plan;

// ── RunState ─────────────────────────────────────────────────────

/// Where a run is in its lifecycle. `Done` and `Aborted` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
pub enum RunState {
    Disconnected,
    Connected,
    DeviceLocated,
    StatusRead,
    ActionsResolved,
    Confirmed,
    Applied,
    Verified,
    Done,
    Aborted,
}

// ── Request / report ─────────────────────────────────────────────

/// What one run should do.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub switch_mac: MacAddress,
    /// Sorted, de-duplicated port indexes.
    pub ports: Vec<u32>,
    pub desired: DesiredState,
}

/// Post-apply check of one acted-on port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PortVerification {
    Confirmed { mode: String },
    Mismatch { expected: String, actual: String },
    Missing,
}

/// Result of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub state: RunState,
    pub device: String,
    /// Empty when every port was already in the desired state.
    pub actions: Vec<Action>,
    /// Keyed by port index. Empty when nothing was applied or the
    /// device could not be re-read.
    pub verification: BTreeMap<u32, PortVerification>,
}

impl RunReport {
    pub fn has_mismatches(&self) -> bool {
        self.verification
            .values()
            .any(|v| !matches!(v, PortVerification::Confirmed { .. }))
    }
}

// ── State tracking ───────────────────────────────────────────────

struct StateTracker<'a, O> {
    state: RunState,
    observer: &'a O,
}

impl<'a, O: RunObserver> StateTracker<'a, O> {
    fn new(observer: &'a O) -> Self {
        Self {
            state: RunState::Disconnected,
            observer,
        }
    }

    fn advance(&mut self, to: RunState) {
        self.observer.on_event(&RunEvent::Transition {
            from: self.state,
            to,
        });
        self.state = to;
    }
}

// ── Orchestrator ─────────────────────────────────────────────────

/// Drives one PoE run against a [`ControllerGateway`].
pub struct Orchestrator<G, C, O> {
    gateway: G,
    confirmer: C,
    observer: O,
    verify: VerifyPolicy,
}

impl<G, C, O> Orchestrator<G, C, O>
where
    G: ControllerGateway,
    C: Confirmer,
    O: RunObserver,
{
    pub fn new(gateway: G, confirmer: C, observer: O) -> Self {
        Self {
            gateway,
            confirmer,
            observer,
            verify: VerifyPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_verify_policy(mut self, verify: VerifyPolicy) -> Self {
        self.verify = verify;
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Execute the run. `Ok` means the terminal state was `Done`; any `Err`
    /// means the run was aborted for that reason.
    ///
    /// Cancelling `cancel` aborts with [`CoreError::Interrupted`]. Once a
    /// session is open it is closed before returning, whatever the outcome.
    pub async fn run(
        &self,
        request: &RunRequest,
        cancel: &CancellationToken,
    ) -> Result<RunReport, CoreError> {
        let mut tracker = StateTracker::new(&self.observer);
        let result = self.run_session(request, cancel, &mut tracker).await;
        if result.is_err() {
            tracker.advance(RunState::Aborted);
        }
        result
    }

    async fn run_session(
        &self,
        request: &RunRequest,
        cancel: &CancellationToken,
        tracker: &mut StateTracker<'_, O>,
    ) -> Result<RunReport, CoreError> {
        self.observer.on_event(&RunEvent::Connecting {
            endpoint: self.gateway.endpoint(),
        });

        let session = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(CoreError::Interrupted),
            session = self.gateway.connect() => session?,
        };
        self.observer.on_event(&RunEvent::Connected);
        tracker.advance(RunState::Connected);

        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(CoreError::Interrupted),
            result = self.drive(&session, request, tracker) => result,
        };

        match self.gateway.close(session).await {
            Ok(()) => self.observer.on_event(&RunEvent::SessionReleased),
            Err(e) => self.observer.on_event(&RunEvent::SessionReleaseFailed {
                error: e.to_string(),
            }),
        }

        result
    }

    async fn drive(
        &self,
        session: &G::Session,
        request: &RunRequest,
        tracker: &mut StateTracker<'_, O>,
    ) -> Result<RunReport, CoreError> {
        let device = self.locate(session, &request.switch_mac).await?;
        tracker.advance(RunState::DeviceLocated);

        let statuses = extract_port_statuses(&device, &request.ports)?;
        if statuses.is_empty() {
            return Err(CoreError::NoValidPorts {
                requested: request.ports.clone(),
            });
        }
        self.observer.on_event(&RunEvent::PortsRead {
            statuses: statuses.clone(),
        });
        tracker.advance(RunState::StatusRead);

        let plan = plan(&statuses, request.desired);
        for skip in &plan.skipped {
            self.observer.on_event(&RunEvent::PortSkipped(skip.clone()));
        }

        if plan.is_noop() {
            self.observer.on_event(&RunEvent::NothingToDo {
                desired: request.desired,
            });
            tracker.advance(RunState::Done);
            return Ok(RunReport {
                state: RunState::Done,
                device: device.label(),
                actions: Vec::new(),
                verification: BTreeMap::new(),
            });
        }

        for action in &plan.actions {
            self.observer.on_event(&RunEvent::ActionPlanned(action.clone()));
        }
        tracker.advance(RunState::ActionsResolved);

        if !self.confirmer.confirm(&plan.actions).await? {
            self.observer.on_event(&RunEvent::Cancelled);
            return Err(CoreError::UserCancelled);
        }
        tracker.advance(RunState::Confirmed);

        self.apply(session, &device, &plan.actions).await?;
        tracker.advance(RunState::Applied);

        let verification = self.verify(session, &device.mac, &plan.actions).await;
        tracker.advance(RunState::Verified);

        tracker.advance(RunState::Done);
        self.observer.on_event(&RunEvent::Completed);

        Ok(RunReport {
            state: RunState::Done,
            device: device.label(),
            actions: plan.actions,
            verification,
        })
    }

    async fn locate(
        &self,
        session: &G::Session,
        mac: &MacAddress,
    ) -> Result<DeviceRecord, CoreError> {
        self.observer.on_event(&RunEvent::LookingForDevice {
            mac: mac.to_string(),
        });

        let device = self
            .gateway
            .list_devices(session)
            .await?
            .into_iter()
            .find(|d| d.mac == *mac)
            .ok_or_else(|| CoreError::DeviceNotFound {
                mac: mac.to_string(),
            })?;

        self.observer.on_event(&RunEvent::DeviceFound {
            name: device.label(),
            model: device.model.clone(),
        });
        Ok(device)
    }

    async fn apply(
        &self,
        session: &G::Session,
        device: &DeviceRecord,
        actions: &[Action],
    ) -> Result<(), CoreError> {
        self.observer.on_event(&RunEvent::Applying {
            count: actions.len(),
        });

        let targets: Vec<(u32, &str)> = actions
            .iter()
            .map(|a| (a.port_index, a.target_mode.as_str()))
            .collect();

        self.gateway
            .set_port_modes(session, device, &targets)
            .await
            .map_err(|e| match e {
                CoreError::ApplyFailed { .. } => e,
                other => CoreError::ApplyFailed {
                    message: other.to_string(),
                },
            })?;

        self.observer.on_event(&RunEvent::Applied);
        Ok(())
    }

    /// Re-read the device until every acted-on port reports its target mode
    /// or the attempts run out. Never fails the run: problems are reported
    /// through the observer.
    async fn verify(
        &self,
        session: &G::Session,
        mac: &MacAddress,
        actions: &[Action],
    ) -> BTreeMap<u32, PortVerification> {
        let attempts = self.verify.attempts.max(1);
        let mut last = Err(String::from("no verification attempt made"));

        for attempt in 0..attempts {
            tokio::time::sleep(self.verify.delay_for(attempt)).await;
            self.observer.on_event(&RunEvent::Verifying {
                attempt: attempt + 1,
                of: attempts,
            });

            last = self.read_back(session, mac, actions).await;
            if let Ok(ref checks) = last {
                if checks
                    .values()
                    .all(|c| matches!(c, PortVerification::Confirmed { .. }))
                {
                    break;
                }
            }
        }

        let checks = match last {
            Ok(checks) => checks,
            Err(reason) => {
                self.observer
                    .on_event(&RunEvent::VerificationUnavailable { reason });
                return BTreeMap::new();
            }
        };

        for action in actions {
            let event = match checks.get(&action.port_index) {
                Some(PortVerification::Confirmed { mode }) => RunEvent::PortVerified {
                    port_index: action.port_index,
                    name: action.port_name.clone(),
                    mode: mode.clone(),
                    direction: action.direction,
                },
                Some(PortVerification::Mismatch { expected, actual }) => RunEvent::PortMismatch {
                    port_index: action.port_index,
                    name: action.port_name.clone(),
                    expected: expected.clone(),
                    actual: actual.clone(),
                },
                Some(PortVerification::Missing) | None => RunEvent::PortMissing {
                    port_index: action.port_index,
                },
            };
            self.observer.on_event(&event);
        }

        checks
    }

    async fn read_back(
        &self,
        session: &G::Session,
        mac: &MacAddress,
        actions: &[Action],
    ) -> Result<BTreeMap<u32, PortVerification>, String> {
        let devices = self
            .gateway
            .list_devices(session)
            .await
            .map_err(|e| e.to_string())?;
        let device = devices
            .iter()
            .find(|d| d.mac == *mac)
            .ok_or_else(|| format!("device {mac} is no longer listed"))?;

        let indexes: Vec<u32> = actions.iter().map(|a| a.port_index).collect();
        let statuses = extract_port_statuses(device, &indexes).map_err(|e| e.to_string())?;

        Ok(actions
            .iter()
            .map(|action| {
                let check = match statuses.iter().find(|s| s.port_index == action.port_index) {
                    Some(s) if s.current_mode == action.target_mode => {
                        PortVerification::Confirmed {
                            mode: s.current_mode.clone(),
                        }
                    }
                    Some(s) => PortVerification::Mismatch {
                        expected: action.target_mode.clone(),
                        actual: s.current_mode.clone(),
                    },
                    None => PortVerification::Missing,
                };
                (action.port_index, check)
            })
            .collect())
    }
}
