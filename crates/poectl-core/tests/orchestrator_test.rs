#![allow(clippy::unwrap_used)]
// Orchestrator tests against an in-memory gateway.

use std::sync::Mutex;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

use poectl_core::{
    Action, AutoApprove, Confirmer, ControllerGateway, CoreError, DesiredState, DeviceRecord,
    MacAddress, Orchestrator, PortRecord, PortVerification, RunEvent, RunObserver, RunRequest,
    RunState, VerifyPolicy,
};

const SWITCH_MAC: &str = "00:11:22:33:44:55";

// ── Fakes ───────────────────────────────────────────────────────────

#[derive(Default)]
struct Calls {
    connects: usize,
    closes: usize,
    lists: usize,
    applied: Vec<Vec<(u32, String)>>,
}

struct FakeGateway {
    /// Devices listed before any change is applied.
    before: Vec<DeviceRecord>,
    /// Devices listed once a change went through.
    after: Vec<DeviceRecord>,
    connect_error: Mutex<Option<CoreError>>,
    apply_error: Mutex<Option<CoreError>>,
    /// When set, listing devices cancels this token and never returns.
    interrupt: Option<CancellationToken>,
    calls: Mutex<Calls>,
}

impl FakeGateway {
    fn new(before: Vec<DeviceRecord>) -> Self {
        Self {
            after: before.clone(),
            before,
            connect_error: Mutex::new(None),
            apply_error: Mutex::new(None),
            interrupt: None,
            calls: Mutex::new(Calls::default()),
        }
    }

    fn after(mut self, after: Vec<DeviceRecord>) -> Self {
        self.after = after;
        self
    }

    fn failing_connect(self, err: CoreError) -> Self {
        *self.connect_error.lock().unwrap() = Some(err);
        self
    }

    fn failing_apply(self, err: CoreError) -> Self {
        *self.apply_error.lock().unwrap() = Some(err);
        self
    }

    fn interrupting(mut self, token: CancellationToken) -> Self {
        self.interrupt = Some(token);
        self
    }
}

impl ControllerGateway for FakeGateway {
    type Session = u32;

    fn endpoint(&self) -> String {
        "https://fake:443/".into()
    }

    async fn connect(&self) -> Result<u32, CoreError> {
        if let Some(err) = self.connect_error.lock().unwrap().take() {
            return Err(err);
        }
        self.calls.lock().unwrap().connects += 1;
        Ok(7)
    }

    async fn list_devices(&self, session: &u32) -> Result<Vec<DeviceRecord>, CoreError> {
        assert_eq!(*session, 7);
        if let Some(token) = &self.interrupt {
            token.cancel();
            std::future::pending::<()>().await;
        }
        let mut calls = self.calls.lock().unwrap();
        calls.lists += 1;
        Ok(if calls.applied.is_empty() {
            self.before.clone()
        } else {
            self.after.clone()
        })
    }

    async fn set_port_modes(
        &self,
        _session: &u32,
        device: &DeviceRecord,
        targets: &[(u32, &str)],
    ) -> Result<(), CoreError> {
        assert_eq!(device.id, "sw1");
        if let Some(err) = self.apply_error.lock().unwrap().take() {
            return Err(err);
        }
        self.calls.lock().unwrap().applied.push(
            targets
                .iter()
                .map(|&(idx, mode)| (idx, mode.to_owned()))
                .collect(),
        );
        Ok(())
    }

    async fn close(&self, session: u32) -> Result<(), CoreError> {
        assert_eq!(session, 7);
        self.calls.lock().unwrap().closes += 1;
        Ok(())
    }
}

struct Decline;

impl Confirmer for Decline {
    async fn confirm(&self, _actions: &[Action]) -> Result<bool, CoreError> {
        Ok(false)
    }
}

/// Ctrl-C while the prompt owns the terminal.
struct InterruptedPrompt;

impl Confirmer for InterruptedPrompt {
    async fn confirm(&self, _actions: &[Action]) -> Result<bool, CoreError> {
        Err(CoreError::Interrupted)
    }
}

#[derive(Default)]
struct RecordingConfirmer {
    seen: Mutex<Vec<Vec<Action>>>,
}

impl Confirmer for RecordingConfirmer {
    async fn confirm(&self, actions: &[Action]) -> Result<bool, CoreError> {
        self.seen.lock().unwrap().push(actions.to_vec());
        Ok(true)
    }
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<RunEvent>>,
}

impl RunObserver for Recorder {
    fn on_event(&self, event: &RunEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

impl Recorder {
    fn events(&self) -> Vec<RunEvent> {
        self.events.lock().unwrap().clone()
    }

    fn transitions(&self) -> Vec<RunState> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RunEvent::Transition { to, .. } => Some(to),
                _ => None,
            })
            .collect()
    }
}

// ── Fixtures ────────────────────────────────────────────────────────

fn port(idx: u32, mode: Option<&str>, caps: u32) -> PortRecord {
    PortRecord {
        port_index: Some(idx),
        name: Some(format!("Port {idx}")),
        mode: mode.map(str::to_owned),
        enabled: mode.is_some_and(|m| m != "off"),
        capabilities: caps,
        profile: None,
    }
}

fn switch(ports: Vec<PortRecord>) -> DeviceRecord {
    DeviceRecord {
        id: "sw1".into(),
        mac: MacAddress::new(SWITCH_MAC),
        name: Some("Office Switch".into()),
        model: Some("US8P60".into()),
        ports: Some(ports),
        port_overrides: Vec::new(),
    }
}

fn access_point() -> DeviceRecord {
    DeviceRecord {
        id: "ap1".into(),
        mac: MacAddress::new("aa:bb:cc:dd:ee:ff"),
        name: Some("Lobby AP".into()),
        model: Some("U6-Lite".into()),
        ports: None,
        port_overrides: Vec::new(),
    }
}

/// Port 1 off, port 2 on, port 3 without PoE.
fn mixed_switch() -> DeviceRecord {
    switch(vec![
        port(1, Some("off"), 1),
        port(2, Some("auto"), 1),
        port(3, None, 0),
    ])
}

fn request(ports: &[u32], desired: DesiredState) -> RunRequest {
    RunRequest {
        switch_mac: MacAddress::new(SWITCH_MAC),
        ports: ports.to_vec(),
        desired,
    }
}

fn instant_verify(attempts: u32) -> VerifyPolicy {
    VerifyPolicy {
        settle_delay: Duration::ZERO,
        attempts,
        backoff_factor: 2,
    }
}

// ── Happy paths ─────────────────────────────────────────────────────

#[tokio::test]
async fn enables_only_ports_that_need_it() {
    let after = switch(vec![
        port(1, Some("auto"), 1),
        port(2, Some("auto"), 1),
        port(3, None, 0),
    ]);
    let gateway = FakeGateway::new(vec![access_point(), mixed_switch()]).after(vec![after]);
    let recorder = Recorder::default();
    let confirmer = RecordingConfirmer::default();
    let orch = Orchestrator::new(gateway, &confirmer, &recorder)
        .with_verify_policy(instant_verify(3));

    let report = orch
        .run(&request(&[1, 2, 3], DesiredState::Enable), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.state, RunState::Done);
    assert_eq!(report.device, "Office Switch");
    assert_eq!(
        report.actions,
        vec![Action {
            port_index: 1,
            port_name: "Port 1".into(),
            from_mode: "off".into(),
            target_mode: "auto".into(),
            direction: DesiredState::Enable,
        }]
    );
    assert_eq!(
        report.verification.get(&1),
        Some(&PortVerification::Confirmed {
            mode: "auto".into()
        })
    );
    assert!(!report.has_mismatches());

    let calls = orch.gateway().calls.lock().unwrap();
    assert_eq!(calls.applied, vec![vec![(1, "auto".to_owned())]]);
    assert_eq!(calls.lists, 2);
    assert_eq!(calls.closes, 1);
    assert_eq!(confirmer.seen.lock().unwrap().len(), 1);

    assert_eq!(
        recorder.transitions(),
        vec![
            RunState::Connected,
            RunState::DeviceLocated,
            RunState::StatusRead,
            RunState::ActionsResolved,
            RunState::Confirmed,
            RunState::Applied,
            RunState::Verified,
            RunState::Done,
        ]
    );
    assert!(recorder.events().contains(&RunEvent::PortVerified {
        port_index: 1,
        name: "Port 1".into(),
        mode: "auto".into(),
        direction: DesiredState::Enable,
    }));
}

#[tokio::test]
async fn already_in_desired_state_skips_confirm_and_apply() {
    let gateway = FakeGateway::new(vec![mixed_switch()]);
    let recorder = Recorder::default();
    let confirmer = RecordingConfirmer::default();
    let orch = Orchestrator::new(gateway, &confirmer, &recorder);

    let report = orch
        .run(&request(&[2, 3], DesiredState::Enable), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.state, RunState::Done);
    assert!(report.actions.is_empty());
    assert!(confirmer.seen.lock().unwrap().is_empty());

    let calls = orch.gateway().calls.lock().unwrap();
    assert!(calls.applied.is_empty());
    assert_eq!(calls.closes, 1);
    assert_eq!(
        recorder.transitions(),
        vec![
            RunState::Connected,
            RunState::DeviceLocated,
            RunState::StatusRead,
            RunState::Done,
        ]
    );
    assert!(recorder.events().contains(&RunEvent::NothingToDo {
        desired: DesiredState::Enable
    }));
}

#[tokio::test]
async fn mac_match_ignores_separators_and_case() {
    let gateway = FakeGateway::new(vec![mixed_switch()]);
    let orch = Orchestrator::new(gateway, AutoApprove, Recorder::default())
        .with_verify_policy(instant_verify(1));

    let mut req = request(&[1], DesiredState::Disable);
    req.switch_mac = MacAddress::new("00-11-22-33-44-55".to_uppercase());

    let report = orch.run(&req, &CancellationToken::new()).await.unwrap();
    assert!(report.actions.is_empty());
}

// ── Verification is advisory ────────────────────────────────────────

#[tokio::test]
async fn mismatch_after_apply_is_a_warning_not_a_failure() {
    // Controller accepted the change but still reports the port as off.
    let gateway = FakeGateway::new(vec![mixed_switch()]);
    let recorder = Recorder::default();
    let orch = Orchestrator::new(gateway, AutoApprove, &recorder)
        .with_verify_policy(instant_verify(3));

    let report = orch
        .run(&request(&[1], DesiredState::Enable), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.state, RunState::Done);
    assert!(report.has_mismatches());
    assert_eq!(
        report.verification.get(&1),
        Some(&PortVerification::Mismatch {
            expected: "auto".into(),
            actual: "off".into(),
        })
    );

    // One read to locate, then every verification attempt.
    assert_eq!(orch.gateway().calls.lock().unwrap().lists, 4);
    assert!(recorder.events().contains(&RunEvent::PortMismatch {
        port_index: 1,
        name: "Port 1".into(),
        expected: "auto".into(),
        actual: "off".into(),
    }));
}

#[tokio::test]
async fn vanished_device_makes_verification_unavailable() {
    let gateway = FakeGateway::new(vec![mixed_switch()]).after(vec![access_point()]);
    let recorder = Recorder::default();
    let orch = Orchestrator::new(gateway, AutoApprove, &recorder)
        .with_verify_policy(instant_verify(2));

    let report = orch
        .run(&request(&[1], DesiredState::Enable), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.state, RunState::Done);
    assert!(report.verification.is_empty());
    assert!(
        recorder
            .events()
            .iter()
            .any(|e| matches!(e, RunEvent::VerificationUnavailable { .. }))
    );
}

#[tokio::test(start_paused = true)]
async fn default_policy_waits_before_rereading() {
    let after = switch(vec![port(1, Some("off"), 1), port(2, Some("off"), 1)]);
    let gateway = FakeGateway::new(vec![mixed_switch()]).after(vec![after]);
    let orch = Orchestrator::new(gateway, AutoApprove, Recorder::default());

    let started = tokio::time::Instant::now();
    let report = orch
        .run(&request(&[1, 2], DesiredState::Disable), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.actions.len(), 1);
    assert_eq!(report.actions[0].port_index, 2);
    assert!(!report.has_mismatches());
    assert!(started.elapsed() >= VerifyPolicy::default().settle_delay);
}

// ── Aborts ──────────────────────────────────────────────────────────

#[tokio::test]
async fn bad_credentials_abort_without_a_session() {
    let gateway = FakeGateway::new(vec![mixed_switch()]).failing_connect(
        CoreError::AuthenticationFailed {
            message: "login failed (HTTP 400)".into(),
        },
    );
    let recorder = Recorder::default();
    let orch = Orchestrator::new(gateway, AutoApprove, &recorder);

    let err = orch
        .run(&request(&[1], DesiredState::Enable), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
    let calls = orch.gateway().calls.lock().unwrap();
    assert_eq!(calls.connects, 0);
    assert_eq!(calls.closes, 0);
    assert_eq!(recorder.transitions(), vec![RunState::Aborted]);
}

#[tokio::test]
async fn unknown_mac_is_device_not_found() {
    let gateway = FakeGateway::new(vec![access_point()]);
    let recorder = Recorder::default();
    let orch = Orchestrator::new(gateway, AutoApprove, &recorder);

    let err = orch
        .run(&request(&[1], DesiredState::Enable), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::DeviceNotFound { .. }));
    assert_eq!(orch.gateway().calls.lock().unwrap().closes, 1);
    assert_eq!(
        recorder.transitions(),
        vec![RunState::Connected, RunState::Aborted]
    );
}

#[tokio::test]
async fn device_without_port_table_is_not_a_switch() {
    let mut ap = access_point();
    ap.mac = MacAddress::new(SWITCH_MAC);
    let orch = Orchestrator::new(FakeGateway::new(vec![ap]), AutoApprove, Recorder::default());

    let err = orch
        .run(&request(&[1], DesiredState::Enable), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::NotASwitch { .. }));
    assert_eq!(orch.gateway().calls.lock().unwrap().closes, 1);
}

#[tokio::test]
async fn ports_absent_from_table_are_no_valid_ports() {
    let orch = Orchestrator::new(
        FakeGateway::new(vec![mixed_switch()]),
        AutoApprove,
        Recorder::default(),
    );

    let err = orch
        .run(&request(&[40, 41], DesiredState::Enable), &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        CoreError::NoValidPorts { requested } => assert_eq!(requested, vec![40, 41]),
        other => panic!("expected NoValidPorts, got {other:?}"),
    }
}

#[tokio::test]
async fn declined_confirmation_cancels_without_applying() {
    let recorder = Recorder::default();
    let orch = Orchestrator::new(FakeGateway::new(vec![mixed_switch()]), Decline, &recorder);

    let err = orch
        .run(&request(&[1, 2], DesiredState::Disable), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::UserCancelled));
    assert!(err.is_cancellation());
    let calls = orch.gateway().calls.lock().unwrap();
    assert!(calls.applied.is_empty());
    assert_eq!(calls.closes, 1);
    assert!(recorder.events().contains(&RunEvent::Cancelled));
    assert_eq!(recorder.transitions().last(), Some(&RunState::Aborted));
}

#[tokio::test]
async fn gateway_write_failure_becomes_apply_error() {
    let gateway = FakeGateway::new(vec![mixed_switch()]).failing_apply(CoreError::Api {
        message: "api.err.InvalidPayload".into(),
    });
    let orch = Orchestrator::new(gateway, AutoApprove, Recorder::default());

    let err = orch
        .run(&request(&[1], DesiredState::Enable), &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        CoreError::ApplyFailed { message } => assert!(message.contains("InvalidPayload")),
        other => panic!("expected ApplyFailed, got {other:?}"),
    }
    assert_eq!(orch.gateway().calls.lock().unwrap().closes, 1);
}

#[tokio::test]
async fn interrupt_mid_run_still_releases_session() {
    let cancel = CancellationToken::new();
    let gateway = FakeGateway::new(vec![mixed_switch()]).interrupting(cancel.clone());
    let orch = Orchestrator::new(gateway, AutoApprove, Recorder::default());

    let err = orch
        .run(&request(&[1], DesiredState::Enable), &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Interrupted));
    let calls = orch.gateway().calls.lock().unwrap();
    assert_eq!(calls.connects, 1);
    assert_eq!(calls.closes, 1);
}

#[tokio::test]
async fn interrupt_at_prompt_applies_nothing_and_releases_session() {
    let orch = Orchestrator::new(
        FakeGateway::new(vec![mixed_switch()]),
        InterruptedPrompt,
        Recorder::default(),
    );

    let err = orch
        .run(&request(&[1, 2], DesiredState::Disable), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Interrupted));
    let calls = orch.gateway().calls.lock().unwrap();
    assert!(calls.applied.is_empty());
    assert_eq!(calls.closes, 1);
}

#[tokio::test]
async fn interrupt_before_connect_opens_nothing() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let orch = Orchestrator::new(
        FakeGateway::new(vec![mixed_switch()]),
        AutoApprove,
        Recorder::default(),
    );

    let err = orch
        .run(&request(&[1], DesiredState::Enable), &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Interrupted));
    let calls = orch.gateway().calls.lock().unwrap();
    assert_eq!(calls.connects, 0);
    assert_eq!(calls.closes, 0);
}
