// ── Controller gateway ──
//
// The orchestrator only ever talks to the controller through this trait.
// `LegacyGateway` is the real implementation over `poectl_api`; tests use
// in-memory fakes.

use std::future::Future;

use tracing::debug;

use poectl_api::transport::{TlsMode, TransportConfig};
use poectl_api::{LegacyClient, PoeTarget};

use crate::config::{ControllerConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::DeviceRecord;

/// Session lifecycle plus the three calls a run needs.
///
/// A `Session` is acquired by [`connect`](Self::connect) and must be handed
/// back to [`close`](Self::close) exactly once.
pub trait ControllerGateway: Send + Sync {
    type Session: Send + Sync;

    /// Where this gateway connects to, for progress messages.
    fn endpoint(&self) -> String;

    /// Authenticate and open a session.
    fn connect(&self) -> impl Future<Output = Result<Self::Session, CoreError>> + Send;

    /// Enumerate every device on the configured site.
    fn list_devices(
        &self,
        session: &Self::Session,
    ) -> impl Future<Output = Result<Vec<DeviceRecord>, CoreError>> + Send;

    /// Set the PoE mode of several ports of one device in a single request.
    fn set_port_modes(
        &self,
        session: &Self::Session,
        device: &DeviceRecord,
        targets: &[(u32, &str)],
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Release the session.
    fn close(&self, session: Self::Session) -> impl Future<Output = Result<(), CoreError>> + Send;
}

/// [`ControllerGateway`] backed by the controller's legacy session API.
pub struct LegacyGateway {
    config: ControllerConfig,
}

impl LegacyGateway {
    pub fn new(config: ControllerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }
}

fn build_transport(config: &ControllerConfig) -> TransportConfig {
    let tls = match config.tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    };
    TransportConfig {
        tls,
        timeout: config.timeout,
        cookie_jar: None,
    }
    .with_cookie_jar()
}

impl ControllerGateway for LegacyGateway {
    type Session = LegacyClient;

    fn endpoint(&self) -> String {
        self.config.url.to_string()
    }

    async fn connect(&self) -> Result<LegacyClient, CoreError> {
        let config = &self.config;
        let transport = build_transport(config);

        let platform = LegacyClient::detect_platform(&config.url, &transport).await?;
        debug!(?platform, "detected controller platform");

        let client = LegacyClient::new(
            config.url.clone(),
            config.site.clone(),
            platform,
            &transport,
        )?;
        client.login(&config.username, &config.password).await?;
        debug!("session authentication successful");

        Ok(client)
    }

    async fn list_devices(&self, session: &LegacyClient) -> Result<Vec<DeviceRecord>, CoreError> {
        let devices = session.list_devices().await?;
        debug!(count = devices.len(), "fetched devices");
        Ok(devices.into_iter().map(DeviceRecord::from).collect())
    }

    async fn set_port_modes(
        &self,
        session: &LegacyClient,
        device: &DeviceRecord,
        targets: &[(u32, &str)],
    ) -> Result<(), CoreError> {
        let targets: Vec<PoeTarget<'_>> = targets
            .iter()
            .map(|&(index, mode)| {
                PoeTarget::new(index, mode).with_profile(device.port_profile(index))
            })
            .collect();
        session
            .set_poe_modes(&device.id, &device.port_overrides, &targets)
            .await
            .map_err(|e| CoreError::ApplyFailed {
                message: e.to_string(),
            })
    }

    async fn close(&self, session: LegacyClient) -> Result<(), CoreError> {
        session.logout().await?;
        Ok(())
    }
}
