// ── HTTP client construction ──
//
// The platform probe and the session client must agree on TLS policy and
// timeout, so both are built from one `TransportConfig`.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;

use crate::error::Error;

const USER_AGENT: &str = concat!("poectl/", env!("CARGO_PKG_VERSION"));

/// Whether to check the controller's certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
    /// Validate against the system roots.
    System,
    /// Accept anything, including the self-signed certificate most
    /// controllers ship with.
    DangerAcceptInvalid,
}

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Session cookie store. Shared so a rebuilt client keeps the session.
    pub cookie_jar: Option<Arc<Jar>>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::DangerAcceptInvalid,
            timeout: Duration::from_secs(30),
            cookie_jar: None,
        }
    }
}

impl TransportConfig {
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(self.timeout)
            .danger_accept_invalid_certs(self.tls == TlsMode::DangerAcceptInvalid);

        let builder = match &self.cookie_jar {
            Some(jar) => builder.cookie_provider(Arc::clone(jar)),
            None => builder,
        };

        builder
            .build()
            .map_err(|e| Error::Tls(format!("cannot build HTTP client: {e}")))
    }

    /// Attach a fresh, empty cookie jar.
    pub fn with_cookie_jar(self) -> Self {
        Self {
            cookie_jar: Some(Arc::new(Jar::default())),
            ..self
        }
    }
}
