// ── Runtime connection configuration ──
//
// These types describe how to reach the controller and how patient to be
// when verifying. They carry credential data but never touch disk; the
// CLI builds them and hands them in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::error::CoreError;

/// TLS verification strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Skip verification (self-signed certs). Default for local controllers.
    #[default]
    DangerAcceptInvalid,
}

/// Configuration for connecting to a single controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Controller URL (e.g., `https://192.168.1.1:443`).
    pub url: Url,
    pub username: String,
    pub password: SecretString,
    /// Site to operate on (defaults to "default").
    pub site: String,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// How post-apply verification waits for the controller to catch up.
///
/// The first re-read happens after `settle_delay`; while any acted-on port
/// still disagrees, up to `attempts` reads are made in total, each delay
/// multiplied by `backoff_factor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyPolicy {
    pub settle_delay: Duration,
    pub attempts: u32,
    pub backoff_factor: u32,
}

impl Default for VerifyPolicy {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(2),
            attempts: 3,
            backoff_factor: 2,
        }
    }
}

impl VerifyPolicy {
    /// Delay before the `attempt`-th read (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.backoff_factor.max(1).saturating_pow(attempt);
        self.settle_delay.saturating_mul(factor)
    }
}

/// Build the controller base URL from a host and port.
///
/// A bare host becomes `https://{host}:{port}`. A host that already carries
/// an `http://` or `https://` scheme is kept, with `port` applied.
pub fn controller_url(host: &str, port: u16) -> Result<Url, CoreError> {
    let host = host.trim().trim_end_matches('/');
    let raw = if host.starts_with("http://") || host.starts_with("https://") {
        host.to_owned()
    } else {
        format!("https://{host}")
    };

    let mut url: Url = raw.parse().map_err(|e| CoreError::Config {
        field: "host".into(),
        message: format!("'{host}' is not a valid controller host: {e}"),
    })?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(CoreError::Config {
            field: "host".into(),
            message: format!("'{host}' is not a valid controller host"),
        });
    }
    url.set_port(Some(port)).map_err(|()| CoreError::Config {
        field: "port".into(),
        message: format!("cannot use port {port} with '{host}'"),
    })?;
    Ok(url)
}
