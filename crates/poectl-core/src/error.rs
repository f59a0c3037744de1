// ── Core error types ──
//
// One variant per way a run can end badly. Consumers never see HTTP
// status codes or JSON parse failures directly; the `From<poectl_api::Error>`
// impl translates transport-layer errors into these.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Cannot connect to controller at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    // ── Device / port errors ─────────────────────────────────────────
    #[error("Switch with MAC {mac} not found")]
    DeviceNotFound { mac: String },

    #[error("Device {device} does not have a port table (not a switch?)")]
    NotASwitch { device: String },

    #[error("No valid ports found with the specified indexes: {requested:?}")]
    NoValidPorts { requested: Vec<u32> },

    // ── Input errors ─────────────────────────────────────────────────
    #[error("Invalid desired state: '{token}'. Use 'on' or 'off'")]
    InvalidState { token: String },

    #[error("Invalid port specification '{spec}': {reason}")]
    PortSpecParse { spec: String, reason: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("PoE configuration request failed: {message}")]
    ApplyFailed { message: String },

    #[error("Operation cancelled by user")]
    UserCancelled,

    #[error("Operation interrupted")]
    Interrupted,

    #[error("Confirmation prompt failed: {message}")]
    Prompt { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    /// `field` names the offending input (`host`, `port`, ...).
    #[error("Configuration error in {field}: {message}")]
    Config { field: String, message: String },
}

impl CoreError {
    /// Whether this ending was the operator's choice rather than a failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::UserCancelled | Self::Interrupted)
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<poectl_api::Error> for CoreError {
    fn from(err: poectl_api::Error) -> Self {
        match err {
            poectl_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            poectl_api::Error::Transport(e)
                if e.is_connect() || e.is_timeout() || e.is_request() =>
            {
                CoreError::ConnectionFailed {
                    url: e
                        .url()
                        .map_or_else(|| "<unknown>".into(), ToString::to_string),
                    reason: e.to_string(),
                }
            }
            poectl_api::Error::Transport(e) => CoreError::Api {
                message: e.to_string(),
            },
            poectl_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            // Built from the controller URL plus site and endpoint paths.
            poectl_api::Error::InvalidUrl(e) => CoreError::Config {
                field: "request URL".into(),
                message: e.to_string(),
            },
            poectl_api::Error::LegacyApi { message } => CoreError::Api { message },
            poectl_api::Error::Deserialization { message, body: _ } => CoreError::Api {
                message: format!("Deserialization error: {message}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_auth_maps_to_authentication_failed() {
        let err = CoreError::from(poectl_api::Error::Authentication {
            message: "bad password".into(),
        });
        assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
    }

    #[test]
    fn api_tls_maps_to_connection_failed() {
        let err = CoreError::from(poectl_api::Error::Tls("handshake".into()));
        assert!(matches!(err, CoreError::ConnectionFailed { .. }));
    }

    #[test]
    fn bad_request_url_is_not_blamed_on_the_host() {
        let err = CoreError::from(poectl_api::Error::InvalidUrl(url::ParseError::EmptyHost));
        match err {
            CoreError::Config { field, message } => {
                assert_eq!(field, "request URL");
                assert!(message.contains("empty host"), "{message}");
            }
            other => panic!("expected Config, got {other:?}"),
        }
    }

    #[test]
    fn envelope_error_maps_to_api() {
        let err = CoreError::from(poectl_api::Error::LegacyApi {
            message: "api.err.NoSiteContext".into(),
        });
        assert!(err.to_string().contains("NoSiteContext"));
    }

    #[test]
    fn cancellation_is_not_a_failure_kind() {
        assert!(CoreError::UserCancelled.is_cancellation());
        assert!(CoreError::Interrupted.is_cancellation());
        assert!(!CoreError::NoValidPorts { requested: vec![1] }.is_cancellation());
    }
}
