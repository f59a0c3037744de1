//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use poectl_core::CoreError;

/// Process exit codes. Every failure, cancellation included, is `FAILURE`.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to controller at {url}")]
    #[diagnostic(
        code(poectl::connection_failed),
        help(
            "Check that the controller is running and reachable.\n\
             Cause: {reason}\n\
             Self-signed certificate? Leave --verify-ssl off."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed")]
    #[diagnostic(
        code(poectl::auth_failed),
        help("Verify the username and password of a local controller account.\n{message}")
    )]
    AuthFailed { message: String },

    // ── Device / ports ───────────────────────────────────────────────
    #[error("Switch with MAC {mac} not found")]
    #[diagnostic(
        code(poectl::device_not_found),
        help("Check the MAC address and the --site the switch is adopted in.")
    )]
    DeviceNotFound { mac: String },

    #[error("Device {device} does not have a port table")]
    #[diagnostic(
        code(poectl::not_a_switch),
        help("The MAC belongs to a device that is not a switch.")
    )]
    NotASwitch { device: String },

    #[error("No valid ports found with the specified indexes: {requested}")]
    #[diagnostic(
        code(poectl::no_valid_ports),
        help("Port indexes start at 1 and must exist on the switch.")
    )]
    NoValidPorts { requested: String },

    // ── Input ────────────────────────────────────────────────────────
    #[error("Invalid desired state: '{token}'")]
    #[diagnostic(
        code(poectl::invalid_state),
        help("Use --state on|off (also accepted: enable, disable, true, false, 1, 0).")
    )]
    InvalidState { token: String },

    #[error("Invalid port specification '{spec}': {reason}")]
    #[diagnostic(
        code(poectl::port_spec),
        help("Use comma-separated indexes and ranges, e.g. 1,3,5-8")
    )]
    PortSpec { spec: String, reason: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(poectl::validation))]
    Validation { field: String, reason: String },

    // ── Operation ────────────────────────────────────────────────────
    #[error("PoE configuration request failed")]
    #[diagnostic(
        code(poectl::apply_failed),
        help("The controller rejected the change: {message}")
    )]
    ApplyFailed { message: String },

    #[error("API error: {message}")]
    #[diagnostic(code(poectl::api_error))]
    Api { message: String },

    #[error("Confirmation prompt failed: {message}")]
    #[diagnostic(
        code(poectl::prompt),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    Prompt { message: String },

    /// Declined at the prompt. Not reported as an error.
    #[error("Operation cancelled")]
    Cancelled,

    /// Ctrl-C. Not reported as an error.
    #[error("Operation interrupted")]
    Interrupted,

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(poectl::config))]
    Config(Box<figment::Error>),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Whether this error should be rendered as a diagnostic.
    pub fn is_reportable(&self) -> bool {
        !matches!(self, Self::Cancelled | Self::Interrupted)
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }
            CoreError::DeviceNotFound { mac } => CliError::DeviceNotFound { mac },
            CoreError::NotASwitch { device } => CliError::NotASwitch { device },
            CoreError::NoValidPorts { requested } => CliError::NoValidPorts {
                requested: requested
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            },
            CoreError::InvalidState { token } => CliError::InvalidState { token },
            CoreError::PortSpecParse { spec, reason } => CliError::PortSpec { spec, reason },
            CoreError::ApplyFailed { message } => CliError::ApplyFailed { message },
            CoreError::UserCancelled => CliError::Cancelled,
            CoreError::Interrupted => CliError::Interrupted,
            CoreError::Prompt { message } => CliError::Prompt { message },
            CoreError::Api { message } => CliError::Api { message },
            CoreError::Config { field, message } => CliError::Validation {
                field,
                reason: message,
            },
        }
    }
}
