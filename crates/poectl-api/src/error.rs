// ── Transport-level errors ──
//
// What can go wrong talking to the controller, before any PoE meaning is
// attached. `poectl-core` folds these into its own error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Login rejected, or the session cookie is no longer accepted.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The request never produced a usable response (refused, DNS, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be set up with the requested TLS policy.
    #[error("TLS error: {0}")]
    Tls(String),

    /// The controller answered but refused: `meta.rc != "ok"`, an error
    /// status, or a UniFi OS proxy failure body.
    #[error("Controller API error: {message}")]
    LegacyApi { message: String },

    /// The body was not the JSON shape expected. `body` keeps it whole.
    #[error("Unexpected response: {message}")]
    Deserialization { message: String, body: String },
}
