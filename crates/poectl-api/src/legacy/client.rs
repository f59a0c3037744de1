// Session client for the controller's legacy API
//
// One `reqwest::Client` (with cookie jar) per controller session. Endpoint
// groups live in sibling files as inherent methods; this file owns URL
// building, the CSRF header, and decoding of the `{meta, data}` envelope.

use std::sync::{PoisonError, RwLock};

use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::auth::ControllerPlatform;
use crate::error::Error;
use crate::legacy::models::LegacyResponse;
use crate::transport::TransportConfig;

const CSRF_HEADER: &str = "X-CSRF-Token";
const CSRF_ROTATED_HEADER: &str = "X-Updated-CSRF-Token";

/// Longest body excerpt carried in an error message.
const BODY_PREVIEW_CHARS: usize = 200;

/// Authenticated connection to one site of one controller.
///
/// Cookies from [`login`](Self::login) ride along on every request. On
/// UniFi OS, writes also need the CSRF token handed out at login.
pub struct LegacyClient {
    http: reqwest::Client,
    base_url: Url,
    site: String,
    platform: ControllerPlatform,
    csrf: RwLock<Option<String>>,
}

impl LegacyClient {
    /// Build a client for `base_url` (the controller root, e.g.
    /// `https://192.168.1.1:443`). A cookie jar is added if `transport` has none.
    pub fn new(
        base_url: Url,
        site: String,
        platform: ControllerPlatform,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut transport = transport.clone();
        if transport.cookie_jar.is_none() {
            transport = transport.with_cookie_jar();
        }
        Ok(Self::with_client(
            transport.build_client()?,
            base_url,
            site,
            platform,
        ))
    }

    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        site: String,
        platform: ControllerPlatform,
    ) -> Self {
        Self {
            http,
            base_url,
            site,
            platform,
            csrf: RwLock::new(None),
        }
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn platform(&self) -> ControllerPlatform {
        self.platform
    }

    // ── CSRF ─────────────────────────────────────────────────────────

    fn set_csrf_token(&self, token: String) {
        *self.csrf.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    fn csrf_token(&self) -> Option<String> {
        self.csrf
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Keep the token from a login response, or a rotated one from any
    /// later response.
    pub(crate) fn capture_csrf(&self, headers: &HeaderMap) {
        let rotated = headers
            .get(CSRF_ROTATED_HEADER)
            .or_else(|| headers.get(CSRF_HEADER))
            .and_then(|v| v.to_str().ok());
        if let Some(token) = rotated {
            trace!("csrf token captured");
            self.set_csrf_token(token.to_owned());
        }
    }

    // ── Requests ─────────────────────────────────────────────────────

    /// `{base}{prefix}/api/s/{site}/{path}`, where the prefix is
    /// `/proxy/network` on UniFi OS and empty on classic controllers.
    pub(crate) fn site_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let prefix = self.platform.legacy_prefix();
        Ok(Url::parse(&format!(
            "{base}{prefix}/api/s/{site}/{path}",
            site = self.site
        ))?)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, Error> {
        self.send::<T, ()>(Method::GET, url, None).await
    }

    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<Vec<T>, Error> {
        self.send(Method::PUT, url, Some(body)).await
    }

    async fn send<T, B>(&self, method: Method, url: Url, body: Option<&B>) -> Result<Vec<T>, Error>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        debug!("{method} {url}");

        let is_write = method != Method::GET;
        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(token) = self.csrf_token().filter(|_| is_write) {
            request = request.header(CSRF_HEADER, token);
        }

        let resp = request.send().await?;
        self.capture_csrf(resp.headers());

        let status = resp.status();
        let body = resp.text().await?;
        check_status(status, &body)?;
        decode_envelope(&body)
    }
}

// ── Envelope decoding ────────────────────────────────────────────────

fn check_status(status: StatusCode, body: &str) -> Result<(), Error> {
    match status {
        StatusCode::UNAUTHORIZED => Err(Error::Authentication {
            message: "session expired or not logged in (HTTP 401)".into(),
        }),
        StatusCode::FORBIDDEN => Err(Error::LegacyApi {
            message: "account lacks permission for this site (HTTP 403)".into(),
        }),
        s if !s.is_success() => Err(Error::LegacyApi {
            message: format!("HTTP {s}: {}", preview(body)),
        }),
        _ => Ok(()),
    }
}

/// UniFi OS proxy failures arrive as HTTP 200 with this body instead of
/// the usual envelope.
#[derive(serde::Deserialize)]
struct ProxyFailure {
    error: ProxyFailureDetail,
}

#[derive(serde::Deserialize)]
struct ProxyFailureDetail {
    code: u16,
    #[serde(default)]
    message: String,
}

fn decode_envelope<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, Error> {
    if let Ok(ProxyFailure { error }) = serde_json::from_str::<ProxyFailure>(body) {
        return Err(if error.code == 401 {
            Error::Authentication {
                message: error.message,
            }
        } else {
            Error::LegacyApi {
                message: format!("UniFi OS error {}: {}", error.code, error.message),
            }
        });
    }

    let envelope: LegacyResponse<T> =
        serde_json::from_str(body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(body)),
            body: body.to_owned(),
        })?;

    if envelope.meta.rc == "ok" {
        Ok(envelope.data)
    } else {
        Err(Error::LegacyApi {
            message: envelope
                .meta
                .msg
                .unwrap_or_else(|| format!("rc={}", envelope.meta.rc)),
        })
    }
}

fn preview(body: &str) -> &str {
    body.char_indices()
        .nth(BODY_PREVIEW_CHARS)
        .map_or(body, |(idx, _)| &body[..idx])
}
