// Session lifecycle: platform probe, login, logout.
//
// Login stores the session cookie in the client's jar; every later request
// on the same `LegacyClient` is authenticated by it.

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::auth::ControllerPlatform;
use crate::error::Error;
use crate::legacy::client::LegacyClient;
use crate::transport::TransportConfig;

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

impl LegacyClient {
    /// Log in with a local controller account.
    ///
    /// Posts to the platform's login path (`/api/auth/login` on UniFi OS,
    /// `/api/login` on classic controllers). A 400, 401 or 403 answer is an
    /// [`Error::Authentication`]; any other non-2xx is an [`Error::LegacyApi`].
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        let url = self.base_url().join(self.platform().login_path())?;
        debug!(%url, username, "logging in");

        let resp = self
            .http()
            .post(url)
            .json(&Credentials {
                username,
                password: password.expose_secret(),
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = format!("login failed (HTTP {status}): {}", body.trim());
            return Err(match status {
                StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    Error::Authentication { message }
                }
                // A restarting controller answers 502/503 on its login page.
                _ => Error::LegacyApi { message },
            });
        }

        self.capture_csrf(resp.headers());
        debug!("logged in");
        Ok(())
    }

    /// Best-effort logout. The response status is ignored; only a transport
    /// failure is an error.
    pub async fn logout(&self) -> Result<(), Error> {
        let url = self.base_url().join(self.platform().logout_path())?;
        debug!(%url, "logging out");
        self.http().post(url).send().await?;
        Ok(())
    }

    /// Work out which kind of controller lives at `base_url`.
    ///
    /// UniFi OS answers `GET /api/auth/login` with something other than 404
    /// (typically 401 or 405). Otherwise `/api/login` must answer at all for
    /// a classic controller; if it cannot be reached the transport error is
    /// returned.
    pub async fn detect_platform(
        base_url: &Url,
        transport: &TransportConfig,
    ) -> Result<ControllerPlatform, Error> {
        let http = transport.build_client()?;
        let probe = |platform: ControllerPlatform| {
            let url = base_url.join(platform.login_path());
            let http = http.clone();
            async move {
                let url = url?;
                debug!(%url, "probing");
                Ok::<_, Error>(http.get(url).send().await?.status())
            }
        };

        let unifi_os = probe(ControllerPlatform::UnifiOs).await;
        if matches!(unifi_os, Ok(status) if status != StatusCode::NOT_FOUND) {
            debug!("UniFi OS controller");
            return Ok(ControllerPlatform::UnifiOs);
        }

        let status = probe(ControllerPlatform::ClassicController).await?;
        debug!(%status, "classic controller");
        Ok(ControllerPlatform::ClassicController)
    }
}
