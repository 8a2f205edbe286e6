// Session login/logout and platform detection for the legacy API.

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::legacy::client::LegacyClient;
use crate::platform::ControllerPlatform;
use crate::transport::{self, TransportConfig};

#[derive(Serialize)]
struct LoginBody<'a> {
    username: &'a str,
    password: &'a str,
}

impl LegacyClient {
    /// Log in with a local controller account.
    ///
    /// The session cookie lands in the client's jar. UniFi OS also hands
    /// out a CSRF token here, which later writes must echo.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        let url = self.base_url.join(self.platform.login_path())?;
        debug!(%url, username, "logging in");

        let body = LoginBody {
            username,
            password: password.expose_secret(),
        };
        let resp = transport::send(self.http.post(url).json(&body), self.timeout).await?;

        let status = resp.status();
        if !status.is_success() {
            let reply = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("login rejected (HTTP {status}): {}", transport::preview(&reply)),
            });
        }

        self.capture_csrf(resp.headers());
        Ok(())
    }

    /// End the session. The reply status is ignored.
    pub async fn logout(&self) -> Result<(), Error> {
        let url = self.base_url.join(self.platform.logout_path())?;
        debug!(%url, "logging out");
        transport::send(self.http.post(url), self.timeout).await?;
        Ok(())
    }

    /// Work out whether `base_url` is a UniFi OS console or a standalone
    /// Network Application.
    ///
    /// UniFi OS answers `/api/auth/login` with something other than 404.
    /// Failing that, any reply from `/api/login` means a classic controller.
    pub async fn detect_platform(
        base_url: &Url,
        config: &TransportConfig,
    ) -> Result<ControllerPlatform, Error> {
        let http = config.build_client()?;

        let probe = base_url.join(ControllerPlatform::UnifiOs.login_path())?;
        if let Ok(resp) = http.get(probe).send().await {
            if resp.status() != StatusCode::NOT_FOUND {
                return Ok(ControllerPlatform::UnifiOs);
            }
        }

        let probe = base_url.join(ControllerPlatform::ClassicController.login_path())?;
        transport::send(http.get(probe), config.timeout).await?;
        Ok(ControllerPlatform::ClassicController)
    }
}
