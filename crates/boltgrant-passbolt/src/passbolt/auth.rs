//! Session checks for an externally issued JWT.
//!
//! Endpoints:
//! - `GET  /auth/is-authenticated.json`: confirm the bearer token is live
//! - `POST /auth/jwt/logout.json`      : revoke the refresh token

use crate::passbolt::api_client::PassboltApiClient;
use crate::passbolt::types::*;
use log::{debug, info, warn};

/// Session-level API operations.
pub struct PassboltAuth;

impl PassboltAuth {
    /// Check if the current session is authenticated.
    ///
    /// A 401/403 answer means "not authenticated"; transport and server
    /// failures are returned as errors so callers can tell the two apart.
    pub async fn is_authenticated(client: &PassboltApiClient) -> Result<bool, PassboltError> {
        let result: Result<ApiResponse<serde_json::Value>, _> =
            client.get("/auth/is-authenticated.json").await;
        match result {
            Ok(resp) => Ok(resp.header.status == "success"),
            Err(e)
                if matches!(
                    e.kind,
                    PassboltErrorKind::SessionExpired
                        | PassboltErrorKind::Forbidden
                        | PassboltErrorKind::MfaRequired
                ) =>
            {
                debug!("Session check rejected: {}", e);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Verify the session and mark the client authenticated.
    pub async fn verify_session(client: &mut PassboltApiClient) -> Result<(), PassboltError> {
        if client.session().access_token.is_none() {
            return Err(PassboltError::auth_failed("No access token configured"));
        }
        if !Self::is_authenticated(client).await? {
            return Err(PassboltError::auth_failed(format!(
                "Access token rejected by {}",
                client.base_url()
            )));
        }
        client.session_mut().authenticated = true;
        info!("Session verified against {}", client.base_url());
        Ok(())
    }

    /// Logout (JWT). Failures are logged; local session state is cleared
    /// either way.
    pub async fn jwt_logout(client: &mut PassboltApiClient) {
        let refresh_token = client.session().refresh_token.clone();
        if refresh_token.is_some() {
            let payload = JwtLogoutRequest { refresh_token };
            if let Err(e) = client
                .post::<_, serde_json::Value>("/auth/jwt/logout.json", &payload)
                .await
            {
                warn!("JWT logout failed: {}", e);
            }
        }

        client.set_session(SessionState::default());
        info!("JWT logout complete");
    }
}
