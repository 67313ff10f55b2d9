//! HTTP API client for the Passbolt REST API.
//!
//! Handles the low-level HTTP communication with a Passbolt server:
//! - Request building with JWT Bearer authentication
//! - Query parameter construction for Passbolt's `contain[]` and `filter[]` system
//! - Response envelope unwrapping (`ApiResponse<T>`)
//! - Error mapping from HTTP status codes to `PassboltError`

use crate::passbolt::types::*;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Passbolt API client.
#[derive(Debug, Clone)]
pub struct PassboltApiClient {
    /// HTTP client.
    client: Client,
    /// Server base URL.
    base_url: String,
    /// Current session state.
    session: SessionState,
}

impl PassboltApiClient {
    /// Create a new API client.
    pub fn new(base_url: &str, verify_tls: bool, timeout_secs: u64) -> Result<Self, PassboltError> {
        let client = Client::builder()
            .danger_accept_invalid_certs(!verify_tls)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| PassboltError::network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session: SessionState::default(),
        })
    }

    /// Create from a `PassboltConfig`, carrying over its tokens.
    pub fn from_config(config: &PassboltConfig) -> Result<Self, PassboltError> {
        let mut client = Self::new(
            &config.server_url,
            config.verify_tls,
            config.request_timeout_secs,
        )?;
        client.session.access_token = config.access_token.clone();
        client.session.refresh_token = config.refresh_token.clone();
        Ok(client)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get a reference to the current session.
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Get a mutable reference to the session.
    pub fn session_mut(&mut self) -> &mut SessionState {
        &mut self.session
    }

    /// Set the session state.
    pub fn set_session(&mut self, session: SessionState) {
        self.session = session;
    }

    /// Check if authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.session.authenticated
    }

    // ── Request building ────────────────────────────────────────────

    /// Build a URL from a path.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Create an authenticated request builder.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        let mut builder = self.client.request(method, &url);

        if let Some(ref token) = self.session.access_token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        builder
    }

    /// Build query parameters for Passbolt's `contain[key]=1` / `filter[key]=value` style.
    pub fn build_contain_filter_params(
        &self,
        contains: &[(&str, bool)],
        filters: &[(&str, &str)],
    ) -> Vec<(String, String)> {
        let mut params = Vec::new();
        for (key, val) in contains {
            if *val {
                params.push((format!("contain[{}]", key), "1".to_string()));
            }
        }
        for (key, val) in filters {
            params.push((format!("filter[{}]", key), val.to_string()));
        }
        params
    }

    // ── Response handling ───────────────────────────────────────────

    /// Execute a request and parse the standard Passbolt envelope.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<ApiResponse<T>, PassboltError> {
        let response = builder.send().await.map_err(Self::transport_error)?;
        self.handle_response(response).await
    }

    fn transport_error(e: reqwest::Error) -> PassboltError {
        if e.is_timeout() {
            PassboltError::timeout(format!("Request timed out: {}", e))
        } else {
            PassboltError::network(format!("Request failed: {}", e))
        }
    }

    /// Handle a raw HTTP response.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<ApiResponse<T>, PassboltError> {
        let status = response.status();
        let url = response.url().to_string();

        if status.is_success() {
            let text = response.text().await.map_err(|e| {
                PassboltError::parse(format!("Failed to read response body: {}", e))
            })?;
            return serde_json::from_str(&text).map_err(|e| {
                PassboltError::parse(format!(
                    "Failed to parse response JSON: {} (url: {})",
                    e, url
                ))
            });
        }

        let text = response.text().await.unwrap_or_default();
        if status == StatusCode::FORBIDDEN && (text.contains("MFA") || text.contains("mfa")) {
            return Err(PassboltError::mfa_required("MFA verification required"));
        }
        Err(self.error_from_status(status, &text, &url))
    }

    /// Map a non-success HTTP status to a PassboltError.
    fn error_from_status(&self, status: StatusCode, body: &str, url: &str) -> PassboltError {
        match status {
            StatusCode::BAD_REQUEST => {
                PassboltError::bad_request(format!("Bad request: {} ({})", body, url))
            }
            StatusCode::UNAUTHORIZED => {
                PassboltError::session_expired("Authentication required or session expired")
            }
            StatusCode::FORBIDDEN => PassboltError::forbidden(format!("Access denied: {}", url)),
            StatusCode::NOT_FOUND => PassboltError::not_found(format!("Not found: {}", url)),
            StatusCode::CONFLICT => PassboltError::conflict("Entity was modified by another user"),
            StatusCode::TOO_MANY_REQUESTS => PassboltError::rate_limited("Rate limited by server"),
            s if s.is_server_error() => {
                PassboltError::server(format!("Server error {}: {}", s.as_u16(), body))
            }
            s => PassboltError::api(format!("Unexpected status {}: {}", s.as_u16(), body)),
        }
    }

    // ── Convenience HTTP methods ────────────────────────────────────

    /// GET request with full envelope.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<ApiResponse<T>, PassboltError> {
        let builder = self.request(Method::GET, path);
        self.execute(builder).await
    }

    /// GET request with query parameters.
    pub async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<ApiResponse<T>, PassboltError> {
        let builder = self.request(Method::GET, path).query(params);
        self.execute(builder).await
    }

    /// POST request with JSON body.
    pub async fn post<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse<T>, PassboltError> {
        let builder = self.request(Method::POST, path).json(body);
        self.execute(builder).await
    }

    /// PUT request with JSON body.
    pub async fn put<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse<T>, PassboltError> {
        let builder = self.request(Method::PUT, path).json(body);
        self.execute(builder).await
    }
}

// ── Tests ───────────────────────────────────────────────────────────
