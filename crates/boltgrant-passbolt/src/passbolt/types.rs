//! Core types for the Passbolt sharing integration.
//!
//! Defines the data models matching the Passbolt API response shapes used by
//! folder sharing, configuration and session structures, and the HTTP-level
//! error type.

use serde::{Deserialize, Serialize};
use std::fmt;

// ── Error types ─────────────────────────────────────────────────────

/// Passbolt-specific error kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PassboltErrorKind {
    /// Authentication failed or the supplied token was rejected.
    AuthFailed,
    /// Session expired or not authenticated.
    SessionExpired,
    /// MFA verification required before proceeding.
    MfaRequired,
    /// The requested item was not found (404).
    NotFound,
    /// Permission denied (403).
    Forbidden,
    /// Bad request (validation error from server).
    BadRequest,
    /// A network or HTTP request error.
    NetworkError,
    /// The Passbolt REST API returned an error.
    ApiError,
    /// JSON parsing or serialization failure.
    ParseError,
    /// Invalid configuration or arguments.
    InvalidConfig,
    /// Rate limited by the server.
    RateLimited,
    /// The HTTP request timed out.
    Timeout,
    /// Conflict: entity was updated by another user.
    Conflict,
    /// Server-side error (5xx).
    ServerError,
}

/// A Passbolt API error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassboltError {
    pub kind: PassboltErrorKind,
    pub message: String,
}

impl fmt::Display for PassboltError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for PassboltError {}

impl PassboltError {
    fn with_kind(kind: PassboltErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            message: msg.into(),
        }
    }

    pub fn auth_failed(msg: impl Into<String>) -> Self {
        Self::with_kind(PassboltErrorKind::AuthFailed, msg)
    }
    pub fn session_expired(msg: impl Into<String>) -> Self {
        Self::with_kind(PassboltErrorKind::SessionExpired, msg)
    }
    pub fn mfa_required(msg: impl Into<String>) -> Self {
        Self::with_kind(PassboltErrorKind::MfaRequired, msg)
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::with_kind(PassboltErrorKind::NotFound, msg)
    }
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::with_kind(PassboltErrorKind::Forbidden, msg)
    }
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::with_kind(PassboltErrorKind::BadRequest, msg)
    }
    pub fn network(msg: impl Into<String>) -> Self {
        Self::with_kind(PassboltErrorKind::NetworkError, msg)
    }
    pub fn api(msg: impl Into<String>) -> Self {
        Self::with_kind(PassboltErrorKind::ApiError, msg)
    }
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::with_kind(PassboltErrorKind::ParseError, msg)
    }
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::with_kind(PassboltErrorKind::InvalidConfig, msg)
    }
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::with_kind(PassboltErrorKind::RateLimited, msg)
    }
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::with_kind(PassboltErrorKind::Timeout, msg)
    }
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::with_kind(PassboltErrorKind::Conflict, msg)
    }
    pub fn server(msg: impl Into<String>) -> Self {
        Self::with_kind(PassboltErrorKind::ServerError, msg)
    }
}

// ── Configuration ───────────────────────────────────────────────────

/// Passbolt connection configuration.
///
/// The access token is obtained outside this crate (browser extension,
/// `passbolt` CLI, or a prior JWT login) and is only presented as a bearer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassboltConfig {
    /// Passbolt server base URL (e.g. `https://passbolt.example.com`).
    pub server_url: String,
    /// Whether to verify TLS certificates.
    pub verify_tls: bool,
    /// JWT access token for the acting user.
    pub access_token: Option<String>,
    /// JWT refresh token, revoked on disconnect when present.
    pub refresh_token: Option<String>,
    /// Per-request HTTP timeout in seconds.
    pub request_timeout_secs: u64,
    /// Overall deadline for one reconciliation, in seconds.
    pub operation_timeout_secs: Option<u64>,
}

impl Default for PassboltConfig {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            verify_tls: true,
            access_token: None,
            refresh_token: None,
            request_timeout_secs: 30,
            operation_timeout_secs: None,
        }
    }
}

// ── Session state ───────────────────────────────────────────────────

/// Current session state with the Passbolt server.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionState {
    /// Whether the session was confirmed by the server.
    pub authenticated: bool,
    /// JWT access token.
    pub access_token: Option<String>,
    /// JWT refresh token.
    pub refresh_token: Option<String>,
}

/// JWT logout payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtLogoutRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

// ── API response envelope ───────────────────────────────────────────

/// Passbolt standard API response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub header: ApiResponseHeader,
    pub body: T,
}

/// API response header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponseHeader {
    #[serde(default)]
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub servertime: i64,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub code: u16,
}

// ── Folders ─────────────────────────────────────────────────────────

/// A folder in the Passbolt hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal: Option<bool>,
    // ── Containable ───
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<Permission>>,
}

impl Folder {
    /// Personal folders are visible to their owner only and cannot be shared
    /// by name. A missing flag counts as shared.
    pub fn is_personal(&self) -> bool {
        self.personal.unwrap_or(false)
    }

    /// Permission entries returned with the folder, empty when the server
    /// did not include them.
    pub fn permissions(&self) -> &[Permission] {
        self.permissions.as_deref().unwrap_or(&[])
    }
}

// ── Users ───────────────────────────────────────────────────────────

/// A Passbolt user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_id: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub deleted: bool,
}

// ── Groups ──────────────────────────────────────────────────────────

/// A group that users belong to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub deleted: bool,
}

// ── Permissions & sharing ───────────────────────────────────────────

/// Kind of access-controlled object a permission applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AcoKind {
    Folder,
    Resource,
}

impl fmt::Display for AcoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcoKind::Folder => write!(f, "Folder"),
            AcoKind::Resource => write!(f, "Resource"),
        }
    }
}

/// Kind of access-requesting object receiving a permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AroKind {
    #[serde(alias = "user")]
    User,
    #[serde(alias = "group")]
    Group,
}

impl fmt::Display for AroKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AroKind::User => write!(f, "User"),
            AroKind::Group => write!(f, "Group"),
        }
    }
}

/// A permission record (ACL entry).
///
/// `(aco, aco_foreign_key, aro, aro_foreign_key)` is the natural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub aco: AcoKind,
    pub aco_foreign_key: String,
    pub aro: AroKind,
    pub aro_foreign_key: String,
    #[serde(rename = "type")]
    pub permission_type: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    /// Request-only marker; never read from the server.
    #[serde(skip)]
    pub delete: bool,
}

impl Permission {
    /// Whether this entry grants `aro_id` (of kind `aro`) access to folder
    /// `folder_id`.
    pub fn matches_folder_grant(&self, folder_id: &str, aro: AroKind, aro_id: &str) -> bool {
        self.aco == AcoKind::Folder
            && self.aco_foreign_key == folder_id
            && self.aro == aro
            && self.aro_foreign_key == aro_id
    }
}

/// A user or group that can receive a share, as returned by ARO search.
///
/// The endpoint mixes both kinds in one list; users carry a `username`,
/// groups a `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareTarget {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
}

impl ShareTarget {
    pub fn kind(&self) -> AroKind {
        if self.username.is_some() {
            AroKind::User
        } else {
            AroKind::Group
        }
    }

    /// The key a grant manifest uses for this target.
    pub fn lookup_name(&self) -> &str {
        self.username
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or(&self.id)
    }
}

/// Permission type codes matching Passbolt ACL levels.
pub mod permission_types {
    /// No access marker (-1).
    pub const NO_ACCESS: i32 = -1;
    /// Read-only access (1).
    pub const READ: i32 = 1;
    /// Can update the resource/folder (7).
    pub const UPDATE: i32 = 7;
    /// Owner, full control (15).
    pub const OWNER: i32 = 15;
}

/// Share/update-permissions request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareRequest {
    pub permissions: Vec<PermissionChange>,
}

/// A permission change entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionChange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub aro: AroKind,
    pub aro_foreign_key: String,
    #[serde(rename = "type")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission_type: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<bool>,
}

impl From<&Permission> for PermissionChange {
    fn from(p: &Permission) -> Self {
        Self {
            id: p.id.clone(),
            aro: p.aro,
            aro_foreign_key: p.aro_foreign_key.clone(),
            permission_type: Some(p.permission_type),
            delete: p.delete.then_some(true),
        }
    }
}

// ── Query helpers ───────────────────────────────────────────────────

/// Query parameters for listing folders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderListParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contain_permissions: Option<bool>,
}

impl FolderListParams {
    /// Server-side name search including each folder's permission entries.
    pub fn named_with_permissions(name: &str) -> Self {
        Self {
            search: Some(name.to_string()),
            contain_permissions: Some(true),
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────
