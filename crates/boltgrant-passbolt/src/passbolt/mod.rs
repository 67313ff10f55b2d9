//! Passbolt folder sharing: sub-modules.
//!
//! - REST API client (`{header, body}` envelope, `contain[]`/`filter[]` queries)
//! - Session verification and JWT logout
//! - Folder, user and group listing
//! - Folder share requests
//! - Name resolution, permission level codec and grant reconciliation
//! - YAML grant manifests and layered configuration

pub mod api_client;
pub mod auth;
pub mod backend;
pub mod config;
pub mod context;
pub mod error;
pub mod folders;
pub mod level;
pub mod manifest;
pub mod reconciler;
pub mod resolver;
pub mod service;
pub mod sharing;
pub mod types;
pub mod users_groups;

// Re-export top-level items for convenience.
pub use backend::ShareBackend;
pub use context::OperationContext;
pub use error::{ErrorClass, ShareError};
pub use level::PermissionLevel;
pub use manifest::{GrantEntry, GrantManifest, GrantState, SubjectRef};
pub use reconciler::{GrantIntent, GrantPlan, GrantReconciler, ReconcileOutcome, ShareAction};
pub use service::PassboltService;
pub use types::*;
