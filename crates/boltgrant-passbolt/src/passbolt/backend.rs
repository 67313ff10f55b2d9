//! The remote collaborator calls the reconciler depends on.

use crate::passbolt::types::*;
use async_trait::async_trait;

/// Read and write operations against the sharing backend.
///
/// Each call is one atomic remote operation; there are no multi-call
/// transactions.
#[async_trait]
pub trait ShareBackend: Send + Sync {
    /// List folders matching the filter.
    async fn list_folders(&self, filter: &FolderListParams) -> Result<Vec<Folder>, PassboltError>;

    /// List all groups.
    async fn list_groups(&self) -> Result<Vec<Group>, PassboltError>;

    /// List all users.
    async fn list_users(&self) -> Result<Vec<User>, PassboltError>;

    /// Apply permission changes to a folder.
    async fn apply_folder_permissions(
        &self,
        folder_id: &str,
        permissions: &[Permission],
    ) -> Result<(), PassboltError>;

    /// Users and groups a folder can be shared with, optionally filtered.
    async fn search_share_targets(
        &self,
        search: Option<&str>,
    ) -> Result<Vec<ShareTarget>, PassboltError>;
}
