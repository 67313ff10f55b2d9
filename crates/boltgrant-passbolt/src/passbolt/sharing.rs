//! Folder sharing for Passbolt.
//!
//! Endpoints:
//! - `PUT /share/folder/{id}.json`: apply permission changes to a folder
//! - `GET /share/search-aros.json`: users and groups a folder can be shared with

use crate::passbolt::api_client::PassboltApiClient;
use crate::passbolt::types::*;
use log::info;

/// Permission and sharing API operations.
pub struct PassboltSharing;

impl PassboltSharing {
    /// Share a folder with users/groups.
    pub async fn share_folder(
        client: &PassboltApiClient,
        folder_id: &str,
        request: &ShareRequest,
    ) -> Result<(), PassboltError> {
        info!(
            "Sharing folder {} with {} permission changes",
            folder_id,
            request.permissions.len()
        );
        let _: ApiResponse<serde_json::Value> = client
            .put(&format!("/share/folder/{}.json", folder_id), request)
            .await?;
        Ok(())
    }

    /// Search users and groups that can receive a share.
    pub async fn search_aros(
        client: &PassboltApiClient,
        search: Option<&str>,
    ) -> Result<Vec<ShareTarget>, PassboltError> {
        let filters: Vec<(&str, &str)> = search.map(|s| vec![("search", s)]).unwrap_or_default();
        let query = client.build_contain_filter_params(&[], &filters);
        let resp: ApiResponse<Vec<ShareTarget>> = if query.is_empty() {
            client.get("/share/search-aros.json").await?
        } else {
            client.get_with_params("/share/search-aros.json", &query).await?
        };
        info!("Found {} share targets", resp.body.len());
        Ok(resp.body)
    }

    /// Build the share request for a set of permission entries.
    pub fn build_request(permissions: &[Permission]) -> ShareRequest {
        ShareRequest {
            permissions: permissions.iter().map(PermissionChange::from).collect(),
        }
    }

    /// Build a grant of `level` on a folder that has no entry for the ARO yet.
    pub fn build_folder_grant(
        folder_id: &str,
        aro: AroKind,
        aro_foreign_key: &str,
        level: i32,
    ) -> Permission {
        Permission {
            id: None,
            aco: AcoKind::Folder,
            aco_foreign_key: folder_id.to_string(),
            aro,
            aro_foreign_key: aro_foreign_key.to_string(),
            permission_type: level,
            created: None,
            modified: None,
            delete: false,
        }
    }

    /// Re-level an existing entry in place.
    pub fn build_level_change(existing: &Permission, level: i32) -> Permission {
        Permission {
            permission_type: level,
            delete: false,
            ..existing.clone()
        }
    }

    /// Mark an existing entry for deletion.
    pub fn build_delete_permission(existing: &Permission) -> Permission {
        Permission {
            delete: true,
            ..existing.clone()
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────
