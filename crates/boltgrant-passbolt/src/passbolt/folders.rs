//! Folder listing for Passbolt.
//!
//! Endpoints:
//! - `GET /folders.json`: list folders, optionally filtered by name and
//!   including their permission entries

use crate::passbolt::api_client::PassboltApiClient;
use crate::passbolt::types::*;
use log::{debug, info};

/// Folder API operations.
pub struct PassboltFolders;

impl PassboltFolders {
    /// List folders.
    pub async fn list(
        client: &PassboltApiClient,
        params: Option<&FolderListParams>,
    ) -> Result<Vec<Folder>, PassboltError> {
        let query = match params {
            Some(p) => client.build_contain_filter_params(
                &[("permissions", p.contain_permissions.unwrap_or(false))],
                &p.search
                    .as_deref()
                    .map(|s| vec![("search", s)])
                    .unwrap_or_default(),
            ),
            None => Vec::new(),
        };

        debug!("Listing folders with {} query params", query.len());
        let resp: ApiResponse<Vec<Folder>> = if query.is_empty() {
            client.get("/folders.json").await?
        } else {
            client.get_with_params("/folders.json", &query).await?
        };

        info!("Listed {} folders", resp.body.len());
        Ok(resp.body)
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_deserialize() {
        let json = r#"{
            "id": "folder-uuid",
            "name": "My Folder",
            "created": "2024-01-01T00:00:00Z",
            "modified": "2024-01-02T00:00:00Z",
            "personal": true
        }"#;
        let f: Folder = serde_json::from_str(json).unwrap();
        assert_eq!(f.id, "folder-uuid");
        assert_eq!(f.name, Some("My Folder".into()));
        assert!(f.is_personal());
    }

    #[test]
    fn test_named_with_permissions_params() {
        let params = FolderListParams::named_with_permissions("Finance");
        assert_eq!(params.search.as_deref(), Some("Finance"));
        assert_eq!(params.contain_permissions, Some(true));
    }
}
