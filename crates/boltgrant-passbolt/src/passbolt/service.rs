//! Passbolt service handle.
//!
//! Owns the API client for one connection and implements [`ShareBackend`]
//! on top of the REST modules.

use crate::passbolt::api_client::PassboltApiClient;
use crate::passbolt::auth::PassboltAuth;
use crate::passbolt::backend::ShareBackend;
use crate::passbolt::folders::PassboltFolders;
use crate::passbolt::sharing::PassboltSharing;
use crate::passbolt::types::*;
use crate::passbolt::users_groups::{PassboltGroups, PassboltUsers};
use async_trait::async_trait;
use log::info;

/// A verified connection to a Passbolt server.
pub struct PassboltService {
    /// Configuration.
    config: PassboltConfig,
    /// API client.
    client: PassboltApiClient,
}

impl PassboltService {
    /// Validate the configuration, build the client and confirm the access
    /// token is accepted.
    pub async fn connect(config: PassboltConfig) -> Result<Self, PassboltError> {
        config.validate()?;
        let mut client = PassboltApiClient::from_config(&config)?;
        PassboltAuth::verify_session(&mut client).await?;
        info!("Connected to Passbolt at {}", client.base_url());
        Ok(Self { config, client })
    }

    /// Get the current config (redacted).
    pub fn config(&self) -> PassboltConfig {
        self.config.redacted()
    }

    /// Check if the service is authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.client.is_authenticated()
    }

    /// Revoke the refresh token, if any, and drop the connection.
    pub async fn disconnect(mut self) {
        PassboltAuth::jwt_logout(&mut self.client).await;
        info!("Disconnected from {}", self.client.base_url());
    }
}

#[async_trait]
impl ShareBackend for PassboltService {
    async fn list_folders(&self, filter: &FolderListParams) -> Result<Vec<Folder>, PassboltError> {
        PassboltFolders::list(&self.client, Some(filter)).await
    }

    async fn list_groups(&self) -> Result<Vec<Group>, PassboltError> {
        PassboltGroups::list(&self.client).await
    }

    async fn list_users(&self) -> Result<Vec<User>, PassboltError> {
        PassboltUsers::list(&self.client).await
    }

    async fn apply_folder_permissions(
        &self,
        folder_id: &str,
        permissions: &[Permission],
    ) -> Result<(), PassboltError> {
        let request = PassboltSharing::build_request(permissions);
        PassboltSharing::share_folder(&self.client, folder_id, &request).await
    }

    async fn search_share_targets(
        &self,
        search: Option<&str>,
    ) -> Result<Vec<ShareTarget>, PassboltError> {
        PassboltSharing::search_aros(&self.client, search).await
    }
}
