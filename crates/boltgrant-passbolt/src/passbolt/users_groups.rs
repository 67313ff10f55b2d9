//! User and Group listing for Passbolt.
//!
//! Endpoints:
//! - `GET /users.json` : list users
//! - `GET /groups.json`: list groups

use crate::passbolt::api_client::PassboltApiClient;
use crate::passbolt::types::*;
use log::info;

/// User API operations.
pub struct PassboltUsers;

impl PassboltUsers {
    /// List all users visible to the acting user.
    pub async fn list(client: &PassboltApiClient) -> Result<Vec<User>, PassboltError> {
        let resp: ApiResponse<Vec<User>> = client.get("/users.json").await?;
        info!("Listed {} users", resp.body.len());
        Ok(resp.body)
    }
}

/// Group API operations.
pub struct PassboltGroups;

impl PassboltGroups {
    /// List all groups visible to the acting user.
    pub async fn list(client: &PassboltApiClient) -> Result<Vec<Group>, PassboltError> {
        let resp: ApiResponse<Vec<Group>> = client.get("/groups.json").await?;
        info!("Listed {} groups", resp.body.len());
        Ok(resp.body)
    }
}
