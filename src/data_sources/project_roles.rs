//! `tencentcloud_wedata_project_roles`

use serde_json::Value;

use super::{base_schema, finish, DataSource};
use crate::client::{read_retry_error, retry, WeDataClient};
use crate::config::retry::READ_TIMEOUT;
use crate::error::ProviderError;
use crate::resource_data::ResourceData;
use crate::schema::{Attribute, Schema};
use crate::wedata::role::ListProjectRolesRequest;

/// Roles defined in a project.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectRolesDataSource;

#[async_trait::async_trait]
impl DataSource for ProjectRolesDataSource {
    fn type_name(&self) -> &'static str {
        "tencentcloud_wedata_project_roles"
    }

    fn schema(&self) -> Schema {
        base_schema("role_list", "Project roles.")
            .with_attribute("project_id", Attribute::required_string())
            .with_attribute("role_display_name", Attribute::optional_string())
    }

    async fn read(&self, client: &WeDataClient, config: &ResourceData) -> Result<Value, ProviderError> {
        let filters = &ListProjectRolesRequest {
            project_id: config.get_str("project_id").unwrap_or_default(),
            role_display_name: config.get_str("role_display_name"),
            ..Default::default()
        };
        let items = retry(READ_TIMEOUT, || async move {
            client.list_project_roles(filters).await.map_err(read_retry_error)
        })
        .await?;
        finish(config, "role_list", items, "RoleId")
    }
}
