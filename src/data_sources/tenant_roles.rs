//! `tencentcloud_wedata_tenant_roles`

use serde_json::Value;

use super::{base_schema, finish, DataSource};
use crate::client::{read_retry_error, retry, WeDataClient};
use crate::config::retry::READ_TIMEOUT;
use crate::error::ProviderError;
use crate::resource_data::ResourceData;
use crate::schema::{Attribute, Schema};
use crate::wedata::role::ListTenantRolesRequest;

/// Roles defined at tenant level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TenantRolesDataSource;

#[async_trait::async_trait]
impl DataSource for TenantRolesDataSource {
    fn type_name(&self) -> &'static str {
        "tencentcloud_wedata_tenant_roles"
    }

    fn schema(&self) -> Schema {
        base_schema("role_list", "Tenant roles.")
            .with_attribute("role_display_name", Attribute::optional_string())
    }

    async fn read(&self, client: &WeDataClient, config: &ResourceData) -> Result<Value, ProviderError> {
        let filters = &ListTenantRolesRequest {
            role_display_name: config.get_str("role_display_name"),
        };
        let items = retry(READ_TIMEOUT, || async move {
            client.list_tenant_roles(filters).await.map_err(read_retry_error)
        })
        .await?;
        finish(config, "role_list", items, "RoleId")
    }
}
