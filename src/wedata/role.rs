//! ListProjectRoles and ListTenantRoles.

use serde::Serialize;
use serde_json::Value;

use super::{fetch_all_pages, DataResponse, Page};
use crate::client::WeDataClient;
use crate::config::pagination::SMALL_PAGE_SIZE;
use crate::error::ProviderError;

/// Filters of ListProjectRoles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListProjectRolesRequest {
    pub project_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u64>,
}

/// Filters of ListTenantRoles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListTenantRolesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_display_name: Option<String>,
}

impl WeDataClient {
    /// List every role defined in a project.
    pub async fn list_project_roles(
        &self,
        filters: &ListProjectRolesRequest,
    ) -> Result<Vec<Value>, ProviderError> {
        fetch_all_pages(SMALL_PAGE_SIZE, |page| {
            let request = ListProjectRolesRequest {
                page_number: Some(page),
                page_size: Some(SMALL_PAGE_SIZE),
                ..filters.clone()
            };
            async move {
                let response: DataResponse<Page<Value>> =
                    self.request("ListProjectRoles", &request).await?;
                Ok(response.data.unwrap_or_default().items)
            }
        })
        .await
    }

    /// List tenant-level roles. The reply is a plain array, not paginated.
    pub async fn list_tenant_roles(&self, filters: &ListTenantRolesRequest) -> Result<Vec<Value>, ProviderError> {
        let response: DataResponse<Vec<Value>> = self.request("ListTenantRoles", filters).await?;
        Ok(response.data.unwrap_or_default())
    }
}
