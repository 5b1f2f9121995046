//! ListProjects.

use serde::Serialize;
use serde_json::Value;

use super::{fetch_all_pages, DataResponse, Page};
use crate::client::WeDataClient;
use crate::config::pagination::SMALL_PAGE_SIZE;
use crate::error::ProviderError;

/// Filters of ListProjects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListProjectsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    /// 0 disabled, 1 enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i64>,
    /// `SIMPLE` or `STANDARD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u64>,
}

impl WeDataClient {
    /// List every project matching the filters.
    pub async fn list_projects(&self, filters: &ListProjectsRequest) -> Result<Vec<Value>, ProviderError> {
        fetch_all_pages(SMALL_PAGE_SIZE, |page| {
            let request = ListProjectsRequest {
                page_number: Some(page),
                page_size: Some(SMALL_PAGE_SIZE),
                ..filters.clone()
            };
            async move {
                let response: DataResponse<Page<Value>> = self.request("ListProjects", &request).await?;
                Ok(response.data.unwrap_or_default().items)
            }
        })
        .await
    }
}
