//! ListWorkflowFolders.

use serde::Serialize;
use serde_json::Value;

use super::{fetch_all_pages, DataResponse, Page};
use crate::client::WeDataClient;
use crate::config::pagination::LARGE_PAGE_SIZE;
use crate::error::ProviderError;

/// Filters of ListWorkflowFolders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListWorkflowFoldersRequest {
    pub project_id: String,
    pub parent_folder_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u64>,
}

impl WeDataClient {
    /// List the folders directly under `parent_folder_path`.
    pub async fn list_workflow_folders(
        &self,
        filters: &ListWorkflowFoldersRequest,
    ) -> Result<Vec<Value>, ProviderError> {
        fetch_all_pages(LARGE_PAGE_SIZE, |page| {
            let request = ListWorkflowFoldersRequest {
                page_number: Some(page),
                page_size: Some(LARGE_PAGE_SIZE),
                ..filters.clone()
            };
            async move {
                let response: DataResponse<Page<Value>> =
                    self.request("ListWorkflowFolders", &request).await?;
                Ok(response.data.unwrap_or_default().items)
            }
        })
        .await
    }
}
