//! `tencentcloud_wedata_workflow_folders`

use serde_json::Value;

use super::{base_schema, finish, DataSource};
use crate::client::{read_retry_error, retry, WeDataClient};
use crate::config::retry::READ_TIMEOUT;
use crate::error::ProviderError;
use crate::resource_data::ResourceData;
use crate::schema::{Attribute, Schema};
use crate::wedata::workflow_folder::ListWorkflowFoldersRequest;

/// Folders directly under a parent folder.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkflowFoldersDataSource;

#[async_trait::async_trait]
impl DataSource for WorkflowFoldersDataSource {
    fn type_name(&self) -> &'static str {
        "tencentcloud_wedata_workflow_folders"
    }

    fn schema(&self) -> Schema {
        base_schema("folder_list", "Folder list.")
            .with_attribute("project_id", Attribute::required_string())
            .with_attribute(
                "parent_folder_path",
                Attribute::required_string().with_description("Absolute path, e.g. `/` or `/etl`."),
            )
    }

    async fn read(&self, client: &WeDataClient, config: &ResourceData) -> Result<Value, ProviderError> {
        let filters = &ListWorkflowFoldersRequest {
            project_id: config.get_str("project_id").unwrap_or_default(),
            parent_folder_path: config.get_str("parent_folder_path").unwrap_or_default(),
            ..Default::default()
        };
        let items = retry(READ_TIMEOUT, || async move {
            client.list_workflow_folders(filters).await.map_err(read_retry_error)
        })
        .await?;
        finish(config, "folder_list", items, "Id")
    }
}
