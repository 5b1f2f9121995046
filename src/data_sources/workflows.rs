//! `tencentcloud_wedata_workflows`

use serde_json::Value;

use super::{base_schema, finish, DataSource};
use crate::client::{read_retry_error, retry, WeDataClient};
use crate::config::retry::READ_TIMEOUT;
use crate::error::ProviderError;
use crate::resource_data::ResourceData;
use crate::schema::{Attribute, Schema};
use crate::wedata::workflow::ListWorkflowsRequest;

/// Workflows of a project.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkflowsDataSource;

fn filters_from(config: &ResourceData) -> ListWorkflowsRequest {
    let view = config.view();
    ListWorkflowsRequest {
        project_id: view.get_str("project_id").unwrap_or_default(),
        keyword: view.get_str("keyword"),
        parent_folder_path: view.get_str("parent_folder_path"),
        workflow_type: view.get_str("workflow_type"),
        bundle_id: view.get_str("bundle_id"),
        owner_uin: view.get_str("owner_uin"),
        create_user_uin: view.get_str("create_user_uin"),
        modify_time: view.get_str_list("modify_time"),
        create_time: view.get_str_list("create_time"),
        ..Default::default()
    }
}

#[async_trait::async_trait]
impl DataSource for WorkflowsDataSource {
    fn type_name(&self) -> &'static str {
        "tencentcloud_wedata_workflows"
    }

    fn schema(&self) -> Schema {
        let range = || Attribute::optional_string_list().with_description("`[start, end]` time range.");
        base_schema("workflow_list", "Workflow list.")
            .with_attribute("project_id", Attribute::required_string())
            .with_attribute("keyword", Attribute::optional_string())
            .with_attribute("parent_folder_path", Attribute::optional_string())
            .with_attribute(
                "workflow_type",
                Attribute::optional_string().with_allowed_values(&["cycle", "manual"]),
            )
            .with_attribute("bundle_id", Attribute::optional_string())
            .with_attribute("owner_uin", Attribute::optional_string())
            .with_attribute("create_user_uin", Attribute::optional_string())
            .with_attribute("modify_time", range())
            .with_attribute("create_time", range())
    }

    async fn read(&self, client: &WeDataClient, config: &ResourceData) -> Result<Value, ProviderError> {
        let filters = &filters_from(config);
        let items = retry(READ_TIMEOUT, || async move {
            client.list_workflows(filters).await.map_err(read_retry_error)
        })
        .await?;
        finish(config, "workflow_list", items, "WorkflowId")
    }
}
