//! `tencentcloud_wedata_tasks`

use serde_json::Value;

use super::{base_schema, finish, DataSource};
use crate::client::{read_retry_error, retry, WeDataClient};
use crate::config::retry::READ_TIMEOUT;
use crate::error::ProviderError;
use crate::resource_data::ResourceData;
use crate::schema::{Attribute, Schema};
use crate::wedata::task::ListTasksRequest;

/// Tasks of a project.
#[derive(Debug, Clone, Copy, Default)]
pub struct TasksDataSource;

fn filters_from(config: &ResourceData) -> ListTasksRequest {
    let view = config.view();
    ListTasksRequest {
        project_id: view.get_str("project_id").unwrap_or_default(),
        task_name: view.get_str("task_name"),
        workflow_id: view.get_str("workflow_id"),
        owner_uin: view.get_str("owner_uin"),
        task_type_id: view.get_i64("task_type_id"),
        status: view.get_str("status"),
        submit: view.get_bool("submit"),
        bundle_id: view.get_str("bundle_id"),
        create_user_uin: view.get_str("create_user_uin"),
        modify_time: view.get_str_list("modify_time"),
        create_time: view.get_str_list("create_time"),
        ..Default::default()
    }
}

#[async_trait::async_trait]
impl DataSource for TasksDataSource {
    fn type_name(&self) -> &'static str {
        "tencentcloud_wedata_tasks"
    }

    fn schema(&self) -> Schema {
        base_schema("task_list", "Task list.")
            .with_attribute("project_id", Attribute::required_string())
            .with_attribute("task_name", Attribute::optional_string())
            .with_attribute("workflow_id", Attribute::optional_string())
            .with_attribute("owner_uin", Attribute::optional_string())
            .with_attribute("task_type_id", Attribute::optional_int64())
            .with_attribute(
                "status",
                Attribute::optional_string().with_description("`N` new, `Y` scheduling, `F` offline, `O` paused, `T` offlining, `INVALID`."),
            )
            .with_attribute("submit", Attribute::optional_bool())
            .with_attribute("bundle_id", Attribute::optional_string())
            .with_attribute("create_user_uin", Attribute::optional_string())
            .with_attribute("modify_time", Attribute::optional_string_list())
            .with_attribute("create_time", Attribute::optional_string_list())
    }

    async fn read(&self, client: &WeDataClient, config: &ResourceData) -> Result<Value, ProviderError> {
        let filters = &filters_from(config);
        let items = retry(READ_TIMEOUT, || async move {
            client.list_tasks(filters).await.map_err(read_retry_error)
        })
        .await?;
        finish(config, "task_list", items, "TaskId")
    }
}
