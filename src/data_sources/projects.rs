//! `tencentcloud_wedata_projects`

use serde_json::Value;

use super::{base_schema, finish, DataSource};
use crate::client::{read_retry_error, retry, WeDataClient};
use crate::config::retry::READ_TIMEOUT;
use crate::error::ProviderError;
use crate::resource_data::ResourceData;
use crate::schema::{Attribute, Schema};
use crate::wedata::project::ListProjectsRequest;

/// Projects visible to the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectsDataSource;

fn filters_from(config: &ResourceData) -> ListProjectsRequest {
    let view = config.view();
    ListProjectsRequest {
        project_ids: view.get_str_list("project_ids"),
        project_name: view.get_str("project_name"),
        status: view.get_i64("status"),
        project_model: view.get_str("project_model"),
        ..Default::default()
    }
}

#[async_trait::async_trait]
impl DataSource for ProjectsDataSource {
    fn type_name(&self) -> &'static str {
        "tencentcloud_wedata_projects"
    }

    fn schema(&self) -> Schema {
        base_schema("project_list", "Project list.")
            .with_attribute("project_ids", Attribute::optional_string_list())
            .with_attribute("project_name", Attribute::optional_string())
            .with_attribute(
                "status",
                Attribute::optional_int64().with_description("0 disabled, 1 enabled."),
            )
            .with_attribute(
                "project_model",
                Attribute::optional_string().with_allowed_values(&["SIMPLE", "STANDARD"]),
            )
    }

    async fn read(&self, client: &WeDataClient, config: &ResourceData) -> Result<Value, ProviderError> {
        let filters = &filters_from(config);
        let items = retry(READ_TIMEOUT, || async move {
            client.list_projects(filters).await.map_err(read_retry_error)
        })
        .await?;
        finish(config, "project_list", items, "ProjectId")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filters_from_config() {
        let config = ResourceData::new(json!({
            "project_ids": ["1460947878944567296"],
            "status": 1,
            "project_name": ""
        }));
        let filters = filters_from(&config);
        assert_eq!(filters.project_ids, Some(vec!["1460947878944567296".to_string()]));
        assert_eq!(filters.status, Some(1));
        assert_eq!(filters.project_name, None);
    }
}
