//! `tencentcloud_wedata_sql_script_runs`

use serde_json::Value;

use super::{base_schema, finish, DataSource};
use crate::client::{read_retry_error, retry, WeDataClient};
use crate::config::retry::READ_TIMEOUT;
use crate::error::ProviderError;
use crate::resource_data::ResourceData;
use crate::schema::{Attribute, Schema};
use crate::wedata::sql_script_run::ListSqlScriptRunsRequest;

/// Executions of one SQL script.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlScriptRunsDataSource;

fn filters_from(config: &ResourceData) -> ListSqlScriptRunsRequest {
    let view = config.view();
    ListSqlScriptRunsRequest {
        project_id: view.get_str("project_id").unwrap_or_default(),
        script_id: view.get_str("script_id").unwrap_or_default(),
        job_id: view.get_str("job_id"),
        search_word: view.get_str("search_word"),
        execute_user_uin: view.get_str("execute_user_uin"),
        start_time: view.get_str("start_time"),
        end_time: view.get_str("end_time"),
    }
}

#[async_trait::async_trait]
impl DataSource for SqlScriptRunsDataSource {
    fn type_name(&self) -> &'static str {
        "tencentcloud_wedata_sql_script_runs"
    }

    fn schema(&self) -> Schema {
        base_schema("data", "Script runs.")
            .with_attribute("project_id", Attribute::optional_string())
            .with_attribute("script_id", Attribute::required_string())
            .with_attribute("job_id", Attribute::optional_string())
            .with_attribute("search_word", Attribute::optional_string())
            .with_attribute("execute_user_uin", Attribute::optional_string())
            .with_attribute("start_time", Attribute::optional_string())
            .with_attribute("end_time", Attribute::optional_string())
    }

    async fn read(&self, client: &WeDataClient, config: &ResourceData) -> Result<Value, ProviderError> {
        let filters = &filters_from(config);
        let items = retry(READ_TIMEOUT, || async move {
            client.list_sql_script_runs(filters).await.map_err(read_retry_error)
        })
        .await?;
        finish(config, "data", items, "JobId")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filters_from_config() {
        let config = ResourceData::new(json!({"script_id": "s-1", "search_word": "orders"}));
        let filters = filters_from(&config);
        assert_eq!(filters.script_id, "s-1");
        assert_eq!(filters.project_id, "");
        assert_eq!(filters.search_word.as_deref(), Some("orders"));
    }
}
