//! `tencentcloud_wedata_data_sources`

use serde_json::Value;

use super::{base_schema, finish, DataSource};
use crate::client::{read_retry_error, retry, WeDataClient};
use crate::config::retry::READ_TIMEOUT;
use crate::error::ProviderError;
use crate::resource_data::ResourceData;
use crate::schema::{Attribute, Schema};
use crate::wedata::data_source::ListDataSourcesRequest;

/// Data sources of a project.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataSourcesDataSource;

fn filters_from(config: &ResourceData) -> ListDataSourcesRequest {
    let view = config.view();
    ListDataSourcesRequest {
        project_id: view.get_str("project_id").unwrap_or_default(),
        name: view.get_str("name"),
        display_name: view.get_str("display_name"),
        source_types: view.get_str_list("type"),
        creator: view.get_str("creator"),
        ..Default::default()
    }
}

#[async_trait::async_trait]
impl DataSource for DataSourcesDataSource {
    fn type_name(&self) -> &'static str {
        "tencentcloud_wedata_data_sources"
    }

    fn schema(&self) -> Schema {
        base_schema("data_source_list", "Data source list.")
            .with_attribute("project_id", Attribute::required_string())
            .with_attribute("name", Attribute::optional_string())
            .with_attribute("display_name", Attribute::optional_string())
            .with_attribute(
                "type",
                Attribute::optional_string_list().with_description("Data source types, e.g. `MYSQL`."),
            )
            .with_attribute("creator", Attribute::optional_string())
    }

    async fn read(&self, client: &WeDataClient, config: &ResourceData) -> Result<Value, ProviderError> {
        let filters = &filters_from(config);
        let items = retry(READ_TIMEOUT, || async move {
            client.list_data_sources(filters).await.map_err(read_retry_error)
        })
        .await?;
        finish(config, "data_source_list", items, "Id")
    }
}
