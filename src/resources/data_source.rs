//! `tencentcloud_wedata_data_source`
//!
//! ID: `projectId#dataSourceId`, where the data source id is numeric.
//! Connection properties are JSON strings holding credentials, so they are
//! marked sensitive and never logged.

use serde_json::Value;
use tracing::debug;

use super::{non_retryable, put, Resource};
use crate::client::{read_retry_error, retry, retry_error, RetryError, WeDataClient};
use crate::config::retry::{READ_TIMEOUT, WRITE_TIMEOUT};
use crate::error::ProviderError;
use crate::logging::LogElapsed;
use crate::resource_data::{BlockView, ResourceData};
use crate::resource_id;
use crate::schema::{Attribute, Block, NestedBlock, Schema};
use crate::wedata::data_source::{CreateDataSourceRequest, DataSourceFileUpload, UpdateDataSourceRequest};

const TYPE_NAME: &str = "tencentcloud_wedata_data_source";

const MUTABLE_ARGS: &[&str] = &[
    "prod_con_properties",
    "dev_con_properties",
    "prod_file_upload",
    "dev_file_upload",
    "display_name",
    "description",
];

/// A connection to an external database, queue or file store.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataSourceResource;

fn file_upload_block() -> Block {
    [
        ("trust_store", "Truststore file, default name truststore.jks."),
        ("key_store", "Keystore file, default name keystore.jks."),
        ("core_site", "core-site.xml file."),
        ("hdfs_site", "hdfs-site.xml file."),
        ("hive_site", "hive-site.xml file."),
        ("hbase_site", "hbase-site file."),
        ("key_tab", "keytab file, default name `<data source name>.keytab`."),
        ("krb5_conf", "krb5.conf file."),
        ("private_key", "Private key, default name private_key.pem."),
        ("public_key", "Public key, default name public_key.pem."),
    ]
    .into_iter()
    .fold(Block::new(), |block, (name, description)| {
        block.with_attribute(name, Attribute::optional_string().with_description(description))
    })
}

fn file_upload_from(view: &BlockView<'_>, key: &str) -> Option<DataSourceFileUpload> {
    let upload = view.head(key)?;
    Some(DataSourceFileUpload {
        trust_store: upload.get_str("trust_store"),
        key_store: upload.get_str("key_store"),
        core_site: upload.get_str("core_site"),
        hdfs_site: upload.get_str("hdfs_site"),
        hive_site: upload.get_str("hive_site"),
        hbase_site: upload.get_str("hbase_site"),
        key_tab: upload.get_str("key_tab"),
        krb5_conf: upload.get_str("krb5_conf"),
        private_key: upload.get_str("private_key"),
        public_key: upload.get_str("public_key"),
    })
}

/// Split the ID and parse the numeric data source id.
fn parse_id(id: &str) -> Result<(&str, &str, i64), ProviderError> {
    let [project_id, data_source_id] = resource_id::split::<2>(id)?;
    let numeric = data_source_id
        .parse::<i64>()
        .map_err(|_| ProviderError::broken_id(id))?;
    Ok((project_id, data_source_id, numeric))
}

#[async_trait::async_trait]
impl Resource for DataSourceResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("project_id", Attribute::required_string().with_force_new())
            .with_attribute("name", Attribute::required_string().with_force_new())
            .with_attribute(
                "type",
                Attribute::required_string()
                    .with_force_new()
                    .with_description("Data source type, e.g. `MYSQL`, `HIVE`, `KAFKA`."),
            )
            .with_attribute(
                "prod_con_properties",
                Attribute::required_string()
                    .sensitive()
                    .with_description("Production connection settings as a JSON object string."),
            )
            .with_attribute(
                "dev_con_properties",
                Attribute::optional_string()
                    .sensitive()
                    .with_description("Development connection settings, required in standard-mode projects."),
            )
            .with_attribute("display_name", Attribute::optional_string())
            .with_attribute("description", Attribute::optional_string())
            .with_attribute("data_source_id", Attribute::computed_int64())
            .with_block("prod_file_upload", NestedBlock::single(file_upload_block()))
            .with_block("dev_file_upload", NestedBlock::single(file_upload_block()))
    }

    async fn create(&self, client: &WeDataClient, data: &ResourceData) -> Result<String, ProviderError> {
        let _elapsed = LogElapsed::new("resource.tencentcloud_wedata_data_source.create");
        let view = data.view();

        let project_id = data.get_str("project_id").unwrap_or_default();
        let request = CreateDataSourceRequest {
            project_id: project_id.clone(),
            name: data.get_str("name").unwrap_or_default(),
            source_type: data.get_str("type").unwrap_or_default(),
            prod_con_properties: data.get_str("prod_con_properties").unwrap_or_default(),
            dev_con_properties: data.get_str("dev_con_properties"),
            prod_file_upload: file_upload_from(&view, "prod_file_upload"),
            dev_file_upload: file_upload_from(&view, "dev_file_upload"),
            display_name: data.get_str("display_name"),
            description: data.get_str("description"),
        };

        let request = &request;
        let result = retry(WRITE_TIMEOUT, || async move {
            client
                .create_data_source(request)
                .await
                .map_err(retry_error)?
                .ok_or_else(|| non_retryable("Create wedata data source failed, Response is nil."))
        })
        .await?;

        if result.status != Some(true) {
            return Err(ProviderError::Sdk(
                "Create wedata data source failed, Status is false".to_string(),
            ));
        }
        let data_source_id = result
            .data_source_id
            .ok_or_else(|| ProviderError::Sdk("DataSourceId is nil.".to_string()))?;

        debug!(project_id = %project_id, data_source_id, "Data source created");
        Ok(resource_id::join(&[&project_id, &data_source_id.to_string()]))
    }

    async fn read(&self, client: &WeDataClient, data: &ResourceData) -> Result<Option<Value>, ProviderError> {
        let _elapsed = LogElapsed::new("resource.tencentcloud_wedata_data_source.read");
        let (project_id, _, id) = parse_id(data.id())?;

        let detail = retry(READ_TIMEOUT, || async move {
            client
                .get_data_source(project_id, id)
                .await
                .map_err(read_retry_error)
        })
        .await?;
        let Some(detail) = detail else {
            return Ok(None);
        };

        // File uploads are not returned; the configured blocks stay as they are.
        let mut state = data.state_map();
        put(&mut state, "project_id", detail.project_id);
        put(&mut state, "name", detail.name);
        put(&mut state, "type", detail.source_type);
        put(&mut state, "prod_con_properties", detail.prod_con_properties);
        put(&mut state, "dev_con_properties", detail.dev_con_properties);
        put(&mut state, "display_name", detail.display_name);
        put(&mut state, "description", detail.description);
        put(&mut state, "data_source_id", detail.id);

        Ok(Some(Value::Object(state)))
    }

    async fn update(&self, client: &WeDataClient, data: &ResourceData) -> Result<(), ProviderError> {
        let _elapsed = LogElapsed::new("resource.tencentcloud_wedata_data_source.update");
        let (project_id, data_source_id, id) = parse_id(data.id())?;

        if data.first_change(MUTABLE_ARGS).is_none() {
            return Ok(());
        }

        let view = data.view();
        let request = UpdateDataSourceRequest {
            project_id: project_id.to_string(),
            id,
            prod_con_properties: data.get_str("prod_con_properties"),
            dev_con_properties: data.get_str("dev_con_properties"),
            prod_file_upload: file_upload_from(&view, "prod_file_upload"),
            dev_file_upload: file_upload_from(&view, "dev_file_upload"),
            display_name: data.get_str("display_name"),
            description: data.get_str("description"),
        };

        let request = &request;
        let status = retry(WRITE_TIMEOUT, || async move {
            client
                .update_data_source(request)
                .await
                .map_err(retry_error)?
                .ok_or_else(|| non_retryable("Update data source failed, Response is nil."))
        })
        .await?;

        if !status {
            return Err(ProviderError::Sdk(format!(
                "Update data source {} failed, Status is false.",
                data_source_id
            )));
        }
        Ok(())
    }

    async fn delete(&self, client: &WeDataClient, data: &ResourceData) -> Result<(), RetryError> {
        let _elapsed = LogElapsed::new("resource.tencentcloud_wedata_data_source.delete");
        let (project_id, data_source_id, id) = parse_id(data.id())?;

        let status = client
            .delete_data_source(project_id, id)
            .await
            .map_err(retry_error)?
            .ok_or_else(|| non_retryable("Delete data source failed, Response is nil."))?;

        if status {
            Ok(())
        } else {
            Err(non_retryable(format!(
                "Delete data source {} failed, Status is false.",
                data_source_id
            )))
        }
    }
}
