//! Data source actions: CreateDataSource, GetDataSource, UpdateDataSource,
//! DeleteDataSource and ListDataSources.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::BoolStatus;
use super::{fetch_all_pages, DataResponse, Page};
use crate::client::WeDataClient;
use crate::config::pagination::SMALL_PAGE_SIZE;
use crate::error::ProviderError;

/// Configuration files uploaded with a connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceFileUpload {
    #[serde(rename = "TrustStore", skip_serializing_if = "Option::is_none")]
    pub trust_store: Option<String>,
    #[serde(rename = "KeyStore", skip_serializing_if = "Option::is_none")]
    pub key_store: Option<String>,
    #[serde(rename = "CoreSite", skip_serializing_if = "Option::is_none")]
    pub core_site: Option<String>,
    #[serde(rename = "HdfsSite", skip_serializing_if = "Option::is_none")]
    pub hdfs_site: Option<String>,
    #[serde(rename = "HiveSite", skip_serializing_if = "Option::is_none")]
    pub hive_site: Option<String>,
    #[serde(rename = "HBASESite", skip_serializing_if = "Option::is_none")]
    pub hbase_site: Option<String>,
    #[serde(rename = "KeyTab", skip_serializing_if = "Option::is_none")]
    pub key_tab: Option<String>,
    #[serde(rename = "KRB5Conf", skip_serializing_if = "Option::is_none")]
    pub krb5_conf: Option<String>,
    #[serde(rename = "PrivateKey", skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(rename = "PublicKey", skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

/// Body of CreateDataSource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateDataSourceRequest {
    pub project_id: String,
    pub name: String,
    #[serde(rename = "Type")]
    pub source_type: String,
    pub prod_con_properties: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_con_properties: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prod_file_upload: Option<DataSourceFileUpload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_file_upload: Option<DataSourceFileUpload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Payload of a CreateDataSource reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateDataSourceResult {
    pub status: Option<bool>,
    pub data_source_id: Option<i64>,
}

/// Body of UpdateDataSource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateDataSourceRequest {
    pub project_id: String,
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prod_con_properties: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_con_properties: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prod_file_upload: Option<DataSourceFileUpload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_file_upload: Option<DataSourceFileUpload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct DataSourceKey<'a> {
    project_id: &'a str,
    id: i64,
}

/// Data source as returned by GetDataSource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DataSourceDetail {
    pub id: Option<i64>,
    pub project_id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "Type")]
    pub source_type: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub prod_con_properties: Option<String>,
    pub dev_con_properties: Option<String>,
}

/// Filters of ListDataSources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListDataSourcesRequest {
    pub project_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "Type", skip_serializing_if = "Option::is_none")]
    pub source_types: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u64>,
}

impl WeDataClient {
    /// Create a data source. `None` when the reply carried no `Data`.
    pub async fn create_data_source(
        &self,
        request: &CreateDataSourceRequest,
    ) -> Result<Option<CreateDataSourceResult>, ProviderError> {
        let response: DataResponse<CreateDataSourceResult> =
            self.request("CreateDataSource", request).await?;
        Ok(response.data)
    }

    /// Fetch one data source by numeric id.
    pub async fn get_data_source(
        &self,
        project_id: &str,
        id: i64,
    ) -> Result<Option<DataSourceDetail>, ProviderError> {
        let response: DataResponse<DataSourceDetail> = self
            .request("GetDataSource", &DataSourceKey { project_id, id })
            .await?;
        Ok(response.data)
    }

    /// Update a data source. Returns the reported status.
    pub async fn update_data_source(
        &self,
        request: &UpdateDataSourceRequest,
    ) -> Result<Option<bool>, ProviderError> {
        let response: DataResponse<BoolStatus> = self.request("UpdateDataSource", request).await?;
        Ok(response.data.and_then(|d| d.status))
    }

    /// Delete a data source. Returns the reported status.
    pub async fn delete_data_source(
        &self,
        project_id: &str,
        id: i64,
    ) -> Result<Option<bool>, ProviderError> {
        let response: DataResponse<BoolStatus> = self
            .request("DeleteDataSource", &DataSourceKey { project_id, id })
            .await?;
        Ok(response.data.and_then(|d| d.status))
    }

    /// List every data source matching the filters.
    pub async fn list_data_sources(
        &self,
        filters: &ListDataSourcesRequest,
    ) -> Result<Vec<Value>, ProviderError> {
        fetch_all_pages(SMALL_PAGE_SIZE, |page| {
            let request = ListDataSourcesRequest {
                page_number: Some(page),
                page_size: Some(SMALL_PAGE_SIZE),
                ..filters.clone()
            };
            async move {
                let response: DataResponse<Page<Value>> =
                    self.request("ListDataSources", &request).await?;
                Ok(response.data.unwrap_or_default().items)
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_file_upload_wire_names() {
        let upload = DataSourceFileUpload {
            hbase_site: Some("/cos/hbase-site.xml".into()),
            krb5_conf: Some("/cos/krb5.conf".into()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&upload).unwrap(),
            json!({"HBASESite": "/cos/hbase-site.xml", "KRB5Conf": "/cos/krb5.conf"})
        );
    }

    #[test]
    fn test_create_result_decodes() {
        let result: CreateDataSourceResult =
            serde_json::from_value(json!({"Status": true, "DataSourceId": 12345})).unwrap();
        assert_eq!(result.status, Some(true));
        assert_eq!(result.data_source_id, Some(12345));
    }

    #[test]
    fn test_list_request_type_filter() {
        let request = ListDataSourcesRequest {
            project_id: "p".into(),
            source_types: Some(vec!["MYSQL".into()]),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"ProjectId": "p", "Type": ["MYSQL"]})
        );
    }
}
