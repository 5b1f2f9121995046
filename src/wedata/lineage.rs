//! Lineage actions: RegisterLineage, ListLineage and DeleteLineage.

use serde::{Deserialize, Serialize};

use super::{fetch_all_pages, DataResponse, Page};
use crate::client::WeDataClient;
use crate::error::ProviderError;

/// Free-form name/value property of a lineage node or process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LineageProperty {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// One end of a lineage edge (a table, a topic, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LineageResource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_unique_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_properties: Option<Vec<LineageProperty>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lineage_node_id: Option<String>,
}

impl LineageResource {
    /// Resource carrying only its identity triple.
    pub fn identity(unique_id: &str, resource_type: &str, platform: &str) -> Self {
        Self {
            resource_unique_id: Some(unique_id.to_string()),
            resource_type: Some(resource_type.to_string()),
            platform: Some(platform.to_string()),
            ..Default::default()
        }
    }
}

/// Job or task that moves data from source to target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LineageProcess {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_sub_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_properties: Option<Vec<LineageProperty>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lineage_node_id: Option<String>,
}

impl LineageProcess {
    /// Process carrying only its identity triple.
    pub fn identity(process_id: &str, process_type: &str, platform: &str) -> Self {
        Self {
            process_id: Some(process_id.to_string()),
            process_type: Some(process_type.to_string()),
            platform: Some(platform.to_string()),
            ..Default::default()
        }
    }

    /// Whether id, type and platform all equal the given values.
    pub fn is(&self, process_id: &str, process_type: &str, platform: &str) -> bool {
        self.process_id.as_deref() == Some(process_id)
            && self.process_type.as_deref() == Some(process_type)
            && self.platform.as_deref() == Some(platform)
    }
}

/// A source, a target and the processes linking them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LineagePair {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<LineageResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<LineageResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processes: Option<Vec<LineageProcess>>,
}

/// Body of RegisterLineage and DeleteLineage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LineageRelationsRequest {
    pub relations: Vec<LineagePair>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LineageRelation {
    pub processes: Option<Vec<LineageProcess>>,
}

/// One neighbour returned by ListLineage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LineageNodeInfo {
    pub resource: Option<LineageResource>,
    pub relation: Option<LineageRelation>,
}

/// Filters of ListLineage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListLineageRequest {
    pub resource_unique_id: String,
    pub resource_type: String,
    pub platform: String,
    /// `INPUT` or `OUTPUT`.
    pub direction: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LineageStatus {
    status: Option<i64>,
}

impl WeDataClient {
    /// Register lineage relations. Returns the reported status (1 on success).
    pub async fn register_lineage(&self, request: &LineageRelationsRequest) -> Result<Option<i64>, ProviderError> {
        let response: DataResponse<LineageStatus> = self.request("RegisterLineage", request).await?;
        Ok(response.data.and_then(|d| d.status))
    }

    /// Delete lineage relations. Returns the reported status (1 on success).
    pub async fn delete_lineage(&self, request: &LineageRelationsRequest) -> Result<Option<i64>, ProviderError> {
        let response: DataResponse<LineageStatus> = self.request("DeleteLineage", request).await?;
        Ok(response.data.and_then(|d| d.status))
    }

    /// List every neighbour of a resource in one direction.
    pub async fn list_lineage(
        &self,
        filters: &ListLineageRequest,
        page_size: u64,
    ) -> Result<Vec<LineageNodeInfo>, ProviderError> {
        fetch_all_pages(page_size, |page| {
            let request = ListLineageRequest {
                page_number: Some(page),
                page_size: Some(page_size),
                ..filters.clone()
            };
            async move {
                let response: DataResponse<Page<LineageNodeInfo>> =
                    self.request("ListLineage", &request).await?;
                Ok(response.data.unwrap_or_default().items)
            }
        })
        .await
    }
}
