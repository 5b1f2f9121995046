//! Workflow actions: CreateWorkflow, GetWorkflow, UpdateWorkflow,
//! DeleteWorkflow and ListWorkflows.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::ParamInfo;
use super::{fetch_all_pages, DataResponse, Page};
use crate::client::WeDataClient;
use crate::config::pagination::LARGE_PAGE_SIZE;
use crate::error::ProviderError;

/// Scheduling settings of a workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WorkflowSchedulerConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_time_zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_depend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crontab_expression: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependency_workflow: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modify_cycle_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clear_link: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_cyclic_config: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subordinate_cyclic_config: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_open: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_id: Option<String>,
}

/// Body of CreateWorkflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateWorkflowRequest {
    pub project_id: String,
    pub workflow_name: String,
    pub parent_folder_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_uin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_params: Option<Vec<ParamInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_scheduler_configuration: Option<WorkflowSchedulerConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_info: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreateWorkflowResult {
    workflow_id: Option<String>,
}

/// Body of UpdateWorkflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateWorkflowRequest {
    pub project_id: String,
    pub workflow_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_uin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_params: Option<Vec<ParamInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_scheduler_configuration: Option<WorkflowSchedulerConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_info: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct WorkflowKey<'a> {
    project_id: &'a str,
    workflow_id: &'a str,
}

/// Workflow as returned by GetWorkflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WorkflowDetail {
    pub workflow_id: Option<String>,
    pub workflow_name: Option<String>,
    pub workflow_type: Option<String>,
    pub workflow_desc: Option<String>,
    pub owner_uin: Option<String>,
    /// Folder path including the workflow name as the last segment.
    pub path: Option<String>,
    #[serde(default)]
    pub workflow_params: Option<Vec<ParamInfo>>,
    pub workflow_scheduler_configuration: Option<WorkflowSchedulerConfiguration>,
    pub bundle_id: Option<String>,
    pub bundle_info: Option<String>,
}

/// Filters of ListWorkflows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListWorkflowsRequest {
    pub project_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_folder_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_uin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_user_uin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modify_time: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u64>,
}

impl WeDataClient {
    /// Create a workflow and return its id.
    pub async fn create_workflow(
        &self,
        request: &CreateWorkflowRequest,
    ) -> Result<Option<String>, ProviderError> {
        let response: DataResponse<CreateWorkflowResult> =
            self.request("CreateWorkflow", request).await?;
        Ok(response.data.and_then(|d| d.workflow_id))
    }

    /// Fetch one workflow. `None` when the API has no data for it.
    pub async fn get_workflow(
        &self,
        project_id: &str,
        workflow_id: &str,
    ) -> Result<Option<WorkflowDetail>, ProviderError> {
        let response: DataResponse<WorkflowDetail> = self
            .request(
                "GetWorkflow",
                &WorkflowKey {
                    project_id,
                    workflow_id,
                },
            )
            .await?;
        Ok(response.data)
    }

    /// Update a workflow in place.
    pub async fn update_workflow(&self, request: &UpdateWorkflowRequest) -> Result<(), ProviderError> {
        let _: Value = self.request("UpdateWorkflow", request).await?;
        Ok(())
    }

    /// Delete a workflow.
    pub async fn delete_workflow(&self, project_id: &str, workflow_id: &str) -> Result<(), ProviderError> {
        let _: Value = self
            .request(
                "DeleteWorkflow",
                &WorkflowKey {
                    project_id,
                    workflow_id,
                },
            )
            .await?;
        Ok(())
    }

    /// List every workflow matching the filters.
    pub async fn list_workflows(
        &self,
        filters: &ListWorkflowsRequest,
    ) -> Result<Vec<Value>, ProviderError> {
        fetch_all_pages(LARGE_PAGE_SIZE, |page| {
            let request = ListWorkflowsRequest {
                page_number: Some(page),
                page_size: Some(LARGE_PAGE_SIZE),
                ..filters.clone()
            };
            async move {
                let response: DataResponse<Page<Value>> =
                    self.request("ListWorkflows", &request).await?;
                Ok(response.data.unwrap_or_default().items)
            }
        })
        .await
    }
}
