//! Task actions: CreateTask, GetTask, UpdateTask, DeleteTask and ListTasks.
//!
//! The same models are used for requests and replies. Numeric settings are
//! sent as strings and may come back as numbers, so those fields accept both.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use super::common::ParamInfo;
use super::{fetch_all_pages, string_or_number, DataResponse, Page};
use crate::client::WeDataClient;
use crate::config::pagination::LARGE_PAGE_SIZE;
use crate::error::ProviderError;

/// Name, type, owner and workflow of a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskBaseAttribute {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub task_type_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_uin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_description: Option<String>,
}

/// Code, cluster and bundle settings of a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,
    /// Base64 encoded code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_ext_configuration_list: Option<Vec<ParamInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_cluster: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broker_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yarn_queue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_service_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_service_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_scheduling_parameter_list: Option<Vec<ParamInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_info: Option<String>,
}

/// How a task waits on an upstream instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DependencyStrategy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polling_null_strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_dependency_executing_strategies: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_dependency_executing_timeout_value: Option<i64>,
}

/// One upstream dependency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DependencyTaskBrief {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_cyclic_config: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subordinate_cyclic_config: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependency_strategy: Option<DependencyStrategy>,
}

/// Event that triggers a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EventListener {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_sub_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_broadcast_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties_list: Option<Vec<ParamInfo>>,
}

/// Input parameter taken from a parent task's output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InTaskParameter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param_desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_task_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_param_key: Option<String>,
}

/// Table registered as a task output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskDataRegistry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datasource_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_flow_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_physical_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_guid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_guid: Option<String>,
}

/// Scheduling settings of a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskSchedulerConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_time_zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crontab_expression: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_end_time: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub schedule_run_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_open: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_depend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_dependency_config_list: Option<Vec<DependencyTaskBrief>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_listener_list: Option<Vec<EventListener>>,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub run_priority: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub retry_wait: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_retry_attempts: Option<String>,
    #[serde(
        rename = "ExecutionTTL",
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub execution_ttl: Option<String>,
    #[serde(
        rename = "WaitExecutionTotalTTL",
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub wait_execution_total_ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_redo_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param_task_out_list: Option<Vec<ParamInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param_task_in_list: Option<Vec<InTaskParameter>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_output_registry_list: Option<Vec<TaskDataRegistry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init_strategy: Option<String>,
}

/// Body of CreateTask.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateTaskRequest {
    pub project_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_base_attribute: Option<TaskBaseAttribute>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_configuration: Option<TaskConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_scheduler_configuration: Option<TaskSchedulerConfiguration>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreateTaskResult {
    task_id: Option<String>,
}

/// Task as returned by GetTask.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskDetail {
    pub task_base_attribute: Option<TaskBaseAttribute>,
    pub task_configuration: Option<TaskConfiguration>,
    pub task_scheduler_configuration: Option<TaskSchedulerConfiguration>,
}

/// The `Task` member of UpdateTask. The workflow and task type are fixed at
/// creation and are left out of `task_base_attribute`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateTaskBrief {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_base_attribute: Option<TaskBaseAttribute>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_configuration: Option<TaskConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_scheduler_configuration: Option<UpdateTaskScheduler>,
}

/// Scheduler settings as UpdateTask expects them. CreateTask takes these
/// settings as strings but UpdateTask wants integers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTaskScheduler(pub TaskSchedulerConfiguration);

const NUMERIC_ON_UPDATE: &[&str] = &[
    "ScheduleRunType",
    "RunPriority",
    "RetryWait",
    "MaxRetryAttempts",
    "ExecutionTTL",
];

impl Serialize for UpdateTaskScheduler {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut value = serde_json::to_value(&self.0).map_err(serde::ser::Error::custom)?;
        if let Some(fields) = value.as_object_mut() {
            for key in NUMERIC_ON_UPDATE {
                let parsed = fields
                    .get(*key)
                    .and_then(Value::as_str)
                    .and_then(|s| s.parse::<i64>().ok());
                if let Some(n) = parsed {
                    fields.insert(key.to_string(), Value::from(n));
                }
            }
        }
        value.serialize(serializer)
    }
}

/// Body of UpdateTask.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateTaskRequest {
    pub project_id: String,
    pub task_id: String,
    pub task: UpdateTaskBrief,
}

/// Body of DeleteTask.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteTaskRequest {
    pub project_id: String,
    pub task_id: String,
    /// Notify the owners of downstream tasks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operate_inform: Option<bool>,
    /// Also delete downstream dependencies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_mode: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct TaskKey<'a> {
    project_id: &'a str,
    task_id: &'a str,
}

/// Filters of ListTasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListTasksRequest {
    pub project_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_uin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_type_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,
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
    /// Create a task and return its id.
    pub async fn create_task(&self, request: &CreateTaskRequest) -> Result<Option<String>, ProviderError> {
        let response: DataResponse<CreateTaskResult> = self.request("CreateTask", request).await?;
        Ok(response.data.and_then(|d| d.task_id))
    }

    /// Fetch one task. `None` when the API has no data for it.
    pub async fn get_task(&self, project_id: &str, task_id: &str) -> Result<Option<TaskDetail>, ProviderError> {
        let response: DataResponse<TaskDetail> = self
            .request("GetTask", &TaskKey { project_id, task_id })
            .await?;
        Ok(response.data)
    }

    /// Update a task in place.
    pub async fn update_task(&self, request: &UpdateTaskRequest) -> Result<(), ProviderError> {
        let _: Value = self.request("UpdateTask", request).await?;
        Ok(())
    }

    /// Delete a task.
    pub async fn delete_task(&self, request: &DeleteTaskRequest) -> Result<(), ProviderError> {
        let _: Value = self.request("DeleteTask", request).await?;
        Ok(())
    }

    /// List every task matching the filters.
    pub async fn list_tasks(&self, filters: &ListTasksRequest) -> Result<Vec<Value>, ProviderError> {
        fetch_all_pages(LARGE_PAGE_SIZE, |page| {
            let request = ListTasksRequest {
                page_number: Some(page),
                page_size: Some(LARGE_PAGE_SIZE),
                ..filters.clone()
            };
            async move {
                let response: DataResponse<Page<Value>> = self.request("ListTasks", &request).await?;
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
    fn test_numeric_fields_come_back_as_strings() {
        let detail: TaskDetail = serde_json::from_value(json!({
            "TaskBaseAttribute": {"TaskName": "t", "TaskTypeId": 26, "WorkflowId": "wf"},
            "TaskSchedulerConfiguration": {
                "ScheduleRunType": 0,
                "RunPriority": 6,
                "RetryWait": 5,
                "MaxRetryAttempts": 4,
                "ExecutionTTL": -1,
                "WaitExecutionTotalTTL": "-1"
            }
        }))
        .unwrap();

        let base = detail.task_base_attribute.unwrap();
        assert_eq!(base.task_type_id.as_deref(), Some("26"));
        let scheduler = detail.task_scheduler_configuration.unwrap();
        assert_eq!(scheduler.schedule_run_type.as_deref(), Some("0"));
        assert_eq!(scheduler.run_priority.as_deref(), Some("6"));
        assert_eq!(scheduler.retry_wait.as_deref(), Some("5"));
        assert_eq!(scheduler.max_retry_attempts.as_deref(), Some("4"));
        assert_eq!(scheduler.execution_ttl.as_deref(), Some("-1"));
        assert_eq!(scheduler.wait_execution_total_ttl.as_deref(), Some("-1"));
        assert!(detail.task_configuration.is_none());
    }

    #[test]
    fn test_ttl_wire_names() {
        let scheduler = TaskSchedulerConfiguration {
            execution_ttl: Some("30".into()),
            wait_execution_total_ttl: Some("60".into()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&scheduler).unwrap(),
            json!({"ExecutionTTL": "30", "WaitExecutionTotalTTL": "60"})
        );
    }

    #[test]
    fn test_update_request_shape() {
        let request = UpdateTaskRequest {
            project_id: "p".into(),
            task_id: "t".into(),
            task: UpdateTaskBrief {
                task_base_attribute: Some(TaskBaseAttribute {
                    task_name: Some("renamed".into()),
                    ..Default::default()
                }),
                ..Default::default()
            },
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "ProjectId": "p",
                "TaskId": "t",
                "Task": {"TaskBaseAttribute": {"TaskName": "renamed"}}
            })
        );
    }

    #[test]
    fn test_update_scheduler_sends_integers() {
        let scheduler = UpdateTaskScheduler(TaskSchedulerConfiguration {
            cycle_type: Some("DAY_CYCLE".into()),
            schedule_run_type: Some("0".into()),
            run_priority: Some("6".into()),
            retry_wait: Some("5".into()),
            max_retry_attempts: Some("4".into()),
            execution_ttl: Some("-1".into()),
            wait_execution_total_ttl: Some("-1".into()),
            ..Default::default()
        });
        assert_eq!(
            serde_json::to_value(&scheduler).unwrap(),
            json!({
                "CycleType": "DAY_CYCLE",
                "ScheduleRunType": 0,
                "RunPriority": 6,
                "RetryWait": 5,
                "MaxRetryAttempts": 4,
                "ExecutionTTL": -1,
                "WaitExecutionTotalTTL": "-1"
            })
        );
    }

    #[test]
    fn test_delete_request_flags() {
        let request = DeleteTaskRequest {
            project_id: "p".into(),
            task_id: "t".into(),
            operate_inform: Some(false),
            delete_mode: None,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"ProjectId": "p", "TaskId": "t", "OperateInform": false})
        );
    }
}
