//! `tencentcloud_wedata_workflow`
//!
//! ID: `projectId#workflowId`.

use serde_json::{Map, Value};
use tracing::debug;

use super::{merge, non_retryable, put, Resource};
use crate::client::{read_retry_error, retry, retry_error, RetryError, WeDataClient};
use crate::config::retry::{READ_TIMEOUT, WRITE_TIMEOUT};
use crate::error::ProviderError;
use crate::logging::LogElapsed;
use crate::resource_data::{from_api, BlockView, ResourceData};
use crate::resource_id;
use crate::schema::{Attribute, Block, NestedBlock, Schema};
use crate::wedata::common::ParamInfo;
use crate::wedata::workflow::{CreateWorkflowRequest, UpdateWorkflowRequest, WorkflowSchedulerConfiguration};

const TYPE_NAME: &str = "tencentcloud_wedata_workflow";

/// Arguments that trigger UpdateWorkflow when changed.
const MUTABLE_ARGS: &[&str] = &[
    "workflow_name",
    "owner_uin",
    "workflow_desc",
    "workflow_params",
    "workflow_scheduler_configuration",
    "bundle_id",
    "bundle_info",
];

/// Scheduler fields the API does not echo back; read keeps the configured values.
const WRITE_ONLY_SCHEDULER_ARGS: &[&str] = &[
    "modify_cycle_value",
    "clear_link",
    "main_cyclic_config",
    "subordinate_cyclic_config",
];

/// A workflow grouping scheduled tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkflowResource;

fn param_block() -> Block {
    Block::new()
        .with_attribute("param_key", Attribute::required_string().with_description("Parameter name."))
        .with_attribute("param_value", Attribute::required_string().with_description("Parameter value."))
}

fn scheduler_block() -> Block {
    let required = ["schedule_time_zone", "cycle_type", "self_depend", "start_time", "end_time", "crontab_expression"];
    let optional = [
        "dependency_workflow",
        "modify_cycle_value",
        "main_cyclic_config",
        "subordinate_cyclic_config",
        "execution_start_time",
        "execution_end_time",
        "calendar_open",
        "calendar_id",
    ];

    let mut block = Block::new().with_description("Unified scheduling settings.");
    for name in required {
        block = block.with_attribute(name, Attribute::required_string());
    }
    for name in optional {
        block = block.with_attribute(name, Attribute::optional_string());
    }
    block.with_attribute("clear_link", Attribute::optional_bool())
}

fn params_from(view: &BlockView<'_>, key: &str) -> Option<Vec<ParamInfo>> {
    let params: Vec<ParamInfo> = view
        .list(key)
        .iter()
        .map(|item| ParamInfo {
            param_key: item.get_str("param_key"),
            param_value: item.get_str("param_value"),
        })
        .collect();
    if params.is_empty() {
        None
    } else {
        Some(params)
    }
}

fn scheduler_from(view: &BlockView<'_>) -> Option<WorkflowSchedulerConfiguration> {
    let cfg = view.head("workflow_scheduler_configuration")?;
    Some(WorkflowSchedulerConfiguration {
        schedule_time_zone: cfg.get_string("schedule_time_zone"),
        cycle_type: cfg.get_string("cycle_type"),
        self_depend: cfg.get_string("self_depend"),
        start_time: cfg.get_string("start_time"),
        end_time: cfg.get_string("end_time"),
        crontab_expression: cfg.get_string("crontab_expression"),
        dependency_workflow: cfg.get_string("dependency_workflow"),
        modify_cycle_value: cfg.get_str("modify_cycle_value"),
        clear_link: cfg.get_bool("clear_link"),
        main_cyclic_config: cfg.get_str("main_cyclic_config"),
        subordinate_cyclic_config: cfg.get_str("subordinate_cyclic_config"),
        execution_start_time: cfg.get_string("execution_start_time"),
        execution_end_time: cfg.get_string("execution_end_time"),
        calendar_open: cfg.get_str("calendar_open"),
        calendar_id: cfg.get_string("calendar_id"),
    })
}

/// `Path` is the parent folder followed by `/<WorkflowName>`.
fn parent_folder_path(path: &str, workflow_name: &str) -> String {
    let suffix = format!("/{}", workflow_name);
    path.strip_suffix(&suffix).unwrap_or(path).to_string()
}

#[async_trait::async_trait]
impl Resource for WorkflowResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::computed_string().with_description("`projectId#workflowId`."))
            .with_attribute(
                "project_id",
                Attribute::required_string().with_force_new().with_description("Project id."),
            )
            .with_attribute("workflow_name", Attribute::required_string().with_description("Workflow name."))
            .with_attribute(
                "parent_folder_path",
                Attribute::required_string().with_immutable().with_description("Parent folder path."),
            )
            .with_attribute(
                "workflow_type",
                Attribute::optional_string()
                    .with_immutable()
                    .with_allowed_values(&["cycle", "manual"])
                    .with_description("Workflow type, `cycle` by default."),
            )
            .with_attribute("workflow_desc", Attribute::optional_string())
            .with_attribute("owner_uin", Attribute::optional_computed_string())
            .with_attribute("bundle_id", Attribute::optional_string())
            .with_attribute("bundle_info", Attribute::optional_string())
            .with_attribute("workflow_id", Attribute::computed_string())
            .with_block("workflow_params", NestedBlock::set(param_block()))
            .with_block(
                "workflow_scheduler_configuration",
                NestedBlock::single(scheduler_block()).with_computed(),
            )
    }

    fn importable(&self) -> bool {
        true
    }

    async fn create(&self, client: &WeDataClient, data: &ResourceData) -> Result<String, ProviderError> {
        let _elapsed = LogElapsed::new("resource.tencentcloud_wedata_workflow.create");
        let view = data.view();

        let project_id = data.get_str("project_id").unwrap_or_default();
        let request = CreateWorkflowRequest {
            project_id: project_id.clone(),
            workflow_name: data.get_str("workflow_name").unwrap_or_default(),
            parent_folder_path: data.get_str("parent_folder_path").unwrap_or_default(),
            workflow_type: data.get_str("workflow_type"),
            workflow_desc: data.get_str("workflow_desc"),
            owner_uin: data.get_str("owner_uin"),
            workflow_params: params_from(&view, "workflow_params"),
            workflow_scheduler_configuration: scheduler_from(&view),
            bundle_id: data.get_str("bundle_id"),
            bundle_info: data.get_str("bundle_info"),
        };

        let request = &request;
        let workflow_id = retry(WRITE_TIMEOUT, || async move {
            client
                .create_workflow(request)
                .await
                .map_err(retry_error)?
                .ok_or_else(|| non_retryable("Create wedata workflow failed, WorkflowId is nil."))
        })
        .await?;

        debug!(project_id = %project_id, workflow_id = %workflow_id, "Workflow created");
        Ok(resource_id::join(&[&project_id, &workflow_id]))
    }

    async fn read(&self, client: &WeDataClient, data: &ResourceData) -> Result<Option<Value>, ProviderError> {
        let _elapsed = LogElapsed::new("resource.tencentcloud_wedata_workflow.read");
        let [project_id, workflow_id] = resource_id::split::<2>(data.id())?;

        let detail = retry(READ_TIMEOUT, || async move {
            client
                .get_workflow(project_id, workflow_id)
                .await
                .map_err(read_retry_error)
        })
        .await?;
        let Some(detail) = detail else {
            return Ok(None);
        };

        let mut state = data.state_map();
        state.insert("project_id".into(), project_id.into());
        state.insert("workflow_id".into(), workflow_id.into());

        if let (Some(path), Some(name)) = (&detail.path, &detail.workflow_name) {
            state.insert("parent_folder_path".into(), parent_folder_path(path, name).into());
        }
        put(&mut state, "workflow_name", detail.workflow_name);
        put(&mut state, "owner_uin", detail.owner_uin);
        put(&mut state, "workflow_type", detail.workflow_type);
        put(&mut state, "workflow_desc", detail.workflow_desc);
        put(&mut state, "bundle_id", detail.bundle_id);
        put(&mut state, "bundle_info", detail.bundle_info);

        if let Some(params) = detail.workflow_params {
            let params: Vec<Value> = params
                .into_iter()
                .map(|p| {
                    let mut item = Map::new();
                    put(&mut item, "param_key", p.param_key);
                    put(&mut item, "param_value", p.param_value);
                    Value::Object(item)
                })
                .collect();
            state.insert("workflow_params".into(), Value::Array(params));
        }

        if let Some(cfg) = detail.workflow_scheduler_configuration {
            let block = scheduler_block();
            let mut converted = Map::new();
            merge(&mut converted, from_api(&block, &serde_json::to_value(&cfg)?));
            for key in WRITE_ONLY_SCHEDULER_ARGS {
                converted.remove(*key);
                if let Some(prior) = data
                    .head("workflow_scheduler_configuration")
                    .and_then(|p| p.get(key).cloned())
                {
                    converted.insert(key.to_string(), prior);
                }
            }
            state.insert(
                "workflow_scheduler_configuration".into(),
                Value::Array(vec![Value::Object(converted)]),
            );
        }

        Ok(Some(Value::Object(state)))
    }

    async fn update(&self, client: &WeDataClient, data: &ResourceData) -> Result<(), ProviderError> {
        let _elapsed = LogElapsed::new("resource.tencentcloud_wedata_workflow.update");
        let [project_id, workflow_id] = resource_id::split::<2>(data.id())?;

        let Some(changed) = data.first_change(MUTABLE_ARGS) else {
            return Ok(());
        };
        debug!(workflow_id, changed, "Updating workflow");

        let view = data.view();
        let request = UpdateWorkflowRequest {
            project_id: project_id.to_string(),
            workflow_id: workflow_id.to_string(),
            workflow_name: data.get_str("workflow_name"),
            owner_uin: data.get_str("owner_uin"),
            workflow_desc: data.get_str("workflow_desc"),
            workflow_params: params_from(&view, "workflow_params"),
            workflow_scheduler_configuration: scheduler_from(&view),
            bundle_id: data.get_str("bundle_id"),
            bundle_info: data.get_str("bundle_info"),
        };

        let request = &request;
        retry(WRITE_TIMEOUT, || async move {
            client.update_workflow(request).await.map_err(retry_error)
        })
        .await
    }

    async fn delete(&self, client: &WeDataClient, data: &ResourceData) -> Result<(), RetryError> {
        let _elapsed = LogElapsed::new("resource.tencentcloud_wedata_workflow.delete");
        let [project_id, workflow_id] = resource_id::split::<2>(data.id())?;

        client
            .delete_workflow(project_id, workflow_id)
            .await
            .map_err(retry_error)
    }
}
