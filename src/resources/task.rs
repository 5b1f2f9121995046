//! `tencentcloud_wedata_task`
//!
//! ID: `projectId#taskId`. The task is configured through three single-item
//! blocks mirroring the API: base attributes, run configuration and
//! scheduling.

use serde_json::{Map, Value};
use tracing::debug;

use super::{non_retryable, Resource};
use crate::client::{read_retry_error, retry, retry_error, RetryError, WeDataClient};
use crate::config::retry::{READ_TIMEOUT, WRITE_TIMEOUT};
use crate::error::ProviderError;
use crate::logging::LogElapsed;
use crate::resource_data::{from_api, BlockView, ResourceData};
use crate::resource_id;
use crate::schema::{Attribute, AttributeType, AttributeFlags, Block, NestedBlock, Schema};
use crate::wedata::common::ParamInfo;
use crate::wedata::task::{
    CreateTaskRequest, DeleteTaskRequest, DependencyStrategy, DependencyTaskBrief, EventListener,
    InTaskParameter, TaskBaseAttribute, TaskConfiguration, TaskDataRegistry, TaskSchedulerConfiguration,
    UpdateTaskBrief, UpdateTaskRequest, UpdateTaskScheduler,
};

const TYPE_NAME: &str = "tencentcloud_wedata_task";

const BASE: &str = "task_base_attribute";
const CONFIGURATION: &str = "task_configuration";
const SCHEDULER: &str = "task_scheduler_configuration";

/// A scheduled task inside a workflow.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskResource;

fn with_optional(block: Block, names: &[&str]) -> Block {
    names.iter().fold(block, |block, name| {
        block.with_attribute(*name, Attribute::optional_computed_string())
    })
}

fn with_required(block: Block, names: &[&str]) -> Block {
    names
        .iter()
        .fold(block, |block, name| block.with_attribute(*name, Attribute::required_string()))
}

fn param_block() -> Block {
    with_required(Block::new(), &["param_key", "param_value"])
}

fn base_block() -> Block {
    let block = with_required(Block::new(), &["task_name", "task_type_id", "workflow_id"]);
    with_optional(block, &["owner_uin", "task_description"])
}

fn configuration_block() -> Block {
    let block = with_optional(
        Block::new(),
        &[
            "resource_group",
            "data_cluster",
            "broker_ip",
            "yarn_queue",
            "source_service_id",
            "target_service_id",
            "bundle_id",
            "bundle_info",
        ],
    );
    block
        .with_attribute(
            "code_content",
            Attribute::optional_computed_string().with_description("Base64 encoded task code."),
        )
        .with_block(
            "task_ext_configuration_list",
            NestedBlock::set(param_block()).with_computed(),
        )
        .with_block(
            "task_scheduling_parameter_list",
            NestedBlock::set(param_block()).with_computed(),
        )
}

fn dependency_block() -> Block {
    let strategy = with_optional(Block::new(), &["polling_null_strategy"])
        .with_attribute(
            "task_dependency_executing_strategies",
            Attribute::new(
                AttributeType::set(AttributeType::String),
                AttributeFlags::optional_computed(),
            ),
        )
        .with_attribute(
            "task_dependency_executing_timeout_value",
            Attribute::new(AttributeType::Int64, AttributeFlags::optional_computed()),
        );

    let block = with_required(Block::new(), &["task_id", "main_cyclic_config"]);
    with_optional(block, &["subordinate_cyclic_config", "offset"]).with_block(
        "dependency_strategy",
        NestedBlock::single(strategy).with_computed(),
    )
}

fn event_listener_block() -> Block {
    with_required(Block::new(), &["event_name", "event_sub_type", "event_broadcast_type"])
        .with_block("properties_list", NestedBlock::list(param_block()).with_computed())
}

fn scheduler_block() -> Block {
    let block = with_optional(
        Block::new(),
        &[
            "cycle_type",
            "schedule_time_zone",
            "crontab_expression",
            "start_time",
            "end_time",
            "execution_start_time",
            "execution_end_time",
            "schedule_run_type",
            "calendar_open",
            "calendar_id",
            "self_depend",
            "run_priority",
            "retry_wait",
            "max_retry_attempts",
            "execution_ttl",
            "wait_execution_total_ttl",
            "allow_redo_type",
        ],
    );
    let in_param = with_required(
        Block::new(),
        &["param_key", "param_desc", "from_task_id", "from_param_key"],
    );
    let registry = with_optional(
        with_required(
            Block::new(),
            &[
                "datasource_id",
                "database_name",
                "table_name",
                "partition_name",
                "data_flow_type",
                "table_physical_id",
            ],
        ),
        &["db_guid", "table_guid"],
    );

    block
        .with_attribute(
            "init_strategy",
            Attribute::optional_computed_string().with_allowed_values(&["T_PLUS_0", "T_PLUS_1"]),
        )
        .with_block(
            "upstream_dependency_config_list",
            NestedBlock::list(dependency_block()).with_computed(),
        )
        .with_block(
            "event_listener_list",
            NestedBlock::list(event_listener_block()).with_computed(),
        )
        .with_block("param_task_out_list", NestedBlock::list(param_block()).with_computed())
        .with_block("param_task_in_list", NestedBlock::list(in_param).with_computed())
        .with_block("task_output_registry_list", NestedBlock::list(registry).with_computed())
}

fn params_from(view: &BlockView<'_>, key: &str) -> Option<Vec<ParamInfo>> {
    let items = view.list(key);
    if items.is_empty() {
        return None;
    }
    Some(
        items
            .iter()
            .map(|item| ParamInfo {
                param_key: item.get_str("param_key"),
                param_value: item.get_str("param_value"),
            })
            .collect(),
    )
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

fn base_from(view: &BlockView<'_>) -> Option<TaskBaseAttribute> {
    let base = view.head(BASE)?;
    Some(TaskBaseAttribute {
        task_name: base.get_str("task_name"),
        task_type_id: base.get_str("task_type_id"),
        workflow_id: base.get_str("workflow_id"),
        owner_uin: base.get_str("owner_uin"),
        task_description: base.get_str("task_description"),
    })
}

fn configuration_from(view: &BlockView<'_>) -> Option<TaskConfiguration> {
    let cfg = view.head(CONFIGURATION)?;
    Some(TaskConfiguration {
        resource_group: cfg.get_str("resource_group"),
        code_content: cfg.get_str("code_content"),
        task_ext_configuration_list: params_from(&cfg, "task_ext_configuration_list"),
        data_cluster: cfg.get_str("data_cluster"),
        broker_ip: cfg.get_str("broker_ip"),
        yarn_queue: cfg.get_str("yarn_queue"),
        source_service_id: cfg.get_str("source_service_id"),
        target_service_id: cfg.get_str("target_service_id"),
        task_scheduling_parameter_list: params_from(&cfg, "task_scheduling_parameter_list"),
        bundle_id: cfg.get_str("bundle_id"),
        bundle_info: cfg.get_str("bundle_info"),
    })
}

fn dependency_from(item: &BlockView<'_>) -> DependencyTaskBrief {
    DependencyTaskBrief {
        task_id: item.get_str("task_id"),
        main_cyclic_config: item.get_str("main_cyclic_config"),
        subordinate_cyclic_config: item.get_str("subordinate_cyclic_config"),
        offset: item.get_str("offset"),
        dependency_strategy: item.head("dependency_strategy").map(|s| DependencyStrategy {
            polling_null_strategy: s.get_str("polling_null_strategy"),
            task_dependency_executing_strategies: s.get_str_list("task_dependency_executing_strategies"),
            task_dependency_executing_timeout_value: s.get_i64("task_dependency_executing_timeout_value"),
        }),
    }
}

fn scheduler_from(view: &BlockView<'_>) -> Option<TaskSchedulerConfiguration> {
    let cfg = view.head(SCHEDULER)?;

    let upstream = cfg
        .list("upstream_dependency_config_list")
        .iter()
        .map(dependency_from)
        .collect();
    let listeners = cfg
        .list("event_listener_list")
        .iter()
        .map(|item| EventListener {
            event_name: item.get_str("event_name"),
            event_sub_type: item.get_str("event_sub_type"),
            event_broadcast_type: item.get_str("event_broadcast_type"),
            properties_list: params_from(item, "properties_list"),
        })
        .collect();
    let in_params = cfg
        .list("param_task_in_list")
        .iter()
        .map(|item| InTaskParameter {
            param_key: item.get_str("param_key"),
            param_desc: item.get_str("param_desc"),
            from_task_id: item.get_str("from_task_id"),
            from_param_key: item.get_str("from_param_key"),
        })
        .collect();
    let registries = cfg
        .list("task_output_registry_list")
        .iter()
        .map(|item| TaskDataRegistry {
            datasource_id: item.get_str("datasource_id"),
            database_name: item.get_str("database_name"),
            table_name: item.get_str("table_name"),
            partition_name: item.get_str("partition_name"),
            data_flow_type: item.get_str("data_flow_type"),
            table_physical_id: item.get_str("table_physical_id"),
            db_guid: item.get_str("db_guid"),
            table_guid: item.get_str("table_guid"),
        })
        .collect();

    Some(TaskSchedulerConfiguration {
        cycle_type: cfg.get_str("cycle_type"),
        schedule_time_zone: cfg.get_str("schedule_time_zone"),
        crontab_expression: cfg.get_str("crontab_expression"),
        start_time: cfg.get_str("start_time"),
        end_time: cfg.get_str("end_time"),
        execution_start_time: cfg.get_str("execution_start_time"),
        execution_end_time: cfg.get_str("execution_end_time"),
        schedule_run_type: cfg.get_str("schedule_run_type"),
        calendar_open: cfg.get_str("calendar_open"),
        calendar_id: cfg.get_str("calendar_id"),
        self_depend: cfg.get_str("self_depend"),
        upstream_dependency_config_list: non_empty(upstream),
        event_listener_list: non_empty(listeners),
        run_priority: cfg.get_str("run_priority"),
        retry_wait: cfg.get_str("retry_wait"),
        max_retry_attempts: cfg.get_str("max_retry_attempts"),
        execution_ttl: cfg.get_str("execution_ttl"),
        wait_execution_total_ttl: cfg.get_str("wait_execution_total_ttl"),
        allow_redo_type: cfg.get_str("allow_redo_type"),
        param_task_out_list: params_from(&cfg, "param_task_out_list"),
        param_task_in_list: non_empty(in_params),
        task_output_registry_list: non_empty(registries),
        init_strategy: cfg.get_str("init_strategy"),
    })
}

/// Convert one reply block into a single-item state list.
fn block_state<T: serde::Serialize>(block: &Block, value: &T) -> Result<Value, ProviderError> {
    Ok(Value::Array(vec![from_api(block, &serde_json::to_value(value)?)]))
}

#[async_trait::async_trait]
impl Resource for TaskResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        let single_required = |block| NestedBlock::single(block).with_min_items(1);
        Schema::v0()
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("project_id", Attribute::required_string().with_description("Project id."))
            .with_attribute(
                "operate_inform",
                Attribute::optional_bool().with_description("Notify the owners of downstream tasks on delete."),
            )
            .with_attribute(
                "delete_mode",
                Attribute::optional_bool().with_description("Also delete downstream dependencies on delete."),
            )
            .with_block(BASE, single_required(base_block()))
            .with_block(CONFIGURATION, single_required(configuration_block()))
            .with_block(SCHEDULER, single_required(scheduler_block()))
    }

    fn importable(&self) -> bool {
        true
    }

    async fn create(&self, client: &WeDataClient, data: &ResourceData) -> Result<String, ProviderError> {
        let _elapsed = LogElapsed::new("resource.tencentcloud_wedata_task.create");
        let view = data.view();

        let project_id = data.get_str("project_id").unwrap_or_default();
        let request = CreateTaskRequest {
            project_id: project_id.clone(),
            task_base_attribute: base_from(&view),
            task_configuration: configuration_from(&view),
            task_scheduler_configuration: scheduler_from(&view),
        };

        let request = &request;
        let task_id = retry(WRITE_TIMEOUT, || async move {
            client
                .create_task(request)
                .await
                .map_err(retry_error)?
                .ok_or_else(|| non_retryable("taskId is nil"))
        })
        .await?;

        debug!(project_id = %project_id, task_id = %task_id, "Task created");
        Ok(resource_id::join(&[&project_id, &task_id]))
    }

    async fn read(&self, client: &WeDataClient, data: &ResourceData) -> Result<Option<Value>, ProviderError> {
        let _elapsed = LogElapsed::new("resource.tencentcloud_wedata_task.read");
        let [project_id, task_id] = resource_id::split::<2>(data.id())?;

        let detail = retry(READ_TIMEOUT, || async move {
            client.get_task(project_id, task_id).await.map_err(read_retry_error)
        })
        .await?;
        let Some(detail) = detail else {
            return Ok(None);
        };

        let mut state: Map<String, Value> = data.state_map();
        state.insert("project_id".into(), project_id.into());
        if let Some(base) = &detail.task_base_attribute {
            state.insert(BASE.into(), block_state(&base_block(), base)?);
        }
        if let Some(cfg) = &detail.task_configuration {
            state.insert(CONFIGURATION.into(), block_state(&configuration_block(), cfg)?);
        }
        if let Some(cfg) = &detail.task_scheduler_configuration {
            state.insert(SCHEDULER.into(), block_state(&scheduler_block(), cfg)?);
        }

        Ok(Some(Value::Object(state)))
    }

    async fn update(&self, client: &WeDataClient, data: &ResourceData) -> Result<(), ProviderError> {
        let _elapsed = LogElapsed::new("resource.tencentcloud_wedata_task.update");
        let [project_id, task_id] = resource_id::split::<2>(data.id())?;

        let Some(changed) = data.first_change(&[BASE, CONFIGURATION, SCHEDULER]) else {
            return Ok(());
        };
        debug!(task_id, changed, "Updating task");

        let view = data.view();
        // The workflow and task type are fixed once the task exists.
        let base = base_from(&view).map(|base| TaskBaseAttribute {
            task_type_id: None,
            workflow_id: None,
            ..base
        });
        let request = UpdateTaskRequest {
            project_id: project_id.to_string(),
            task_id: task_id.to_string(),
            task: UpdateTaskBrief {
                task_base_attribute: base,
                task_configuration: configuration_from(&view),
                task_scheduler_configuration: scheduler_from(&view).map(UpdateTaskScheduler),
            },
        };

        let request = &request;
        retry(WRITE_TIMEOUT, || async move {
            client.update_task(request).await.map_err(retry_error)
        })
        .await
    }

    async fn delete(&self, client: &WeDataClient, data: &ResourceData) -> Result<(), RetryError> {
        let _elapsed = LogElapsed::new("resource.tencentcloud_wedata_task.delete");
        let [project_id, task_id] = resource_id::split::<2>(data.id())?;

        let request = DeleteTaskRequest {
            project_id: project_id.to_string(),
            task_id: task_id.to_string(),
            operate_inform: data.get_bool("operate_inform"),
            delete_mode: data.get_bool("delete_mode"),
        };
        client.delete_task(&request).await.map_err(retry_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_state() -> Value {
        json!({
            "project_id": "1460947878944567296",
            "task_base_attribute": [{
                "task_name": "sync_orders",
                "task_type_id": "26",
                "workflow_id": "wf-1",
                "task_description": ""
            }],
            "task_configuration": [{
                "code_content": "c2VsZWN0IDE=",
                "task_ext_configuration_list": [{"param_key": "specLabel", "param_value": "small"}]
            }],
            "task_scheduler_configuration": [{
                "cycle_type": "DAY_CYCLE",
                "run_priority": "6",
                "upstream_dependency_config_list": [{
                    "task_id": "t-0",
                    "main_cyclic_config": "DAY",
                    "dependency_strategy": [{
                        "polling_null_strategy": "NOT_EXIST_WAITING",
                        "task_dependency_executing_strategies": ["CHILD_IS_RUNNING"],
                        "task_dependency_executing_timeout_value": 30
                    }]
                }],
                "param_task_in_list": []
            }]
        })
    }

    #[test]
    fn test_request_blocks_from_state() {
        let data = ResourceData::new(sample_state());
        let view = data.view();

        let base = base_from(&view).unwrap();
        assert_eq!(base.task_name.as_deref(), Some("sync_orders"));
        assert_eq!(base.task_description, None);

        let cfg = configuration_from(&view).unwrap();
        assert_eq!(cfg.task_ext_configuration_list.unwrap().len(), 1);
        assert_eq!(cfg.task_scheduling_parameter_list, None);

        let scheduler = scheduler_from(&view).unwrap();
        assert_eq!(scheduler.run_priority.as_deref(), Some("6"));
        assert_eq!(scheduler.param_task_in_list, None);
        let upstream = scheduler.upstream_dependency_config_list.unwrap();
        let strategy = upstream[0].dependency_strategy.clone().unwrap();
        assert_eq!(strategy.task_dependency_executing_timeout_value, Some(30));
        assert_eq!(
            strategy.task_dependency_executing_strategies,
            Some(vec!["CHILD_IS_RUNNING".to_string()])
        );
    }

    #[test]
    fn test_reply_block_to_state() {
        let scheduler = TaskSchedulerConfiguration {
            cycle_type: Some("DAY_CYCLE".into()),
            run_priority: Some("6".into()),
            execution_ttl: Some("-1".into()),
            upstream_dependency_config_list: Some(vec![DependencyTaskBrief {
                task_id: Some("t-0".into()),
                dependency_strategy: Some(DependencyStrategy {
                    polling_null_strategy: Some("NOT_EXIST_WAITING".into()),
                    ..Default::default()
                }),
                ..Default::default()
            }]),
            ..Default::default()
        };
        let state = block_state(&scheduler_block(), &scheduler).unwrap();
        assert_eq!(
            state,
            json!([{
                "cycle_type": "DAY_CYCLE",
                "run_priority": "6",
                "execution_ttl": "-1",
                "upstream_dependency_config_list": [{
                    "task_id": "t-0",
                    "dependency_strategy": [{"polling_null_strategy": "NOT_EXIST_WAITING"}]
                }]
            }])
        );
    }

    #[test]
    fn test_schema_requires_all_three_blocks() {
        let schema = TaskResource.schema();
        for name in [BASE, CONFIGURATION, SCHEDULER] {
            let block = &schema.block.blocks[name];
            assert_eq!((block.min_items, block.max_items), (1, 1), "{}", name);
        }
        assert!(schema.immutable_names().is_empty());
    }

    #[test]
    fn test_configuration_and_scheduler_keep_specific_attributes() {
        let schema = TaskResource.schema();
        let code_content = &schema.block.blocks[CONFIGURATION].block.attributes["code_content"];
        assert!(code_content.flags.optional && code_content.flags.computed);
        assert_eq!(code_content.description.as_deref(), Some("Base64 encoded task code."));

        let init_strategy = &schema.block.blocks[SCHEDULER].block.attributes["init_strategy"];
        assert_eq!(init_strategy.allowed_values, vec!["T_PLUS_0".to_string(), "T_PLUS_1".to_string()]);
    }
}
