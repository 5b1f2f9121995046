use serde_json::{json, Value};
use tencentcloud_wedata_provider::testing::{
    assert_plan_changes_attribute, assert_plan_replaces, assert_plan_updates_in_place, ProviderTester,
};
use tencentcloud_wedata_provider::{Credential, ProviderService, WeDataClient, WeDataProvider};
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LINEAGE_ID: &str = "db.src,TABLE,WEDATA#db.tgt,TABLE,WEDATA#task-1,SCHEDULE_TASK,WEDATA";

fn provider_for(server: &MockServer) -> WeDataProvider {
    let client = WeDataClient::with_endpoint(Credential::new("AKIDtest", "secret"), "ap-guangzhou", server.uri());
    WeDataProvider::with_client(client)
}

fn reply(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "Response": {"Data": data, "RequestId": "req-1"}
    }))
}

fn api_error(code: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "Response": {
            "Error": {"Code": code, "Message": "object does not exist"},
            "RequestId": "req-err"
        }
    }))
}

fn action(name: &str) -> wiremock::MockBuilder {
    Mock::given(method("POST")).and(path("/")).and(header("X-TC-Action", name))
}

fn workflow_detail(desc: &str) -> Value {
    json!({
        "WorkflowId": "wf-1",
        "WorkflowName": "daily_etl",
        "WorkflowType": "cycle",
        "WorkflowDesc": desc,
        "OwnerUin": "100028439226",
        "Path": "/ods/daily_etl"
    })
}

fn lineage_state() -> Value {
    json!({
        "relations": [{
            "source": [{"resource_unique_id": "db.src", "resource_type": "TABLE", "platform": "WEDATA"}],
            "target": [{"resource_unique_id": "db.tgt", "resource_type": "TABLE", "platform": "WEDATA"}],
            "processes": [{"process_id": "task-1", "process_type": "SCHEDULE_TASK", "platform": "WEDATA"}]
        }]
    })
}

fn lineage_neighbour(unique_id: &str) -> Value {
    json!({
        "Resource": {"ResourceUniqueId": unique_id, "ResourceType": "TABLE", "Platform": "WEDATA"},
        "Relation": {
            "Processes": [{"ProcessId": "task-1", "ProcessType": "SCHEDULE_TASK", "Platform": "WEDATA"}]
        }
    })
}

// =============================================================================
// Workflow
// =============================================================================

#[tokio::test]
async fn test_workflow_create_reads_back() {
    let server = MockServer::start().await;

    action("CreateWorkflow")
        .and(body_partial_json(json!({
            "ProjectId": "1460947878944567296",
            "WorkflowName": "daily_etl",
            "ParentFolderPath": "/ods"
        })))
        .respond_with(reply(json!({"WorkflowId": "wf-1"})))
        .expect(1)
        .mount(&server)
        .await;
    action("GetWorkflow")
        .and(body_partial_json(json!({"WorkflowId": "wf-1"})))
        .respond_with(reply(workflow_detail("")))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let state = assert_ok!(
        provider
            .create(
                "tencentcloud_wedata_workflow",
                json!({
                    "project_id": "1460947878944567296",
                    "workflow_name": "daily_etl",
                    "parent_folder_path": "/ods",
                    "workflow_type": "cycle"
                }),
            )
            .await
    );

    assert_eq!(state["id"], "1460947878944567296#wf-1");
    assert_eq!(state["workflow_id"], "wf-1");
    assert_eq!(state["parent_folder_path"], "/ods");
    assert_eq!(state["owner_uin"], "100028439226");
}

#[tokio::test]
async fn test_workflow_create_without_id_fails() {
    let server = MockServer::start().await;

    action("CreateWorkflow")
        .respond_with(reply(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let err = assert_err!(
        provider
            .create(
                "tencentcloud_wedata_workflow",
                json!({"project_id": "p", "workflow_name": "w", "parent_folder_path": "/"}),
            )
            .await
    );
    assert!(format!("{}", err).contains("WorkflowId is nil"));
}

#[tokio::test]
async fn test_workflow_read_not_found_clears_state() {
    let server = MockServer::start().await;

    action("GetWorkflow")
        .respond_with(api_error("ResourceNotFound.Workflow"))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let state = assert_ok!(
        provider
            .read("tencentcloud_wedata_workflow", json!({"id": "p#wf-gone", "project_id": "p"}))
            .await
    );
    assert_eq!(state, Value::Null);
}

#[tokio::test]
async fn test_workflow_read_broken_id() {
    let server = MockServer::start().await;
    let provider = provider_for(&server);

    let err = assert_err!(provider.read("tencentcloud_wedata_workflow", json!({"id": "wf-1"})).await);
    assert!(format!("{}", err).contains("wf-1"));
}

#[tokio::test]
async fn test_workflow_update_sends_changes() {
    let server = MockServer::start().await;

    action("UpdateWorkflow")
        .and(body_partial_json(json!({
            "ProjectId": "p",
            "WorkflowId": "wf-1",
            "WorkflowDesc": "nightly load"
        })))
        .respond_with(reply(json!({"Status": true})))
        .expect(1)
        .mount(&server)
        .await;
    action("GetWorkflow")
        .respond_with(reply(workflow_detail("nightly load")))
        .mount(&server)
        .await;

    let prior = json!({
        "id": "p#wf-1",
        "project_id": "p",
        "workflow_id": "wf-1",
        "workflow_name": "daily_etl",
        "parent_folder_path": "/ods",
        "workflow_desc": ""
    });
    let mut planned = prior.clone();
    planned["workflow_desc"] = json!("nightly load");

    let provider = provider_for(&server);
    let state = assert_ok!(provider.update("tencentcloud_wedata_workflow", prior, planned).await);
    assert_eq!(state["workflow_desc"], "nightly load");
    assert_eq!(state["id"], "p#wf-1");
}

#[tokio::test]
async fn test_workflow_update_rejects_folder_move() {
    let server = MockServer::start().await;

    action("UpdateWorkflow").respond_with(reply(json!({}))).expect(0).mount(&server).await;

    let prior = json!({
        "id": "p#wf-1",
        "project_id": "p",
        "workflow_name": "daily_etl",
        "parent_folder_path": "/ods"
    });
    let mut planned = prior.clone();
    planned["parent_folder_path"] = json!("/dwd");

    let provider = provider_for(&server);
    let err = assert_err!(provider.update("tencentcloud_wedata_workflow", prior, planned).await);
    assert_eq!(format!("{}", err), "argument `parent_folder_path` cannot be changed");
}

#[tokio::test]
async fn test_workflow_delete() {
    let server = MockServer::start().await;

    action("DeleteWorkflow")
        .and(body_partial_json(json!({"ProjectId": "p", "WorkflowId": "wf-1"})))
        .respond_with(reply(json!({"Status": true})))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    assert_ok!(provider.delete("tencentcloud_wedata_workflow", json!({"id": "p#wf-1"})).await);
}

#[tokio::test]
async fn test_workflow_import() {
    let server = MockServer::start().await;

    action("GetWorkflow").respond_with(reply(workflow_detail("imported"))).mount(&server).await;

    let provider = provider_for(&server);
    let imported = assert_ok!(provider.import_resource("tencentcloud_wedata_workflow", "p#wf-1").await);

    assert_eq!(imported.len(), 1);
    assert_eq!(imported[0].resource_type, "tencentcloud_wedata_workflow");
    assert_eq!(imported[0].state["project_id"], "p");
    assert_eq!(imported[0].state["workflow_desc"], "imported");
}

// =============================================================================
// Data source
// =============================================================================

#[tokio::test]
async fn test_data_source_create() {
    let server = MockServer::start().await;

    action("CreateDataSource")
        .and(body_partial_json(json!({"ProjectId": "p", "Name": "orders_db", "Type": "MYSQL"})))
        .respond_with(reply(json!({"Status": true, "DataSourceId": 1024})))
        .expect(1)
        .mount(&server)
        .await;
    action("GetDataSource")
        .and(body_partial_json(json!({"ProjectId": "p", "Id": 1024})))
        .respond_with(reply(json!({
            "Id": 1024,
            "ProjectId": "p",
            "Name": "orders_db",
            "Type": "MYSQL",
            "DisplayName": "Orders",
            "ProdConProperties": "{\"deployType\":\"CONNSTR_PUBLICDB\"}"
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let state = assert_ok!(
        provider
            .create(
                "tencentcloud_wedata_data_source",
                json!({
                    "project_id": "p",
                    "name": "orders_db",
                    "type": "MYSQL",
                    "prod_con_properties": "{\"deployType\":\"CONNSTR_PUBLICDB\"}"
                }),
            )
            .await
    );

    assert_eq!(state["id"], "p#1024");
    assert_eq!(state["data_source_id"], 1024);
    assert_eq!(state["display_name"], "Orders");
}

#[tokio::test]
async fn test_data_source_create_status_false() {
    let server = MockServer::start().await;

    action("CreateDataSource")
        .respond_with(reply(json!({"Status": false})))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let err = assert_err!(
        provider
            .create(
                "tencentcloud_wedata_data_source",
                json!({"project_id": "p", "name": "n", "type": "MYSQL", "prod_con_properties": "{}"}),
            )
            .await
    );
    assert_eq!(
        format!("{}", err),
        "SDK error: Create wedata data source failed, Status is false"
    );
}

#[tokio::test]
async fn test_data_source_delete_status_false() {
    let server = MockServer::start().await;

    action("DeleteDataSource")
        .respond_with(reply(json!({"Status": false})))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let err = assert_err!(provider.delete("tencentcloud_wedata_data_source", json!({"id": "p#1024"})).await);
    assert!(format!("{}", err).contains("Delete data source 1024 failed, Status is false."));
}

#[tokio::test]
async fn test_data_source_rejects_non_numeric_id() {
    let server = MockServer::start().await;
    let provider = provider_for(&server);

    let err = assert_err!(provider.read("tencentcloud_wedata_data_source", json!({"id": "p#abc"})).await);
    assert!(format!("{}", err).contains("p#abc"));
}

// =============================================================================
// Task
// =============================================================================

fn task_state() -> Value {
    json!({
        "id": "p#20230901114849981",
        "project_id": "p",
        "task_base_attribute": [{
            "task_name": "sync_orders",
            "task_type_id": "26",
            "workflow_id": "wf-1"
        }],
        "task_configuration": [{"code_content": "c2VsZWN0IDE="}],
        "task_scheduler_configuration": [{
            "cycle_type": "DAY_CYCLE",
            "schedule_run_type": "0",
            "run_priority": "6",
            "retry_wait": "5",
            "max_retry_attempts": "4",
            "execution_ttl": "-1"
        }]
    })
}

fn task_detail(task_name: &str) -> Value {
    json!({
        "TaskBaseAttribute": {
            "TaskId": "20230901114849981",
            "TaskName": task_name,
            "TaskTypeId": "26",
            "WorkflowId": "wf-1"
        },
        "TaskConfiguration": {"CodeContent": "c2VsZWN0IDE="},
        "TaskSchedulerConfiguration": {
            "CycleType": "DAY_CYCLE",
            "ScheduleRunType": "0",
            "RunPriority": "6",
            "RetryWait": "5",
            "MaxRetryAttempts": "4",
            "ExecutionTTL": "-1"
        }
    })
}

#[tokio::test]
async fn test_task_create_sends_string_scheduler_fields() {
    let server = MockServer::start().await;

    action("CreateTask")
        .and(body_partial_json(json!({
            "ProjectId": "p",
            "TaskBaseAttribute": {"TaskName": "sync_orders", "TaskTypeId": "26", "WorkflowId": "wf-1"},
            "TaskSchedulerConfiguration": {"RunPriority": "6", "ExecutionTTL": "-1"}
        })))
        .respond_with(reply(json!({"TaskId": "20230901114849981"})))
        .expect(1)
        .mount(&server)
        .await;
    action("GetTask").respond_with(reply(task_detail("sync_orders"))).mount(&server).await;

    let mut planned = task_state();
    if let Some(fields) = planned.as_object_mut() {
        fields.remove("id");
    }

    let provider = provider_for(&server);
    let state = assert_ok!(provider.create("tencentcloud_wedata_task", planned).await);
    assert_eq!(state["id"], "p#20230901114849981");
    assert_eq!(state["task_base_attribute"][0]["task_name"], "sync_orders");
}

#[tokio::test]
async fn test_task_update_sends_integer_scheduler_fields() {
    let server = MockServer::start().await;

    action("UpdateTask")
        .and(body_partial_json(json!({
            "ProjectId": "p",
            "TaskId": "20230901114849981",
            "Task": {
                "TaskBaseAttribute": {"TaskName": "sync_orders_v2"},
                "TaskSchedulerConfiguration": {
                    "ScheduleRunType": 0,
                    "RunPriority": 6,
                    "RetryWait": 5,
                    "MaxRetryAttempts": 4,
                    "ExecutionTTL": -1
                }
            }
        })))
        .respond_with(reply(json!({"Status": true})))
        .expect(1)
        .mount(&server)
        .await;
    action("GetTask").respond_with(reply(task_detail("sync_orders_v2"))).mount(&server).await;

    let prior = task_state();
    let mut planned = prior.clone();
    planned["task_base_attribute"][0]["task_name"] = json!("sync_orders_v2");

    let provider = provider_for(&server);
    let state = assert_ok!(provider.update("tencentcloud_wedata_task", prior, planned).await);
    assert_eq!(state["task_base_attribute"][0]["task_name"], "sync_orders_v2");

    let requests = server.received_requests().await.unwrap_or_default();
    let update = requests
        .iter()
        .find(|r| r.headers.get("X-TC-Action").map(|v| v.as_bytes()) == Some(b"UpdateTask".as_slice()))
        .expect("UpdateTask was sent");
    let body: Value = serde_json::from_slice(&update.body).unwrap();
    let base = &body["Task"]["TaskBaseAttribute"];
    assert!(base.get("TaskTypeId").is_none());
    assert!(base.get("WorkflowId").is_none());
    assert_eq!(body["Task"]["TaskSchedulerConfiguration"]["ScheduleRunType"], json!(0));
}

#[tokio::test]
async fn test_task_delete_with_flags() {
    let server = MockServer::start().await;

    action("DeleteTask")
        .and(body_partial_json(json!({
            "ProjectId": "p",
            "TaskId": "20230901114849981",
            "OperateInform": true
        })))
        .respond_with(reply(json!({"Status": true})))
        .expect(1)
        .mount(&server)
        .await;

    let mut state = task_state();
    state["operate_inform"] = json!(true);

    let provider = provider_for(&server);
    assert_ok!(provider.delete("tencentcloud_wedata_task", state).await);
}

// =============================================================================
// Lineage attachment
// =============================================================================

#[tokio::test]
async fn test_lineage_create_registers_and_finds_edge() {
    let server = MockServer::start().await;

    action("RegisterLineage")
        .and(body_partial_json(json!({
            "Relations": [{
                "Source": {"ResourceUniqueId": "db.src", "ResourceType": "TABLE", "Platform": "WEDATA"},
                "Target": {"ResourceUniqueId": "db.tgt", "ResourceType": "TABLE", "Platform": "WEDATA"}
            }]
        })))
        .respond_with(reply(json!({"Status": 1})))
        .expect(1)
        .mount(&server)
        .await;
    action("ListLineage")
        .and(body_partial_json(json!({
            "ResourceUniqueId": "db.src",
            "ResourceType": "TABLE",
            "Platform": "WEDATA",
            "Direction": "OUTPUT",
            "PageNumber": 1
        })))
        .respond_with(reply(json!({"Items": [lineage_neighbour("db.other"), lineage_neighbour("db.tgt")]})))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let state = assert_ok!(provider.create("tencentcloud_wedata_lineage_attachment", lineage_state()).await);
    assert_eq!(state["id"], LINEAGE_ID);
    assert_eq!(state["relations"], lineage_state()["relations"]);
}

#[tokio::test]
async fn test_lineage_create_status_not_one() {
    let server = MockServer::start().await;

    action("RegisterLineage")
        .respond_with(reply(json!({"Status": 0})))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let err = assert_err!(provider.create("tencentcloud_wedata_lineage_attachment", lineage_state()).await);
    assert!(format!("{}", err).contains("Status is not 1."));
}

#[tokio::test]
async fn test_lineage_read_missing_edge() {
    let server = MockServer::start().await;

    action("ListLineage")
        .respond_with(reply(json!({"Items": [lineage_neighbour("db.other")]})))
        .mount(&server)
        .await;

    let mut state = lineage_state();
    state["id"] = json!(LINEAGE_ID);

    let provider = provider_for(&server);
    let refreshed = assert_ok!(provider.read("tencentcloud_wedata_lineage_attachment", state).await);
    assert_eq!(refreshed, Value::Null);
}

#[tokio::test]
async fn test_lineage_delete() {
    let server = MockServer::start().await;

    action("DeleteLineage")
        .and(body_partial_json(json!({
            "Relations": [{
                "Processes": [{"ProcessId": "task-1", "ProcessType": "SCHEDULE_TASK", "Platform": "WEDATA"}]
            }]
        })))
        .respond_with(reply(json!({"Status": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    assert_ok!(provider.delete("tencentcloud_wedata_lineage_attachment", json!({"id": LINEAGE_ID})).await);
}

// =============================================================================
// Lifecycle through the tester
// =============================================================================

#[tokio::test]
async fn test_workflow_lifecycle_crud() {
    let server = MockServer::start().await;

    action("CreateWorkflow")
        .respond_with(reply(json!({"WorkflowId": "wf-1"})))
        .expect(1)
        .mount(&server)
        .await;
    action("GetWorkflow")
        .respond_with(reply(workflow_detail("")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    action("GetWorkflow")
        .respond_with(reply(workflow_detail("nightly load")))
        .mount(&server)
        .await;
    action("UpdateWorkflow")
        .and(body_partial_json(json!({"WorkflowDesc": "nightly load"})))
        .respond_with(reply(json!({"Status": true})))
        .expect(1)
        .mount(&server)
        .await;
    action("DeleteWorkflow")
        .and(body_partial_json(json!({"WorkflowId": "wf-1"})))
        .respond_with(reply(json!({"Status": true})))
        .expect(1)
        .mount(&server)
        .await;

    let tester = ProviderTester::new(provider_for(&server));
    let config = json!({
        "project_id": "p",
        "workflow_name": "daily_etl",
        "parent_folder_path": "/ods",
        "workflow_type": "cycle",
        "workflow_desc": ""
    });
    let mut updated_config = config.clone();
    updated_config["workflow_desc"] = json!("nightly load");

    let created = assert_ok!(tester.lifecycle_create("tencentcloud_wedata_workflow", config).await);
    let plan = assert_ok!(
        tester
            .plan_update("tencentcloud_wedata_workflow", created.clone(), updated_config.clone())
            .await
    );
    assert_plan_updates_in_place(&plan);
    assert_plan_changes_attribute(&plan, "workflow_desc");

    let updated = assert_ok!(
        tester
            .lifecycle_update("tencentcloud_wedata_workflow", created, updated_config)
            .await
    );
    assert_eq!(updated["workflow_desc"], "nightly load");
    assert_eq!(updated["workflow_id"], "wf-1");

    assert_ok!(tester.delete("tencentcloud_wedata_workflow", updated).await);
}

#[tokio::test]
async fn test_lineage_plan_replaces_on_relation_change() {
    let server = MockServer::start().await;
    let tester = ProviderTester::new(provider_for(&server));

    let mut prior = lineage_state();
    prior["id"] = json!(LINEAGE_ID);
    let mut proposed = lineage_state();
    proposed["relations"][0]["target"][0]["resource_unique_id"] = json!("db.other");

    let plan = assert_ok!(
        tester
            .plan_update("tencentcloud_wedata_lineage_attachment", prior, proposed)
            .await
    );
    assert_plan_replaces(&plan);
    assert_plan_changes_attribute(&plan, "relations");
}

#[tokio::test]
async fn test_data_source_lifecycle_crud() {
    let server = MockServer::start().await;

    let detail = |description: &str| {
        json!({
            "Id": 77,
            "ProjectId": "p",
            "Name": "events",
            "Type": "KAFKA",
            "Description": description,
            "ProdConProperties": "{\"brokers\":\"10.0.0.1:9092\"}"
        })
    };

    action("CreateDataSource")
        .respond_with(reply(json!({"Status": true, "DataSourceId": 77})))
        .expect(1)
        .mount(&server)
        .await;
    action("GetDataSource")
        .respond_with(reply(detail("raw events")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    action("GetDataSource")
        .respond_with(reply(detail("clickstream events")))
        .mount(&server)
        .await;
    action("UpdateDataSource")
        .and(body_partial_json(json!({"ProjectId": "p", "Id": 77, "Description": "clickstream events"})))
        .respond_with(reply(json!({"Status": true})))
        .expect(1)
        .mount(&server)
        .await;
    action("DeleteDataSource")
        .and(body_partial_json(json!({"ProjectId": "p", "Id": 77})))
        .respond_with(reply(json!({"Status": true})))
        .expect(1)
        .mount(&server)
        .await;

    let config = json!({
        "project_id": "p",
        "name": "events",
        "type": "KAFKA",
        "prod_con_properties": "{\"brokers\":\"10.0.0.1:9092\"}",
        "description": "raw events"
    });
    let mut updated_config = config.clone();
    updated_config["description"] = json!("clickstream events");

    let tester = ProviderTester::new(provider_for(&server));
    let updated = assert_ok!(
        tester
            .lifecycle_crud("tencentcloud_wedata_data_source", config, updated_config)
            .await
    );
    assert_eq!(updated["id"], "p#77");
    assert_eq!(updated["description"], "clickstream events");
}
