use serde_json::{json, Value};
use tencentcloud_wedata_provider::{Credential, ProviderService, WeDataClient, WeDataProvider};
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_partial_json, header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider_for(server: &MockServer) -> WeDataProvider {
    let client = WeDataClient::with_endpoint(Credential::new("AKIDtest", "secret"), "ap-guangzhou", server.uri());
    WeDataProvider::with_client(client)
}

fn reply(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "Response": {"Data": data, "RequestId": "req-1"}
    }))
}

fn action(name: &str) -> wiremock::MockBuilder {
    Mock::given(method("POST")).and(header("X-TC-Action", name))
}

#[tokio::test]
async fn test_projects_walks_every_page() {
    let server = MockServer::start().await;

    let first: Vec<Value> = (0..50)
        .map(|i| json!({"ProjectId": format!("p{}", i), "ProjectName": format!("project_{}", i)}))
        .collect();
    action("ListProjects")
        .and(body_partial_json(json!({"PageNumber": 1, "PageSize": 50, "Status": 1})))
        .respond_with(reply(json!({"Items": first, "TotalCount": 51})))
        .expect(1)
        .mount(&server)
        .await;
    action("ListProjects")
        .and(body_partial_json(json!({"PageNumber": 2})))
        .respond_with(reply(json!({"Items": [{"ProjectId": "p50", "ProjectName": "project_50"}], "TotalCount": 51})))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let state = assert_ok!(provider.read_data_source("tencentcloud_wedata_projects", json!({"status": 1})).await);

    let list = state["project_list"].as_array().unwrap();
    assert_eq!(list.len(), 51);
    assert_eq!(list[50], json!({"project_id": "p50", "project_name": "project_50"}));
    assert_eq!(state["status"], 1);
    assert_eq!(state["id"].as_str().unwrap().len(), 64);
}

#[tokio::test]
async fn test_same_results_same_id() {
    let server = MockServer::start().await;

    action("ListWorkflows")
        .respond_with(reply(json!({"Items": [{"WorkflowId": "wf-1"}, {"WorkflowId": "wf-2"}]})))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let config = json!({"project_id": "p"});
    let a = assert_ok!(provider.read_data_source("tencentcloud_wedata_workflows", config.clone()).await);
    let b = assert_ok!(provider.read_data_source("tencentcloud_wedata_workflows", config).await);
    assert_eq!(a["id"], b["id"]);
    assert_eq!(a["workflow_list"][0]["workflow_id"], "wf-1");
}

#[tokio::test]
async fn test_tenant_roles_writes_result_file() {
    let server = MockServer::start().await;

    action("ListTenantRoles")
        .and(body_partial_json(json!({"RoleDisplayName": "admin"})))
        .respond_with(reply(json!([
            {"RoleId": "308335260274237440", "RoleDisplayName": "admin", "Description": ""}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tenant_roles.json");

    let provider = provider_for(&server);
    let state = assert_ok!(
        provider
            .read_data_source(
                "tencentcloud_wedata_tenant_roles",
                json!({"role_display_name": "admin", "result_output_file": path.to_str().unwrap()}),
            )
            .await
    );

    let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written, state["role_list"]);
    assert_eq!(written[0]["role_id"], "308335260274237440");
}

#[tokio::test]
async fn test_sql_script_runs() {
    let server = MockServer::start().await;

    action("ListSQLScriptRuns")
        .and(body_partial_json(json!({"ScriptId": "s-1", "ProjectId": "p"})))
        .respond_with(reply(json!([
            {"JobId": "job-1", "JobName": "adhoc", "Status": "SUCCESS"},
            {"JobId": "job-2", "JobName": "adhoc", "Status": "FAILED"}
        ])))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let state = assert_ok!(
        provider
            .read_data_source("tencentcloud_wedata_sql_script_runs", json!({"project_id": "p", "script_id": "s-1"}))
            .await
    );
    assert_eq!(state["data"].as_array().unwrap().len(), 2);
    assert_eq!(state["data"][1]["status"], "FAILED");
}

#[tokio::test]
async fn test_data_sources_empty_result() {
    let server = MockServer::start().await;

    action("ListDataSources")
        .respond_with(reply(json!({"Items": [], "TotalCount": 0})))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let state = assert_ok!(
        provider
            .read_data_source("tencentcloud_wedata_data_sources", json!({"project_id": "p"}))
            .await
    );
    assert_eq!(state["data_source_list"], json!([]));
}

#[tokio::test]
async fn test_api_error_is_reported() {
    let server = MockServer::start().await;

    action("ListProjectRoles")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Response": {
                "Error": {"Code": "ResourceNotFound.Project", "Message": "project p does not exist"},
                "RequestId": "req-err"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let err = assert_err!(
        provider
            .read_data_source("tencentcloud_wedata_project_roles", json!({"project_id": "p"}))
            .await
    );
    assert_eq!(err.code(), Some("ResourceNotFound.Project"));
    assert_eq!(
        format!("{}", err),
        "[TencentCloudSDKError] Code=ResourceNotFound.Project, Message=project p does not exist, RequestId=req-err"
    );
}

#[tokio::test]
async fn test_unknown_data_source() {
    let server = MockServer::start().await;
    let provider = provider_for(&server);

    let err = assert_err!(provider.read_data_source("tencentcloud_wedata_nope", json!({})).await);
    assert_eq!(format!("{}", err), "Unknown resource type: tencentcloud_wedata_nope");
}
