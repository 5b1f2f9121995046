//! Read-only data sources.
//!
//! Each data source maps its filter arguments onto one list action, pages
//! through the results and exposes them under a single computed list. Field
//! names in the list are converted to snake_case. The `id` is a SHA-256 of
//! the identifiers of the returned items, so it changes whenever the result
//! set does.

pub mod data_sources;
pub mod project_roles;
pub mod projects;
pub mod sql_script_runs;
pub mod tasks;
pub mod tenant_roles;
pub mod workflow_folders;
pub mod workflows;

use std::path::Path;
use std::sync::Arc;

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::client::WeDataClient;
use crate::error::ProviderError;
use crate::resource_data::{snake_case_keys, ResourceData};
use crate::schema::{Attribute, Schema};

pub use data_sources::DataSourcesDataSource;
pub use project_roles::ProjectRolesDataSource;
pub use projects::ProjectsDataSource;
pub use sql_script_runs::SqlScriptRunsDataSource;
pub use tasks::TasksDataSource;
pub use tenant_roles::TenantRolesDataSource;
pub use workflow_folders::WorkflowFoldersDataSource;
pub use workflows::WorkflowsDataSource;

/// Argument naming a file the result list is written to.
pub const RESULT_OUTPUT_FILE: &str = "result_output_file";

/// A read-only query over existing remote objects.
#[async_trait::async_trait]
pub trait DataSource: Send + Sync + 'static {
    /// Type name, e.g. `tencentcloud_wedata_projects`.
    fn type_name(&self) -> &'static str;

    /// Filters and the computed result list.
    fn schema(&self) -> Schema;

    /// Run the query for the configured filters and return the full state.
    async fn read(&self, client: &WeDataClient, config: &ResourceData) -> Result<Value, ProviderError>;
}

/// Every data source the provider serves.
pub fn all() -> Vec<Arc<dyn DataSource>> {
    vec![
        Arc::new(ProjectsDataSource),
        Arc::new(DataSourcesDataSource),
        Arc::new(WorkflowsDataSource),
        Arc::new(TasksDataSource),
        Arc::new(WorkflowFoldersDataSource),
        Arc::new(SqlScriptRunsDataSource),
        Arc::new(ProjectRolesDataSource),
        Arc::new(TenantRolesDataSource),
    ]
}

/// Schema with `id`, `result_output_file` and the computed `output` list.
pub(crate) fn base_schema(output: &str, description: &str) -> Schema {
    Schema::v0()
        .with_attribute("id", Attribute::computed_string())
        .with_attribute(
            RESULT_OUTPUT_FILE,
            Attribute::optional_string().with_description("Used to save results."),
        )
        .with_attribute(output, Attribute::computed_list().with_description(description))
}

/// Hash of the item identifiers, used as the data source `id`.
pub(crate) fn ids_hash(ids: &[String]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ids.join("-").as_bytes());
    format!("{:x}", hasher.finalize())
}

fn id_of(item: &Value, id_field: &str) -> Option<String> {
    match item.get(id_field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Write `items` as pretty JSON to `path`.
pub(crate) fn write_output_file(path: &Path, items: &Value) -> Result<(), ProviderError> {
    let text = serde_json::to_string_pretty(items)?;
    std::fs::write(path, text).map_err(|e| {
        ProviderError::Sdk(format!("failed to write {}: {}", path.display(), e))
    })
}

/// Build the final state from the raw API items.
///
/// `id_field` is the PascalCase field identifying each item in the reply.
pub(crate) fn finish(
    config: &ResourceData,
    output: &str,
    items: Vec<Value>,
    id_field: &str,
) -> Result<Value, ProviderError> {
    let ids: Vec<String> = items.iter().filter_map(|item| id_of(item, id_field)).collect();
    let list = Value::Array(items.iter().map(snake_case_keys).collect());

    if let Some(path) = config.get_str(RESULT_OUTPUT_FILE) {
        write_output_file(Path::new(&path), &list)?;
        debug!(path = %path, count = ids.len(), "Wrote data source results");
    }

    let mut state: Map<String, Value> = config.state_map();
    state.insert("id".into(), ids_hash(&ids).into());
    state.insert(output.to_string(), list);
    Ok(Value::Object(state))
}
