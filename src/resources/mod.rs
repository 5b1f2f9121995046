//! Managed resources.
//!
//! Each resource turns its state into API requests and the API replies back
//! into state. The [`WeDataProvider`](crate::provider::WeDataProvider) owns
//! plan, immutable-argument checks and the create-then-read sequence, so
//! handlers only talk to the API.

pub mod data_source;
pub mod lineage_attachment;
pub mod task;
pub mod workflow;

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::client::{RetryError, WeDataClient};
use crate::error::ProviderError;
use crate::resource_data::ResourceData;
use crate::schema::Schema;

pub use data_source::DataSourceResource;
pub use lineage_attachment::LineageAttachmentResource;
pub use task::TaskResource;
pub use workflow::WorkflowResource;

/// CRUD handlers of one resource type.
#[async_trait::async_trait]
pub trait Resource: Send + Sync + 'static {
    /// Type name, e.g. `tencentcloud_wedata_workflow`.
    fn type_name(&self) -> &'static str;

    /// Schema of the resource's state.
    fn schema(&self) -> Schema;

    /// Whether `import` with a bare ID is supported.
    fn importable(&self) -> bool {
        false
    }

    /// Create the remote object and return its composite ID.
    async fn create(&self, client: &WeDataClient, data: &ResourceData) -> Result<String, ProviderError>;

    /// Refresh the state for `data.id()`. `None` when the object is gone.
    async fn read(&self, client: &WeDataClient, data: &ResourceData) -> Result<Option<Value>, ProviderError>;

    /// Apply changed mutable arguments. Immutable ones are checked before this is called.
    async fn update(&self, client: &WeDataClient, data: &ResourceData) -> Result<(), ProviderError> {
        let _ = (client, data);
        Err(ProviderError::Unimplemented(format!(
            "{} does not support in-place update",
            self.type_name()
        )))
    }

    /// Delete the remote object. Runs inside the write retry.
    async fn delete(&self, client: &WeDataClient, data: &ResourceData) -> Result<(), RetryError>;
}

/// Every resource the provider serves.
pub fn all() -> Vec<Arc<dyn Resource>> {
    vec![
        Arc::new(WorkflowResource),
        Arc::new(DataSourceResource),
        Arc::new(TaskResource),
        Arc::new(LineageAttachmentResource),
    ]
}

/// Give up on a write with `message`.
pub(crate) fn non_retryable(message: impl Into<String>) -> RetryError {
    RetryError::NonRetryable(ProviderError::Sdk(message.into()))
}

/// Set `key` when the API returned a value; keep the prior value otherwise.
pub(crate) fn put(state: &mut Map<String, Value>, key: &str, value: Option<impl Into<Value>>) {
    if let Some(v) = value {
        state.insert(key.to_string(), v.into());
    }
}

/// Copy every field of an already-converted state object into `state`.
pub(crate) fn merge(state: &mut Map<String, Value>, converted: Value) {
    if let Value::Object(fields) = converted {
        state.extend(fields);
    }
}
