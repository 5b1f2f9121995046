//! The provider service.
//!
//! [`ProviderService`] is the surface a host drives: schema discovery,
//! configuration, plan, CRUD, import and data source reads, all with plain
//! Rust types. [`WeDataProvider`] implements it by dispatching to the
//! registered [`Resource`]s and [`DataSource`]s.
//!
//! # Example
//!
//! ```ignore
//! use tencentcloud_wedata_provider::{ProviderService, WeDataProvider};
//! use serde_json::json;
//!
//! let provider = WeDataProvider::new();
//! provider
//!     .configure(json!({"secret_id": "AKID...", "secret_key": "...", "region": "ap-guangzhou"}))
//!     .await?;
//!
//! let state = provider
//!     .create("tencentcloud_wedata_workflow", json!({
//!         "project_id": "1460947878944567296",
//!         "workflow_name": "daily_etl",
//!         "parent_folder_path": "/etl",
//!     }))
//!     .await?;
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

use crate::client::{retry, WeDataClient};
use crate::config::retry::WRITE_TIMEOUT;
use crate::config::ProviderConfig;
use crate::data_sources::{self, DataSource};
use crate::error::ProviderError;
use crate::resource_data::{normalize, ResourceData};
use crate::resources::{self, Resource};
use crate::schema::{Block, BlockNestingMode, Diagnostic, DiagnosticSeverity, ProviderSchema, Schema};
use crate::types::{AttributeChange, ImportedResource, PlanResult, ProviderMetadata};
use crate::validation;

/// Operations a provider host can invoke.
#[async_trait::async_trait]
pub trait ProviderService: Send + Sync + 'static {
    // =========================================================================
    // Schema & Metadata
    // =========================================================================

    /// Schemas of the provider block, every resource and every data source.
    fn schema(&self) -> ProviderSchema;

    /// Names of everything served. Derived from the schema by default.
    fn metadata(&self) -> ProviderMetadata {
        let schema = self.schema();
        ProviderMetadata {
            resources: schema.resources.keys().cloned().collect(),
            data_sources: schema.data_sources.keys().cloned().collect(),
            importable: Vec::new(),
        }
    }

    // =========================================================================
    // Provider Lifecycle
    // =========================================================================

    /// Validate the provider block before configuring.
    async fn validate_provider_config(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let _ = config;
        Ok(vec![])
    }

    /// Configure credentials and endpoint.
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError>;

    /// Release the configured client.
    async fn stop(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    /// Validate a resource's configuration before planning.
    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let _ = (resource_type, config);
        Ok(vec![])
    }

    /// Upgrade resource state written by an older schema version.
    async fn upgrade_resource_state(
        &self,
        resource_type: &str,
        version: i64,
        state: Value,
    ) -> Result<Value, ProviderError> {
        let _ = (resource_type, version);
        Ok(state)
    }

    /// Plan the change from `prior_state` (absent on create) to `proposed_state`.
    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        config: Value,
    ) -> Result<PlanResult, ProviderError>;

    /// Create a resource and return its state.
    async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, ProviderError>;

    /// Refresh a resource. `Value::Null` means it no longer exists.
    async fn read(&self, resource_type: &str, current_state: Value) -> Result<Value, ProviderError>;

    /// Update a resource in place and return its state.
    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError>;

    /// Delete a resource.
    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError>;

    /// Bring an existing object under management by its ID.
    async fn import_resource(&self, resource_type: &str, id: &str) -> Result<Vec<ImportedResource>, ProviderError> {
        let _ = id;
        Err(ProviderError::Unimplemented(format!(
            "Import not supported for resource type: {}",
            resource_type
        )))
    }

    // =========================================================================
    // Data Source Operations
    // =========================================================================

    /// Validate a data source's configuration.
    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let _ = (data_source_type, config);
        Ok(vec![])
    }

    /// Run a data source query.
    async fn read_data_source(&self, data_source_type: &str, config: Value) -> Result<Value, ProviderError>;
}

/// The WeData provider: resource and data source registry plus the API client.
pub struct WeDataProvider {
    resources: BTreeMap<&'static str, Arc<dyn Resource>>,
    data_sources: BTreeMap<&'static str, Arc<dyn DataSource>>,
    client: RwLock<Option<Arc<WeDataClient>>>,
}

impl Default for WeDataProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for WeDataProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeDataProvider")
            .field("resources", &self.resources.keys().collect::<Vec<_>>())
            .field("data_sources", &self.data_sources.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl WeDataProvider {
    /// An unconfigured provider serving every resource and data source.
    pub fn new() -> Self {
        Self {
            resources: resources::all().into_iter().map(|r| (r.type_name(), r)).collect(),
            data_sources: data_sources::all().into_iter().map(|d| (d.type_name(), d)).collect(),
            client: RwLock::new(None),
        }
    }

    /// A provider already configured with `client`.
    pub fn with_client(client: WeDataClient) -> Self {
        Self {
            client: RwLock::new(Some(Arc::new(client))),
            ..Self::new()
        }
    }

    fn resource(&self, resource_type: &str) -> Result<&Arc<dyn Resource>, ProviderError> {
        self.resources
            .get(resource_type)
            .ok_or_else(|| ProviderError::UnknownResource(resource_type.to_string()))
    }

    fn data_source(&self, data_source_type: &str) -> Result<&Arc<dyn DataSource>, ProviderError> {
        self.data_sources
            .get(data_source_type)
            .ok_or_else(|| ProviderError::UnknownResource(data_source_type.to_string()))
    }

    async fn client(&self) -> Result<Arc<WeDataClient>, ProviderError> {
        self.client.read().await.clone().ok_or_else(|| {
            ProviderError::Configuration("provider is not configured, call configure first".to_string())
        })
    }

    /// Read `state` back from the API, adding the ID to the result.
    async fn refresh(
        &self,
        resource: &Arc<dyn Resource>,
        client: &WeDataClient,
        state: Value,
    ) -> Result<Option<Value>, ProviderError> {
        let data = ResourceData::new(state);
        let id = data.id().to_string();
        let refreshed = match resource.read(client, &data).await {
            Ok(refreshed) => refreshed,
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e),
        };

        Ok(refreshed.map(|state| match state {
            Value::Object(mut fields) => {
                fields.insert("id".to_string(), Value::String(id));
                Value::Object(fields)
            },
            other => other,
        }))
    }
}

fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics
        .iter()
        .any(|d| matches!(d.severity, DiagnosticSeverity::Error))
}

fn log_outcome<T>(operation: &str, resource_type: &str, result: &Result<T, ProviderError>) {
    match result {
        Ok(_) => info!(resource_type = %resource_type, "{} completed successfully", operation),
        Err(e) => error!(resource_type = %resource_type, error = %e, "{} failed", operation),
    }
}

fn log_diagnostics(operation: &str, diagnostics: &[Diagnostic]) {
    if has_errors(diagnostics) {
        warn!(diagnostics = diagnostics.len(), "{} completed with errors", operation);
    } else {
        info!("{} completed successfully", operation);
    }
}

/// Build the planned state and per-attribute changes.
///
/// Computed attributes and blocks left empty by the proposal keep their prior
/// value. Differences are taken on normalized values, so order-only changes of
/// set-typed values are not reported.
pub fn plan_changes(schema: &Schema, prior: Option<&Value>, proposed: Value) -> PlanResult {
    let Some(prior) = prior.filter(|p| !p.is_null()) else {
        let changes = proposed
            .as_object()
            .map(|fields| {
                fields
                    .iter()
                    .filter(|(_, v)| !v.is_null())
                    .map(|(k, v)| AttributeChange::new(k.clone(), None, Some(v.clone())))
                    .collect()
            })
            .unwrap_or_default();
        return PlanResult::from_changes(proposed, changes);
    };

    let mut planned: Map<String, Value> = proposed.as_object().cloned().unwrap_or_default();
    let block = &schema.block;

    if let Some(prior_fields) = prior.as_object() {
        carry_computed(block, prior_fields, &mut planned);
    }
    let planned = Value::Object(planned);

    let before = normalize(block, prior);
    let after = normalize(block, &planned);
    let mut names: Vec<&String> = block.attributes.keys().chain(block.blocks.keys()).collect();
    names.sort();

    let changes = names
        .into_iter()
        .filter(|name| before.get(name.as_str()) != after.get(name.as_str()))
        .map(|name| {
            let change = AttributeChange::new(
                name.clone(),
                prior.get(name.as_str()).cloned(),
                planned.get(name.as_str()).cloned(),
            );
            let force_new = block.attributes.get(name.as_str()).map(|a| a.force_new).unwrap_or(false)
                || block.blocks.get(name.as_str()).map(|b| b.force_new).unwrap_or(false);
            if force_new {
                change.forcing_replacement()
            } else {
                change
            }
        })
        .collect();

    PlanResult::from_changes(planned, changes)
}

/// Copy prior values into computed attributes and blocks the proposal left
/// unset, descending into list blocks item by item.
///
/// Set blocks are not descended into since their items have no stable
/// position to pair on.
fn carry_computed(block: &Block, prior: &Map<String, Value>, planned: &mut Map<String, Value>) {
    let computed = block
        .attributes
        .iter()
        .filter(|(_, attr)| attr.flags.computed)
        .map(|(name, _)| name)
        .chain(block.blocks.iter().filter(|(_, b)| b.computed).map(|(name, _)| name));
    for name in computed {
        let unset = planned.get(name).map_or(true, Value::is_null);
        if let (true, Some(previous)) = (unset, prior.get(name)) {
            planned.insert(name.clone(), previous.clone());
        }
    }

    for (name, nested) in &block.blocks {
        if nested.nesting_mode == BlockNestingMode::Set {
            continue;
        }
        let (Some(Value::Array(prior_items)), Some(Value::Array(items))) = (prior.get(name), planned.get_mut(name))
        else {
            continue;
        };
        for (item, prior_item) in items.iter_mut().zip(prior_items) {
            if let (Some(item), Some(prior_item)) = (item.as_object_mut(), prior_item.as_object()) {
                carry_computed(&nested.block, prior_item, item);
            }
        }
    }
}

#[async_trait::async_trait]
impl ProviderService for WeDataProvider {
    fn schema(&self) -> ProviderSchema {
        let schema = ProviderSchema::new().with_provider_config(ProviderConfig::schema());
        let schema = self
            .resources
            .iter()
            .fold(schema, |s, (name, r)| s.with_resource(*name, r.schema()));
        self.data_sources
            .iter()
            .fold(schema, |s, (name, d)| s.with_data_source(*name, d.schema()))
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            resources: self.resources.keys().map(|k| k.to_string()).collect(),
            data_sources: self.data_sources.keys().map(|k| k.to_string()).collect(),
            importable: self
                .resources
                .iter()
                .filter(|(_, r)| r.importable())
                .map(|(k, _)| k.to_string())
                .collect(),
        }
    }

    #[instrument(skip(self, config), name = "provider.validate_provider_config")]
    async fn validate_provider_config(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        debug!("ValidateProviderConfig called");
        let mut diagnostics = validation::validate(&ProviderConfig::schema(), &config);
        if let Err(e) = ProviderConfig::from_value(config) {
            diagnostics.push(Diagnostic::error(e.to_string()));
        }
        log_diagnostics("ValidateProviderConfig", &diagnostics);
        Ok(diagnostics)
    }

    #[instrument(skip(self, config), name = "provider.configure")]
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        debug!("Configure called");
        let result = ProviderConfig::from_value(config)
            .and_then(ProviderConfig::with_env_defaults)
            .and_then(|config| WeDataClient::from_config(&config));

        match result {
            Ok(client) => {
                info!(region = %client.region(), endpoint = %client.endpoint(), "Configure completed successfully");
                *self.client.write().await = Some(Arc::new(client));
                Ok(vec![])
            },
            Err(e) => {
                error!(error = %e, "Configure failed");
                Err(e)
            },
        }
    }

    #[instrument(skip(self), name = "provider.stop")]
    async fn stop(&self) -> Result<(), ProviderError> {
        info!("Stop called");
        self.client.write().await.take();
        Ok(())
    }

    #[instrument(skip(self, config), name = "provider.validate_resource_config")]
    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let schema = self.resource(resource_type)?.schema();
        let diagnostics = validation::validate(&schema, &config);
        log_diagnostics("ValidateResourceConfig", &diagnostics);
        Ok(diagnostics)
    }

    #[instrument(skip(self, prior_state, proposed_state, config), name = "provider.plan")]
    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        config: Value,
    ) -> Result<PlanResult, ProviderError> {
        let _ = config;
        let schema = self.resource(resource_type)?.schema();
        let result = plan_changes(&schema, prior_state.as_ref(), proposed_state);
        info!(
            resource_type = %resource_type,
            changes = result.changes.len(),
            requires_replace = result.requires_replace,
            "Plan completed"
        );
        Ok(result)
    }

    #[instrument(skip(self, planned_state), name = "provider.create")]
    async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, ProviderError> {
        info!(resource_type = %resource_type, "Create called");
        let result = async {
            let resource = self.resource(resource_type)?;
            let client = self.client().await?;

            let id = resource.create(&client, &ResourceData::new(planned_state.clone())).await?;
            let mut state = planned_state.as_object().cloned().unwrap_or_default();
            state.insert("id".to_string(), Value::String(id.clone()));

            self.refresh(resource, &client, Value::Object(state))
                .await?
                .ok_or_else(|| {
                    ProviderError::FailedPrecondition(format!(
                        "{} {} was created but cannot be read back",
                        resource_type, id
                    ))
                })
        }
        .await;
        log_outcome("Create", resource_type, &result);
        result
    }

    #[instrument(skip(self, current_state), name = "provider.read")]
    async fn read(&self, resource_type: &str, current_state: Value) -> Result<Value, ProviderError> {
        debug!(resource_type = %resource_type, "Read called");
        let resource = self.resource(resource_type)?;
        let client = self.client().await?;
        let id = current_state.get("id").and_then(Value::as_str).unwrap_or_default().to_string();

        match self.refresh(resource, &client, current_state).await {
            Ok(Some(state)) => {
                debug!(resource_type = %resource_type, "Read completed successfully");
                Ok(state)
            },
            Ok(None) => {
                warn!(
                    resource_type = %resource_type,
                    id = %id,
                    "resource not found, please check if it has been deleted"
                );
                Ok(Value::Null)
            },
            Err(e) => {
                error!(resource_type = %resource_type, error = %e, "Read failed");
                Err(e)
            },
        }
    }

    #[instrument(skip(self, prior_state, planned_state), name = "provider.update")]
    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        info!(resource_type = %resource_type, "Update called");
        let result = async {
            let resource = self.resource(resource_type)?;
            let client = self.client().await?;
            let schema = resource.schema();

            let mut planned = planned_state.as_object().cloned().unwrap_or_default();
            if let Some(id) = prior_state.get("id") {
                planned.entry("id").or_insert_with(|| id.clone());
            }
            let data = ResourceData::for_update(&schema, prior_state, Value::Object(planned));

            if let Some(name) = schema.immutable_names().into_iter().find(|name| data.has_change(name)) {
                return Err(ProviderError::ImmutableArgument(name.to_string()));
            }

            resource.update(&client, &data).await?;

            let id = data.id().to_string();
            self.refresh(resource, &client, data.state().clone())
                .await?
                .ok_or_else(|| ProviderError::NotFound(format!("{} {}", resource_type, id)))
        }
        .await;
        log_outcome("Update", resource_type, &result);
        result
    }

    #[instrument(skip(self, current_state), name = "provider.delete")]
    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        info!(resource_type = %resource_type, "Delete called");
        let result = async {
            let resource = self.resource(resource_type)?;
            let client = self.client().await?;
            let data = ResourceData::new(current_state);
            let (client, data) = (&client, &data);

            retry(WRITE_TIMEOUT, || resource.delete(client, data)).await
        }
        .await;
        log_outcome("Delete", resource_type, &result);
        result
    }

    #[instrument(skip(self), name = "provider.import_resource")]
    async fn import_resource(&self, resource_type: &str, id: &str) -> Result<Vec<ImportedResource>, ProviderError> {
        info!(resource_type = %resource_type, id = %id, "ImportResource called");
        let result = async {
            let resource = self.resource(resource_type)?;
            if !resource.importable() {
                return Err(ProviderError::Unimplemented(format!(
                    "Import not supported for resource type: {}",
                    resource_type
                )));
            }
            let client = self.client().await?;

            let mut state = Map::new();
            state.insert("id".to_string(), Value::String(id.to_string()));
            let state = self
                .refresh(resource, &client, Value::Object(state))
                .await?
                .ok_or_else(|| ProviderError::NotFound(format!("{} {}", resource_type, id)))?;
            Ok(vec![ImportedResource::new(resource_type, state)])
        }
        .await;
        log_outcome("ImportResource", resource_type, &result);
        result
    }

    #[instrument(skip(self, config), name = "provider.validate_data_source_config")]
    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let schema = self.data_source(data_source_type)?.schema();
        let diagnostics = validation::validate(&schema, &config);
        log_diagnostics("ValidateDataSourceConfig", &diagnostics);
        Ok(diagnostics)
    }

    #[instrument(skip(self, config), name = "provider.read_data_source")]
    async fn read_data_source(&self, data_source_type: &str, config: Value) -> Result<Value, ProviderError> {
        debug!(data_source_type = %data_source_type, "ReadDataSource called");
        let result = async {
            let data_source = self.data_source(data_source_type)?;
            let client = self.client().await?;
            data_source.read(&client, &ResourceData::new(config)).await
        }
        .await;
        log_outcome("ReadDataSource", data_source_type, &result);
        result
    }
}
