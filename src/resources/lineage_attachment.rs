//! `tencentcloud_wedata_lineage_attachment`
//!
//! Registers one lineage edge: a source node, a target node and the
//! processes producing the target. The ID carries the three identities of
//! source, target and first process, so read and delete need nothing else
//! from the state.

use serde_json::Value;
use tracing::{debug, warn};

use super::{non_retryable, Resource};
use crate::client::{read_retry_error, retry, retry_error, RetryError, WeDataClient};
use crate::config::pagination::LARGE_PAGE_SIZE;
use crate::config::retry::{READ_TIMEOUT, WRITE_TIMEOUT};
use crate::error::ProviderError;
use crate::logging::LogElapsed;
use crate::resource_data::{BlockView, ResourceData};
use crate::resource_id::{Identity, LineageId};
use crate::schema::{Attribute, Block, NestedBlock, Schema};
use crate::wedata::lineage::{
    LineageNodeInfo, LineagePair, LineageProcess, LineageProperty, LineageRelationsRequest, LineageResource,
    ListLineageRequest,
};

const TYPE_NAME: &str = "tencentcloud_wedata_lineage_attachment";

/// Resource type assumed for nodes the API returns without one.
const DEFAULT_RESOURCE_TYPE: &str = "WEDATA";

/// Status reported by RegisterLineage and DeleteLineage on success.
const STATUS_OK: i64 = 1;

/// A lineage edge between two data nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineageAttachmentResource;

fn property_block() -> Block {
    Block::new()
        .with_attribute("name", Attribute::optional_string())
        .with_attribute("value", Attribute::optional_string())
}

fn node_block() -> Block {
    Block::new()
        .with_attribute("resource_unique_id", Attribute::required_string())
        .with_attribute("resource_type", Attribute::required_string())
        .with_attribute("platform", Attribute::required_string())
        .with_attribute("resource_name", Attribute::optional_string())
        .with_attribute("description", Attribute::optional_string())
        .with_attribute("create_time", Attribute::optional_string())
        .with_attribute("update_time", Attribute::optional_string())
        .with_attribute("lineage_node_id", Attribute::optional_string())
        .with_block("resource_properties", NestedBlock::list(property_block()))
}

fn process_block() -> Block {
    Block::new()
        .with_attribute("process_id", Attribute::required_string())
        .with_attribute("process_type", Attribute::required_string())
        .with_attribute("platform", Attribute::required_string())
        .with_attribute("process_sub_type", Attribute::optional_string())
        .with_attribute("lineage_node_id", Attribute::optional_string())
        .with_block("process_properties", NestedBlock::list(property_block()))
}

fn properties_from(view: &BlockView<'_>, key: &str) -> Option<Vec<LineageProperty>> {
    let items: Vec<LineageProperty> = view
        .list(key)
        .iter()
        .map(|item| LineageProperty {
            name: item.get_str("name"),
            value: item.get_str("value"),
        })
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

fn node_from(view: &BlockView<'_>) -> LineageResource {
    LineageResource {
        resource_unique_id: view.get_str("resource_unique_id"),
        resource_type: view.get_str("resource_type"),
        platform: view.get_str("platform"),
        resource_name: view.get_str("resource_name"),
        description: view.get_str("description"),
        create_time: view.get_str("create_time"),
        update_time: view.get_str("update_time"),
        resource_properties: properties_from(view, "resource_properties"),
        lineage_node_id: view.get_str("lineage_node_id"),
    }
}

fn process_from(view: &BlockView<'_>) -> LineageProcess {
    LineageProcess {
        process_id: view.get_str("process_id"),
        process_type: view.get_str("process_type"),
        platform: view.get_str("platform"),
        process_sub_type: view.get_str("process_sub_type"),
        process_properties: properties_from(view, "process_properties"),
        lineage_node_id: view.get_str("lineage_node_id"),
    }
}

fn identity(unique_id: Option<&String>, kind: Option<&String>, platform: Option<&String>) -> Option<Identity> {
    Some(Identity::new(unique_id?.as_str(), kind?.as_str(), platform?.as_str()))
}

/// Build the relation from the `relations` block along with its ID.
fn relation_from(data: &ResourceData) -> Result<(LineagePair, LineageId), ProviderError> {
    let relations = data
        .head("relations")
        .ok_or_else(|| ProviderError::Validation("relations is required".to_string()))?;

    let source = relations.head("source").map(|v| node_from(&v)).unwrap_or_default();
    let target = relations.head("target").map(|v| node_from(&v)).unwrap_or_default();
    let processes: Vec<LineageProcess> = relations.list("processes").iter().map(process_from).collect();

    let missing = |what: &str| ProviderError::Validation(format!("relations.{} is incomplete", what));
    let id = LineageId {
        source: identity(
            source.resource_unique_id.as_ref(),
            source.resource_type.as_ref(),
            source.platform.as_ref(),
        )
        .ok_or_else(|| missing("source"))?,
        target: identity(
            target.resource_unique_id.as_ref(),
            target.resource_type.as_ref(),
            target.platform.as_ref(),
        )
        .ok_or_else(|| missing("target"))?,
        process: processes
            .first()
            .and_then(|p| identity(p.process_id.as_ref(), p.process_type.as_ref(), p.platform.as_ref()))
            .ok_or_else(|| missing("processes"))?,
    };

    let pair = LineagePair {
        source: Some(source),
        target: Some(target),
        processes: Some(processes),
    };
    Ok((pair, id))
}

/// Request addressing exactly the edge named by `id`.
fn identity_request(id: &LineageId) -> LineageRelationsRequest {
    let node = |identity: &Identity| LineageResource::identity(&identity.id, &identity.kind, &identity.platform);
    LineageRelationsRequest {
        relations: vec![LineagePair {
            source: Some(node(&id.source)),
            target: Some(node(&id.target)),
            processes: Some(vec![LineageProcess::identity(
                &id.process.id,
                &id.process.kind,
                &id.process.platform,
            )]),
        }],
    }
}

/// Whether a downstream neighbour of the source is the target linked by the process.
///
/// A neighbour without a type counts as the target only when the target
/// type is `WEDATA`.
fn edge_matches(node: &LineageNodeInfo, id: &LineageId) -> bool {
    let Some(resource) = &node.resource else {
        return false;
    };
    let same_id = resource.resource_unique_id.as_deref() == Some(id.target.id.as_str());
    let same_type = match resource.resource_type.as_deref() {
        Some(kind) => kind == id.target.kind,
        None => id.target.kind == DEFAULT_RESOURCE_TYPE,
    };
    if !(same_id && same_type) {
        return false;
    }

    node.relation
        .as_ref()
        .and_then(|relation| relation.processes.as_ref())
        .is_some_and(|processes| {
            processes
                .iter()
                .any(|p| p.is(&id.process.id, &id.process.kind, &id.process.platform))
        })
}

#[async_trait::async_trait]
impl Resource for LineageAttachmentResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        let relation = Block::new()
            .with_block("source", NestedBlock::single(node_block()).with_min_items(1))
            .with_block("target", NestedBlock::single(node_block()).with_min_items(1))
            .with_block("processes", NestedBlock::list(process_block()).with_min_items(1));

        Schema::v0()
            .with_attribute("id", Attribute::computed_string())
            .with_block(
                "relations",
                NestedBlock::single(relation).with_min_items(1).with_force_new(),
            )
    }

    async fn create(&self, client: &WeDataClient, data: &ResourceData) -> Result<String, ProviderError> {
        let _elapsed = LogElapsed::new("resource.tencentcloud_wedata_lineage_attachment.create");
        let (pair, id) = relation_from(data)?;
        let request = LineageRelationsRequest { relations: vec![pair] };

        let request = &request;
        let status = retry(WRITE_TIMEOUT, || async move {
            client
                .register_lineage(request)
                .await
                .map_err(retry_error)?
                .ok_or_else(|| non_retryable("Create wedata lineage attachment failed, Response is nil."))
        })
        .await?;

        if status != STATUS_OK {
            return Err(ProviderError::Sdk(
                "Create wedata lineage attachment failed, Status is not 1.".to_string(),
            ));
        }

        debug!(id = %id, "Lineage attachment created");
        Ok(id.to_string())
    }

    async fn read(&self, client: &WeDataClient, data: &ResourceData) -> Result<Option<Value>, ProviderError> {
        let _elapsed = LogElapsed::new("resource.tencentcloud_wedata_lineage_attachment.read");
        let id = LineageId::parse(data.id())?;

        let filters = ListLineageRequest {
            resource_unique_id: id.source.id.clone(),
            resource_type: id.source.kind.clone(),
            platform: id.source.platform.clone(),
            direction: "OUTPUT".to_string(),
            ..Default::default()
        };
        let filters = &filters;
        let nodes = retry(READ_TIMEOUT, || async move {
            client
                .list_lineage(filters, LARGE_PAGE_SIZE)
                .await
                .map_err(read_retry_error)
        })
        .await?;

        if nodes.iter().any(|node| edge_matches(node, &id)) {
            Ok(Some(data.state().clone()))
        } else {
            warn!(id = %id, neighbours = nodes.len(), "Lineage edge not found downstream of source");
            Ok(None)
        }
    }

    async fn delete(&self, client: &WeDataClient, data: &ResourceData) -> Result<(), RetryError> {
        let _elapsed = LogElapsed::new("resource.tencentcloud_wedata_lineage_attachment.delete");
        let id = LineageId::parse(data.id())?;

        let status = client
            .delete_lineage(&identity_request(&id))
            .await
            .map_err(retry_error)?
            .ok_or_else(|| non_retryable("Delete wedata lineage attachment failed, Response is nil."))?;

        if status == STATUS_OK {
            Ok(())
        } else {
            Err(non_retryable("Delete wedata lineage attachment failed, Status is not 1."))
        }
    }
}
