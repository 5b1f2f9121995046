//! Tencent Cloud WeData provider
//!
//! Declarative resources and data sources for the WeData management API
//! (version `2025-08-06`). Each resource translates its configured state into
//! signed API calls and the replies back into state, addressed by a composite
//! ID built from the returned identifiers.
//!
//! # Overview
//!
//! - **Resources**: `tencentcloud_wedata_workflow`, `tencentcloud_wedata_data_source`,
//!   `tencentcloud_wedata_task`, `tencentcloud_wedata_lineage_attachment`
//! - **Data sources**: projects, data sources, workflows, tasks, workflow
//!   folders, SQL script runs, project roles and tenant roles
//! - **Client**: TC3-HMAC-SHA256 signing, retry-until-timeout and a
//!   per-action rate limiter
//! - **ProviderService**: the host-facing trait, implemented by [`WeDataProvider`]
//!
//! # Quick Start
//!
//! ```ignore
//! use tencentcloud_wedata_provider::{init_logging, ProviderService, WeDataProvider};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_logging();
//!
//!     let provider = WeDataProvider::new();
//!     // Credentials fall back to TENCENTCLOUD_SECRET_ID / TENCENTCLOUD_SECRET_KEY.
//!     provider.configure(json!({"region": "ap-guangzhou"})).await?;
//!
//!     let projects = provider
//!         .read_data_source("tencentcloud_wedata_projects", json!({"status": 1}))
//!         .await?;
//!     println!("{}", projects["project_list"]);
//!     Ok(())
//! }
//! ```
//!
//! # Resource IDs
//!
//! | Resource | ID |
//! |---|---|
//! | workflow | `projectId#workflowId` |
//! | data source | `projectId#dataSourceId` |
//! | task | `projectId#taskId` |
//! | lineage attachment | `src,type,platform#tgt,type,platform#proc,type,platform` |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod data_sources;
pub mod error;
pub mod logging;
pub mod provider;
pub mod resource_data;
pub mod resource_id;
pub mod resources;
pub mod schema;
pub mod testing;
pub mod types;
pub mod validation;

#[allow(missing_docs)]
pub mod wedata;

// Re-export main types at crate root
pub use client::{Credential, WeDataClient};
pub use config::ProviderConfig;
pub use error::ProviderError;
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use provider::{ProviderService, WeDataProvider};
pub use schema::ProviderSchema;
pub use types::{AttributeChange, ImportedResource, PlanResult, ProviderMetadata};
pub use validation::{is_valid, validate, validate_result};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

// Re-export commonly used external types
pub use serde_json;
pub use tracing;
