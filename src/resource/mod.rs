//! Resource abstraction layer
//!
//! Schema, state and lifecycle plumbing for the resource types this provider
//! serves.
//!
//! # Architecture
//!
//! - [`registry`] - The [`Resource`] trait and the type-name lookup table
//! - [`schema`] - Attribute definitions and config validation
//! - [`data`] - Identity plus attribute map handed to each operation
//! - [`id`] - ARM resource ID parsing
//! - [`validate`] - Reusable attribute validators
//! - [`servicebus_rule`] - `azurerm_servicebus_rule`
//!
//! # Example
//!
//! ```ignore
//! use sbrule::resource::{get_resource, ResourceData};
//!
//! async fn refresh(client: &ArmClient, id: &str) -> anyhow::Result<ResourceData> {
//!     let resource = get_resource("azurerm_servicebus_rule").unwrap();
//!     let mut data = ResourceData::from_id(id);
//!     resource.read(client, &mut data).await?;
//!     Ok(data)
//! }
//! ```

pub mod data;
pub mod id;
mod registry;
pub mod schema;
pub mod servicebus_rule;
pub mod validate;

pub use data::ResourceData;
pub use id::{IdError, ResourceId, RuleId};
pub use registry::*;
pub use schema::{has_errors, Attribute, Diagnostic, Schema, Severity, ValueType};
