//! Azure Service Bus topic-subscription rules as a declarative resource.
//!
//! - [`azure`] talks to Azure Resource Manager
//! - [`resource`] holds the schema, state and lifecycle of `azurerm_servicebus_rule`
//! - [`provider`] is what a host framework (or the `sbrule` CLI) drives

pub mod azure;
pub mod config;
pub mod provider;
pub mod resource;

pub use provider::{Applied, Provider};
