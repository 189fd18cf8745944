//! Azure Resource Manager interaction module
//!
//! # Module Structure
//!
//! - [`auth`] - Bearer credentials handed over by the host
//! - [`client`] - Main ARM client, scoped to one subscription
//! - [`http`] - HTTP utilities for REST API calls
//! - [`servicebus`] - Service Bus rule model and operations
//!
//! # Example
//!
//! ```ignore
//! use sbrule::azure::auth::ArmCredentials;
//! use sbrule::azure::client::{ArmClient, DEFAULT_API_VERSION, DEFAULT_ENDPOINT};
//! use sbrule::azure::servicebus::RuleKey;
//!
//! async fn example(key: &RuleKey) -> anyhow::Result<()> {
//!     let credentials = ArmCredentials::from_env()?;
//!     let client = ArmClient::new(DEFAULT_ENDPOINT, "my-subscription", DEFAULT_API_VERSION, credentials)?;
//!     let rule = client.servicebus_rules().get(key).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
pub mod servicebus;
