//! Resource Registry
//!
//! Every resource type this provider serves implements [`Resource`] and is
//! registered here under its type name.

use super::data::ResourceData;
use super::schema::Schema;
use super::servicebus_rule::ServiceBusRule;
use crate::azure::client::ArmClient;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Lifecycle operations of one resource type
#[async_trait]
pub trait Resource: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> &Schema;

    async fn create(&self, client: &ArmClient, data: &mut ResourceData) -> Result<()>;

    /// Refresh `data` from the remote object. Clears the id if it is gone.
    async fn read(&self, client: &ArmClient, data: &mut ResourceData) -> Result<()>;

    /// Defaults to a full replace through `create`
    async fn update(&self, client: &ArmClient, data: &mut ResourceData) -> Result<()> {
        self.create(client, data).await
    }

    async fn delete(&self, client: &ArmClient, data: &ResourceData) -> Result<()>;

    /// Seed state from an ID supplied by the user; the caller reads afterwards
    fn import(&self, id: &str) -> Result<ResourceData>;
}

type Registry = HashMap<&'static str, Box<dyn Resource>>;

static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// Get the resource registry (built on first access)
pub fn get_registry() -> &'static Registry {
    REGISTRY.get_or_init(|| {
        let resources: Vec<Box<dyn Resource>> = vec![Box::new(ServiceBusRule::new())];

        resources
            .into_iter()
            .map(|r| (r.type_name(), r))
            .collect()
    })
}

/// Get a resource by type name
pub fn get_resource(type_name: &str) -> Option<&'static dyn Resource> {
    get_registry().get(type_name).map(|r| r.as_ref())
}

/// Get all resource type names, sorted
pub fn get_all_resource_types() -> Vec<&'static str> {
    let mut types: Vec<&'static str> = get_registry().keys().copied().collect();
    types.sort_unstable();
    types
}
