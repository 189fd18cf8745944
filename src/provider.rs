//! Provider
//!
//! Host-facing entry point. Looks up the resource by type name, validates
//! configs against its schema and drives the lifecycle operations.

use crate::azure::client::ArmClient;
use crate::resource::{get_resource, has_errors, Diagnostic, Resource, ResourceData};
use anyhow::Result;
use serde_json::{Map, Value};

/// Outcome of a create or update
#[derive(Debug)]
pub struct Applied {
    pub state: ResourceData,
    /// Non-fatal diagnostics, e.g. deprecated attributes
    pub warnings: Vec<Diagnostic>,
}

#[derive(Clone, Debug)]
pub struct Provider {
    client: ArmClient,
}

impl Provider {
    pub fn new(client: ArmClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ArmClient {
        &self.client
    }

    fn resource(&self, type_name: &str) -> Result<&'static dyn Resource> {
        get_resource(type_name).ok_or_else(|| anyhow::anyhow!("Unknown resource type: {}", type_name))
    }

    /// Validate a config without touching the remote API
    pub fn validate(&self, type_name: &str, config: &Map<String, Value>) -> Result<Vec<Diagnostic>> {
        Ok(self.resource(type_name)?.schema().validate(config))
    }

    /// Create the object, or replace it when `prior_id` names an existing one
    pub async fn apply(
        &self,
        type_name: &str,
        prior_id: Option<&str>,
        config: Map<String, Value>,
    ) -> Result<Applied> {
        let resource = self.resource(type_name)?;

        let diagnostics = resource.schema().validate(&config);
        if has_errors(&diagnostics) {
            let messages: Vec<String> = diagnostics.iter().map(|d| d.to_string()).collect();
            anyhow::bail!("Invalid {} configuration:\n  {}", type_name, messages.join("\n  "));
        }

        let mut state = ResourceData::from_config(config);
        match prior_id.filter(|id| !id.is_empty()) {
            Some(id) => {
                tracing::info!(resource = type_name, id, "updating");
                state.set_id(id);
                resource.update(&self.client, &mut state).await?;
            }
            None => {
                tracing::info!(resource = type_name, "creating");
                resource.create(&self.client, &mut state).await?;
            }
        }

        Ok(Applied {
            state,
            warnings: diagnostics,
        })
    }

    /// Refresh an object by ID; `None` when it no longer exists
    pub async fn read(&self, type_name: &str, id: &str) -> Result<Option<ResourceData>> {
        let resource = self.resource(type_name)?;

        let mut state = ResourceData::from_id(id);
        resource.read(&self.client, &mut state).await?;

        Ok((!state.is_gone()).then_some(state))
    }

    pub async fn delete(&self, type_name: &str, id: &str) -> Result<()> {
        let resource = self.resource(type_name)?;
        resource.delete(&self.client, &ResourceData::from_id(id)).await
    }

    /// Adopt an existing object: seed state from the ID, then read it
    pub async fn import(&self, type_name: &str, id: &str) -> Result<ResourceData> {
        let resource = self.resource(type_name)?;

        let mut state = resource.import(id)?;
        resource.read(&self.client, &mut state).await?;

        if state.is_gone() {
            anyhow::bail!("Cannot import non-existent remote object");
        }
        Ok(state)
    }
}
