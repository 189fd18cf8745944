//! Resource IDs
//!
//! Parsing of ARM resource IDs of the form
//! `/subscriptions/{sub}/resourceGroups/{rg}/providers/{ns}/{type}/{name}/...`.

use crate::azure::servicebus::{RuleKey, PROVIDER_NAMESPACE};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Why an ID string could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("Cannot parse Azure ID {0:?}: not an absolute path")]
    NotAbsolute(String),

    #[error("The number of path segments is not divisible by 2 in {0:?}")]
    OddSegments(String),

    #[error("Key/Value cannot be empty strings. Key: '{key}', Value: '{value}'")]
    EmptySegment { key: String, value: String },

    #[error("No subscription ID found in: {0:?}")]
    MissingSubscription(String),

    #[error("No resource group name found in: {0:?}")]
    MissingResourceGroup(String),

    #[error("ID was missing the `{0}` element")]
    MissingElement(&'static str),
}

/// A parsed ARM resource ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceId {
    pub subscription_id: String,
    pub resource_group: String,
    pub provider: Option<String>,
    /// Remaining `type -> name` pairs below the provider
    pub path: HashMap<String, String>,
}

impl ResourceId {
    pub fn parse(id: &str) -> Result<Self, IdError> {
        let trimmed = id.trim();
        if !trimmed.starts_with('/') {
            return Err(IdError::NotAbsolute(id.to_string()));
        }
        // Query strings and fragments are not part of the identity
        let trimmed = trimmed.split(['?', '#']).next().unwrap_or_default();
        let path = trimmed.trim_start_matches('/').trim_end_matches('/');

        let components: Vec<&str> = path.split('/').collect();
        if components.len() % 2 != 0 {
            return Err(IdError::OddSegments(path.to_string()));
        }

        let mut subscription_id: Option<String> = None;
        let mut path_map = HashMap::with_capacity(components.len() / 2);

        for pair in components.chunks_exact(2) {
            let (key, value) = (pair[0], pair[1]);
            if key.is_empty() || value.is_empty() {
                return Err(IdError::EmptySegment {
                    key: key.to_string(),
                    value: value.to_string(),
                });
            }

            // Only the first `subscriptions` is the Azure subscription; a
            // Service Bus topic subscription reuses the same key further down.
            if key == "subscriptions" && subscription_id.is_none() {
                subscription_id = Some(value.to_string());
            } else {
                path_map.insert(key.to_string(), value.to_string());
            }
        }

        let subscription_id =
            subscription_id.ok_or_else(|| IdError::MissingSubscription(path.to_string()))?;

        // Some APIs hand back `resourcegroups` in lower case
        let resource_group = path_map
            .remove("resourceGroups")
            .or_else(|| path_map.remove("resourcegroups"))
            .ok_or_else(|| IdError::MissingResourceGroup(path.to_string()))?;

        let provider = path_map.remove("providers");

        Ok(Self {
            subscription_id,
            resource_group,
            provider,
            path: path_map,
        })
    }

    fn require(&self, key: &'static str) -> Result<String, IdError> {
        self.path
            .get(key)
            .cloned()
            .ok_or(IdError::MissingElement(key))
    }
}

/// ID of a Service Bus topic-subscription rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleId {
    pub subscription_id: String,
    pub key: RuleKey,
}

impl RuleId {
    pub fn new(subscription_id: impl Into<String>, key: RuleKey) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            key,
        }
    }

    pub fn parse(id: &str) -> Result<Self, IdError> {
        let parsed = ResourceId::parse(id)?;

        let key = RuleKey {
            namespace_name: parsed.require("namespaces")?,
            topic_name: parsed.require("topics")?,
            subscription_name: parsed.require("subscriptions")?,
            name: parsed.require("rules")?,
            resource_group: parsed.resource_group,
        };

        Ok(Self {
            subscription_id: parsed.subscription_id,
            key,
        })
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/subscriptions/{}/resourceGroups/{}/providers/{}/namespaces/{}/topics/{}/subscriptions/{}/rules/{}",
            self.subscription_id,
            self.key.resource_group,
            PROVIDER_NAMESPACE,
            self.key.namespace_name,
            self.key.topic_name,
            self.key.subscription_name,
            self.key.name
        )
    }
}
