//! Service Bus Rules
//!
//! REST model and operations for topic-subscription rules under
//! `Microsoft.ServiceBus/namespaces/{ns}/topics/{topic}/subscriptions/{sub}/rules/{rule}`.

use super::client::ArmClient;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

pub const PROVIDER_NAMESPACE: &str = "Microsoft.ServiceBus";

/// Rule filter kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterType {
    SqlFilter,
    CorrelationFilter,
}

impl FilterType {
    pub const ALL: [FilterType; 2] = [FilterType::SqlFilter, FilterType::CorrelationFilter];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterType::SqlFilter => "SqlFilter",
            FilterType::CorrelationFilter => "CorrelationFilter",
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("expected filter type to be one of SqlFilter, CorrelationFilter, got {s:?}"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql_expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compatibility_level: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_preprocessing: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_type: Option<FilterType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql_filter: Option<SqlFilter>,
    /// Opaque to this resource; kept so a GET/PUT cycle loses nothing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_filter: Option<Value>,
}

/// ARM rule entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<RuleProperties>,
}

/// The five names that address a rule inside a subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleKey {
    pub resource_group: String,
    pub namespace_name: String,
    pub topic_name: String,
    pub subscription_name: String,
    pub name: String,
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}",
            self.resource_group, self.namespace_name, self.topic_name, self.subscription_name, self.name
        )
    }
}

/// Rule operations bound to an [`ArmClient`]
pub struct RulesClient<'a> {
    client: &'a ArmClient,
}

impl<'a> RulesClient<'a> {
    pub fn new(client: &'a ArmClient) -> Self {
        Self { client }
    }

    pub fn rule_url(&self, key: &RuleKey) -> String {
        self.client.provider_resource_url(
            &key.resource_group,
            PROVIDER_NAMESPACE,
            &[
                ("namespaces", key.namespace_name.as_str()),
                ("topics", key.topic_name.as_str()),
                ("subscriptions", key.subscription_name.as_str()),
                ("rules", key.name.as_str()),
            ],
        )
    }

    /// Create the rule, or replace it wholesale if it exists
    pub async fn create_or_update(&self, key: &RuleKey, rule: &Rule) -> Result<Rule> {
        tracing::info!(rule = %key, "PUT servicebus rule");

        let body = serde_json::to_value(rule).context("Failed to serialize rule")?;
        let response = self.client.put(&self.rule_url(key), &body).await?;
        parse_rule(response)
    }

    pub async fn get(&self, key: &RuleKey) -> Result<Rule> {
        tracing::debug!(rule = %key, "GET servicebus rule");

        let response = self.client.get(&self.rule_url(key)).await?;
        parse_rule(response)
    }

    pub async fn delete(&self, key: &RuleKey) -> Result<()> {
        tracing::info!(rule = %key, "DELETE servicebus rule");

        self.client.delete(&self.rule_url(key)).await?;
        Ok(())
    }
}

fn parse_rule(response: Value) -> Result<Rule> {
    if response.is_null() {
        return Ok(Rule::default());
    }
    serde_json::from_value(response).context("Failed to decode servicebus rule")
}
