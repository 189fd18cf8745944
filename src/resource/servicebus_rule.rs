//! `azurerm_servicebus_rule`
//!
//! A filter on a Service Bus topic subscription. Every update replaces the
//! rule wholesale, so update and create share one code path.

use super::data::ResourceData;
use super::id::RuleId;
use super::registry::Resource;
use super::schema::{Attribute, Schema, ValueType};
use super::validate;
use crate::azure::client::ArmClient;
use crate::azure::http::response_was_not_found;
use crate::azure::servicebus::{FilterType, Rule, RuleKey, RuleProperties, SqlFilter};
use anyhow::Result;
use async_trait::async_trait;

pub const TYPE_NAME: &str = "azurerm_servicebus_rule";

fn filter_type(value: &str) -> Result<(), String> {
    // Empty means unset, same as leaving the attribute out
    if value.is_empty() {
        return Ok(());
    }
    value.parse::<FilterType>().map(|_| ()).map_err(|e| e.to_string())
}

pub fn rule_schema() -> Schema {
    Schema::new()
        .with_attribute("name", Attribute::required(ValueType::String).force_new())
        .with_attribute("namespace_name", Attribute::required(ValueType::String).force_new())
        .with_attribute("topic_name", Attribute::required(ValueType::String).force_new())
        .with_attribute("subscription_name", Attribute::required(ValueType::String).force_new())
        .with_attribute(
            "resource_group_name",
            Attribute::required(ValueType::String)
                .force_new()
                .validate(validate::resource_group_name),
        )
        .with_attribute(
            "filtertype",
            Attribute::optional(ValueType::String).computed().validate(filter_type),
        )
        .with_attribute("sqlexpression", Attribute::optional(ValueType::String).computed())
        .with_attribute(
            "location",
            Attribute::optional(ValueType::String).deprecated("location is no longer used"),
        )
        .with_attribute(
            "auto_delete_on_idle",
            Attribute::optional(ValueType::String)
                .computed()
                .validate(validate::iso8601_duration),
        )
        .with_attribute(
            "default_message_ttl",
            Attribute::optional(ValueType::String)
                .computed()
                .validate(validate::iso8601_duration),
        )
        .with_attribute(
            "lock_duration",
            Attribute::optional(ValueType::String)
                .computed()
                .validate(validate::iso8601_duration),
        )
        .with_attribute("dead_lettering_on_message_expiration", Attribute::optional(ValueType::Bool))
        .with_attribute("enable_batched_operations", Attribute::optional(ValueType::Bool))
        .with_attribute("max_delivery_count", Attribute::required(ValueType::Int))
        // Cannot be changed after creation
        .with_attribute("requires_session", Attribute::optional(ValueType::Bool).force_new())
        .with_attribute(
            "dead_lettering_on_filter_evaluation_exceptions",
            Attribute::optional(ValueType::Bool).deprecated("This field has been deprecated by Azure"),
        )
}

pub struct ServiceBusRule {
    schema: Schema,
}

impl ServiceBusRule {
    pub fn new() -> Self {
        Self {
            schema: rule_schema(),
        }
    }

    fn key_from_config(data: &ResourceData) -> RuleKey {
        RuleKey {
            resource_group: data.get_str("resource_group_name").to_string(),
            namespace_name: data.get_str("namespace_name").to_string(),
            topic_name: data.get_str("topic_name").to_string(),
            subscription_name: data.get_str("subscription_name").to_string(),
            name: data.get_str("name").to_string(),
        }
    }

    /// Request body: only the filter travels over the wire
    fn expand_rule(data: &ResourceData) -> Result<Rule> {
        let filter_type = match data.get_str("filtertype") {
            "" => None,
            value => Some(value.parse::<FilterType>()?),
        };
        let sql_filter = match data.get_str("sqlexpression") {
            "" => None,
            expression => Some(SqlFilter {
                sql_expression: Some(expression.to_string()),
                ..Default::default()
            }),
        };

        Ok(Rule {
            properties: Some(RuleProperties {
                filter_type,
                sql_filter,
                ..Default::default()
            }),
            ..Default::default()
        })
    }
}

impl Default for ServiceBusRule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Resource for ServiceBusRule {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn create(&self, client: &ArmClient, data: &mut ResourceData) -> Result<()> {
        tracing::info!("preparing arguments for ServiceBus Rule creation");

        let key = Self::key_from_config(data);
        let parameters = Self::expand_rule(data)?;

        let rules = client.servicebus_rules();
        rules.create_or_update(&key, &parameters).await?;

        let read = rules.get(&key).await?;
        let Some(id) = read.id.filter(|id| !id.is_empty()) else {
            anyhow::bail!(
                "Cannot read ServiceBus Rule {} (resource group {}) ID",
                key.name,
                key.resource_group
            );
        };

        data.set_id(id);
        self.read(client, data).await
    }

    async fn read(&self, client: &ArmClient, data: &mut ResourceData) -> Result<()> {
        let id = RuleId::parse(data.id())?;
        let key = &id.key;

        tracing::info!(
            rule_id = %data.id(),
            resource_group = %key.resource_group,
            namespace = %key.namespace_name,
            topic = %key.topic_name,
            rule = %key.name,
            "reading ServiceBus Rule"
        );
        if id.subscription_id != client.subscription_id {
            tracing::warn!(
                "rule ID names subscription {} but the client is scoped to {}",
                id.subscription_id,
                client.subscription_id
            );
        }

        let resp = match client.servicebus_rules().get(key).await {
            Ok(resp) => resp,
            Err(e) if response_was_not_found(&e) => {
                tracing::info!(rule = %key, "ServiceBus Rule is gone, removing from state");
                data.set_id("");
                return Ok(());
            }
            Err(e) => {
                let msg = format!("Error making Read request on Azure ServiceBus Rule {}: {:#}", key.name, e);
                return Err(e.context(msg));
            }
        };

        data.set("name", resp.name.unwrap_or_else(|| key.name.clone()));
        data.set("resource_group_name", key.resource_group.as_str());
        data.set("namespace_name", key.namespace_name.as_str());
        data.set("topic_name", key.topic_name.as_str());
        data.set("subscription_name", key.subscription_name.as_str());

        if let Some(props) = resp.properties {
            if let Some(filter_type) = props.filter_type {
                data.set("filtertype", filter_type.as_str());
            }
            if let Some(expression) = props.sql_filter.and_then(|f| f.sql_expression) {
                data.set("sqlexpression", expression);
            }
        }

        Ok(())
    }

    async fn delete(&self, client: &ArmClient, data: &ResourceData) -> Result<()> {
        let id = RuleId::parse(data.id())?;
        client.servicebus_rules().delete(&id.key).await
    }

    fn import(&self, id: &str) -> Result<ResourceData> {
        let parsed = RuleId::parse(id)?;

        let mut data = ResourceData::from_id(id);
        data.set("name", parsed.key.name);
        data.set("resource_group_name", parsed.key.resource_group);
        data.set("namespace_name", parsed.key.namespace_name);
        data.set("topic_name", parsed.key.topic_name);
        data.set("subscription_name", parsed.key.subscription_name);
        Ok(data)
    }
}
