//! Resource data
//!
//! The identity string plus the flat attribute map a resource operation reads
//! its inputs from and writes its results to.

use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceData {
    id: String,
    attributes: Map<String, Value>,
}

impl ResourceData {
    /// Start from a planned config, before the object exists remotely
    pub fn from_config(attributes: Map<String, Value>) -> Self {
        Self {
            id: String::new(),
            attributes,
        }
    }

    /// Start from a bare identity, as import and refresh do
    pub fn from_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: Map::new(),
        }
    }

    /// Rebuild from a state object previously produced by [`Self::to_state`]
    pub fn from_state(state: Value) -> Self {
        let mut attributes = match state {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let id = match attributes.remove("id") {
            Some(Value::String(id)) => id,
            _ => String::new(),
        };
        Self { id, attributes }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// An empty id marks the object as gone
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn is_gone(&self) -> bool {
        self.id.is_empty()
    }

    /// String attribute, `""` when unset
    pub fn get_str(&self, key: &str) -> &str {
        self.attributes
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Bool attribute, `false` when unset
    pub fn get_bool(&self, key: &str) -> bool {
        self.attributes
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or_default()
    }

    /// Int attribute, `0` when unset
    pub fn get_int(&self, key: &str) -> i64 {
        self.attributes
            .get(key)
            .and_then(Value::as_i64)
            .unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.attributes.insert(key.to_string(), value.into());
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Flatten into a state object with `id` alongside the attributes
    pub fn to_state(&self) -> Value {
        let mut state = self.attributes.clone();
        state.insert("id".to_string(), Value::String(self.id.clone()));
        Value::Object(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_getters_default_to_zero_values() {
        let data = ResourceData::from_config(Map::new());

        assert_eq!(data.get_str("name"), "");
        assert!(!data.get_bool("requires_session"));
        assert_eq!(data.get_int("max_delivery_count"), 0);
        assert!(data.is_gone());
    }

    #[test]
    fn test_state_round_trip_keeps_id_out_of_attributes() {
        let mut data = ResourceData::from_id("/subscriptions/s/resourceGroups/rg");
        data.set("name", "rule-1");
        data.set("max_delivery_count", 10);

        let state = data.to_state();
        assert_eq!(state["id"], "/subscriptions/s/resourceGroups/rg");

        let back = ResourceData::from_state(state);
        assert_eq!(back, data);
        assert!(back.get("id").is_none());
    }

    #[test]
    fn test_from_state_tolerates_non_objects() {
        let data = ResourceData::from_state(json!("nope"));
        assert!(data.is_gone());
        assert!(data.attributes().is_empty());
    }
}
