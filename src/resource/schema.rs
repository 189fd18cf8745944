//! Attribute schema
//!
//! Declarative description of a resource's attributes, the markers the host
//! framework plans with, and config validation against it.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Per-attribute value check; returns a human readable reason on failure
pub type ValidateFn = fn(&str) -> Result<(), String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Bool,
    Int,
}

impl ValueType {
    fn matches(&self, value: &Value) -> bool {
        match self {
            ValueType::String => value.is_string(),
            ValueType::Bool => value.is_boolean(),
            ValueType::Int => value.is_i64() || value.is_u64(),
        }
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// A single attribute definition
#[derive(Debug, Clone, Serialize)]
pub struct Attribute {
    #[serde(rename = "type")]
    pub value_type: ValueType,
    #[serde(skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub optional: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub computed: bool,
    /// A change to this attribute replaces the remote object
    #[serde(skip_serializing_if = "is_false")]
    pub force_new: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<&'static str>,
    #[serde(skip)]
    pub validate: Option<ValidateFn>,
}

impl Attribute {
    fn new(value_type: ValueType) -> Self {
        Self {
            value_type,
            required: false,
            optional: false,
            computed: false,
            force_new: false,
            deprecated: None,
            validate: None,
        }
    }

    pub fn required(value_type: ValueType) -> Self {
        Self {
            required: true,
            ..Self::new(value_type)
        }
    }

    pub fn optional(value_type: ValueType) -> Self {
        Self {
            optional: true,
            ..Self::new(value_type)
        }
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn deprecated(mut self, message: &'static str) -> Self {
        self.deprecated = Some(message);
        self
    }

    pub fn validate(mut self, f: ValidateFn) -> Self {
        self.validate = Some(f);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A validation finding tied to an attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub attribute: String,
    pub summary: String,
}

impl Diagnostic {
    fn error(attribute: &str, summary: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            attribute: attribute.to_string(),
            summary: summary.into(),
        }
    }

    fn warning(attribute: &str, summary: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            attribute: attribute.to_string(),
            summary: summary.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}: {}", level, self.attribute, self.summary)
    }
}

pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(|d| d.severity == Severity::Error)
}

/// Resource schema
#[derive(Debug, Clone, Default, Serialize)]
pub struct Schema {
    pub attributes: BTreeMap<&'static str, Attribute>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, name: &'static str, attribute: Attribute) -> Self {
        self.attributes.insert(name, attribute);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Check a user-supplied config. `null` counts as unset.
    pub fn validate(&self, config: &Map<String, Value>) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        for (name, value) in config {
            if value.is_null() {
                continue;
            }

            let Some(attribute) = self.get(name) else {
                diagnostics.push(Diagnostic::error(
                    name,
                    "An argument by this name is not expected here",
                ));
                continue;
            };

            if attribute.computed && !attribute.optional && !attribute.required {
                diagnostics.push(Diagnostic::error(name, "This attribute is computed and cannot be set"));
                continue;
            }

            if !attribute.value_type.matches(value) {
                diagnostics.push(Diagnostic::error(
                    name,
                    format!("Inappropriate value: expected {:?}, got {}", attribute.value_type, value),
                ));
                continue;
            }

            if let (Some(check), Some(s)) = (attribute.validate, value.as_str()) {
                if let Err(reason) = check(s) {
                    diagnostics.push(Diagnostic::error(name, reason));
                }
            }

            if let Some(message) = attribute.deprecated {
                diagnostics.push(Diagnostic::warning(name, message));
            }
        }

        for (name, attribute) in &self.attributes {
            if attribute.required && config.get(*name).map_or(true, Value::is_null) {
                diagnostics.push(Diagnostic::error(name, "The argument is required, but no definition was found"));
            }
        }

        diagnostics
    }
}
