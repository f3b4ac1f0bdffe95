//! Enumerated-value output schemas for constrained generation.
//!
//! An [`EnumSchema`] restricts a model's output to a JSON object with a single
//! string field whose value is one of a declared finite set:
//!
//! ```json
//! {"result": "Act"}
//! ```
//!
//! [`Choice`] ties a closed Rust enum to its schema so that callers get a
//! typed value back instead of a string tag.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SchemaViolation;
use crate::provider::ResponseFormat;

/// Field name used when none is given.
pub const DEFAULT_FIELD: &str = "result";

/// A single-field schema whose value must be one of `values`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumSchema {
    name: String,
    field: String,
    values: Vec<String>,
}

impl EnumSchema {
    /// Create a schema named `name` over `values`, using the default field.
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            field: DEFAULT_FIELD.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Use a different field name.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Whether `value` is one of the declared values.
    pub fn allows(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    /// The JSON Schema document sent to the backend.
    pub fn to_json_schema(&self) -> serde_json::Value {
        let mut properties = serde_json::Map::new();
        properties.insert(
            self.field.clone(),
            serde_json::json!({
                "type": "string",
                "enum": self.values,
            }),
        );
        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": [self.field],
            "additionalProperties": false,
        })
    }

    /// The strict `response_format` carrying this schema.
    pub fn response_format(&self) -> ResponseFormat {
        ResponseFormat::json_schema(&self.name, self.to_json_schema())
    }

    /// Parse raw model output and extract the declared field's value.
    pub fn parse(&self, raw: &str) -> Result<String, SchemaViolation> {
        let value: serde_json::Value =
            serde_json::from_str(raw.trim()).map_err(|e| SchemaViolation::Unparseable {
                raw: raw.to_string(),
                reason: e.to_string(),
            })?;

        let Some(found) = value.get(&self.field).and_then(|v| v.as_str()) else {
            debug!(schema = %self.name, raw, "Constrained output lacks the declared field");
            return Err(SchemaViolation::MissingField {
                field: self.field.clone(),
                raw: raw.to_string(),
            });
        };

        if !self.allows(found) {
            debug!(schema = %self.name, value = found, "Constrained output outside the enum");
            return Err(SchemaViolation::NotAllowed {
                field: self.field.clone(),
                value: found.to_string(),
                allowed: self.values.clone(),
            });
        }

        Ok(found.to_string())
    }
}

/// A closed enumeration that can be produced by constrained generation.
pub trait Choice: Copy + Sized + 'static {
    /// Name of the generated schema (sent to the backend).
    const SCHEMA_NAME: &'static str;

    /// Every variant, in declaration order.
    const VARIANTS: &'static [Self];

    /// The tag the model emits for this variant.
    fn tag(self) -> &'static str;

    /// Resolve a tag back to its variant.
    fn from_tag(tag: &str) -> Option<Self> {
        Self::VARIANTS.iter().copied().find(|v| v.tag() == tag)
    }

    /// The schema admitting exactly the tags of [`Self::VARIANTS`].
    fn schema() -> EnumSchema {
        EnumSchema::new(Self::SCHEMA_NAME, Self::VARIANTS.iter().map(|v| v.tag()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mode_schema() -> EnumSchema {
        EnumSchema::new("mode", ["Tho", "Act"])
    }

    #[test]
    fn json_schema_declares_single_required_enum_field() {
        let schema = mode_schema().to_json_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], serde_json::json!(["result"]));
        assert_eq!(
            schema["properties"]["result"]["enum"],
            serde_json::json!(["Tho", "Act"])
        );
        assert_eq!(schema["additionalProperties"], false);
    }

    #[test]
    fn parse_extracts_declared_value() {
        assert_eq!(mode_schema().parse(r#"{"result": "Act"}"#).unwrap(), "Act");
        assert_eq!(mode_schema().parse(" {\"result\":\"Tho\"}\n").unwrap(), "Tho");
    }

    #[test]
    fn parse_rejects_invalid_json() {
        let err = mode_schema().parse("Act").unwrap_err();
        assert!(matches!(err, SchemaViolation::Unparseable { .. }));
    }

    #[test]
    fn parse_rejects_missing_field() {
        let err = mode_schema().parse(r#"{"mode": "Act"}"#).unwrap_err();
        assert!(matches!(
            err,
            SchemaViolation::MissingField { ref field, .. } if field == "result"
        ));

        let err = mode_schema().parse(r#"{"result": 3}"#).unwrap_err();
        assert!(matches!(err, SchemaViolation::MissingField { .. }));
    }

    #[test]
    fn parse_rejects_values_outside_enum() {
        let err = mode_schema().parse(r#"{"result": "Obs"}"#).unwrap_err();
        match err {
            SchemaViolation::NotAllowed { value, allowed, .. } => {
                assert_eq!(value, "Obs");
                assert_eq!(allowed, vec!["Tho".to_string(), "Act".to_string()]);
            }
            other => panic!("Expected NotAllowed, got {other:?}"),
        }
    }

    #[test]
    fn custom_field_name() {
        let schema = EnumSchema::new("action", ["Search", "Finish"]).with_field("action");
        assert_eq!(schema.parse(r#"{"action": "Finish"}"#).unwrap(), "Finish");
        assert!(schema.parse(r#"{"result": "Finish"}"#).is_err());
    }

    #[test]
    fn response_format_carries_schema_name() {
        match mode_schema().response_format() {
            ResponseFormat::JsonSchema { json_schema } => {
                assert_eq!(json_schema.name, "mode");
                assert!(json_schema.strict);
            }
            ResponseFormat::Text => panic!("Expected a JSON schema format"),
        }
    }
}
