//! Field and schema specifications.

use crate::errors::FieldViolation;
use crate::html::check_well_formed;
use serde_json::{json, Map, Value};

/// The kind of value a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Plain text with a trimmed character-count range.
    Text {
        /// Minimum number of characters.
        min_chars: usize,
        /// Maximum number of characters, if bounded.
        max_chars: Option<usize>,
    },
    /// A non-empty, well-formed HTML fragment.
    Html,
    /// One of a fixed set of strings.
    OneOf(&'static [&'static str]),
}

/// A single declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// JSON field name.
    pub name: &'static str,
    /// Value kind.
    pub kind: FieldKind,
    /// What the field means; sent to the model as the field description.
    pub description: &'static str,
    /// Human label used in user-facing messages.
    pub label: &'static str,
}

impl FieldSpec {
    /// Declares a text field.
    #[must_use]
    pub const fn text(
        name: &'static str,
        label: &'static str,
        min_chars: usize,
        max_chars: Option<usize>,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            kind: FieldKind::Text {
                min_chars,
                max_chars,
            },
            description,
            label,
        }
    }

    /// Declares an HTML fragment field.
    #[must_use]
    pub const fn html(name: &'static str, label: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Html,
            description,
            label,
        }
    }

    /// Declares an enumerated field.
    #[must_use]
    pub const fn one_of(
        name: &'static str,
        label: &'static str,
        values: &'static [&'static str],
        description: &'static str,
    ) -> Self {
        Self {
            name,
            kind: FieldKind::OneOf(values),
            description,
            label,
        }
    }

    fn check(&self, value: &Value) -> Option<String> {
        let Some(text) = value.as_str() else {
            return Some(format!("expected a string, got {}", json_type(value)));
        };

        match self.kind {
            FieldKind::Text {
                min_chars,
                max_chars,
            } => {
                let len = text.trim().chars().count();
                if len == 0 {
                    Some("must not be empty".to_string())
                } else if len < min_chars {
                    Some(format!("must be at least {min_chars} characters"))
                } else if let Some(max) = max_chars.filter(|max| len > *max) {
                    Some(format!("must be at most {max} characters"))
                } else {
                    None
                }
            }
            FieldKind::Html => {
                if text.trim().is_empty() {
                    Some("must not be empty".to_string())
                } else {
                    check_well_formed(text)
                        .err()
                        .map(|problem| format!("malformed HTML: {problem}"))
                }
            }
            FieldKind::OneOf(values) => {
                if values.contains(&text) {
                    None
                } else {
                    Some(format!("must be one of {}", values.join(", ")))
                }
            }
        }
    }

    fn json_schema(&self) -> Value {
        let mut property = Map::new();
        property.insert("type".into(), json!("string"));
        property.insert("description".into(), json!(self.description));
        match self.kind {
            FieldKind::Text {
                min_chars,
                max_chars,
            } => {
                property.insert("minLength".into(), json!(min_chars.max(1)));
                if let Some(max) = max_chars {
                    property.insert("maxLength".into(), json!(max));
                }
            }
            FieldKind::Html => {
                property.insert("minLength".into(), json!(1));
            }
            FieldKind::OneOf(values) => {
                property.insert("enum".into(), json!(values));
            }
        }
        Value::Object(property)
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A named object shape: every declared field is required, nothing else is
/// allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaSpec {
    /// Schema name (e.g., `GenerateFaqSectionOutput`).
    pub name: &'static str,
    /// What the object represents.
    pub description: &'static str,
    /// Declared fields.
    pub fields: &'static [FieldSpec],
}

impl SchemaSpec {
    /// Declares a schema.
    #[must_use]
    pub const fn new(
        name: &'static str,
        description: &'static str,
        fields: &'static [FieldSpec],
    ) -> Self {
        Self {
            name,
            description,
            fields,
        }
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns `true` if the schema declares a field with this name.
    #[must_use]
    pub fn declares(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Validates a payload, collecting every violation.
    ///
    /// # Errors
    ///
    /// Returns the list of violations when the payload does not conform.
    pub fn validate(&self, payload: &Value) -> Result<(), Vec<FieldViolation>> {
        let Some(object) = payload.as_object() else {
            return Err(vec![FieldViolation::new(
                "$",
                format!("expected an object, got {}", json_type(payload)),
            )]);
        };

        let mut violations = Vec::new();
        for field in self.fields {
            match object.get(field.name) {
                None => violations.push(FieldViolation::new(field.name, "is required")),
                Some(value) => {
                    if let Some(message) = field.check(value) {
                        violations.push(FieldViolation::new(field.name, message));
                    }
                }
            }
        }

        let mut unknown: Vec<&String> = object.keys().filter(|k| !self.declares(k)).collect();
        unknown.sort();
        for key in unknown {
            violations.push(FieldViolation::new(key.as_str(), "is not declared by the schema"));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    /// Renders the schema as a JSON Schema object.
    #[must_use]
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.name.to_string(), f.json_schema()))
            .collect();
        let required: Vec<&str> = self.fields.iter().map(|f| f.name).collect();

        json!({
            "type": "object",
            "title": self.name,
            "description": self.description,
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ACTIONS: &[&str] = &["apply_now", "check_rates"];

    const SAMPLE: SchemaSpec = SchemaSpec::new(
        "Sample",
        "A sample object.",
        &[
            FieldSpec::text("title", "Title", 3, Some(10), "Short title."),
            FieldSpec::html("body", "Body", "Body markup."),
            FieldSpec::one_of("action", "Action", ACTIONS, "Primary action."),
        ],
    );

    #[test]
    fn test_valid_payload() {
        let payload = json!({"title": "Loans", "body": "<p>Hi</p>", "action": "apply_now"});
        assert!(SAMPLE.validate(&payload).is_ok());
    }

    #[test]
    fn test_collects_every_violation() {
        let payload = json!({"title": "ab", "body": "<p>open", "action": "buy", "extra": 1});
        let violations = SAMPLE.validate(&payload).unwrap_err();
        let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["title", "body", "action", "extra"]);
        assert_eq!(violations[0].message, "must be at least 3 characters");
        assert!(violations[1].message.starts_with("malformed HTML"));
        assert_eq!(violations[2].message, "must be one of apply_now, check_rates");
    }

    #[test]
    fn test_missing_and_mistyped_fields() {
        let violations = SAMPLE
            .validate(&json!({"title": 42, "action": "apply_now"}))
            .unwrap_err();
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].message, "expected a string, got number");
        assert_eq!(violations[1].field, "body");
        assert_eq!(violations[1].message, "is required");
    }

    #[test]
    fn test_text_bounds_use_trimmed_chars() {
        let spec = FieldSpec::text("t", "T", 3, Some(4), "");
        assert!(spec.check(&json!("  abc  ")).is_none());
        assert_eq!(spec.check(&json!("   ")), Some("must not be empty".to_string()));
        assert_eq!(spec.check(&json!("abcde")), Some("must be at most 4 characters".to_string()));
        assert!(spec.check(&json!("ééé")).is_none());
    }

    #[test]
    fn test_non_object_payload() {
        let violations = SAMPLE.validate(&json!("just text")).unwrap_err();
        assert_eq!(violations, vec![FieldViolation::new("$", "expected an object, got string")]);
    }

    #[test]
    fn test_json_schema_shape() {
        let schema = SAMPLE.to_json_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["title"], "Sample");
        assert_eq!(schema["additionalProperties"], false);
        assert_eq!(schema["required"], json!(["title", "body", "action"]));
        assert_eq!(schema["properties"]["title"]["minLength"], 3);
        assert_eq!(schema["properties"]["title"]["maxLength"], 10);
        assert_eq!(schema["properties"]["body"]["minLength"], 1);
        assert_eq!(schema["properties"]["action"]["enum"], json!(["apply_now", "check_rates"]));
        assert_eq!(schema["properties"]["action"]["description"], "Primary action.");
    }
}
