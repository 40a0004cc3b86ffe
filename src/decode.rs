//! Schema-driven argument decoding.
//!
//! Function-call arguments arrive as free-form JSON text produced by the
//! model. This module is the single point where that untrusted payload is
//! validated against the declared [`SchemaObject`] before a handler runs:
//! unknown properties are rejected, required properties must be present,
//! declared types must match exactly, and enumerated values must be members
//! of their allowed set. No silent coercion.

use crate::error::DecodeError;
use crate::schema::{PropertyKind, SchemaObject};
use serde_json::Value;
use std::collections::BTreeMap;

/// Validated argument mapping handed to function handlers.
///
/// Every entry has passed the declared-type checks, so the typed accessors
/// return `Some` for any property the schema guarantees.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arguments(BTreeMap<String, Value>);

impl Arguments {
    /// Raw JSON value of a property.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// String property value.
    pub fn string(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// Number property value.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.0.get(name).and_then(Value::as_f64)
    }

    /// Integer property value.
    pub fn integer(&self, name: &str) -> Option<i64> {
        self.0.get(name).and_then(Value::as_i64)
    }

    /// Boolean property value.
    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.0.get(name).and_then(Value::as_bool)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parse and validate an argument payload against a schema.
pub fn decode(schema: &SchemaObject, args_json: &str) -> Result<Arguments, DecodeError> {
    let parsed: Value = serde_json::from_str(args_json)
        .map_err(|e| DecodeError::Malformed(e.to_string()))?;
    let Value::Object(object) = parsed else {
        return Err(DecodeError::Malformed(
            "arguments must be a JSON object".into(),
        ));
    };

    // Reject undeclared properties before anything else; an unknown shape
    // should fail loudly, not flow through to a handler.
    for key in object.keys() {
        if schema.get(key).is_none() {
            return Err(DecodeError::Malformed(format!("unknown property `{key}`")));
        }
    }

    for name in schema.required_names() {
        if !object.contains_key(name) {
            return Err(DecodeError::MissingRequired(name.to_string()));
        }
    }

    let mut values = BTreeMap::new();
    for property in schema.properties() {
        let Some(value) = object.get(&property.name) else {
            continue;
        };
        check_type(property.kind, &property.name, value)?;
        if let Some(allowed) = &property.allowed {
            // Type check above guarantees a string here.
            let supplied = value.as_str().unwrap_or_default();
            if !allowed.iter().any(|candidate| candidate == supplied) {
                return Err(DecodeError::InvalidEnum {
                    property: property.name.clone(),
                    value: supplied.to_string(),
                    allowed: allowed.clone(),
                });
            }
        }
        values.insert(property.name.clone(), value.clone());
    }

    Ok(Arguments(values))
}

/// Check one supplied value against its declared kind.
fn check_type(kind: PropertyKind, name: &str, value: &Value) -> Result<(), DecodeError> {
    let matches = match kind {
        PropertyKind::String => value.is_string(),
        PropertyKind::Number => value.is_number(),
        PropertyKind::Integer => value.is_i64() || value.is_u64(),
        PropertyKind::Boolean => value.is_boolean(),
    };
    if matches {
        Ok(())
    } else {
        Err(DecodeError::TypeMismatch {
            property: name.to_string(),
            expected: kind.type_name(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Property;

    /// Schema fixture matching the canonical weather function.
    fn weather_schema() -> SchemaObject {
        SchemaObject::new()
            .property(
                Property::string("location", "The city and state, e.g. San Francisco, CA")
                    .required(),
            )
            .property(
                Property::string_enum("unit", "The temperature unit to use.", &[
                    "fahrenheit",
                    "celsius",
                ])
                .required(),
            )
    }

    // Verifies the round trip from the spec scenario decodes both properties.
    #[test]
    fn decodes_valid_weather_arguments() {
        let args = decode(
            &weather_schema(),
            r#"{"location":"Glasgow, Scotland","unit":"celsius"}"#,
        )
        .unwrap();
        assert_eq!(args.string("location"), Some("Glasgow, Scotland"));
        assert_eq!(args.string("unit"), Some("celsius"));
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn rejects_invalid_json() {
        let err = decode(&weather_schema(), "{not json").unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn rejects_non_object_payload() {
        let err = decode(&weather_schema(), r#"["Glasgow"]"#).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn rejects_unknown_property() {
        let err = decode(
            &weather_schema(),
            r#"{"location":"Glasgow, Scotland","unit":"celsius","altitude":12}"#,
        )
        .unwrap_err();
        match err {
            DecodeError::Malformed(msg) => assert!(msg.contains("altitude"), "got: {msg}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_required_property_is_an_error() {
        let err = decode(&weather_schema(), r#"{"location":"Glasgow"}"#).unwrap_err();
        assert_eq!(err, DecodeError::MissingRequired("unit".into()));
    }

    #[test]
    fn enum_membership_is_enforced() {
        let err = decode(
            &weather_schema(),
            r#"{"location":"Glasgow, Scotland","unit":"kelvin"}"#,
        )
        .unwrap_err();
        match err {
            DecodeError::InvalidEnum {
                property, value, ..
            } => {
                assert_eq!(property, "unit");
                assert_eq!(value, "kelvin");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn declared_types_are_not_coerced() {
        let err = decode(
            &weather_schema(),
            r#"{"location":42,"unit":"celsius"}"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            DecodeError::TypeMismatch {
                property: "location".into(),
                expected: "string",
            }
        );
    }

    #[test]
    fn integer_kind_rejects_fractional_numbers() {
        let schema =
            SchemaObject::new().property(Property::integer("count", "How many.").required());
        let err = decode(&schema, r#"{"count":1.5}"#).unwrap_err();
        assert!(matches!(err, DecodeError::TypeMismatch { .. }));
        let args = decode(&schema, r#"{"count":3}"#).unwrap();
        assert_eq!(args.integer("count"), Some(3));
    }

    #[test]
    fn optional_properties_may_be_absent() {
        let schema = SchemaObject::new()
            .property(Property::string("location", "Where.").required())
            .property(Property::boolean("detailed", "Verbose output."));
        let args = decode(&schema, r#"{"location":"Glasgow"}"#).unwrap();
        assert_eq!(args.len(), 1);
        assert!(args.boolean("detailed").is_none());
    }

    #[cfg(feature = "fuzz-tests")]
    mod prop_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // The decoder faces adversarial input; it must reject, never panic.
            #[test]
            fn decode_never_panics_on_arbitrary_input(payload in ".{0,256}") {
                let _ = decode(&weather_schema(), &payload);
            }

            #[test]
            fn decode_accepts_any_allowed_unit(
                location in "[a-zA-Z ,]{1,40}",
                unit in prop_oneof![Just("fahrenheit"), Just("celsius")]
            ) {
                let payload = serde_json::json!({
                    "location": location,
                    "unit": unit,
                })
                .to_string();
                let args = decode(&weather_schema(), &payload).expect("valid payload");
                prop_assert_eq!(args.string("unit"), Some(unit));
            }
        }
    }
}
