//! Typed declarations for callable functions.
//!
//! Function parameter schemas are authored as plain Rust data structures and
//! serialized to the JSON Schema wire shape only when a request is built.
//! The same declarations drive argument validation in [`crate::decode`].

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Function specs
// ---------------------------------------------------------------------------

/// The advertised schema of a callable function.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionSpec {
    /// Exposed function name the model will call.
    pub name: String,
    /// Natural-language description of function behavior.
    pub description: String,
    /// Parameter schema, serialized as a JSON Schema object.
    pub parameters: SchemaObject,
}

impl FunctionSpec {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: SchemaObject,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

// ---------------------------------------------------------------------------
// Parameter schemas
// ---------------------------------------------------------------------------

/// Declared JSON type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    String,
    Number,
    Integer,
    Boolean,
}

impl PropertyKind {
    /// JSON Schema type name for the wire format and error messages.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
        }
    }
}

/// One named parameter of a function.
#[derive(Debug, Clone)]
pub struct Property {
    pub name: String,
    pub kind: PropertyKind,
    pub description: String,
    /// Whether the model must supply this parameter.
    pub required: bool,
    /// Allowed values for enumerated string parameters.
    pub allowed: Option<Vec<String>>,
}

impl Property {
    fn new(name: impl Into<String>, kind: PropertyKind, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            required: false,
            allowed: None,
        }
    }

    /// Declare a free-form string parameter.
    pub fn string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, PropertyKind::String, description)
    }

    /// Declare a string parameter restricted to an enumerated value set.
    pub fn string_enum(
        name: impl Into<String>,
        description: impl Into<String>,
        allowed: &[&str],
    ) -> Self {
        let mut property = Self::new(name, PropertyKind::String, description);
        property.allowed = Some(allowed.iter().map(|v| v.to_string()).collect());
        property
    }

    /// Declare a floating-point number parameter.
    pub fn number(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, PropertyKind::Number, description)
    }

    /// Declare an integer parameter.
    pub fn integer(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, PropertyKind::Integer, description)
    }

    /// Declare a boolean parameter.
    pub fn boolean(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, PropertyKind::Boolean, description)
    }

    /// Mark this parameter as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Ordered parameter declarations for one function.
///
/// Declaration order is preserved; it fixes both the wire property order and
/// the order validation errors are reported in.
#[derive(Debug, Clone, Default)]
pub struct SchemaObject {
    properties: Vec<Property>,
}

impl SchemaObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter declaration.
    pub fn property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    /// All declared parameters in declaration order.
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Look up a parameter by name.
    pub fn get(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Names of parameters declared required, in declaration order.
    pub fn required_names(&self) -> impl Iterator<Item = &str> {
        self.properties
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
    }
}

// ---------------------------------------------------------------------------
// Wire serialization
// ---------------------------------------------------------------------------

// {"type":"object","properties":{...},"required":[...],"additionalProperties":false}
impl Serialize for SchemaObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let required: Vec<&str> = self.required_names().collect();
        let mut entries = 3;
        if !required.is_empty() {
            entries += 1;
        }
        let mut map = serializer.serialize_map(Some(entries))?;
        map.serialize_entry("type", "object")?;
        map.serialize_entry("properties", &PropertiesWire(&self.properties))?;
        if !required.is_empty() {
            map.serialize_entry("required", &required)?;
        }
        map.serialize_entry("additionalProperties", &false)?;
        map.end()
    }
}

struct PropertiesWire<'a>(&'a [Property]);

impl Serialize for PropertiesWire<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for property in self.0 {
            map.serialize_entry(&property.name, &PropertyWire(property))?;
        }
        map.end()
    }
}

struct PropertyWire<'a>(&'a Property);

impl Serialize for PropertyWire<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = if self.0.allowed.is_some() { 3 } else { 2 };
        let mut map = serializer.serialize_map(Some(entries))?;
        map.serialize_entry("type", self.0.kind.type_name())?;
        map.serialize_entry("description", &self.0.description)?;
        if let Some(allowed) = &self.0.allowed {
            map.serialize_entry("enum", allowed)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Schema fixture matching the canonical weather function.
    fn weather_schema() -> SchemaObject {
        SchemaObject::new()
            .property(
                Property::string("location", "The city and state, e.g. San Francisco, CA")
                    .required(),
            )
            .property(
                Property::string_enum(
                    "unit",
                    "The temperature unit to use. Infer this from the users location.",
                    &["fahrenheit", "celsius"],
                )
                .required(),
            )
    }

    #[test]
    fn serializes_to_json_schema_wire_shape() {
        let value = serde_json::to_value(weather_schema()).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "object",
                "properties": {
                    "location": {
                        "type": "string",
                        "description": "The city and state, e.g. San Francisco, CA"
                    },
                    "unit": {
                        "type": "string",
                        "description": "The temperature unit to use. Infer this from the users location.",
                        "enum": ["fahrenheit", "celsius"]
                    }
                },
                "required": ["location", "unit"],
                "additionalProperties": false
            })
        );
    }

    #[test]
    fn required_array_omitted_when_all_optional() {
        let schema = SchemaObject::new().property(Property::boolean("verbose", "More detail."));
        let value = serde_json::to_value(schema).unwrap();
        assert!(value.get("required").is_none());
        assert_eq!(value["properties"]["verbose"]["type"], "boolean");
    }

    #[test]
    fn function_spec_serializes_with_nested_parameters() {
        let spec = FunctionSpec::new(
            "get_current_weather",
            "Get the current weather in a given location",
            weather_schema(),
        );
        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(value["name"], "get_current_weather");
        assert_eq!(value["parameters"]["type"], "object");
        assert_eq!(
            value["parameters"]["required"],
            json!(["location", "unit"])
        );
    }

    #[test]
    fn lookup_and_required_names_follow_declaration_order() {
        let schema = weather_schema();
        assert!(schema.get("location").is_some());
        assert!(schema.get("altitude").is_none());
        let required: Vec<&str> = schema.required_names().collect();
        assert_eq!(required, vec!["location", "unit"]);
    }
}
