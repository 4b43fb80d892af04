//! JSON schemas for structured completion output.
//!
//! A [`JsonSchema`] is sent as `response_format.json_schema`. The root is
//! always an object with `additionalProperties: false`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::{CoreError, Result};

/// Named schema attached to a completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSchema {
    /// Schema name.
    pub name: String,
    /// Root schema object.
    pub schema: Value,
    /// Whether the provider must follow the schema exactly.
    pub strict: bool,
}

/// JSON schema primitive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    /// `object`
    Object,
    /// `array`
    Array,
    /// `string`
    String,
    /// `integer`
    Integer,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
    /// `null`
    Null,
}

impl PropertyType {
    /// Parse a schema type name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "object" => Self::Object,
            "array" => Self::Array,
            "string" => Self::String,
            "integer" => Self::Integer,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "null" => Self::Null,
            _ => return None,
        })
    }

    /// Schema type name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Array => "array",
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A property in a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Value type.
    #[serde(rename = "type")]
    pub kind: PropertyType,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Nested properties of an object.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Property>,
    /// Item schema of an array.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Property>>,
    /// Required nested property names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    /// Allowed values.
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,
    /// Default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl Property {
    /// A bare property of the given type.
    #[must_use]
    pub fn new(kind: PropertyType) -> Self {
        Self {
            kind,
            description: String::new(),
            properties: BTreeMap::new(),
            items: None,
            required: Vec::new(),
            enum_values: Vec::new(),
            default: None,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Restrict to the given values.
    #[must_use]
    pub fn with_enum(mut self, values: Vec<Value>) -> Self {
        self.enum_values = values;
        self
    }

    /// Parse one field definition: a bare type name (`"string"`) or an
    /// object with `type` and optional `description`, `properties`,
    /// `required`, `items`, `enum`, `default`.
    fn from_definition(def: &Value) -> Result<Self> {
        match def {
            Value::String(name) => match PropertyType::parse(name) {
                // Composite types need a full definition.
                Some(kind) if !matches!(kind, PropertyType::Object | PropertyType::Array) => {
                    Ok(Self::new(kind))
                }
                _ => Err(CoreError::Schema(format!("unsupported type: {name}"))),
            },
            Value::Object(map) => Self::from_map(map),
            other => Err(CoreError::Schema(format!(
                "unsupported definition type: {}",
                crate::error::json_kind(other)
            ))),
        }
    }

    fn from_map(def: &Map<String, Value>) -> Result<Self> {
        let kind = match def.get("type") {
            Some(Value::String(name)) => PropertyType::parse(name)
                .ok_or_else(|| CoreError::Schema(format!("unsupported type: {name}")))?,
            Some(_) => return Err(CoreError::Schema("type must be a string".into())),
            None => return Err(CoreError::Schema("type is required".into())),
        };

        let mut property = Self::new(kind);
        if let Some(Value::String(desc)) = def.get("description") {
            property.description.clone_from(desc);
        }

        match kind {
            PropertyType::Object => {
                if let Some(Value::Object(props)) = def.get("properties") {
                    for (name, nested) in props {
                        let nested = Self::from_definition(nested).map_err(|e| {
                            CoreError::Schema(format!("nested property {name}: {e}"))
                        })?;
                        property.properties.insert(name.clone(), nested);
                    }
                }
                if let Some(Value::Array(required)) = def.get("required") {
                    property.required = required
                        .iter()
                        .map(|r| {
                            r.as_str().map(str::to_string).ok_or_else(|| {
                                CoreError::Schema("required field names must be strings".into())
                            })
                        })
                        .collect::<Result<_>>()?;
                }
            }
            PropertyType::Array => {
                if let Some(items) = def.get("items") {
                    let items = Self::from_definition(items).map_err(|e| {
                        CoreError::Schema(format!("failed to build array items: {e}"))
                    })?;
                    property.items = Some(Box::new(items));
                }
            }
            _ => {}
        }

        if let Some(Value::Array(values)) = def.get("enum") {
            property.enum_values.clone_from(values);
        }
        property.default = def.get("default").cloned();

        Ok(property)
    }
}

/// Fluent builder for [`JsonSchema`]. Strict mode is on by default.
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    name: String,
    properties: BTreeMap<String, Property>,
    required: Vec<String>,
    strict: bool,
}

impl SchemaBuilder {
    /// Start a schema called `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: BTreeMap::new(),
            required: Vec::new(),
            strict: true,
        }
    }

    /// Add (or replace) a property.
    #[must_use]
    pub fn property(mut self, name: impl Into<String>, property: Property) -> Self {
        self.properties.insert(name.into(), property);
        self
    }

    /// Add a string property.
    #[must_use]
    pub fn string(self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.property(name, Property::new(PropertyType::String).with_description(description))
    }

    /// Add an integer property.
    #[must_use]
    pub fn integer(self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.property(name, Property::new(PropertyType::Integer).with_description(description))
    }

    /// Add a number property.
    #[must_use]
    pub fn number(self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.property(name, Property::new(PropertyType::Number).with_description(description))
    }

    /// Add a boolean property.
    #[must_use]
    pub fn boolean(self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.property(name, Property::new(PropertyType::Boolean).with_description(description))
    }

    /// Add an object property with nested properties.
    #[must_use]
    pub fn object(
        self,
        name: impl Into<String>,
        description: impl Into<String>,
        properties: BTreeMap<String, Property>,
        required: Vec<String>,
    ) -> Self {
        let mut prop = Property::new(PropertyType::Object).with_description(description);
        prop.properties = properties;
        prop.required = required;
        self.property(name, prop)
    }

    /// Add an array property.
    #[must_use]
    pub fn array(
        self,
        name: impl Into<String>,
        description: impl Into<String>,
        items: Property,
    ) -> Self {
        let mut prop = Property::new(PropertyType::Array).with_description(description);
        prop.items = Some(Box::new(items));
        self.property(name, prop)
    }

    /// Replace the required list.
    #[must_use]
    pub fn required(mut self, fields: Vec<String>) -> Self {
        self.required = fields;
        self
    }

    /// Append one required field.
    #[must_use]
    pub fn require(mut self, field: impl Into<String>) -> Self {
        self.required.push(field.into());
        self
    }

    /// Set strict mode.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Produce the schema.
    ///
    /// # Errors
    ///
    /// [`CoreError::Schema`] when the name is empty or no property was added.
    pub fn build(self) -> Result<JsonSchema> {
        if self.name.is_empty() {
            return Err(CoreError::Schema("schema name is required".into()));
        }
        if self.properties.is_empty() {
            return Err(CoreError::Schema("schema must have at least one property".into()));
        }

        let schema = json!({
            "type": "object",
            "properties": serde_json::to_value(&self.properties)?,
            "required": self.required,
            "additionalProperties": false,
        });

        Ok(JsonSchema {
            name: self.name,
            schema,
            strict: self.strict,
        })
    }
}

impl JsonSchema {
    /// Build a schema from a field → definition mapping.
    ///
    /// ```
    /// use llmgate_core::JsonSchema;
    /// use serde_json::json;
    ///
    /// let schema = JsonSchema::from_mapping("person", json!({
    ///     "name": "string",
    ///     "tags": {"type": "array", "items": "string"},
    /// }).as_object().unwrap()).unwrap();
    /// assert_eq!(schema.schema["properties"]["tags"]["items"]["type"], "string");
    /// ```
    ///
    /// # Errors
    ///
    /// [`CoreError::Schema`] for an empty name or mapping, or any
    /// definition that is not a supported type name or type object.
    pub fn from_mapping(name: impl Into<String>, mapping: &Map<String, Value>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(CoreError::Schema("schema name is required".into()));
        }
        if mapping.is_empty() {
            return Err(CoreError::Schema("mapping cannot be empty".into()));
        }

        let mut builder = SchemaBuilder::new(name);
        for (field, def) in mapping {
            let property = Property::from_definition(def)
                .map_err(|e| CoreError::Schema(format!("failed to build property {field}: {e}")))?;
            builder = builder.property(field.clone(), property);
        }
        builder.build()
    }
}
