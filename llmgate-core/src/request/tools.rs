//! Tool definitions advertised to the model in a completion request.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::mcp::AvailableTool;
use crate::tool_call::FUNCTION_TOOL_TYPE;

/// Parameter block type for function tools.
pub const OBJECT_PARAMETERS_TYPE: &str = "object";

/// A tool the model may call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallTool {
    /// Tool type, `"function"` for MCP tools.
    #[serde(rename = "type")]
    pub kind: String,
    /// Function definition; absent for built-in tools such as web search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<CallToolFunction>,
}

/// Function part of a [`CallTool`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallToolFunction {
    /// Function name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// What the function does.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Input parameters; omitted for parameterless functions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<CallToolParameters>,
}

/// Parameter schema of a [`CallToolFunction`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallToolParameters {
    /// Always `"object"`.
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    /// Parameter name → definition.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, CallToolProperty>,
    /// Required parameter names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

/// One function parameter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallToolProperty {
    /// Parameter description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// JSON type name.
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    /// Allowed values.
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    /// Format hint, e.g. `"date-time"`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub format: String,
    /// Example value.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub example: String,
}

impl CallToolProperty {
    /// A property of the given JSON type.
    #[must_use]
    pub fn new(kind: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            description: description.into(),
            ..Self::default()
        }
    }
}

impl CallTool {
    /// A function tool.
    #[must_use]
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Option<CallToolParameters>,
    ) -> Self {
        Self {
            kind: FUNCTION_TOOL_TYPE.to_string(),
            function: Some(CallToolFunction {
                name: name.into(),
                description: description.into(),
                parameters,
            }),
        }
    }

    /// Convert the gateway's tool listing into request tool definitions.
    ///
    /// A missing tool type becomes `"function"`. Tools without input
    /// properties are sent without a parameter block.
    #[must_use]
    pub fn from_available(tools: &[AvailableTool]) -> Vec<Self> {
        tools.iter().map(Self::from_available_tool).collect()
    }

    fn from_available_tool(tool: &AvailableTool) -> Self {
        let kind = if tool.kind.is_empty() {
            FUNCTION_TOOL_TYPE.to_string()
        } else {
            tool.kind.clone()
        };

        let schema = &tool.input_schema;
        let parameters = (!schema.properties.is_empty()).then(|| CallToolParameters {
            kind: OBJECT_PARAMETERS_TYPE.to_string(),
            properties: schema
                .properties
                .iter()
                .map(|(name, prop)| {
                    (
                        name.clone(),
                        CallToolProperty::new(prop.kind.clone(), prop.description.clone()),
                    )
                })
                .collect(),
            required: schema.required.clone(),
        });

        Self {
            kind,
            function: Some(CallToolFunction {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters,
            }),
        }
    }
}
