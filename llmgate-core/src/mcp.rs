//! MCP tools exposed through the gateway (`GET /mcp-rest/tools/list`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::serde_util::null_as_default;

/// Response body of the tool listing endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailableToolsResponse {
    /// Tools the gateway can execute.
    #[serde(deserialize_with = "null_as_default")]
    pub tools: Vec<AvailableTool>,
    /// Error reported by the gateway, if any.
    pub error: Option<String>,
    /// Free-form status message.
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
}

/// One executable tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailableTool {
    /// Tool type; empty means `"function"`.
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,
    /// Web-search context size (`"low"`, `"medium"`, `"high"`).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub search_context_size: String,
    /// Tool name.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// What the tool does.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// JSON schema of the tool's input.
    #[serde(rename = "inputSchema")]
    pub input_schema: InputSchema,
    /// Which MCP server hosts the tool.
    pub mcp_info: McpInfo,
}

/// Input schema of an [`AvailableTool`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSchema {
    /// Property name → description and type.
    #[serde(deserialize_with = "null_as_default")]
    pub properties: BTreeMap<String, InputProperty>,
    /// Required property names.
    #[serde(deserialize_with = "null_as_default")]
    pub required: Vec<String>,
    /// Schema type, `"object"`.
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
}

/// A single input property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputProperty {
    /// Property description.
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    /// JSON type name.
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
}

/// MCP server info.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct McpInfo {
    /// Server name.
    #[serde(deserialize_with = "null_as_default")]
    pub server_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_tool_listing() {
        let resp: AvailableToolsResponse = serde_json::from_str(
            r#"{
                "tools": [{
                    "name": "current_time",
                    "description": "Current time in a timezone",
                    "inputSchema": {
                        "type": "object",
                        "properties": {"timezone": {"type": "string", "description": "IANA zone"}},
                        "required": ["timezone"]
                    },
                    "mcp_info": {"server_name": "time"}
                }],
                "error": null,
                "message": "ok"
            }"#,
        )
        .unwrap();

        assert_eq!(resp.tools.len(), 1);
        let tool = &resp.tools[0];
        assert_eq!(tool.name, "current_time");
        assert!(tool.kind.is_empty());
        assert_eq!(tool.input_schema.required, vec!["timezone"]);
        assert_eq!(tool.input_schema.properties["timezone"].kind, "string");
        assert_eq!(tool.mcp_info.server_name, "time");
        assert!(resp.error.is_none());
    }
}
