//! Tool calls and the string-encoded arguments envelope.
//!
//! On the wire a tool call's `arguments` is a JSON *string* holding JSON
//! text, never a nested object:
//!
//! ```text
//! {"name": "click", "arguments": "{\"uid\":\"1_146\",\"dblClick\":true}"}
//! ```
//!
//! Decoding therefore parses twice (envelope, then the embedded text) and
//! encoding serializes twice. [`ToolCallFunction`] only exposes the decoded
//! [`Arguments`]; its `Serialize` impl always writes them back as a string,
//! so a nested-object `arguments` field cannot be produced.

use serde::de::Error as _;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::arguments::Arguments;
use crate::error::DecodeError;

/// The `type` value of every function tool call.
pub const FUNCTION_TOOL_TYPE: &str = "function";

/// A named function invocation with decoded arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolCallFunction {
    /// Function name.
    pub name: String,
    /// Decoded arguments.
    pub arguments: Arguments,
}

/// Envelope as it appears on the wire, before the second parse pass.
#[derive(Deserialize)]
struct WireFunction {
    #[serde(default)]
    name: String,
    #[serde(default)]
    arguments: Option<String>,
}

impl WireFunction {
    fn into_function(self) -> Result<ToolCallFunction, DecodeError> {
        let arguments = match self.arguments.as_deref() {
            None | Some("") => Arguments::new(),
            Some(text) => Arguments::from_json_str(text)?,
        };
        Ok(ToolCallFunction {
            name: self.name,
            arguments,
        })
    }
}

impl ToolCallFunction {
    /// Create a tool call for `name` with the given arguments.
    #[must_use]
    pub fn new(name: impl Into<String>, arguments: Arguments) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// Decode an envelope from raw bytes.
    ///
    /// An empty or absent `arguments` string yields an empty map.
    ///
    /// # Errors
    /// [`DecodeError::Envelope`] if the outer object is malformed (including
    /// an `arguments` field that is not a string); [`DecodeError::Arguments`]
    /// or [`DecodeError::NotAnObject`] if the embedded text is.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let wire: WireFunction =
            serde_json::from_slice(bytes).map_err(|e| DecodeError::Envelope(e.to_string()))?;
        wire.into_function()
    }

    /// Encode to wire bytes: `{"name": ..., "arguments": "<json text>"}`.
    ///
    /// # Errors
    /// Only if the underlying JSON writer fails.
    pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

impl Serialize for ToolCallFunction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("ToolCallFunction", 2)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("arguments", &self.arguments.encode())?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for ToolCallFunction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        WireFunction::deserialize(deserializer)?
            .into_function()
            .map_err(D::Error::custom)
    }
}

/// A model-issued tool call inside a chat completion choice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call ID; tool results are threaded back under this ID.
    #[serde(default)]
    pub id: String,
    /// Call type, `"function"` in practice.
    #[serde(rename = "type", default = "default_tool_type")]
    pub kind: String,
    /// Position of this call among its siblings.
    #[serde(default)]
    pub index: u32,
    /// The function invocation.
    pub function: ToolCallFunction,
}

fn default_tool_type() -> String {
    FUNCTION_TOOL_TYPE.to_string()
}

impl ToolCall {
    /// Create a function tool call.
    #[must_use]
    pub fn new(id: impl Into<String>, index: u32, function: ToolCallFunction) -> Self {
        Self {
            id: id.into(),
            kind: FUNCTION_TOOL_TYPE.to_string(),
            index,
            function,
        }
    }
}

/// Sort tool calls ascending by `index`.
///
/// The gateway does not guarantee index order. The sort is stable, so calls
/// sharing an index keep their received order.
pub fn sort_by_index(calls: &mut [ToolCall]) {
    calls.sort_by_key(|call| call.index);
}
