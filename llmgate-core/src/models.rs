//! Model identifiers and gateway model metadata.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::serde_util::null_as_default;

/// Gateway model (or model group) identifier, e.g. `"claude-4"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(pub String);

impl ModelId {
    /// Create a model ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModelId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ModelId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// An entry from `GET /models`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    /// Model ID.
    pub id: ModelId,
    /// Object kind, `"model"`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub object: String,
    /// Owning organisation.
    #[serde(default, deserialize_with = "null_as_default")]
    pub owned_by: String,
}

/// The list returned by `GET /models`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Models(pub Vec<Model>);

impl Models {
    /// Find a model by ID.
    #[must_use]
    pub fn get(&self, id: &ModelId) -> Option<&Model> {
        self.0.iter().find(|m| &m.id == id)
    }

    /// Number of models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate the models.
    pub fn iter(&self) -> impl Iterator<Item = &Model> {
        self.0.iter()
    }
}

/// Capabilities and limits of a model group (`GET /model_group/info`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelMeta {
    /// Model group ID.
    #[serde(rename = "model_group")]
    pub model_id: ModelId,
    /// Maximum input tokens.
    #[serde(deserialize_with = "null_as_default")]
    pub max_input_tokens: f64,
    /// Maximum output tokens.
    #[serde(deserialize_with = "null_as_default")]
    pub max_output_tokens: f64,
    /// Input cost per token.
    #[serde(deserialize_with = "null_as_default")]
    pub input_cost_per_token: f64,
    /// Output cost per token.
    #[serde(deserialize_with = "null_as_default")]
    pub output_cost_per_token: f64,
    /// Upstream providers serving the group.
    #[serde(deserialize_with = "null_as_default")]
    pub providers: Vec<String>,
    /// Mode, e.g. `"chat"` or `"embedding"`.
    #[serde(deserialize_with = "null_as_default")]
    pub mode: String,
    /// Requests per minute limit.
    #[serde(deserialize_with = "null_as_default")]
    pub rpm: u64,
    /// Tokens per minute limit.
    #[serde(deserialize_with = "null_as_default")]
    pub tpm: u64,
    /// Accepts image input.
    #[serde(deserialize_with = "null_as_default")]
    pub supports_vision: bool,
    /// Can search the web.
    #[serde(deserialize_with = "null_as_default")]
    pub supports_web_search: bool,
    /// Emits reasoning tokens.
    #[serde(deserialize_with = "null_as_default")]
    pub supports_reasoning: bool,
    /// Supports tool calling.
    #[serde(deserialize_with = "null_as_default")]
    pub supports_function_calling: bool,
    /// Can issue several tool calls per turn.
    #[serde(deserialize_with = "null_as_default")]
    pub supports_parallel_function_calling: bool,
    /// OpenAI request parameters the group accepts.
    #[serde(deserialize_with = "null_as_default")]
    pub supported_openai_params: Vec<String>,
}

impl ModelMeta {
    /// Metadata carrying only an ID, for callers that skip discovery.
    #[must_use]
    pub fn with_id(id: impl Into<ModelId>) -> Self {
        Self {
            model_id: id.into(),
            ..Self::default()
        }
    }

    /// Whether `param` is in `supported_openai_params`.
    #[must_use]
    pub fn supports_param(&self, param: &str) -> bool {
        self.supported_openai_params.iter().any(|p| p == param)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn models_lookup() {
        let models: Models = serde_json::from_str(
            r#"[{"id": "claude-4", "object": "model", "owned_by": "openai"},
                {"id": "mistral-embed", "object": "model", "owned_by": null}]"#,
        )
        .unwrap();
        assert_eq!(models.len(), 2);
        assert!(models.get(&ModelId::from("mistral-embed")).is_some());
        assert!(models.get(&ModelId::from("gpt-9")).is_none());
    }

    #[test]
    fn model_meta_tolerates_nulls() {
        let meta: ModelMeta = serde_json::from_str(
            r#"{"model_group": "claude-4", "max_input_tokens": 200000, "rpm": null,
                "providers": ["anthropic"], "supported_openai_params": ["temperature", "tools"]}"#,
        )
        .unwrap();
        assert_eq!(meta.model_id.as_str(), "claude-4");
        assert_eq!(meta.rpm, 0);
        assert!(meta.supports_param("temperature"));
        assert!(!meta.supports_param("top_k"));
    }
}
