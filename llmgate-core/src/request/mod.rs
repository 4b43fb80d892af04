//! Request bodies for the gateway endpoints.

pub mod messages;
pub mod tools;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::models::{ModelId, ModelMeta};
use crate::schema::JsonSchema;

pub use messages::{ImageUrl, Message, MessageContent, Messages, Role};
pub use tools::{CallTool, CallToolFunction, CallToolParameters, CallToolProperty};

/// Name of the temperature parameter in `supported_openai_params`.
pub const TEMPERATURE_PARAM: &str = "temperature";

/// Default speech file extension.
pub const DEFAULT_SPEECH_FORMAT: &str = "mp3";

// ---------------------------------------------------------------------------
// Chat completion
// ---------------------------------------------------------------------------

/// Requested output format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseFormat {
    /// `"json_schema"` or `"json_object"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Schema for `"json_schema"` mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_schema: Option<JsonSchema>,
}

impl ResponseFormat {
    /// Structured output following `schema`.
    #[must_use]
    pub fn json_schema(schema: JsonSchema) -> Self {
        Self {
            kind: "json_schema".to_string(),
            json_schema: Some(schema),
        }
    }

    /// Free-form JSON object output.
    #[must_use]
    pub fn json_object() -> Self {
        Self {
            kind: "json_object".to_string(),
            json_schema: None,
        }
    }
}

/// Body of `POST /chat/completions`.
///
/// Built fluently:
///
/// ```
/// use llmgate_core::{CompletionRequest, Message, Messages};
///
/// let req = CompletionRequest::new("claude-4")
///     .with_messages(Messages::from(vec![Message::user_text("Hello!")]))
///     .with_temperature(0.2, &["temperature".to_string()]);
/// assert!(req.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Target model.
    pub model: ModelId,
    /// Conversation history.
    pub messages: Messages,
    /// Streaming is not supported; always `false`.
    #[serde(default)]
    pub stream: bool,
    /// Sampling temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Tools the model may call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<CallTool>>,
    /// Tool selection policy, e.g. `"auto"`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tool_choice: String,
    /// Output format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

impl CompletionRequest {
    /// An empty request for `model`.
    #[must_use]
    pub fn new(model: impl Into<ModelId>) -> Self {
        Self {
            model: model.into(),
            messages: Messages::new(),
            stream: false,
            temperature: None,
            tools: None,
            tool_choice: String::new(),
            response_format: None,
        }
    }

    /// A request for `meta`'s model with history, tools and a temperature.
    ///
    /// `temperature` falls back to `default_temperature`; either is dropped
    /// when the model does not list `temperature` as supported.
    #[must_use]
    pub fn new_completion(
        meta: &ModelMeta,
        messages: Messages,
        tools: Vec<CallTool>,
        temperature: Option<f32>,
        default_temperature: f32,
    ) -> Self {
        let mut req = Self::new(meta.model_id.clone()).with_messages(messages);
        if !tools.is_empty() {
            req = req.with_tools(tools);
        }
        req.with_temperature(
            temperature.unwrap_or(default_temperature),
            &meta.supported_openai_params,
        )
    }

    /// Set the history, dropping empty messages first.
    #[must_use]
    pub fn with_messages(mut self, mut messages: Messages) -> Self {
        messages.remove_empty();
        self.messages = messages;
        self
    }

    /// Set the temperature if `temperature >= 0` and the model supports it.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32, supported_params: &[String]) -> Self {
        if temperature >= 0.0 && supported_params.iter().any(|p| p == TEMPERATURE_PARAM) {
            self.temperature = Some(temperature);
        }
        self
    }

    /// Offer tools to the model.
    #[must_use]
    pub fn with_tools(mut self, tools: Vec<CallTool>) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Set the tool selection policy.
    #[must_use]
    pub fn with_tool_choice(mut self, choice: impl Into<String>) -> Self {
        self.tool_choice = choice.into();
        self
    }

    /// Request structured output following `schema`.
    #[must_use]
    pub fn with_json_schema(mut self, schema: JsonSchema) -> Self {
        self.response_format = Some(ResponseFormat::json_schema(schema));
        self
    }

    /// Request a JSON object response.
    #[must_use]
    pub fn with_json_mode(mut self) -> Self {
        self.response_format = Some(ResponseFormat::json_object());
        self
    }

    /// Check the request can be sent.
    ///
    /// # Errors
    ///
    /// [`CoreError::Validation`] when the model identifier or the message
    /// list is empty.
    pub fn validate(&self) -> Result<()> {
        if self.model.is_empty() {
            return Err(CoreError::Validation("model identifier cannot be empty".into()));
        }
        if self.messages.is_empty() {
            return Err(CoreError::Validation("messages cannot be empty".into()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Utility endpoints
// ---------------------------------------------------------------------------

/// Body of `POST /utils/token_counter`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenCounterRequest {
    /// Model whose tokenizer to use.
    pub model: ModelId,
    /// Messages to count.
    #[serde(default, skip_serializing_if = "Messages::is_empty")]
    pub messages: Messages,
}

impl TokenCounterRequest {
    /// Count `messages` with `model`'s tokenizer.
    #[must_use]
    pub fn new(model: impl Into<ModelId>, messages: Messages) -> Self {
        Self {
            model: model.into(),
            messages,
        }
    }
}

/// Body of `POST /v1/embeddings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    /// Embedding model.
    pub model: ModelId,
    /// Text to embed.
    pub input: String,
}

/// Body of `POST /audio/speech`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechRequest {
    /// Speech model.
    pub model: ModelId,
    /// Text to speak.
    pub input: String,
    /// Voice name.
    pub voice: String,
    /// Delivery instructions.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub instructions: String,
    /// Audio format, also used as the file extension.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub response_format: String,
    /// Playback speed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    /// Stream format (`"audio"` or `"sse"`).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub stream_format: String,
}

impl SpeechRequest {
    /// Speak `input` with `voice`.
    #[must_use]
    pub fn new(
        model: impl Into<ModelId>,
        input: impl Into<String>,
        voice: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            input: input.into(),
            voice: voice.into(),
            instructions: String::new(),
            response_format: String::new(),
            speed: None,
            stream_format: String::new(),
        }
    }

    /// File extension for the returned audio, `mp3` unless a format was set.
    #[must_use]
    pub fn extension(&self) -> &str {
        if self.response_format.is_empty() {
            DEFAULT_SPEECH_FORMAT
        } else {
            &self.response_format
        }
    }
}
