//! Response bodies returned by the gateway.
//!
//! Providers behind the gateway disagree on which fields they fill in, and
//! many send explicit `null`s. Every field here decodes `null` or absence
//! to its default.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ModelId;
use crate::serde_util::{null_as_default, string_or_number};
use crate::tool_call::{ToolCall, sort_by_index};

// ---------------------------------------------------------------------------
// Chat completion
// ---------------------------------------------------------------------------

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural end of the message.
    Stop,
    /// The model is waiting for tool results.
    ToolCalls,
    /// Output token limit reached.
    Length,
    /// Output withheld by a content filter.
    ContentFilter,
    /// Any reason this client does not know about.
    #[serde(other)]
    Other,
}

/// Assistant message inside a choice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMessage {
    /// Text content.
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    /// Author role as sent by the provider.
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    /// Requested tool calls.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

impl ResponseMessage {
    /// Whether the message carries neither text nor tool calls.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() && self.tool_calls.is_empty()
    }
}

/// One completion alternative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseChoice {
    /// Position among the choices.
    #[serde(default, deserialize_with = "null_as_default")]
    pub index: u32,
    /// Stop reason; absent on some providers.
    #[serde(default)]
    pub finish_reason: Option<FinishReason>,
    /// Generated message.
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: ResponseMessage,
}

static EMPTY_CHOICE: ResponseChoice = ResponseChoice {
    index: 0,
    finish_reason: None,
    message: ResponseMessage {
        content: String::new(),
        role: String::new(),
        tool_calls: Vec::new(),
    },
};

/// Completion token breakdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionTokensDetails {
    /// Audio output tokens.
    #[serde(deserialize_with = "null_as_default")]
    pub audio_tokens: u64,
    /// Predicted tokens that were accepted.
    #[serde(deserialize_with = "null_as_default")]
    pub accepted_prediction_tokens: u64,
    /// Predicted tokens that were rejected.
    #[serde(deserialize_with = "null_as_default")]
    pub rejected_prediction_tokens: u64,
    /// Reasoning tokens.
    #[serde(deserialize_with = "null_as_default")]
    pub reasoning_tokens: u64,
}

/// Prompt token breakdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptTokensDetails {
    /// Audio input tokens.
    #[serde(deserialize_with = "null_as_default")]
    pub audio_tokens: u64,
    /// Tokens served from the prompt cache.
    #[serde(deserialize_with = "null_as_default")]
    pub cached_tokens: u64,
}

/// Token accounting and timings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Usage {
    /// Generated tokens.
    #[serde(deserialize_with = "null_as_default")]
    pub completion_tokens: u64,
    /// Prompt tokens.
    #[serde(deserialize_with = "null_as_default")]
    pub prompt_tokens: u64,
    /// Sum of both.
    #[serde(deserialize_with = "null_as_default")]
    pub total_tokens: u64,
    /// Completion breakdown.
    #[serde(deserialize_with = "null_as_default")]
    pub completion_tokens_details: CompletionTokensDetails,
    /// Prompt breakdown.
    #[serde(deserialize_with = "null_as_default")]
    pub prompt_tokens_details: PromptTokensDetails,
    /// Seconds spent queued.
    #[serde(deserialize_with = "null_as_default")]
    pub queue_time: f64,
    /// Seconds spent on the prompt.
    #[serde(deserialize_with = "null_as_default")]
    pub prompt_time: f64,
    /// Seconds spent generating.
    #[serde(deserialize_with = "null_as_default")]
    pub completion_time: f64,
    /// Total seconds.
    #[serde(deserialize_with = "null_as_default")]
    pub total_time: f64,
}

/// Body of a successful `POST /chat/completions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Response {
    /// Completion ID.
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    /// Unix timestamp (seconds).
    #[serde(deserialize_with = "null_as_default")]
    pub created: i64,
    /// Model that served the request.
    #[serde(deserialize_with = "null_as_default")]
    pub model: ModelId,
    /// Object kind, `"chat.completion"`.
    #[serde(deserialize_with = "null_as_default")]
    pub object: String,
    /// Backend fingerprint.
    #[serde(deserialize_with = "null_as_default")]
    pub system_fingerprint: String,
    /// Alternatives, in the order received.
    #[serde(deserialize_with = "null_as_default")]
    pub choices: Vec<ResponseChoice>,
    /// Token accounting.
    #[serde(deserialize_with = "null_as_default")]
    pub usage: Usage,
}

impl Response {
    /// The *last* choice, or an empty one when there are none.
    ///
    /// The gateway only ever returns one choice; when several arrive the
    /// final one is the most recent.
    #[must_use]
    pub fn choice(&self) -> &ResponseChoice {
        self.choices.last().unwrap_or(&EMPTY_CHOICE)
    }

    /// Message of [`Self::choice`].
    #[must_use]
    pub fn message(&self) -> &ResponseMessage {
        &self.choice().message
    }

    /// Text content of [`Self::choice`].
    #[must_use]
    pub fn text(&self) -> &str {
        &self.message().content
    }

    /// Replace the text of the last choice.
    ///
    /// With no choices, a `stop`/`assistant` choice is created.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        match self.choices.last_mut() {
            Some(choice) => choice.message.content = text,
            None => self.choices.push(ResponseChoice {
                index: 0,
                finish_reason: Some(FinishReason::Stop),
                message: ResponseMessage {
                    content: text,
                    role: "assistant".to_string(),
                    tool_calls: Vec::new(),
                },
            }),
        }
    }

    /// Sort every choice's tool calls by index.
    pub fn sort_tool_calls(&mut self) {
        for choice in &mut self.choices {
            sort_by_index(&mut choice.message.tool_calls);
        }
    }

    /// `created` as a UTC timestamp.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created, 0)
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error payload of a failed request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorDetail {
    /// Human-readable message.
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
    /// Error class.
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    /// Provider error code; sent as a string or a number.
    #[serde(deserialize_with = "string_or_number")]
    pub code: String,
    /// Offending parameter.
    #[serde(deserialize_with = "null_as_default")]
    pub param: String,
}

/// Body of a failed request: `{"error": {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error details.
    #[serde(default)]
    pub error: ErrorDetail,
}

// ---------------------------------------------------------------------------
// Token counting and embeddings
// ---------------------------------------------------------------------------

/// Body returned by `POST /utils/token_counter`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenCounterResponse {
    /// Token count.
    #[serde(deserialize_with = "null_as_default")]
    pub total_tokens: f64,
    /// Model whose tokenizer counted.
    #[serde(deserialize_with = "null_as_default")]
    pub model_used: String,
    /// Model named in the request.
    #[serde(deserialize_with = "null_as_default")]
    pub request_model: String,
    /// Tokenizer family.
    #[serde(deserialize_with = "null_as_default")]
    pub tokenizer_type: String,
}

/// An embedding vector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding(pub Vec<f64>);

impl Embedding {
    /// Narrow to `f32`, the precision most vector stores use.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_f32(&self) -> Vec<f32> {
        self.0.iter().map(|&v| v as f32).collect()
    }

    /// Number of dimensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the vector is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One embedding in an [`EmbeddingResponse`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingData {
    /// Object kind, `"embedding"`.
    #[serde(deserialize_with = "null_as_default")]
    pub object: String,
    /// The vector.
    #[serde(deserialize_with = "null_as_default")]
    pub embedding: Embedding,
    /// Position of the input.
    #[serde(deserialize_with = "null_as_default")]
    pub index: u32,
}

/// Token usage of an embedding call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingUsage {
    /// Input tokens.
    #[serde(deserialize_with = "null_as_default")]
    pub prompt_tokens: u64,
    /// Total tokens.
    #[serde(deserialize_with = "null_as_default")]
    pub total_tokens: u64,
}

/// Body returned by `POST /v1/embeddings`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingResponse {
    /// Object kind, `"list"`.
    #[serde(deserialize_with = "null_as_default")]
    pub object: String,
    /// Embeddings in input order.
    #[serde(deserialize_with = "null_as_default")]
    pub data: Vec<EmbeddingData>,
    /// Model used.
    #[serde(deserialize_with = "null_as_default")]
    pub model: String,
    /// Token usage.
    #[serde(deserialize_with = "null_as_default")]
    pub usage: EmbeddingUsage,
}

impl EmbeddingResponse {
    /// The first embedding, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Embedding> {
        self.data.first().map(|d| &d.embedding)
    }
}
