//! # llmgate core
//!
//! Wire types for talking to an OpenAI-compatible LLM gateway that also
//! fronts MCP tool servers.
//!
//! The centrepiece is the tool-call contract:
//!
//! - [`TypedValue`] and [`Arguments`]: dynamically-typed tool arguments with
//!   native and string-coerced accessors. Whole numbers always surface as
//!   integers, whatever their JSON spelling.
//! - [`ToolCallFunction`]: the `{"name", "arguments": "<json text>"}`
//!   envelope, decoded and encoded in two passes.
//! - [`reconcile`]: folds fragmented tool results into one message per call.
//!
//! Around it sit the request and response bodies ([`CompletionRequest`],
//! [`Response`], ...), a JSON-schema builder for structured output, and
//! [`GatewayConfig`] with its explicit [`ConfigValidator`].
//!
//! Nothing here performs I/O beyond reading a config file; the HTTP client
//! lives in `llmgate-client`.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod arguments;
pub mod audio;
pub mod config;
pub mod error;
pub mod mcp;
pub mod models;
pub mod request;
pub mod response;
pub mod schema;
mod serde_util;
pub mod tool_call;
pub mod tool_response;
pub mod value;

pub use arguments::Arguments;
pub use audio::{Speech, Transcription};
pub use config::{ConfigLoader, ConfigValidator, GatewayConfig, Target, TargetName, Targets};
pub use error::{CoreError, DecodeError};
pub use mcp::{AvailableTool, AvailableToolsResponse};
pub use models::{Model, ModelId, ModelMeta, Models};
pub use request::{
    CallTool, CompletionRequest, EmbeddingRequest, ImageUrl, Message, MessageContent, Messages,
    Role, SpeechRequest, TokenCounterRequest,
};
pub use response::{
    EmbeddingResponse, ErrorResponse, FinishReason, Response, ResponseChoice, ResponseMessage,
    TokenCounterResponse, Usage,
};
pub use schema::{JsonSchema, SchemaBuilder};
pub use tool_call::{ToolCall, ToolCallFunction};
pub use tool_response::{ToolResponse, reconcile};
pub use value::TypedValue;
