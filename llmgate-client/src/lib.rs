//! # llmgate client
//!
//! Async client for an OpenAI-compatible LLM gateway that also executes
//! MCP tools.
//!
//! Endpoints are grouped into *targets* (system, llm, mcp), each with its
//! own timeout and exponential-backoff retry policy from
//! [`GatewayConfig`](llmgate_core::GatewayConfig). Only connection
//! failures, timeouts and 5xx answers are retried.
//!
//! ```no_run
//! use llmgate_client::GatewayClient;
//! use llmgate_core::{CompletionRequest, ConfigLoader, Message, Messages};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new().load_file("llmgate.toml".as_ref())?;
//! let client = GatewayClient::new(config)?;
//!
//! let request = CompletionRequest::new("claude-4")
//!     .with_messages(Messages::from(vec![Message::user_text("Hello!")]));
//! let response = client.completion(&request).await?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod error;
pub mod mock;
pub mod retry;
pub mod transport;

pub use client::GatewayClient;
pub use error::LlmError;
pub use retry::RetryPolicy;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
