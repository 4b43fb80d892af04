//! Gateway client: one method per gateway endpoint.
//!
//! Every call runs under its endpoint group's timeout and retry policy.
//! Local validation happens before the transport is touched, 4xx answers
//! surface as [`LlmError::Remote`] without retrying, and tool-call results
//! are reconciled into at most one fragment.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use llmgate_core::mcp::{AvailableTool, AvailableToolsResponse};
use llmgate_core::tool_response::reconcile;
use llmgate_core::{
    CompletionRequest, EmbeddingRequest, EmbeddingResponse, ErrorResponse, GatewayConfig, ModelId,
    ModelMeta, Models, Response, Speech, SpeechRequest, TargetName, TokenCounterRequest,
    TokenCounterResponse, ToolCallFunction, ToolResponse, Transcription,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{LlmError, Result};
use crate::retry::{RetryPolicy, with_retry};
use crate::transport::{
    FilePart, HttpRequest, HttpResponse, RequestBody, ReqwestTransport, Transport, USER_ID_HEADER,
};

/// `{"data": [...]}` wrapper used by the listing endpoints.
#[derive(serde::Deserialize)]
struct DataList<T> {
    #[serde(default)]
    data: Vec<T>,
}

#[derive(serde::Deserialize, Default)]
struct ModelInfoEntry {
    #[serde(default)]
    model_name: String,
    #[serde(default)]
    model_info: ModelInfoParams,
}

#[derive(serde::Deserialize, Default)]
struct ModelInfoParams {
    #[serde(default)]
    key: String,
}

/// Client for the gateway.
pub struct GatewayClient {
    transport: Arc<dyn Transport>,
    config: GatewayConfig,
    speech_dir: PathBuf,
}

impl GatewayClient {
    /// Create a client talking HTTP to `config.url`.
    ///
    /// # Errors
    /// Returns `LlmError::Config` if the URL is unusable.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config.url, config.api_key.clone())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client over a custom transport.
    #[must_use]
    pub fn with_transport(config: GatewayConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            config,
            speech_dir: std::env::temp_dir(),
        }
    }

    /// Write synthesized speech to `dir` instead of the system temp dir.
    #[must_use]
    pub fn with_speech_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.speech_dir = dir.into();
        self
    }

    /// The client's configuration.
    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // LLM endpoints
    // -----------------------------------------------------------------------

    /// Run a chat completion.
    ///
    /// Tool calls in the returned response are sorted by index.
    ///
    /// # Errors
    /// `Validation` for an empty model or message list (no request is
    /// sent), `Remote` for a 4xx answer, `Parse` for an unreadable body,
    /// `RetriesExhausted` when every attempt failed at the transport.
    pub async fn completion(&self, request: &CompletionRequest) -> Result<Response> {
        request.validate()?;

        let http = self.post(TargetName::Llm, "/chat/completions", json_body(request)?);
        let raw = self.execute("completion", http).await?;

        let mut response: Response = parse(&raw, "completion")?;
        response.sort_tool_calls();
        debug!(
            model = %request.model,
            choices = response.choices.len(),
            tool_calls = response.message().tool_calls.len(),
            "Completion received"
        );
        Ok(response)
    }

    /// Embed `input` with `model`.
    ///
    /// # Errors
    /// `Validation` for an empty model or input; otherwise as [`Self::completion`].
    pub async fn embeddings(&self, model: &ModelMeta, input: &str) -> Result<EmbeddingResponse> {
        require_model(&model.model_id)?;
        if input.is_empty() {
            return Err(LlmError::Validation("embedding input cannot be empty".into()));
        }

        let body = EmbeddingRequest {
            model: model.model_id.clone(),
            input: input.to_string(),
        };
        let http = self.post(TargetName::Llm, "/v1/embeddings", json_body(&body)?);
        let raw = self.execute("embeddings", http).await?;
        parse(&raw, "embeddings")
    }

    /// Count the tokens `request.messages` would use.
    ///
    /// # Errors
    /// `Validation` for an empty model; otherwise as [`Self::completion`].
    pub async fn token_counter(
        &self,
        request: &TokenCounterRequest,
    ) -> Result<TokenCounterResponse> {
        require_model(&request.model)?;

        let http = self.post(TargetName::Llm, "/utils/token_counter", json_body(request)?);
        let raw = self.execute("token_counter", http).await?;
        parse(&raw, "token counter")
    }

    /// Transcribe the audio file at `path`.
    ///
    /// # Errors
    /// `Validation` for an empty model, `Io` if the file cannot be read;
    /// otherwise as [`Self::completion`].
    pub async fn speech_to_text(&self, model: &ModelMeta, path: &Path) -> Result<Transcription> {
        require_model(&model.model_id)?;

        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "audio".to_string(), |n| n.to_string_lossy().into_owned());

        let body = RequestBody::Multipart {
            fields: vec![("model".to_string(), model.model_id.to_string())],
            files: vec![FilePart {
                field: "file".to_string(),
                file_name,
                bytes,
            }],
        };
        let http = self.post(TargetName::Llm, "/audio/transcriptions", body);
        let raw = self.execute("speech_to_text", http).await?;
        parse(&raw, "speech-to-text")
    }

    /// Synthesize speech and write it to `speech_<uuid>.<ext>` in the speech dir.
    ///
    /// # Errors
    /// `Validation` for an empty model or input, `Io` if the file cannot be
    /// written; otherwise as [`Self::completion`].
    pub async fn text_to_speech(&self, request: &SpeechRequest) -> Result<Speech> {
        require_model(&request.model)?;
        if request.input.is_empty() {
            return Err(LlmError::Validation("speech input cannot be empty".into()));
        }

        let http = self.post(TargetName::Llm, "/audio/speech", json_body(request)?);
        let raw = self.execute("text_to_speech", http).await?;

        let extension = request.extension();
        let name = format!("speech_{}.{extension}", Uuid::new_v4());
        let speech = Speech::new(&self.speech_dir, name, extension);

        if let Err(e) = tokio::fs::write(&speech.full, &raw.body).await {
            // A partially written file is useless to the caller.
            let _ = tokio::fs::remove_file(&speech.full).await;
            return Err(e.into());
        }

        info!(path = %speech.full.display(), bytes = raw.body.len(), "Wrote synthesized speech");
        Ok(speech)
    }

    // -----------------------------------------------------------------------
    // System endpoints
    // -----------------------------------------------------------------------

    /// List the models the gateway serves.
    ///
    /// # Errors
    /// As [`Self::completion`].
    pub async fn models(&self) -> Result<Models> {
        let http = self.get(TargetName::System, "/models");
        let raw = self.execute("models", http).await?;
        let list: DataList<_> = parse(&raw, "models")?;
        Ok(Models(list.data))
    }

    /// Metadata of one model group.
    ///
    /// # Errors
    /// `Validation` for an empty ID, `Unexpected` unless exactly one group
    /// matches; otherwise as [`Self::completion`].
    pub async fn model(&self, id: &ModelId) -> Result<ModelMeta> {
        require_model(id)?;

        let http = self
            .get(TargetName::System, "/model_group/info")
            .with_query("model_group", id.as_str());
        let raw = self.execute("model", http).await?;
        let list: DataList<ModelMeta> = parse(&raw, "model info")?;

        let found = list.data.len();
        let mut groups = list.data.into_iter();
        match (groups.next(), found) {
            (Some(meta), 1) => Ok(meta),
            _ => Err(LlmError::Unexpected(format!(
                "expected exactly one model group for {id:?}, found {found}"
            ))),
        }
    }

    /// Map of model name to the gateway's provider model key, e.g.
    /// `qwen3-235b` → `openrouter/qwen/qwen3-235b-a22b`.
    ///
    /// # Errors
    /// As [`Self::completion`].
    pub async fn model_info_map(&self) -> Result<BTreeMap<String, String>> {
        let http = self.get(TargetName::System, "/v2/model/info");
        let raw = self.execute("model_info_map", http).await?;
        let list: DataList<ModelInfoEntry> = parse(&raw, "model info map")?;

        Ok(list
            .data
            .into_iter()
            .map(|entry| (entry.model_name, entry.model_info.key))
            .collect())
    }

    // -----------------------------------------------------------------------
    // MCP endpoints
    // -----------------------------------------------------------------------

    /// Tools the gateway can execute.
    ///
    /// # Errors
    /// `Unexpected` if the listing carries an error; otherwise as
    /// [`Self::completion`].
    pub async fn tools(&self) -> Result<Vec<AvailableTool>> {
        let http = self.get(TargetName::Mcp, "/mcp-rest/tools/list");
        let raw = self.execute("tools", http).await?;
        let listing: AvailableToolsResponse = parse(&raw, "tools")?;

        if let Some(error) = listing.error.filter(|e| !e.is_empty()) {
            warn!(error = %error, message = %listing.message, "Tool listing reported an error");
            return Err(LlmError::Unexpected(format!("tool listing failed: {error}")));
        }
        Ok(listing.tools)
    }

    /// Execute a tool call; the result is reconciled to at most one fragment.
    ///
    /// # Errors
    /// `Validation` for an empty function name; otherwise as
    /// [`Self::completion`].
    pub async fn tool_call(&self, function: &ToolCallFunction) -> Result<Vec<ToolResponse>> {
        self.send_tool_call(function, None).await
    }

    /// [`Self::tool_call`] on behalf of `user_id`, sent as `X-User-ID`.
    ///
    /// # Errors
    /// As [`Self::tool_call`].
    pub async fn tool_call_as(
        &self,
        user_id: &str,
        function: &ToolCallFunction,
    ) -> Result<Vec<ToolResponse>> {
        self.send_tool_call(function, Some(user_id)).await
    }

    async fn send_tool_call(
        &self,
        function: &ToolCallFunction,
        user_id: Option<&str>,
    ) -> Result<Vec<ToolResponse>> {
        if function.name.is_empty() {
            return Err(LlmError::Validation("tool name cannot be empty".into()));
        }

        let body = function
            .encode()
            .map_err(|e| LlmError::Validation(format!("failed to encode tool call: {e}")))?;
        let mut http = self.post(TargetName::Mcp, "/mcp-rest/tools/call", RequestBody::Json(body));
        if let Some(user_id) = user_id {
            http = http.with_header(USER_ID_HEADER, user_id);
        }

        let raw = self.execute("tool_call", http).await?;
        let fragments: Vec<ToolResponse> = parse(&raw, "tool call")?;
        debug!(tool = %function.name, fragments = fragments.len(), "Tool call returned");
        Ok(reconcile(fragments))
    }

    // -----------------------------------------------------------------------
    // Plumbing
    // -----------------------------------------------------------------------

    fn get(&self, target: TargetName, path: &str) -> HttpRequest {
        HttpRequest::get(target, path, self.config.target(target).timeout())
    }

    fn post(&self, target: TargetName, path: &str, body: RequestBody) -> HttpRequest {
        HttpRequest::post(target, path, self.config.target(target).timeout(), body)
    }

    async fn execute(&self, operation: &str, request: HttpRequest) -> Result<HttpResponse> {
        let policy = RetryPolicy::from(self.config.target(request.target));
        let transport = &self.transport;
        let request = &request;

        with_retry(&policy, operation, || async move {
            let response = transport.send(request.clone()).await?;
            check_status(response)
        })
        .await
    }
}

fn require_model(id: &ModelId) -> Result<()> {
    if id.is_empty() {
        return Err(LlmError::Validation("model identifier cannot be empty".into()));
    }
    Ok(())
}

fn json_body<T: Serialize>(value: &T) -> Result<RequestBody> {
    serde_json::to_vec(value)
        .map(RequestBody::Json)
        .map_err(|e| LlmError::Validation(format!("failed to encode request: {e}")))
}

fn parse<T: DeserializeOwned>(response: &HttpResponse, what: &str) -> Result<T> {
    serde_json::from_slice(&response.body).map_err(|e| LlmError::Parse(format!("{what}: {e}")))
}

/// Map non-2xx statuses to errors: 4xx to `Remote`, anything else to `Http`.
fn check_status(response: HttpResponse) -> Result<HttpResponse> {
    if response.is_success() {
        return Ok(response);
    }

    if (400..500).contains(&response.status) {
        let message = serde_json::from_slice::<ErrorResponse>(&response.body)
            .ok()
            .map(|e| e.error.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| response.text());
        return Err(LlmError::Remote {
            status: response.status,
            message,
        });
    }

    Err(LlmError::Http {
        status: response.status,
        body: response.text(),
    })
}
