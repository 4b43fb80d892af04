//! Client tests driven by the scripted in-memory transport.

use std::sync::Arc;

use llmgate_client::mock::MockTransport;
use llmgate_client::transport::{Method, RequestBody};
use llmgate_client::{GatewayClient, LlmError};
use llmgate_core::{
    Arguments, CompletionRequest, GatewayConfig, Message, Messages, ModelId, ModelMeta,
    SpeechRequest, TargetName, TokenCounterRequest, ToolCallFunction,
};

fn config() -> GatewayConfig {
    let mut config = GatewayConfig {
        api_key: "sk-test".into(),
        ..GatewayConfig::default()
    };
    for target in [&mut config.targets.system, &mut config.targets.llm, &mut config.targets.mcp] {
        target.retry_interval_ms = 1;
        target.retry_max_attempts = 3;
    }
    config
}

fn client(mock: &Arc<MockTransport>) -> GatewayClient {
    GatewayClient::with_transport(config(), mock.clone())
}

fn hello() -> CompletionRequest {
    CompletionRequest::new("claude-4")
        .with_messages(Messages::from(vec![Message::user_text("Hello!")]))
}

fn json_of(body: &RequestBody) -> serde_json::Value {
    match body {
        RequestBody::Json(bytes) => serde_json::from_slice(bytes).unwrap(),
        other => panic!("expected a JSON body, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_model_rejected_without_network() {
    let mock = Arc::new(MockTransport::new().with_json(200, "{}"));
    let request =
        CompletionRequest::new("").with_messages(Messages::from(vec![Message::user_text("hi")]));

    let err = client(&mock).completion(&request).await.unwrap_err();
    assert!(matches!(err, LlmError::Validation(_)));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn empty_messages_rejected_without_network() {
    let mock = Arc::new(MockTransport::new().with_json(200, "{}"));

    let err = client(&mock).completion(&CompletionRequest::new("claude-4")).await.unwrap_err();
    assert!(matches!(err, LlmError::Validation(_)));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn client_error_surfaces_remote_message_once() {
    let mock = Arc::new(MockTransport::new().with_json(400, r#"{"error": {"message": "X"}}"#));

    let err = client(&mock).completion(&hello()).await.unwrap_err();
    assert!(matches!(err, LlmError::Remote { status: 400, .. }));
    assert!(err.to_string().contains('X'));
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn completion_posts_to_llm_group() {
    let mock = Arc::new(MockTransport::new().with_json(
        200,
        r#"{"choices": [{"index": 0, "finish_reason": "stop",
            "message": {"role": "assistant", "content": "Hi"}}]}"#,
    ));

    let response = client(&mock).completion(&hello()).await.unwrap();
    assert_eq!(response.text(), "Hi");

    let sent = mock.last_request().unwrap();
    assert_eq!(sent.method, Method::Post);
    assert_eq!(sent.path, "/chat/completions");
    assert_eq!(sent.target, TargetName::Llm);
    assert_eq!(sent.timeout, config().targets.llm.timeout());
    let body = json_of(&sent.body);
    assert_eq!(body["model"], "claude-4");
    assert_eq!(body["messages"][0]["content"][0]["text"], "Hello!");
}

#[tokio::test]
async fn completion_picks_last_choice_and_sorts_tool_calls() {
    let mock = Arc::new(MockTransport::new().with_json(
        200,
        r#"{"choices": [
            {"index": 0, "message": {"role": "assistant", "content": "First"}},
            {"index": 1, "finish_reason": "tool_calls",
             "message": {"role": "assistant", "content": "Second",
             "tool_calls": [
                {"index": 2, "id": "c", "type": "function",
                 "function": {"name": "f", "arguments": "{}"}},
                {"index": 0, "id": "a", "type": "function",
                 "function": {"name": "f", "arguments": "{\"n\":1}"}},
                {"index": 1, "id": "b", "type": "function",
                 "function": {"name": "f", "arguments": ""}}
             ]}}
        ]}"#,
    ));

    let response = client(&mock).completion(&hello()).await.unwrap();
    assert_eq!(response.text(), "Second");

    let order: Vec<u32> = response.message().tool_calls.iter().map(|c| c.index).collect();
    assert_eq!(order, vec![0, 1, 2]);
    let first = &response.message().tool_calls[0].function.arguments;
    assert_eq!(first.get_str_argument("n").as_deref(), Some("1"));
    assert!(response.message().tool_calls[1].function.arguments.is_empty());
}

#[tokio::test]
async fn server_errors_are_retried() {
    let mock = Arc::new(
        MockTransport::new()
            .with_json(503, "upstream unavailable")
            .with_json(
                200,
                r#"{"choices": [{"message": {"role": "assistant", "content": "ok"}}]}"#,
            ),
    );

    let response = client(&mock).completion(&hello()).await.unwrap();
    assert_eq!(response.text(), "ok");
    assert_eq!(mock.call_count(), 2);
}

#[tokio::test]
async fn transport_failures_exhaust_retries() {
    let mock = Arc::new(
        MockTransport::new()
            .with_transport_error("connection refused")
            .with_transport_error("connection refused")
            .with_transport_error("connection refused"),
    );

    let err = client(&mock).completion(&hello()).await.unwrap_err();
    match err {
        LlmError::RetriesExhausted { attempts, last_error } => {
            assert_eq!(attempts, 3);
            assert!(last_error.contains("connection refused"));
        }
        other => panic!("expected exhaustion, got {other:?}"),
    }
    assert_eq!(mock.call_count(), 3);
}

#[tokio::test]
async fn malformed_body_is_parse_error() {
    let mock = Arc::new(MockTransport::new().with_json(200, "<html>"));
    let err = client(&mock).completion(&hello()).await.unwrap_err();
    assert!(matches!(err, LlmError::Parse(_)));
    assert_eq!(mock.call_count(), 1);
}

// ---------------------------------------------------------------------------
// Tools
// ---------------------------------------------------------------------------

#[tokio::test]
async fn tool_call_reconciles_fragments() {
    let mock = Arc::new(MockTransport::new().with_json(
        200,
        r#"[{"type": "text", "text": "First", "annotations": {"source": "a"}},
            {"type": "text", "text": ""},
            {"type": "text", "text": "Third"}]"#,
    ));

    let mut args = Arguments::new();
    args.set_argument("timezone", "Europe/Riga");
    args.set_argument("verbose", true);
    let function = ToolCallFunction::new("current_time", args);

    let result = client(&mock).tool_call_as("42", &function).await.unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].text, "First\n\nThird");
    assert_eq!(result[0].annotations, Some(serde_json::json!({"source": "a"})));

    let sent = mock.last_request().unwrap();
    assert_eq!(sent.path, "/mcp-rest/tools/call");
    assert_eq!(sent.target, TargetName::Mcp);
    assert_eq!(sent.header("X-User-ID"), Some("42"));

    let body = json_of(&sent.body);
    assert_eq!(body["name"], "current_time");
    assert_eq!(body["arguments"], r#"{"timezone":"Europe/Riga","verbose":true}"#);
}

#[tokio::test]
async fn empty_tool_result_is_not_an_error() {
    let mock = Arc::new(MockTransport::new().with_json(200, "[]"));
    let result = client(&mock)
        .tool_call(&ToolCallFunction::new("noop", Arguments::new()))
        .await
        .unwrap();
    assert!(result.is_empty());
    assert_eq!(mock.last_request().unwrap().header("X-User-ID"), None);
}

#[tokio::test]
async fn tool_listing_error_surfaces() {
    let mock = Arc::new(
        MockTransport::new()
            .with_json(
                200,
                r#"{"tools": [{"name": "current_time", "inputSchema": {}, "mcp_info": {}}],
                    "error": null}"#,
            )
            .with_json(200, r#"{"tools": [], "error": "server offline", "message": ""}"#),
    );
    let client = client(&mock);

    let tools = client.tools().await.unwrap();
    assert_eq!(tools[0].name, "current_time");
    assert_eq!(mock.last_request().unwrap().method, Method::Get);

    let err = client.tools().await.unwrap_err();
    assert!(matches!(err, LlmError::Unexpected(msg) if msg.contains("server offline")));
}

// ---------------------------------------------------------------------------
// Model discovery
// ---------------------------------------------------------------------------

#[tokio::test]
async fn model_requires_exactly_one_group() {
    let mock = Arc::new(
        MockTransport::new()
            .with_json(
                200,
                r#"{"data": [{"model_group": "claude-4",
                    "supported_openai_params": ["temperature"]}]}"#,
            )
            .with_json(200, r#"{"data": [{"model_group": "a"}, {"model_group": "b"}]}"#)
            .with_json(200, r#"{"data": []}"#),
    );
    let client = client(&mock);
    let id = ModelId::from("claude-4");

    let meta = client.model(&id).await.unwrap();
    assert!(meta.supports_param("temperature"));
    let sent = mock.last_request().unwrap();
    assert_eq!(sent.path, "/model_group/info");
    assert_eq!(sent.query, vec![("model_group".to_string(), "claude-4".to_string())]);
    assert_eq!(sent.target, TargetName::System);

    assert!(matches!(client.model(&id).await, Err(LlmError::Unexpected(_))));
    assert!(matches!(client.model(&id).await, Err(LlmError::Unexpected(_))));
}

#[tokio::test]
async fn models_and_info_map() {
    let mock = Arc::new(
        MockTransport::new()
            .with_json(
                200,
                r#"{"object": "list",
                    "data": [{"id": "claude-4", "object": "model", "owned_by": "openai"}]}"#,
            )
            .with_json(
                200,
                r#"{"data": [{"model_name": "qwen3",
                    "model_info": {"key": "openrouter/qwen/qwen3-235b-a22b"}}]}"#,
            ),
    );
    let client = client(&mock);

    let models = client.models().await.unwrap();
    assert!(models.get(&ModelId::from("claude-4")).is_some());

    let map = client.model_info_map().await.unwrap();
    assert_eq!(map["qwen3"], "openrouter/qwen/qwen3-235b-a22b");
    assert_eq!(mock.last_request().unwrap().path, "/v2/model/info");
}

// ---------------------------------------------------------------------------
// Embeddings, token counting, audio
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_embedding_input_rejected() {
    let mock = Arc::new(MockTransport::new());
    let err = client(&mock).embeddings(&ModelMeta::with_id("mistral-embed"), "").await.unwrap_err();
    assert!(matches!(err, LlmError::Validation(_)));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn embeddings_round_trip() {
    let mock = Arc::new(MockTransport::new().with_json(
        200,
        r#"{"object": "list",
            "data": [{"object": "embedding", "embedding": [0.25, 0.5], "index": 0}],
            "model": "mistral-embed", "usage": {"prompt_tokens": 2, "total_tokens": 2}}"#,
    ));

    let resp = client(&mock)
        .embeddings(&ModelMeta::with_id("mistral-embed"), "hello")
        .await
        .unwrap();
    assert_eq!(resp.first().unwrap().to_f32(), vec![0.25, 0.5]);

    let sent = mock.last_request().unwrap();
    assert_eq!(sent.path, "/v1/embeddings");
    assert_eq!(
        json_of(&sent.body),
        serde_json::json!({"model": "mistral-embed", "input": "hello"})
    );
}

#[tokio::test]
async fn token_counter_posts_messages() {
    let mock = Arc::new(MockTransport::new().with_json(
        200,
        r#"{"total_tokens": 12, "model_used": "claude-4", "request_model": "claude-4",
            "tokenizer_type": "openai_tokenizer"}"#,
    ));
    let request =
        TokenCounterRequest::new("claude-4", Messages::from(vec![Message::user_text("count me")]));

    let resp = client(&mock).token_counter(&request).await.unwrap();
    assert!((resp.total_tokens - 12.0).abs() < f64::EPSILON);
    assert_eq!(mock.last_request().unwrap().path, "/utils/token_counter");
}

#[tokio::test]
async fn speech_to_text_sends_multipart() {
    let dir = tempfile::tempdir().unwrap();
    let audio = dir.path().join("story.mp3");
    std::fs::write(&audio, b"ID3fake").unwrap();

    let mock = Arc::new(
        MockTransport::new().with_json(200, r#"{"text": "Make me a story.", "words": null}"#),
    );
    let transcript = client(&mock)
        .speech_to_text(&ModelMeta::with_id("whisper"), &audio)
        .await
        .unwrap();
    assert_eq!(transcript.text, "Make me a story.");

    let sent = mock.last_request().unwrap();
    assert_eq!(sent.path, "/audio/transcriptions");
    match sent.body {
        RequestBody::Multipart { fields, files } => {
            assert_eq!(fields, vec![("model".to_string(), "whisper".to_string())]);
            assert_eq!(files[0].field, "file");
            assert_eq!(files[0].file_name, "story.mp3");
            assert_eq!(files[0].bytes, b"ID3fake");
        }
        other => panic!("expected multipart, got {other:?}"),
    }
}

#[tokio::test]
async fn speech_to_text_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockTransport::new());
    let err = client(&mock)
        .speech_to_text(&ModelMeta::with_id("whisper"), &dir.path().join("absent.wav"))
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::Io(_)));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn text_to_speech_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockTransport::new().with_json(200, "RIFFfake"));
    let client = client(&mock).with_speech_dir(dir.path());

    let mut request = SpeechRequest::new("tts-1", "Hello there", "alloy");
    request.response_format = "wav".into();
    let speech = client.text_to_speech(&request).await.unwrap();

    assert_eq!(speech.extension, "wav");
    assert_eq!(speech.directory, dir.path());
    assert!(speech.name.starts_with("speech_") && speech.name.ends_with(".wav"));
    assert_eq!(std::fs::read(&speech.full).unwrap(), b"RIFFfake");
}

#[tokio::test]
async fn text_to_speech_defaults_to_mp3() {
    let dir = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockTransport::new().with_json(200, "ID3"));
    let speech = client(&mock)
        .with_speech_dir(dir.path())
        .text_to_speech(&SpeechRequest::new("tts-1", "Hi", "alloy"))
        .await
        .unwrap();
    assert_eq!(speech.extension, "mp3");
    assert!(speech.full.exists());
}
