//! Integration tests: end-to-end flows over the wire types.
//!
//! A completion response with tool calls is decoded, the calls are
//! executed (simulated), fragmented results reconciled, and the follow-up
//! request is serialized back to the wire.

use std::io::Write;

use llmgate_core::config::{ConfigLoader, GatewayConfig, TargetName};
use llmgate_core::request::messages::EMPTY_TEXT_PLACEHOLDER;
use llmgate_core::{
    CallTool, CompletionRequest, CoreError, Message, Messages, ModelMeta, Response, Role,
    ToolCallFunction, ToolResponse, TypedValue, reconcile,
};

const TOOL_CALL_RESPONSE: &str = r#"{
    "id": "chatcmpl-9",
    "created": 1751360000,
    "model": "claude-4",
    "object": "chat.completion",
    "choices": [{
        "finish_reason": "tool_calls",
        "index": 0,
        "message": {
            "content": "",
            "role": "assistant",
            "tool_calls": [
                {"index": 1, "id": "call_b", "type": "function",
                 "function": {"name": "click",
                              "arguments": "{\"uid\":\"1_146\",\"dblClick\":true}"}},
                {"index": 0, "id": "call_a", "type": "function",
                 "function": {"name": "wait_for",
                              "arguments": "{\"text\":\"WordPress\",\"timeout\":5000.0}"}}
            ]
        }
    }],
    "usage": {"completion_tokens": 40, "prompt_tokens": 900, "total_tokens": 940}
}"#;

// ---------------------------------------------------------------------------
// Tool-call conversation round trip
// ---------------------------------------------------------------------------

#[test]
fn tool_call_conversation_round_trip() {
    let mut response: Response = serde_json::from_str(TOOL_CALL_RESPONSE).unwrap();
    response.sort_tool_calls();

    let calls = &response.message().tool_calls;
    assert_eq!(calls[0].id, "call_a");
    let (wait_for, click) = (&calls[0].function.arguments, &calls[1].function.arguments);
    assert_eq!(wait_for.get_argument("timeout"), Some(&TypedValue::Integer(5000)));
    assert_eq!(wait_for.get_str_argument("timeout").as_deref(), Some("5000"));
    assert_eq!(click.get_str_argument("dblClick").as_deref(), Some("true"));

    let mut history = Messages::from(vec![Message::user_text("Open the admin page")]);
    history.push(Message::from_response(response.message()));

    // Simulated executions: one fragmented, one empty.
    let results = [
        reconcile(vec![
            ToolResponse::text("Found"),
            ToolResponse::text(""),
            ToolResponse::text("WordPress"),
        ]),
        reconcile(Vec::new()),
    ];
    for (call, result) in calls.iter().zip(&results) {
        let response = result.first().cloned().unwrap_or_default();
        history.push(Message::tool_result(call, &response));
    }

    let meta = ModelMeta {
        supported_openai_params: vec!["temperature".into()],
        ..ModelMeta::with_id("claude-4")
    };
    let request = CompletionRequest::new_completion(&meta, history, Vec::new(), None, 0.3);
    request.validate().unwrap();

    let wire = serde_json::to_value(&request).unwrap();
    let messages = wire["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 4);

    // Assistant turn echoes tool calls in index order, arguments re-encoded as strings.
    assert_eq!(messages[1]["role"], "assistant");
    assert_eq!(messages[1]["content"][0]["text"], EMPTY_TEXT_PLACEHOLDER);
    assert_eq!(messages[1]["tool_calls"][0]["id"], "call_a");
    let args_text = messages[1]["tool_calls"][0]["function"]["arguments"].as_str().unwrap();
    assert_eq!(args_text, r#"{"text":"WordPress","timeout":5000}"#);

    // One tool message per call ID, fragments joined with blank lines kept.
    assert_eq!(messages[2]["role"], "tool");
    assert_eq!(messages[2]["tool_call_id"], "call_a");
    assert_eq!(messages[2]["content"][0]["text"], "Found\n\nWordPress");
    assert_eq!(messages[3]["tool_call_id"], "call_b");
    assert_eq!(messages[3]["content"][0]["text"], EMPTY_TEXT_PLACEHOLDER);
}

#[test]
fn nested_object_arguments_rejected_as_envelope_error() {
    let err =
        ToolCallFunction::decode(br#"{"name": "click", "arguments": {"uid": "1"}}"#).unwrap_err();
    assert!(!err.is_arguments());

    let err = ToolCallFunction::decode(br#"{"name": "click", "arguments": "[1, 2]"}"#).unwrap_err();
    assert!(err.is_arguments());
}

#[test]
fn history_round_trips_through_json() {
    let mut history = Messages::new();
    history.push_pair(Message::user_text("ping"), Message::assistant_text("pong"));

    let text = serde_json::to_string(&history).unwrap();
    let restored: Messages = serde_json::from_str(&text).unwrap();
    assert_eq!(restored, history);
    assert_eq!(restored.last().map(|m| m.role), Some(Role::Assistant));
}

#[test]
fn tools_offered_from_listing() {
    let listing: llmgate_core::AvailableToolsResponse = serde_json::from_str(
        r#"{"tools": [{"name": "current_time", "description": "Time",
                       "inputSchema": {"type": "object", "properties": {}, "required": []},
                       "mcp_info": {"server_name": "time"}}]}"#,
    )
    .unwrap();

    let request = CompletionRequest::new("claude-4")
        .with_messages(Messages::from(vec![Message::user_text("What time is it?")]))
        .with_tools(CallTool::from_available(&listing.tools))
        .with_tool_choice("auto");

    let wire = serde_json::to_value(&request).unwrap();
    assert_eq!(wire["tools"][0]["type"], "function");
    assert_eq!(wire["tools"][0]["function"]["name"], "current_time");
    assert_eq!(wire["tool_choice"], "auto");
}

// ---------------------------------------------------------------------------
// Config files
// ---------------------------------------------------------------------------

#[test]
fn loads_and_validates_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
api_key = "sk-1234"
temperature = 0.2
url = "https://gateway.example.com"

[targets.llm]
timeout_ms = 90000
retry_max_attempts = 5
"#
    )
    .unwrap();

    let config = ConfigLoader::new().load_file(file.path()).unwrap();
    assert_eq!(config.target(TargetName::Llm).retry_max_attempts, 5);
    assert_eq!(config.base_url().unwrap().host_str(), Some("gateway.example.com"));
}

#[test]
fn invalid_config_file_reports_every_problem() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "url = \"nope\"\n[targets.system]\ntimeout_ms = 0").unwrap();

    // Parsing alone succeeds.
    assert!(GatewayConfig::from_file(file.path()).is_ok());

    let Err(CoreError::Config(msg)) = ConfigLoader::new().load_file(file.path()) else {
        panic!("expected a config error");
    };
    assert!(msg.contains("api_key"));
    assert!(msg.contains("url"));
    assert!(msg.contains("targets.system.timeout_ms"));
}

#[test]
fn missing_config_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = ConfigLoader::new().load_file(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(CoreError::Io(_))));
}
