//! Conversation messages sent with completion requests.
//!
//! Content is always sent in the multi-part form (`[{"type": "text", ...}]`).
//! Several providers reject an assistant or tool message whose text is
//! empty, so those constructors substitute `"-"`.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::response::ResponseMessage;
use crate::tool_call::{ToolCall, sort_by_index};
use crate::tool_response::ToolResponse;

/// Placeholder text for messages that must not be empty.
pub const EMPTY_TEXT_PLACEHOLDER: &str = "-";

/// Content part type for text.
pub const TEXT_CONTENT_TYPE: &str = "text";

/// Content part type for images.
pub const IMAGE_CONTENT_TYPE: &str = "image_url";

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions.
    System,
    /// End-user input.
    User,
    /// Model output.
    Assistant,
    /// Result of a tool call.
    Tool,
}

impl Role {
    /// Wire name of the role.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }

    /// Parse a wire role name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "system" => Some(Self::System),
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            "tool" => Some(Self::Tool),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image reference inside a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    /// Image URL or data URI.
    pub url: String,
    /// Optional MIME type, e.g. `"image/jpeg"`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub format: String,
}

impl ImageUrl {
    /// Reference an image by URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            format: String::new(),
        }
    }
}

/// One part of a message's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageContent {
    /// Part type: `"text"`, `"image_url"`, ...
    #[serde(rename = "type")]
    pub kind: String,
    /// Text payload for text parts.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    /// Image payload for image parts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<ImageUrl>,
}

impl MessageContent {
    /// A text part.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: TEXT_CONTENT_TYPE.to_string(),
            text: text.into(),
            image_url: None,
        }
    }

    /// An image part.
    #[must_use]
    pub fn image(image: ImageUrl) -> Self {
        Self {
            kind: IMAGE_CONTENT_TYPE.to_string(),
            text: String::new(),
            image_url: Some(image),
        }
    }

    fn is_blank_text(&self) -> bool {
        self.kind == TEXT_CONTENT_TYPE && self.text.is_empty() && self.image_url.is_none()
    }
}

/// Display form of a content list: text parts verbatim, image parts as
/// `[Image: <url>]`, joined with single spaces.
struct ContentsDisplay<'a>(&'a [MessageContent]);

impl fmt::Display for ContentsDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for part in self.0 {
            let rendered = match (part.kind.as_str(), &part.image_url) {
                (TEXT_CONTENT_TYPE, _) => part.text.clone(),
                (IMAGE_CONTENT_TYPE, Some(image)) => format!("[Image: {}]", image.url),
                _ => continue,
            };
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(&rendered)?;
            first = false;
        }
        Ok(())
    }
}

/// A single conversation message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Author.
    pub role: Role,
    /// Content parts.
    #[serde(rename = "content", default, deserialize_with = "contents_from_wire")]
    pub contents: Vec<MessageContent>,
    /// Function name, set on tool results.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// ID of the tool call this message answers.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tool_call_id: String,
    /// Tool calls issued by the assistant in this turn.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

/// Accept content as a bare string or as a part list.
fn contents_from_wire<'de, D>(deserializer: D) -> Result<Vec<MessageContent>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Text(String),
        Parts(Vec<MessageContent>),
    }

    Ok(match Option::<Wire>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(Wire::Text(text)) => vec![MessageContent::text(text)],
        Some(Wire::Parts(parts)) => parts,
    })
}

impl Message {
    /// A message with the given role and content parts.
    #[must_use]
    pub fn new(role: Role, contents: Vec<MessageContent>) -> Self {
        Self {
            role,
            contents,
            name: String::new(),
            tool_call_id: String::new(),
            tool_calls: Vec::new(),
        }
    }

    /// System message with multi-part content.
    #[must_use]
    pub fn system(contents: Vec<MessageContent>) -> Self {
        Self::new(Role::System, contents)
    }

    /// System message with a single text part.
    #[must_use]
    pub fn system_text(text: impl Into<String>) -> Self {
        Self::system(vec![MessageContent::text(text)])
    }

    /// User message with multi-part content.
    #[must_use]
    pub fn user(contents: Vec<MessageContent>) -> Self {
        Self::new(Role::User, contents)
    }

    /// User message with a single text part.
    #[must_use]
    pub fn user_text(text: impl Into<String>) -> Self {
        Self::user(vec![MessageContent::text(text)])
    }

    /// User message with an image, preceded by a text part when `text` is non-empty.
    #[must_use]
    pub fn user_image(text: impl Into<String>, image: ImageUrl) -> Self {
        let text = text.into();
        let mut contents = Vec::with_capacity(2);
        if !text.is_empty() {
            contents.push(MessageContent::text(text));
        }
        contents.push(MessageContent::image(image));
        Self::user(contents)
    }

    /// Assistant message with multi-part content.
    #[must_use]
    pub fn assistant(contents: Vec<MessageContent>) -> Self {
        Self::new(Role::Assistant, contents)
    }

    /// Assistant message with a single text part; empty text becomes `"-"`.
    #[must_use]
    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self::assistant(vec![MessageContent::text(non_empty(text.into()))])
    }

    /// Echo a model response back into the history.
    ///
    /// Tool calls are sorted by index so follow-up tool results line up
    /// with them. An unknown or missing role is treated as assistant.
    #[must_use]
    pub fn from_response(message: &ResponseMessage) -> Self {
        let role = Role::parse(&message.role).unwrap_or_else(|| {
            if !message.role.is_empty() {
                warn!(role = %message.role, "Unknown response role, treating as assistant");
            }
            Role::Assistant
        });

        let mut tool_calls = message.tool_calls.clone();
        sort_by_index(&mut tool_calls);

        Self {
            tool_calls,
            ..Self::new(role, vec![MessageContent::text(non_empty(message.content.clone()))])
        }
    }

    /// The tool message answering `call` with a reconciled tool response.
    ///
    /// Content text must be present, so an empty result becomes `"-"`.
    #[must_use]
    pub fn tool_result(call: &ToolCall, response: &ToolResponse) -> Self {
        Self {
            name: call.function.name.clone(),
            tool_call_id: call.id.clone(),
            ..Self::new(
                Role::Tool,
                vec![MessageContent::text(non_empty(response.text.clone()))],
            )
        }
    }

    /// The message's content rendered as plain text.
    #[must_use]
    pub fn content_text(&self) -> String {
        ContentsDisplay(&self.contents).to_string()
    }
}

fn non_empty(text: String) -> String {
    if text.is_empty() {
        EMPTY_TEXT_PLACEHOLDER.to_string()
    } else {
        text
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.role, ContentsDisplay(&self.contents))
    }
}

/// Ordered conversation history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Messages(Vec<Message>);

impl Messages {
    /// Empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message.
    pub fn push(&mut self, message: Message) {
        self.0.push(message);
    }

    /// Append a user message and the reply to it.
    pub fn push_pair(&mut self, user: Message, reply: Message) {
        self.0.push(user);
        self.0.push(reply);
    }

    /// Drop blank text parts, then drop messages left with no parts.
    ///
    /// Every dropped entry is logged.
    pub fn remove_empty(&mut self) {
        self.0.retain_mut(|message| {
            message.contents.retain(|part| {
                if part.is_blank_text() {
                    warn!(role = %message.role, "Dropping message content with empty text");
                    false
                } else {
                    true
                }
            });
            if message.contents.is_empty() {
                warn!(role = %message.role, "Dropping message with no valid contents");
                false
            } else {
                true
            }
        });
    }

    /// Number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the history is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in order.
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.0.iter()
    }

    /// Borrow as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Message] {
        &self.0
    }

    /// The most recent message.
    #[must_use]
    pub fn last(&self) -> Option<&Message> {
        self.0.last()
    }
}

impl From<Vec<Message>> for Messages {
    fn from(messages: Vec<Message>) -> Self {
        Self(messages)
    }
}

impl FromIterator<Message> for Messages {
    fn from_iter<I: IntoIterator<Item = Message>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Messages {
    type Item = Message;
    type IntoIter = std::vec::IntoIter<Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for Messages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, message) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{message}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arguments::Arguments;
    use crate::tool_call::ToolCallFunction;

    #[test]
    fn serializes_multipart_content() {
        let json = serde_json::to_value(Message::user_text("Hello!")).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["content"][0]["text"], "Hello!");
        assert!(json.get("name").is_none());
        assert!(json.get("tool_calls").is_none());
    }

    #[test]
    fn deserializes_bare_string_content() {
        let msg: Message =
            serde_json::from_str(r#"{"role": "system", "content": "Be brief."}"#).unwrap();
        assert_eq!(msg.role, Role::System);
        assert_eq!(msg.content_text(), "Be brief.");
    }

    #[test]
    fn deserializes_missing_content() {
        let msg: Message =
            serde_json::from_str(r#"{"role": "tool", "tool_call_id": "c1"}"#).unwrap();
        assert_eq!(msg.role, Role::Tool);
        assert!(msg.contents.is_empty());
        assert_eq!(msg.tool_call_id, "c1");
    }

    #[test]
    fn user_image_skips_empty_text() {
        let msg = Message::user_image("", ImageUrl::new("https://example.com/a.png"));
        assert_eq!(msg.contents.len(), 1);
        assert_eq!(msg.to_string(), "user: [Image: https://example.com/a.png]");

        let msg = Message::user_image("Look", ImageUrl::new("https://example.com/a.png"));
        assert_eq!(msg.contents.len(), 2);
        assert_eq!(msg.content_text(), "Look [Image: https://example.com/a.png]");
    }

    #[test]
    fn empty_assistant_text_becomes_placeholder() {
        assert_eq!(Message::assistant_text("").content_text(), EMPTY_TEXT_PLACEHOLDER);
    }

    #[test]
    fn from_response_sorts_tool_calls() {
        let response = ResponseMessage {
            content: String::new(),
            role: "assistant".into(),
            tool_calls: vec![
                ToolCall::new("b", 1, ToolCallFunction::default()),
                ToolCall::new("a", 0, ToolCallFunction::default()),
            ],
        };
        let msg = Message::from_response(&response);
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.tool_calls[0].id, "a");
        assert_eq!(msg.tool_calls[1].id, "b");
        assert_eq!(msg.content_text(), EMPTY_TEXT_PLACEHOLDER);
    }

    #[test]
    fn tool_result_threads_call_id() {
        let call =
            ToolCall::new("call_1", 0, ToolCallFunction::new("current_time", Arguments::new()));
        let msg = Message::tool_result(&call, &ToolResponse::text(""));

        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_call_id, "call_1");
        assert_eq!(msg.name, "current_time");
        assert_eq!(msg.content_text(), EMPTY_TEXT_PLACEHOLDER);
    }

    #[test]
    fn remove_empty_drops_blank_parts_and_messages() {
        let mut messages = Messages::from(vec![
            Message::system_text("rules"),
            Message::user(vec![MessageContent::text(""), MessageContent::text("hi")]),
            Message::user_text(""),
            Message::user_image("", ImageUrl::new("https://example.com/x.png")),
        ]);
        messages.remove_empty();

        assert_eq!(messages.len(), 3);
        assert_eq!(messages.as_slice()[1].contents.len(), 1);
        assert_eq!(messages.as_slice()[1].content_text(), "hi");
    }

    #[test]
    fn display_joins_lines() {
        let mut messages = Messages::new();
        messages.push_pair(Message::user_text("ping"), Message::assistant_text("pong"));
        assert_eq!(messages.to_string(), "user: ping\nassistant: pong");
    }
}
