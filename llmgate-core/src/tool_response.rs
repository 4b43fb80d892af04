//! Tool-execution results and fragment reconciliation.
//!
//! The tool-execution endpoint returns a list of fragments per call. It is
//! normally one element, but the gateway sometimes splits one logical
//! result into several. Conversation history needs exactly one tool message
//! per tool-call ID, so [`reconcile`] folds a multi-fragment list into one.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Fragment type used for plain-text results.
pub const TEXT_RESPONSE_TYPE: &str = "text";

/// One fragment of a tool-execution result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    /// Fragment type, e.g. `"text"` or `"image_url"`.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Text payload.
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    pub text: String,
    /// Opaque annotations, passed through untouched.
    #[serde(default)]
    pub annotations: Option<serde_json::Value>,
}

impl ToolResponse {
    /// A plain-text fragment without annotations.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: TEXT_RESPONSE_TYPE.to_string(),
            text: text.into(),
            annotations: None,
        }
    }
}

impl fmt::Display for ToolResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Fold tool-response fragments into at most one.
///
/// - zero fragments: returned as-is (no textual result, not an error)
/// - one fragment: returned unchanged
/// - more: one fragment whose text is every fragment's text joined with
///   `\n` in order, empty texts kept as blank lines; `type` and
///   `annotations` come from the first fragment
#[must_use]
pub fn reconcile(fragments: Vec<ToolResponse>) -> Vec<ToolResponse> {
    if fragments.len() <= 1 {
        return fragments;
    }

    let count = fragments.len();
    let mut iter = fragments.into_iter();
    let Some(first) = iter.next() else {
        return Vec::new();
    };

    let mut text = first.text;
    for fragment in iter {
        if fragment.kind != first.kind {
            // Only homogeneous text batches have been observed; keep the
            // first fragment's type and surface the mismatch.
            warn!(
                first_type = %first.kind,
                fragment_type = %fragment.kind,
                "Heterogeneous tool-response fragment types; keeping the first"
            );
        }
        text.push('\n');
        text.push_str(&fragment.text);
    }

    debug!(fragments = count, "Reconciled fragmented tool response");

    vec![ToolResponse {
        kind: first.kind,
        text,
        annotations: first.annotations,
    }]
}

/// Join every fragment's text with newlines.
#[must_use]
pub fn joined_text(fragments: &[ToolResponse]) -> String {
    fragments
        .iter()
        .map(|f| f.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
