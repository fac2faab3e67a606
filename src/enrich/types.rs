//! Wire types for the text-generation service.

use serde::{Deserialize, Serialize};

/// One chat message in an enrichment request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body: `{"messages": [...]}`.
#[derive(Debug, Serialize)]
pub struct EnrichmentRequest<'a> {
    pub messages: &'a [Message],
}

/// Response body: `{"result": {"response": "..."}}`. Extra fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct EnrichmentResponse {
    pub result: EnrichmentResult,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnrichmentResult {
    pub response: String,
}

/// Build the system + user prompt for a generated document.
///
/// `language` is the source file's extension; the whole document is embedded
/// in a fence tagged with it.
pub fn build_messages(system_prompt: &str, language: &str, document: &str) -> Vec<Message> {
    let label = if language.is_empty() { "source" } else { language };
    vec![
        Message::system(system_prompt),
        Message::user(format!(
            "Generate a Mermaid Markdown overview for the following {} file:\n```{}\n{}\n```",
            label, language, document
        )),
    ]
}
