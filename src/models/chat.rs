//! Provider-neutral chat shapes.
//!
//! These types decouple callers from the Gemini wire format: a caller
//! builds [`ChatMessage`]s and [`ChatOptions`], and receives a
//! [`ChatCompletion`] or a sequence of [`StreamingChatCompletionUpdate`]s.
//! They are constructed per call and owned by the caller.

// Author: kelexine (https://github.com/kelexine)

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
    Tool,
}

/// One piece of message content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AiContent {
    Text {
        text: String,
    },
    /// Raw bytes with a media type (images, audio, documents).
    Data {
        mime_type: String,
        #[serde(with = "bytes_base64")]
        data: Bytes,
    },
    /// The model asks the caller to invoke a function.
    FunctionCall {
        call_id: Option<String>,
        name: String,
        arguments: Value,
    },
    /// The caller reports a function's result back to the model.
    FunctionResult {
        call_id: Option<String>,
        name: String,
        result: Value,
    },
}

impl AiContent {
    pub fn text(text: impl Into<String>) -> Self {
        AiContent::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AiContent::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// A single message in the conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub contents: Vec<AiContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, contents: Vec<AiContent>) -> Self {
        Self {
            role,
            contents,
            author_name: None,
        }
    }

    pub fn text(role: ChatRole, text: impl Into<String>) -> Self {
        Self::new(role, vec![AiContent::text(text)])
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::text(ChatRole::System, text)
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::text(ChatRole::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::text(ChatRole::Assistant, text)
    }

    /// Concatenation of all text contents.
    pub fn text_content(&self) -> String {
        self.contents
            .iter()
            .filter_map(AiContent::as_text)
            .collect::<Vec<_>>()
            .join("")
    }
}

/// A tool the model may use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatTool {
    Function {
        name: String,
        description: Option<String>,
        /// JSON schema of the arguments.
        parameters: Option<Value>,
    },
    /// Let the model run the code it writes.
    CodeExecution,
}

/// Per-call options. Read once by the mapper; unrecognized
/// `additional_properties` are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatOptions {
    /// Overrides the client's default model.
    pub model_id: Option<String>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    pub max_output_tokens: Option<u32>,
    pub stop_sequences: Option<Vec<String>>,
    pub presence_penalty: Option<f32>,
    pub frequency_penalty: Option<f32>,
    pub seed: Option<i64>,
    /// `"text"` or `"json"`.
    pub response_format: Option<String>,
    #[serde(default)]
    pub tools: Vec<ChatTool>,
    #[serde(default)]
    pub additional_properties: HashMap<String, Value>,
}

/// Why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatFinishReason {
    Stop,
    Length,
    ContentFilter,
    ToolCalls,
}

/// Token accounting for one call or chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageDetails {
    pub input_token_count: Option<u32>,
    pub output_token_count: Option<u32>,
    pub total_token_count: Option<u32>,
    pub cached_input_token_count: Option<u32>,
}

/// Aggregate reply of a one-shot completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletion {
    /// One message per candidate, in candidate order.
    pub choices: Vec<ChatMessage>,
    pub completion_id: Option<String>,
    pub model_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub finish_reason: Option<ChatFinishReason>,
    pub usage: Option<UsageDetails>,
}

impl ChatCompletion {
    /// A completion with no candidates.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn new(choices: Vec<ChatMessage>) -> Self {
        Self {
            choices,
            completion_id: None,
            model_id: None,
            created_at: None,
            finish_reason: None,
            usage: None,
        }
    }

    /// The first choice, if any.
    pub fn message(&self) -> Option<&ChatMessage> {
        self.choices.first()
    }
}

/// Incremental reply, one per streamed chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamingChatCompletionUpdate {
    pub role: Option<ChatRole>,
    pub contents: Vec<AiContent>,
    pub choice_index: u32,
    pub completion_id: Option<String>,
    pub model_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub finish_reason: Option<ChatFinishReason>,
    pub usage: Option<UsageDetails>,
}

impl StreamingChatCompletionUpdate {
    pub fn text(&self) -> String {
        self.contents
            .iter()
            .filter_map(AiContent::as_text)
            .collect::<Vec<_>>()
            .join("")
    }
}

/// Identifies the provider behind a chat client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatClientMetadata {
    pub provider_name: String,
    pub provider_uri: Option<String>,
    pub model_id: Option<String>,
}

mod bytes_base64 {
    use base64::prelude::*;
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64_STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        BASE64_STANDARD
            .decode(encoded.as_bytes())
            .map(Bytes::from)
            .map_err(serde::de::Error::custom)
    }
}
