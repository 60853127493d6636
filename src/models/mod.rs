//! Data models for the Gemini API and the provider-neutral chat surface.
//!
//! - Gemini REST request/response bodies (`gemini`)
//! - Provider-neutral chat messages, options and completions (`chat`)
//! - Model and resource name normalization (`mapping`)

// Author: kelexine (https://github.com/kelexine)

pub mod chat;
pub mod gemini;
pub mod mapping;

pub use chat::{
    AiContent, ChatClientMetadata, ChatCompletion, ChatFinishReason, ChatMessage, ChatOptions,
    ChatRole, ChatTool, StreamingChatCompletionUpdate, UsageDetails,
};
pub use gemini::{
    Candidate, CodeExecution, Content, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig, Part, Tool, UsageMetadata,
};
pub use mapping::{model_path, sanitize_cached_content_name};
