// gemkit - async client for the Gemini REST API
// Author: kelexine (https://github.com/kelexine)

//! Content generation, cached content management, the OpenAI-compatible
//! endpoints, and a provider-neutral chat adapter over Google Gemini.
//!
//! ```no_run
//! use gemkit::{ChatClient, ChatMessage, GeminiChatClient};
//!
//! # async fn run() -> gemkit::Result<()> {
//! let client = GeminiChatClient::new("AIza...", "gemini-1.5-flash")?;
//! let completion = client.complete(&[ChatMessage::user("Hello")], None).await?;
//! println!("{:?}", completion.message().map(|m| m.text_content()));
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod chat;
pub mod config;
pub mod error;
pub mod gemini;
pub mod models;
pub mod openai;
pub mod translation;
pub mod utils;

pub use cache::{CachedContent, CachedContentManager};
pub use chat::{ChatClient, ChatStream, GeminiChatClient, Service, ServiceKind};
pub use config::{ApiConfig, ClientConfig, Credentials};
pub use error::{GemkitError, Result};
pub use gemini::{GeminiClient, RequestOptions, ResponseStream};
pub use models::chat::{
    AiContent, ChatCompletion, ChatFinishReason, ChatMessage, ChatOptions, ChatRole, ChatTool,
    StreamingChatCompletionUpdate,
};
pub use openai::OpenAiModel;
