// Chat client adapter
// Author: kelexine (https://github.com/kelexine)

//! Provider-neutral chat client surface and its Gemini implementation.
//!
//! [`ChatClient`] is the capability callers program against.
//! [`GeminiChatClient`] implements it over [`GeminiClient`], translating
//! requests and responses with the functions in [`crate::translation`].

use crate::config::{ClientConfig, Credentials};
use crate::error::{GemkitError, Result};
use crate::gemini::GeminiClient;
use crate::models::chat::{
    ChatClientMetadata, ChatCompletion, ChatMessage, ChatOptions, StreamingChatCompletionUpdate,
};
use crate::translation::{
    to_chat_completion, to_generate_content_request, to_request_options, to_streaming_update,
};
use async_trait::async_trait;
use futures::stream::{Stream, StreamExt};
use std::pin::Pin;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Lazy, finite sequence of streaming updates, one per server chunk.
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<StreamingChatCompletionUpdate>> + Send>>;

/// Provider name reported in [`ChatClientMetadata`].
pub const PROVIDER_NAME: &str = "gemini";

/// Capabilities a chat client can be queried for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    /// The generic [`ChatClient`] surface.
    ChatClient,
    /// The concrete Gemini adapter.
    GeminiChatClient,
}

/// Result of a capability query, borrowed from the client.
pub enum Service<'a> {
    ChatClient(&'a dyn ChatClient),
    GeminiChatClient(&'a GeminiChatClient),
}

impl Service<'_> {
    pub fn kind(&self) -> ServiceKind {
        match self {
            Service::ChatClient(_) => ServiceKind::ChatClient,
            Service::GeminiChatClient(_) => ServiceKind::GeminiChatClient,
        }
    }
}

/// A chat model behind the provider-neutral message types.
#[async_trait]
pub trait ChatClient: Send + Sync {
    fn metadata(&self) -> &ChatClientMetadata;

    /// Send the conversation and wait for the whole reply.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: Option<&ChatOptions>,
    ) -> Result<ChatCompletion>;

    /// Send the conversation and receive the reply incrementally.
    ///
    /// Cancelling `cancel` ends the returned stream; no update is produced
    /// after the cancellation has been observed.
    async fn complete_streaming(
        &self,
        messages: &[ChatMessage],
        options: Option<&ChatOptions>,
        cancel: CancellationToken,
    ) -> Result<ChatStream>;

    /// Look up a capability. Returns `None` when the client does not provide
    /// it or when a `key` is given.
    fn service(&self, kind: ServiceKind, key: Option<&str>) -> Option<Service<'_>>;
}

/// [`ChatClient`] over the Gemini `generateContent` endpoints.
#[derive(Clone)]
pub struct GeminiChatClient {
    client: GeminiClient,
    model: String,
    metadata: ChatClientMetadata,
}

impl GeminiChatClient {
    /// Google AI backend with an API key.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        Ok(Self::with_client(GeminiClient::with_api_key(api_key)?, model))
    }

    /// Vertex AI backend. `region` defaults to `us-central1`.
    pub fn vertex(
        project_id: impl Into<String>,
        region: Option<String>,
        access_token: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let credentials = Credentials::vertex(project_id, region, access_token);
        let client = GeminiClient::new(&Default::default(), credentials)?;
        Ok(Self::with_client(client, model))
    }

    /// Build from loaded configuration, using its default model.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let client = GeminiClient::from_config(config)?;
        Ok(Self::with_client(client, config.api.default_model.clone()))
    }

    /// Wrap an existing client.
    pub fn with_client(client: GeminiClient, model: impl Into<String>) -> Self {
        let model = model.into();
        let metadata = ChatClientMetadata {
            provider_name: PROVIDER_NAME.to_string(),
            provider_uri: Some(client.base_url().to_string()),
            model_id: Some(model.clone()),
        };
        info!("Gemini chat client ready for model {}", model);

        Self {
            client,
            model,
            metadata,
        }
    }

    pub fn client(&self) -> &GeminiClient {
        &self.client
    }

    /// Default model; `ChatOptions::model_id` overrides it per call.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn target_model<'a>(&'a self, options: Option<&'a ChatOptions>) -> &'a str {
        options
            .and_then(|o| o.model_id.as_deref())
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(&self.model)
    }
}

fn require_messages(messages: &[ChatMessage]) -> Result<()> {
    if messages.is_empty() {
        return Err(GemkitError::missing("messages"));
    }
    Ok(())
}

#[async_trait]
impl ChatClient for GeminiChatClient {
    fn metadata(&self) -> &ChatClientMetadata {
        &self.metadata
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: Option<&ChatOptions>,
    ) -> Result<ChatCompletion> {
        require_messages(messages)?;

        let model = self.target_model(options);
        let request = to_generate_content_request(messages, options)?;
        let request_options = to_request_options(options);

        let response = self
            .client
            .generate_content(model, &request, &request_options)
            .await?;

        let mut completion = to_chat_completion(Some(response));
        if completion.model_id.is_none() {
            completion.model_id = Some(model.to_string());
        }
        debug!("Completion with {} choices", completion.choices.len());
        Ok(completion)
    }

    async fn complete_streaming(
        &self,
        messages: &[ChatMessage],
        options: Option<&ChatOptions>,
        cancel: CancellationToken,
    ) -> Result<ChatStream> {
        require_messages(messages)?;

        let model = self.target_model(options).to_string();
        let request = to_generate_content_request(messages, options)?;
        let request_options = to_request_options(options);

        let chunks = self
            .client
            .stream_generate_content(&model, &request, &request_options, cancel)
            .await?;

        let updates = chunks.map(move |chunk| {
            chunk.map(|chunk| {
                let mut update = to_streaming_update(chunk);
                if update.model_id.is_none() {
                    update.model_id = Some(model.clone());
                }
                update
            })
        });
        Ok(Box::pin(updates))
    }

    fn service(&self, kind: ServiceKind, key: Option<&str>) -> Option<Service<'_>> {
        if key.is_some() {
            return None;
        }
        match kind {
            ServiceKind::ChatClient => Some(Service::ChatClient(self)),
            ServiceKind::GeminiChatClient => Some(Service::GeminiChatClient(self)),
        }
    }
}
