// OpenAI-compatible endpoints of the Gemini API
// Author: kelexine (https://github.com/kelexine)

pub mod models;

pub use models::{
    ChatCompletionsRequest, ChatCompletionsResponse, CompletionChoice, CompletionMessage,
    CompletionUsage, EmbeddingData, EmbeddingInput, GenerateEmbeddingsRequest,
    GenerateEmbeddingsResponse,
};

use crate::config::ApiConfig;
use crate::error::{GemkitError, Result};
use crate::gemini::ensure_success;
use crate::utils::url::resource_url;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use zeroize::Zeroizing;

/// Client for `{base}/openai/chat/completions` and `{base}/openai/embeddings`.
///
/// The API key travels as a bearer token, fixed at construction.
#[derive(Clone)]
pub struct OpenAiModel {
    http_client: Client,
    base_url: String,
}

impl OpenAiModel {
    pub fn new(config: &ApiConfig, api_key: impl Into<String>) -> Result<Self> {
        let api_key = Zeroizing::new(api_key.into());
        let mut value = HeaderValue::from_str(&format!("Bearer {}", api_key.as_str()))
            .map_err(|_| GemkitError::Config("API key contains invalid characters".to_string()))?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);

        let http_client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .use_rustls_tls()
            .build()
            .map_err(|e| GemkitError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: resource_url(&config.endpoint, &config.api_version),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Generate chat choices for a message history.
    pub async fn completions(&self, request: &ChatCompletionsRequest) -> Result<ChatCompletionsResponse> {
        if request.model.trim().is_empty() {
            return Err(GemkitError::missing("model"));
        }
        if request.messages.is_empty() {
            return Err(GemkitError::missing("messages"));
        }
        self.post("openai/chat/completions", request).await
    }

    /// Generate embeddings for one input or a batch.
    pub async fn embeddings(
        &self,
        request: &GenerateEmbeddingsRequest,
    ) -> Result<GenerateEmbeddingsResponse> {
        if request.model.trim().is_empty() {
            return Err(GemkitError::missing("model"));
        }
        self.post("openai/embeddings", request).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = resource_url(&self.base_url, path);
        debug!("POST {}", url);
        let response = self.http_client.post(&url).json(body).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.json().await?)
    }
}
