// Gemini API client: shared transport for every resource family
// Author: kelexine (https://github.com/kelexine)

use super::streaming::{self, ResponseStream};
use super::RequestOptions;
use crate::config::{ApiConfig, ClientConfig, Credentials};
use crate::error::{GemkitError, Result};
use crate::models::gemini::{GenerateContentRequest, GenerateContentResponse};
use crate::models::mapping::{model_id, model_path};
use crate::utils::logging::sanitize;
use crate::utils::url::resource_url;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use zeroize::Zeroizing;

const API_KEY_HEADER: &str = "x-goog-api-key";
const VERTEX_API_VERSION: &str = "v1";

/// Client for the Google Gemini API.
///
/// Owns the HTTP connection pool and the credentials. The auth header is
/// fixed when the client is built, so clones can be shared across tasks
/// without coordinating credential changes.
#[derive(Clone)]
pub struct GeminiClient {
    http_client: Client,
    config: ApiConfig,
    credentials: Credentials,
    base_url: String,
}

impl GeminiClient {
    /// Create a client for the backend selected by `credentials`.
    pub fn new(config: &ApiConfig, credentials: Credentials) -> Result<Self> {
        let http_client = Client::builder()
            .default_headers(Self::auth_headers(&credentials)?)
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .pool_max_idle_per_host(10)
            .tcp_nodelay(true)
            .use_rustls_tls()
            .build()
            .map_err(|e| GemkitError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = Self::base_url_for(config, &credentials);
        debug!("Created Gemini client for {}", base_url);

        Ok(Self {
            http_client,
            config: config.clone(),
            credentials,
            base_url,
        })
    }

    /// Create a Google AI client with default settings.
    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self> {
        Self::new(&ApiConfig::default(), Credentials::api_key(api_key))
    }

    /// Create a client from loaded configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(&config.api, config.auth.credentials()?)
    }

    fn auth_headers(credentials: &Credentials) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let (name, value) = match credentials {
            Credentials::ApiKey(key) => (
                HeaderName::from_static(API_KEY_HEADER),
                Zeroizing::new(key.as_str().to_string()),
            ),
            Credentials::VertexAi { access_token, .. } => (
                AUTHORIZATION,
                Zeroizing::new(format!("Bearer {}", access_token.as_str())),
            ),
        };
        let mut value = HeaderValue::from_str(value.as_str())
            .map_err(|_| GemkitError::Config("Credentials contain invalid characters".to_string()))?;
        value.set_sensitive(true);
        headers.insert(name, value);

        Ok(headers)
    }

    fn base_url_for(config: &ApiConfig, credentials: &Credentials) -> String {
        match credentials {
            Credentials::ApiKey(_) => resource_url(&config.endpoint, &config.api_version),
            Credentials::VertexAi {
                project_id, region, ..
            } => {
                let host = config
                    .vertex_endpoint
                    .clone()
                    .unwrap_or_else(|| format!("https://{}-aiplatform.googleapis.com", region));
                resource_url(
                    &host,
                    &format!(
                        "{}/projects/{}/locations/{}",
                        VERTEX_API_VERSION, project_id, region
                    ),
                )
            }
        }
    }

    /// Versioned base URL every resource path is appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the API settings this client was built with.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Whether calls authenticate with a plain API key.
    pub fn uses_api_key(&self) -> bool {
        self.credentials.is_api_key()
    }

    /// Absolute URL of a resource-relative path.
    pub fn url(&self, path: &str) -> String {
        resource_url(&self.base_url, path)
    }

    fn model_url(&self, model: &str, method: &str) -> Result<String> {
        let path = match self.credentials {
            Credentials::ApiKey(_) => model_path(model)?,
            Credentials::VertexAi { .. } => format!("publishers/google/models/{}", model_id(model)?),
        };
        Ok(self.url(&format!("{}:{}", path, method)))
    }

    /// Call `generateContent` (blocking).
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
        options: &RequestOptions,
    ) -> Result<GenerateContentResponse> {
        let url = self.model_url(model, "generateContent")?;
        debug!(
            "Calling generateContent for model {} with {} contents",
            model,
            request.contents.len()
        );
        self.post_json(&url, request, options).await
    }

    /// Call `streamGenerateContent` with server-sent events.
    ///
    /// Chunks are yielded in delivery order. Cancelling `cancel` ends the
    /// stream without an error; buffered but undelivered chunks are dropped.
    pub async fn stream_generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
        options: &RequestOptions,
        cancel: CancellationToken,
    ) -> Result<ResponseStream> {
        let url = format!("{}?alt=sse", self.model_url(model, "streamGenerateContent")?);
        debug!("Starting streamGenerateContent for model {}", model);

        let request = options.apply(
            self.http_client
                .post(&url)
                .header(ACCEPT, "text/event-stream")
                .json(request),
        );
        let response = self.execute(request).await?;

        Ok(streaming::response_stream(response.bytes_stream(), cancel))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET {}", sanitize(url));
        let response = self.execute(self.http_client.get(url)).await?;
        Self::read_json(response).await
    }

    pub(crate) async fn post_json<B, T>(&self, url: &str, body: &B, options: &RequestOptions) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("POST {}", sanitize(url));
        let request = options.apply(self.http_client.post(url).json(body));
        let response = self.execute(request).await?;
        Self::read_json(response).await
    }

    pub(crate) async fn patch_json<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("PATCH {}", sanitize(url));
        let response = self.execute(self.http_client.patch(url).json(body)).await?;
        Self::read_json(response).await
    }

    /// DELETE and return the raw acknowledgement body.
    pub(crate) async fn delete_text(&self, url: &str) -> Result<String> {
        debug!("DELETE {}", sanitize(url));
        let response = self.execute(self.http_client.delete(url)).await?;
        Ok(response.text().await?)
    }

    /// Send a request; any non-success status becomes `RequestFailed`.
    async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        ensure_success(response).await
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let body = response.text().await?;
        // Some endpoints acknowledge with an empty body.
        let body = if body.trim().is_empty() { "{}" } else { body.as_str() };
        Ok(serde_json::from_str(body)?)
    }
}

/// Turn a non-success response into [`GemkitError::RequestFailed`].
pub(crate) async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!("Gemini API error: HTTP {} - {}", status, sanitize(&body));
    Err(GemkitError::RequestFailed {
        status: status.as_u16(),
        body,
    })
}
