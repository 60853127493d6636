// Cached content manager - CRUD over the cachedContents collection
// Author: kelexine (https://github.com/kelexine)

use crate::cache::models::{CachedContent, ListCachedContentsResponse, UpdateCachedContent};
use crate::error::{GemkitError, Result};
use crate::gemini::{GeminiClient, RequestOptions};
use crate::models::gemini::Content;
use crate::models::mapping::{is_tuned_model_resource, model_path, sanitize_cached_content_name};
use crate::utils::url::{add_query_string, QueryParams};
use std::time::Duration;
use tracing::{debug, info};

/// Default lifetime of content created through [`CachedContentManager::create_with`].
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Default listing page size. The server coerces values above 1000 to 1000.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

const COLLECTION: &str = "cachedContents";

/// Manages cached content resources for one client.
///
/// Every operation validates its arguments before issuing a call, so an
/// invalid request never reaches the network.
#[derive(Clone)]
pub struct CachedContentManager {
    client: GeminiClient,
}

impl CachedContentManager {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &GeminiClient {
        &self.client
    }

    /// Create a cached content resource. Returns the resource with its
    /// server-assigned name.
    pub async fn create(&self, request: &CachedContent) -> Result<CachedContent> {
        if request.model.trim().is_empty() {
            return Err(GemkitError::missing("model"));
        }

        let mut request = request.clone();
        request.model = model_path(&request.model)?;

        let url = self.client.url(COLLECTION);
        let created: CachedContent = self
            .client
            .post_json(&url, &request, &RequestOptions::default())
            .await?;

        info!(
            "Created cached content {} for {}",
            created.name.as_deref().unwrap_or("<unnamed>"),
            request.model
        );
        Ok(created)
    }

    /// Create from parts; `ttl` defaults to five minutes.
    pub async fn create_with(
        &self,
        model: &str,
        display_name: Option<String>,
        system_instruction: Option<Content>,
        contents: Option<Vec<Content>>,
        ttl: Option<Duration>,
    ) -> Result<CachedContent> {
        let request = CachedContent {
            model: model.to_string(),
            display_name,
            system_instruction,
            contents,
            ttl: Some(ttl.unwrap_or(DEFAULT_TTL)),
            ..Default::default()
        };
        self.create(&request).await
    }

    /// List one page of cached content resources. Returns an empty list,
    /// not an error, when none exist.
    pub async fn list(
        &self,
        page_size: Option<u32>,
        page_token: Option<&str>,
    ) -> Result<Vec<CachedContent>> {
        Ok(self.list_page(page_size, page_token).await?.cached_contents)
    }

    /// Like [`list`](Self::list), keeping the next page token.
    pub async fn list_page(
        &self,
        page_size: Option<u32>,
        page_token: Option<&str>,
    ) -> Result<ListCachedContentsResponse> {
        let mut params = QueryParams::new();
        params.insert(
            "pageSize",
            Some(page_size.unwrap_or(DEFAULT_PAGE_SIZE).to_string()),
        );
        params.insert("pageToken", page_token.map(str::to_string));

        let url = add_query_string(&self.client.url(COLLECTION), &params);
        let page: ListCachedContentsResponse = self.client.get_json(&url).await?;
        debug!("Listed {} cached contents", page.cached_contents.len());
        Ok(page)
    }

    /// Read a cached content resource by name, with or without the
    /// `cachedContents/` prefix.
    ///
    /// Tuned-model resources need OAuth credentials; asking for one with an
    /// API key fails with [`GemkitError::Unsupported`] without a call.
    pub async fn get(&self, cached_content_name: &str) -> Result<CachedContent> {
        let name = self.resolve_name(cached_content_name)?;
        if self.client.uses_api_key() && is_tuned_model_resource(&name) {
            return Err(GemkitError::Unsupported(format!(
                "Accessing {} requires OAuth credentials; API key authentication is not supported for tuned model resources",
                name
            )));
        }

        self.client.get_json(&self.client.url(&name)).await
    }

    /// Change the expiration of an existing resource. Only the TTL is
    /// mutable; `update_mask` optionally restricts the fields the server
    /// applies.
    pub async fn update(
        &self,
        request: &CachedContent,
        ttl: Duration,
        update_mask: Option<&str>,
    ) -> Result<CachedContent> {
        let name = self.resolve_name(request.name.as_deref().unwrap_or_default())?;

        let mut params = QueryParams::new();
        params.insert("updateMask", update_mask.map(str::to_string));
        let url = add_query_string(&self.client.url(&name), &params);

        let body = UpdateCachedContent { ttl: Some(ttl) };
        let updated = self.client.patch_json(&url, &body).await?;
        info!("Updated ttl of {}", name);
        Ok(updated)
    }

    /// Delete a resource. Returns the server's acknowledgement body.
    pub async fn delete(&self, cached_content_name: &str) -> Result<String> {
        let name = self.resolve_name(cached_content_name)?;
        let ack = self.client.delete_text(&self.client.url(&name)).await?;
        info!("Deleted cached content {}", name);
        Ok(ack)
    }

    fn resolve_name(&self, name: &str) -> Result<String> {
        let trimmed = name.trim().trim_start_matches('/');
        if trimmed.is_empty() || trimmed.trim_end_matches('/') == COLLECTION {
            return Err(GemkitError::missing("cachedContentName"));
        }
        Ok(sanitize_cached_content_name(trimmed))
    }
}
