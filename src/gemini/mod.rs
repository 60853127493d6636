// Gemini API client module
// Author: kelexine (https://github.com/kelexine)

mod client;
pub mod streaming;

pub use client::GeminiClient;
pub(crate) use client::ensure_success;
pub use streaming::ResponseStream;

use reqwest::RequestBuilder;
use std::time::Duration;

/// Per-call transport settings, kept apart from the request content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Overrides the client-wide timeout for this call.
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }

    pub(crate) fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        }
    }
}
