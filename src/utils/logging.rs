//! Structured logging and secret-redaction utilities.
//!
//! Library code only emits `tracing` events; applications that want them
//! printed can call [`init`] once at startup, or install their own
//! subscriber. [`sanitize`] keeps credentials out of log sinks when server
//! bodies or URLs are logged.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::config::LoggingConfig;
use crate::error::{GemkitError, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the global tracing subscriber.
///
/// Supports three output formats:
/// - `json`: Structured JSON logs for production ingestion.
/// - `compact`: Single-line human-readable output.
/// - `pretty` (default): Multi-line, colorized output for development.
///
/// `RUST_LOG` takes precedence over `config.level`. Fails if a global
/// subscriber has already been installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = match config.format.as_str() {
        "json" => registry.with(tracing_subscriber::fmt::layer().json()).try_init(),
        "compact" => registry
            .with(tracing_subscriber::fmt::layer().compact())
            .try_init(),
        _ => registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init(),
    };

    installed.map_err(|e| GemkitError::Config(format!("Failed to install subscriber: {}", e)))
}

/// Credential prefixes that must never reach a log sink, with their placeholders.
const SECRET_PATTERNS: &[(&str, &str)] = &[
    // Google API keys
    ("AIza", "[REDACTED_API_KEY]"),
    // Google OAuth2 access tokens
    ("ya29.", "[REDACTED_ACCESS_TOKEN]"),
];

/// Sanitizes sensitive information from log messages.
///
/// Every occurrence of a Google API key (`AIza…`) or OAuth access token
/// (`ya29.…`) is replaced by a placeholder. A secret ends at whitespace,
/// a quote, `&` or `,`.
pub fn sanitize(input: &str) -> String {
    let mut result = input.to_string();

    for (prefix, placeholder) in SECRET_PATTERNS {
        let mut search_from = 0;
        while let Some(offset) = result[search_from..].find(prefix) {
            let start = search_from + offset;
            let end = result[start..]
                .find(|c: char| c.is_whitespace() || matches!(c, '"' | '\'' | '&' | ','))
                .map(|i| start + i)
                .unwrap_or(result.len());
            result.replace_range(start..end, placeholder);
            search_from = start + placeholder.len();
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_api_key() {
        let input = "x-goog-api-key: AIzaSyA1b2C3d4 sent";
        let output = sanitize(input);
        assert!(output.contains("[REDACTED_API_KEY]"));
        assert!(!output.contains("AIzaSyA1b2C3d4"));
        assert!(output.ends_with(" sent"));
    }

    #[test]
    fn test_sanitize_access_token() {
        let input = "Authorization: Bearer ya29.a0AfH6SMC...";
        let output = sanitize(input);
        assert!(output.contains("[REDACTED_ACCESS_TOKEN]"));
        assert!(!output.contains("ya29.a0AfH6SMC"));
    }

    #[test]
    fn test_sanitize_every_occurrence() {
        let input = "key=AIzaOne&other=AIzaTwo";
        let output = sanitize(input);
        assert_eq!(output, "key=[REDACTED_API_KEY]&other=[REDACTED_API_KEY]");
    }

    #[test]
    fn test_sanitize_leaves_plain_text() {
        assert_eq!(sanitize("nothing secret here"), "nothing secret here");
    }
}
