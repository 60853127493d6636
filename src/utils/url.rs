// Resource URL composition
// Author: kelexine (https://github.com/kelexine)

use std::collections::BTreeMap;

/// Query parameters keyed by name. Keys are unique; values that are `None`
/// or empty are dropped when the query string is built.
pub type QueryParams<'a> = BTreeMap<&'a str, Option<String>>;

/// Join a versioned base URL and a resource-relative path with exactly one
/// `/` between them.
pub fn resource_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, path)
    }
}

/// Append the non-empty parameters of `params` to `url`.
///
/// Values are percent-encoded. An existing query string is extended.
pub fn add_query_string(url: &str, params: &QueryParams<'_>) -> String {
    let pairs: Vec<String> = params
        .iter()
        .filter_map(|(key, value)| match value.as_deref() {
            Some(v) if !v.is_empty() => Some(format!("{}={}", key, urlencoding::encode(v))),
            _ => None,
        })
        .collect();

    if pairs.is_empty() {
        return url.to_string();
    }

    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", url, separator, pairs.join("&"))
}
