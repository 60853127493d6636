// Model and resource name normalization
// Author: kelexine (https://github.com/kelexine)

use crate::error::{GemkitError, Result};

/// Collection prefix of cached content resources.
pub const CACHED_CONTENTS_PREFIX: &str = "cachedContents/";

/// Collection prefix of tuned models.
pub const TUNED_MODELS_PREFIX: &str = "tunedModels/";

const MODELS_PREFIX: &str = "models/";

/// Resolve a model identifier to its resource path.
///
/// `gemini-1.5-pro` and `models/gemini-1.5-pro` both yield
/// `models/gemini-1.5-pro`; tuned models (`tunedModels/…`) are kept as-is.
pub fn model_path(model: &str) -> Result<String> {
    let model = model.trim().trim_start_matches('/');
    if model.is_empty() || model == MODELS_PREFIX {
        return Err(GemkitError::missing("model"));
    }

    if model.starts_with(MODELS_PREFIX) || model.starts_with(TUNED_MODELS_PREFIX) {
        Ok(model.to_string())
    } else {
        Ok(format!("{}{}", MODELS_PREFIX, model))
    }
}

/// Bare model id without its collection prefix, as used in Vertex AI
/// publisher paths.
pub fn model_id(model: &str) -> Result<String> {
    let path = model_path(model)?;
    Ok(path
        .strip_prefix(MODELS_PREFIX)
        .unwrap_or(&path)
        .to_string())
}

/// Normalize a cached content name so it can be appended to the base URL.
///
/// Whitespace and leading slashes are trimmed. A bare id gains the
/// `cachedContents/` prefix; a name that already names its collection
/// (`cachedContents/…`, `tunedModels/…`) is kept.
pub fn sanitize_cached_content_name(name: &str) -> String {
    let name = name.trim().trim_start_matches('/');
    if name.starts_with(CACHED_CONTENTS_PREFIX) || name.starts_with(TUNED_MODELS_PREFIX) {
        name.to_string()
    } else {
        format!("{}{}", CACHED_CONTENTS_PREFIX, name)
    }
}

/// Whether a sanitized name addresses a tuned-model-scoped resource.
pub fn is_tuned_model_resource(name: &str) -> bool {
    name.starts_with(TUNED_MODELS_PREFIX)
}
