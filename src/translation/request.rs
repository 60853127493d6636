// Request translation (neutral chat → Gemini)
// Author: kelexine (https://github.com/kelexine)

use crate::error::{GemkitError, Result};
use crate::gemini::RequestOptions;
use crate::models::chat::{AiContent, ChatMessage, ChatOptions, ChatRole};
use crate::models::gemini::{Content, GenerateContentRequest, GenerationConfig, InlineData, Part};
use crate::models::mapping::sanitize_cached_content_name;
use crate::translation::tools::{translate_function_call, translate_function_result, translate_tools};
use base64::prelude::*;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// `additional_properties` keys the mapper understands.
pub const SYSTEM_INSTRUCTION_KEY: &str = "systemInstruction";
pub const CACHED_CONTENT_KEY: &str = "cachedContent";
pub const CANDIDATE_COUNT_KEY: &str = "candidateCount";
pub const RESPONSE_MIME_TYPE_KEY: &str = "responseMimeType";
/// Per-call timeout in seconds.
pub const TIMEOUT_KEY: &str = "timeout";

const RECOGNIZED_KEYS: &[&str] = &[
    SYSTEM_INSTRUCTION_KEY,
    CACHED_CONTENT_KEY,
    CANDIDATE_COUNT_KEY,
    RESPONSE_MIME_TYPE_KEY,
    TIMEOUT_KEY,
];

/// Translate a neutral conversation into a `generateContent` request.
///
/// System messages become the system instruction; every other message maps
/// to one `Content`, in order. Unrecognized `additional_properties` are
/// ignored.
pub fn to_generate_content_request(
    messages: &[ChatMessage],
    options: Option<&ChatOptions>,
) -> Result<GenerateContentRequest> {
    let mut system_parts = Vec::new();
    let mut contents = Vec::with_capacity(messages.len());

    for (index, message) in messages.iter().enumerate() {
        if message.role == ChatRole::System {
            system_parts.extend(
                message
                    .contents
                    .iter()
                    .filter_map(AiContent::as_text)
                    .map(Part::text),
            );
            continue;
        }

        if message.contents.is_empty() {
            return Err(GemkitError::Translation(format!(
                "Message {} has no content",
                index
            )));
        }

        let role = match message.role {
            ChatRole::Assistant => "model",
            _ => "user",
        };
        contents.push(Content {
            role: Some(role.to_string()),
            parts: message.contents.iter().cloned().map(translate_content).collect(),
        });
    }

    let mut request = GenerateContentRequest {
        contents,
        ..Default::default()
    };

    if let Some(options) = options {
        log_unrecognized(options);

        if let Some(Value::String(instruction)) =
            options.additional_properties.get(SYSTEM_INSTRUCTION_KEY)
        {
            system_parts.push(Part::text(instruction.clone()));
        }

        request.cached_content = string_property(options, CACHED_CONTENT_KEY)
            .map(|name| sanitize_cached_content_name(&name));

        let tools = translate_tools(&options.tools);
        if !tools.is_empty() {
            request.tools = Some(tools);
        }

        let config = generation_config(options);
        if config != GenerationConfig::default() {
            request.generation_config = Some(config);
        }
    }

    if !system_parts.is_empty() {
        request.system_instruction = Some(Content {
            role: None,
            parts: system_parts,
        });
    }

    debug!(
        "Translated request: {} contents, system: {}, tools: {}",
        request.contents.len(),
        request.system_instruction.is_some(),
        request.tools.as_ref().map_or(0, Vec::len)
    );

    Ok(request)
}

/// Extract the transport settings carried by chat options.
pub fn to_request_options(options: Option<&ChatOptions>) -> RequestOptions {
    let timeout = options
        .and_then(|o| o.additional_properties.get(TIMEOUT_KEY))
        .and_then(Value::as_f64)
        .filter(|secs| *secs > 0.0)
        .and_then(|secs| match Duration::try_from_secs_f64(secs) {
            Ok(timeout) => Some(timeout),
            Err(e) => {
                debug!("Ignoring timeout option {}: {}", secs, e);
                None
            }
        });

    RequestOptions { timeout }
}

fn translate_content(content: AiContent) -> Part {
    match content {
        AiContent::Text { text } => Part::text(text),
        AiContent::Data { mime_type, data } => Part::InlineData {
            inline_data: InlineData {
                mime_type,
                data: BASE64_STANDARD.encode(&data),
            },
        },
        AiContent::FunctionCall {
            call_id,
            name,
            arguments,
        } => translate_function_call(call_id, name, arguments),
        AiContent::FunctionResult {
            call_id,
            name,
            result,
        } => translate_function_result(call_id, name, result),
    }
}

fn generation_config(options: &ChatOptions) -> GenerationConfig {
    let response_mime_type = string_property(options, RESPONSE_MIME_TYPE_KEY).or_else(|| {
        match options.response_format.as_deref() {
            Some("json") => Some("application/json".to_string()),
            Some("text") => Some("text/plain".to_string()),
            _ => None,
        }
    });

    GenerationConfig {
        max_output_tokens: options.max_output_tokens,
        temperature: options.temperature,
        top_p: options.top_p,
        top_k: options.top_k,
        stop_sequences: options.stop_sequences.clone(),
        candidate_count: options
            .additional_properties
            .get(CANDIDATE_COUNT_KEY)
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok()),
        presence_penalty: options.presence_penalty,
        frequency_penalty: options.frequency_penalty,
        seed: options.seed,
        response_mime_type,
    }
}

fn string_property(options: &ChatOptions, key: &str) -> Option<String> {
    options
        .additional_properties
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

fn log_unrecognized(options: &ChatOptions) {
    for key in options.additional_properties.keys() {
        if !RECOGNIZED_KEYS.contains(&key.as_str()) {
            debug!("Ignoring unrecognized chat option: {}", key);
        }
    }
}
