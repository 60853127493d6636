// Response translation (Gemini → neutral chat)
// Author: kelexine (https://github.com/kelexine)

use crate::models::chat::{AiContent, ChatCompletion, ChatFinishReason, ChatMessage, ChatRole, UsageDetails};
use crate::models::gemini::{Candidate, GenerateContentResponse, Part, UsageMetadata};
use base64::prelude::*;
use bytes::Bytes;
use chrono::Utc;
use tracing::{debug, warn};

/// Translate a `generateContent` response into a neutral completion.
///
/// One choice per candidate, in candidate order. A missing response maps to
/// a completion without choices.
pub fn to_chat_completion(response: Option<GenerateContentResponse>) -> ChatCompletion {
    let Some(response) = response else {
        debug!("No response to translate, returning empty completion");
        return ChatCompletion::empty();
    };

    let finish_reason = response.candidates.first().and_then(finish_reason);
    let choices = response
        .candidates
        .into_iter()
        .map(|candidate| ChatMessage::new(ChatRole::Assistant, candidate_contents(candidate)))
        .collect::<Vec<_>>();

    debug!("Translated response: {} choices", choices.len());

    ChatCompletion {
        choices,
        completion_id: Some(completion_id(response.response_id)),
        model_id: response.model_version,
        created_at: Some(Utc::now()),
        finish_reason,
        usage: response.usage_metadata.map(to_usage),
    }
}

/// Neutral contents of a candidate. Thought summaries are dropped; code
/// execution parts become text.
pub fn candidate_contents(candidate: Candidate) -> Vec<AiContent> {
    candidate
        .content
        .map(|content| content.parts.into_iter().filter_map(translate_part).collect())
        .unwrap_or_default()
}

fn translate_part(part: Part) -> Option<AiContent> {
    match part {
        Part::Text {
            thought: Some(true),
            ..
        } => None,
        Part::Text { text, .. } => Some(AiContent::Text { text }),
        Part::InlineData { inline_data } => match BASE64_STANDARD.decode(inline_data.data.as_bytes()) {
            Ok(data) => Some(AiContent::Data {
                mime_type: inline_data.mime_type,
                data: Bytes::from(data),
            }),
            Err(e) => {
                warn!("Dropping inline data with invalid base64: {}", e);
                None
            }
        },
        Part::FunctionCall { function_call, .. } => Some(AiContent::FunctionCall {
            call_id: function_call.id,
            name: function_call.name,
            arguments: function_call.args,
        }),
        Part::FunctionResponse { function_response } => Some(AiContent::FunctionResult {
            call_id: function_response.id,
            name: function_response.name,
            result: function_response.response,
        }),
        Part::ExecutableCode { executable_code } => Some(AiContent::Text {
            text: format!(
                "```{}\n{}\n```",
                executable_code.language.to_lowercase(),
                executable_code.code
            ),
        }),
        Part::CodeExecutionResult {
            code_execution_result,
        } => Some(AiContent::Text {
            text: code_execution_result.output.unwrap_or_default(),
        }),
    }
}

/// Map a candidate's finish reason. A candidate that asks for function
/// calls reports `ToolCalls` regardless of the server's reason.
pub fn finish_reason(candidate: &Candidate) -> Option<ChatFinishReason> {
    let calls_functions = candidate.content.as_ref().is_some_and(|content| {
        content
            .parts
            .iter()
            .any(|part| matches!(part, Part::FunctionCall { .. }))
    });
    if calls_functions {
        return Some(ChatFinishReason::ToolCalls);
    }

    map_finish_reason(candidate.finish_reason.as_deref())
}

fn map_finish_reason(reason: Option<&str>) -> Option<ChatFinishReason> {
    match reason? {
        "STOP" => Some(ChatFinishReason::Stop),
        "MAX_TOKENS" => Some(ChatFinishReason::Length),
        "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII"
        | "IMAGE_SAFETY" => Some(ChatFinishReason::ContentFilter),
        "MALFORMED_FUNCTION_CALL" => Some(ChatFinishReason::ToolCalls),
        "FINISH_REASON_UNSPECIFIED" | "OTHER" | "LANGUAGE" => None,
        other => {
            warn!("Unknown finish reason: {}", other);
            None
        }
    }
}

pub fn to_usage(usage: UsageMetadata) -> UsageDetails {
    UsageDetails {
        input_token_count: usage.prompt_token_count,
        output_token_count: usage.candidates_token_count,
        total_token_count: usage.total_token_count,
        cached_input_token_count: usage.cached_content_token_count,
    }
}

/// The server's response id, else a fresh one.
pub fn completion_id(response_id: Option<String>) -> String {
    response_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}
