// Streaming chunk translation
// Author: kelexine (https://github.com/kelexine)

use crate::models::chat::{ChatRole, StreamingChatCompletionUpdate};
use crate::models::gemini::GenerateContentResponse;
use crate::translation::response::{candidate_contents, completion_id, finish_reason, to_usage};
use chrono::Utc;

/// Translate one streamed chunk into one update, built from the chunk's
/// first candidate. A chunk without candidates (e.g. trailing usage) still
/// yields an update, with no contents.
pub fn to_streaming_update(chunk: GenerateContentResponse) -> StreamingChatCompletionUpdate {
    let first = chunk.candidates.into_iter().next();
    let choice_index = first.as_ref().and_then(|c| c.index).unwrap_or(0);
    let finish_reason = first.as_ref().and_then(finish_reason);
    let contents = first.map(candidate_contents).unwrap_or_default();

    StreamingChatCompletionUpdate {
        role: Some(ChatRole::Assistant),
        contents,
        choice_index,
        completion_id: Some(completion_id(chunk.response_id)),
        model_id: chunk.model_version,
        created_at: Some(Utc::now()),
        finish_reason,
        usage: chunk.usage_metadata.map(to_usage),
    }
}
