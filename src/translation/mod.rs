// Translation module - neutral chat ↔ Gemini API translation
// Author: kelexine (https://github.com/kelexine)

pub mod request;
pub mod response;
pub mod streaming;
pub mod tools;

pub use request::{to_generate_content_request, to_request_options};
pub use response::to_chat_completion;
pub use streaming::to_streaming_update;
