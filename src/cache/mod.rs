// Cached content management module
// Author: kelexine (https://github.com/kelexine)

pub mod manager;
pub mod models;

pub use manager::{CachedContentManager, DEFAULT_PAGE_SIZE, DEFAULT_TTL};
pub use models::{CachedContent, ListCachedContentsResponse};
