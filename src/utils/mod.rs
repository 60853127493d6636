//! Utility functions and helpers for gemkit.
//!
//! This module provides cross-cutting concerns shared by every resource
//! client.
//!
//! # Submodules
//!
//! - `logging`: Tracing initialization and secret redaction for log lines.
//! - `url`: Versioned resource URL and query string composition.
//! - `duration`: Protobuf duration strings (`"300s"`) for TTL fields.
//!
//! Author: kelexine (<https://github.com/kelexine>)

pub mod duration;
pub mod logging;
pub mod url;
