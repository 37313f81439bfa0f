//! Browser adapters for the repochat-core ports.

pub mod body;
pub mod http;

pub use http::HttpChatApi;
