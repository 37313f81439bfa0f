pub mod message;
pub mod event;
pub mod project;
pub mod config;
pub mod error;
pub mod session;
pub mod content;

#[cfg(test)]
mod tests;

pub use error::ChatError;
pub type Result<T> = std::result::Result<T, ChatError>;
