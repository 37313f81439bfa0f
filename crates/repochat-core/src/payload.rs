//! Outgoing message construction for `@file` attachments.

/// An attached file and its fetched content (`None` if the fetch failed)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub path: String,
    pub content: Option<String>,
}

impl Attachment {
    pub fn new(path: impl Into<String>, content: Option<String>) -> Self {
        Self {
            path: path.into(),
            content,
        }
    }

    /// Delimited block for the outgoing message; empty for failed fetches.
    pub fn block(&self) -> String {
        match &self.content {
            Some(content) => format!(
                "\n\n--- File: {path} ---\n{content}\n--- End of {path} ---",
                path = self.path,
            ),
            None => String::new(),
        }
    }
}

/// User text followed by every attachment block, in attachment order.
pub fn build_outgoing_message(text: &str, attachments: &[Attachment]) -> String {
    let mut message = String::from(text);
    for attachment in attachments {
        message.push_str(&attachment.block());
    }
    message
}
