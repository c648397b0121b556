//! Conversation about one analyzed page.

use crate::api::{ApiClient, ApiResponse, FailureKind};
use crate::config::UiConfig;
use crate::models::{ChatMessage, UrlRecord, TRUNCATION_MARKER};

use super::{session_expired, Toast, ViewUpdate};

/// Placeholder answer after a failed question.
pub const CHAT_ERROR_REPLY: &str = "Sorry, I encountered an error processing your request.";

/// Placeholder answer when the page content exceeded the model's limits.
pub const CONTENT_TOO_LARGE_REPLY: &str = "The webpage content is too large for me to process completely. I can only analyze a portion of it. Please ask about specific sections or keep your questions focused on the main content.";

/// One display line of an assistant message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLine {
    /// `* item` bullet, marker stripped
    Bullet(String),
    /// Notice that the page content was cut short
    TruncationNotice(String),
    Text(String),
}

/// Split a message into display lines, recognising bullets and truncation
/// notices.
pub fn format_message(text: &str) -> Vec<MessageLine> {
    text.lines()
        .map(|line| {
            let trimmed = line.trim_start();
            if let Some(item) = trimmed.strip_prefix('*') {
                MessageLine::Bullet(item.trim_start().to_string())
            } else if line.contains(TRUNCATION_MARKER) {
                MessageLine::TruncationNotice(line.to_string())
            } else {
                MessageLine::Text(line.to_string())
            }
        })
        .collect()
}

/// Chat page state for the record `url_id`.
#[derive(Debug, Clone)]
pub struct ChatView {
    api: ApiClient,
    ui: UiConfig,
    url_id: String,
    record: Option<UrlRecord>,
    messages: Vec<ChatMessage>,
    content_truncated: bool,
}

impl ChatView {
    pub fn new(api: ApiClient, ui: UiConfig, url_id: impl Into<String>) -> Self {
        Self {
            api,
            ui,
            url_id: url_id.into(),
            record: None,
            messages: Vec::new(),
            content_truncated: false,
        }
    }

    pub fn url_id(&self) -> &str {
        &self.url_id
    }

    pub fn record(&self) -> Option<&UrlRecord> {
        self.record.as_ref()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Whether any answer so far was based on truncated page content.
    pub fn content_truncated(&self) -> bool {
        self.content_truncated
    }

    /// Whether a question is awaiting its answer.
    pub fn is_waiting(&self) -> bool {
        self.messages.iter().any(|m| m.loading)
    }

    fn redirect_target(&self) -> String {
        format!("chat/{}", self.url_id)
    }

    /// Fetch the record and the conversation so far.
    pub async fn load(&mut self) -> ViewUpdate {
        match self.api.get_url(&self.url_id).await {
            ApiResponse::Success(record) => self.record = Some(record),
            ApiResponse::Failure(failure) if failure.is_auth() => {
                return session_expired(&self.ui, Some(&self.redirect_target()));
            }
            ApiResponse::Failure(failure) => {
                return ViewUpdate::none().with(Toast::error(failure.message));
            }
        }

        match self.api.chat_history(&self.url_id).await {
            ApiResponse::Success(history) => {
                self.content_truncated = history.messages.iter().any(|m| m.mentions_truncation());
                self.messages = history.messages;
                ViewUpdate::none()
            }
            ApiResponse::Failure(failure) if failure.is_auth() => {
                session_expired(&self.ui, Some(&self.redirect_target()))
            }
            ApiResponse::Failure(failure) => {
                tracing::warn!("Failed to load chat history: {}", failure);
                ViewUpdate::none().with(Toast::error(failure.message))
            }
        }
    }

    /// Ask `question` about the page.
    ///
    /// The question and a loading placeholder are appended immediately; the
    /// placeholder is then replaced by the answer or an apology. Blank
    /// questions are ignored.
    pub async fn send(&mut self, question: &str) -> ViewUpdate {
        if question.trim().is_empty() {
            return ViewUpdate::none();
        }

        self.messages.push(ChatMessage::user(question));
        self.messages.push(ChatMessage::pending());

        match self.api.ask_question(&self.url_id, question).await {
            ApiResponse::Success(reply) => {
                if reply.answer.contains(TRUNCATION_MARKER) {
                    self.content_truncated = true;
                }
                self.resolve_pending(Some(ChatMessage::assistant(reply.answer)));
                ViewUpdate::none()
            }
            ApiResponse::Failure(failure) if failure.is_auth() => {
                self.resolve_pending(None);
                session_expired(&self.ui, Some(&self.redirect_target()))
            }
            ApiResponse::Failure(failure) => {
                let reply = if failure.kind == FailureKind::ContentTooLarge {
                    self.content_truncated = true;
                    CONTENT_TOO_LARGE_REPLY
                } else {
                    CHAT_ERROR_REPLY
                };
                self.resolve_pending(Some(ChatMessage::assistant(reply)));
                ViewUpdate::none().with(Toast::error(failure.message))
            }
        }
    }

    /// Replace the loading placeholder, or drop it when `replacement` is
    /// `None`.
    fn resolve_pending(&mut self, replacement: Option<ChatMessage>) {
        let Some(index) = self.messages.iter().rposition(|m| m.loading) else {
            return;
        };
        match replacement {
            Some(message) => self.messages[index] = message,
            None => {
                self.messages.remove(index);
            }
        }
    }
}
