//! Wire types exchanged with the URL analyzer API
//!
//! All authoritative state lives on the server; these types are read-only
//! snapshots. Field names follow the service's camelCase JSON and every
//! optional field tolerates absence so that partially populated records
//! still decode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marker the assistant appends when the page content had to be cut short.
pub const TRUNCATION_MARKER: &str = "Content truncated due to token limit";

/// Profile of the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Display name
    #[serde(default)]
    pub username: String,

    /// Account email
    #[serde(default)]
    pub email: String,

    /// Account creation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Subscription tier, `Free` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,

    /// Account status, `Active` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl UserProfile {
    /// Plan label with the service default applied
    pub fn plan_label(&self) -> &str {
        self.plan.as_deref().unwrap_or("Free")
    }

    /// Status label with the service default applied
    pub fn status_label(&self) -> &str {
        self.status.as_deref().unwrap_or("Active")
    }
}

/// Metadata extracted from the analyzed page's head.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
}

/// A URL analysis record as created server-side by `POST /urls/analyze`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlRecord {
    /// Server identifier
    #[serde(rename = "_id")]
    pub id: String,

    /// URL as submitted by the user
    #[serde(default)]
    pub original_url: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub metadata: PageMetadata,

    /// Page headings in document order
    #[serde(default)]
    pub headings: Vec<String>,

    /// Excerpt of the page text
    #[serde(default)]
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl UrlRecord {
    /// Title shortened for list and header display.
    ///
    /// Falls back to the original URL when the page has no title.
    pub fn short_title(&self, max_chars: usize) -> String {
        let title = if self.title.trim().is_empty() {
            self.original_url.as_str()
        } else {
            self.title.as_str()
        };
        truncate_chars(title, max_chars)
    }
}

/// Shorten `text` to at most `max_chars` characters, appending `...` when cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of a per-record conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,

    #[serde(default)]
    pub content: String,

    /// Placeholder for a pending answer; never sent or persisted.
    #[serde(skip)]
    pub loading: bool,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            loading: false,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            loading: false,
        }
    }

    /// Empty assistant message shown while a question is in flight
    pub fn pending() -> Self {
        Self {
            role: Role::Assistant,
            content: String::new(),
            loading: true,
        }
    }

    /// Whether this assistant message reports truncated page content
    pub fn mentions_truncation(&self) -> bool {
        self.role == Role::Assistant && self.content.contains(TRUNCATION_MARKER)
    }
}

/// Body of `GET /chat/history/:id`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatHistory {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

/// Body of `POST /chat/ask`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
}

/// Body of a successful registration verification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Body of `POST /auth/login`.
///
/// Either carries a credential, or asks the client to complete email
/// verification first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,

    #[serde(default)]
    pub needs_verification: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Generic `{ success?, message? }` acknowledgement body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Request body for `POST /auth/register`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}
