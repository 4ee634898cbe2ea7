//! Notification payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn general() -> String {
    "general".to_string()
}

/// A reference to the entity a notification is about (a task, a project, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    /// Entity type, e.g. `"task"`.
    pub kind: String,
    pub id: u64,
}

/// A notification as delivered by the server.
///
/// The client never mutates a received record; it is either appended to
/// history or discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    pub id: u64,
    /// Human-readable text.
    pub content: String,
    /// The user the notification originated from.
    pub user_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_entity: Option<EntityRef>,
    #[serde(default, alias = "isRead")]
    pub read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Notification category, used to filter history.
    #[serde(default = "general")]
    pub category: String,
}

impl NotificationRecord {
    /// Create an unread record in the `general` category.
    pub fn new(id: u64, content: impl Into<String>, user_id: u64) -> Self {
        Self {
            id,
            content: content.into(),
            user_id,
            related_entity: None,
            read: false,
            created_at: None,
            category: general(),
        }
    }

    /// Set the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

/// A notification a client asks the server to create and fan out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDraft {
    pub content: String,
    pub user_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_entity: Option<EntityRef>,
    #[serde(default = "general")]
    pub category: String,
}

impl NotificationDraft {
    pub fn new(content: impl Into<String>, user_id: u64) -> Self {
        Self {
            content: content.into(),
            user_id,
            related_entity: None,
            category: general(),
        }
    }

    /// Attach the entity the notification refers to.
    pub fn about(mut self, kind: impl Into<String>, id: u64) -> Self {
        self.related_entity = Some(EntityRef {
            kind: kind.into(),
            id,
        });
        self
    }
}

/// A failure reported by the remote side after the connection is up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolFault {
    pub message: String,
}
