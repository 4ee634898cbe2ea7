//! Protocol messages.
//!
//! Everything the server pushes is an [`Envelope`]. Everything the client
//! writes is a [`ClientFrame`], which may carry an envelope as its body.

use crate::{NotificationDraft, NotificationRecord, ProtocolFault, Topic};
use serde::{Deserialize, Serialize};

/// A typed `{ "type": KIND, "content": {...} }` message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Envelope {
    /// A delivered notification.
    Notification(NotificationRecord),
    /// A client request to create a notification.
    NewNotification(NotificationDraft),
    /// Failure reported by the server.
    Error(ProtocolFault),
}

impl Envelope {
    /// Every recognised `type` value.
    pub const KINDS: [&'static str; 3] = ["NOTIFICATION", "NEW_NOTIFICATION", "ERROR"];

    /// The wire name of this envelope's kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Envelope::Notification(_) => "NOTIFICATION",
            Envelope::NewNotification(_) => "NEW_NOTIFICATION",
            Envelope::Error(_) => "ERROR",
        }
    }
}

impl From<NotificationDraft> for Envelope {
    fn from(draft: NotificationDraft) -> Self {
        Envelope::NewNotification(draft)
    }
}

/// Frames sent from client to server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientFrame {
    /// Start receiving messages published to a topic.
    Subscribe { destination: Topic },
    /// Stop receiving messages from a topic.
    Unsubscribe { destination: Topic },
    /// Publish an envelope.
    Send { destination: Topic, body: Envelope },
}
