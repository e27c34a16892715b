use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One chat turn. Messages are append-only once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub text: String,
    pub sender: Sender,
    pub timestamp: jiff::Timestamp,
    /// Attached image as a data URL or bare base64.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Bot,
}

impl Message {
    pub fn user(text: impl Into<String>, image: Option<String>, timestamp: jiff::Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            sender: Sender::User,
            timestamp,
            image,
        }
    }

    pub fn bot(text: impl Into<String>, timestamp: jiff::Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            sender: Sender::Bot,
            timestamp,
            image: None,
        }
    }
}
