//! The collaborator seam between the session and a hosted model.

use std::future::Future;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use mycoach_core::models::message::{Message, Sender};

use crate::error::ModelError;

/// Media type assumed for bare base64 payloads without a data-URL header.
pub const DEFAULT_IMAGE_MEDIA_TYPE: &str = "image/jpeg";

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        let role = match message.sender {
            Sender::User => ChatRole::User,
            Sender::Bot => ChatRole::Assistant,
        };
        Self {
            role,
            content: message.text.clone(),
        }
    }
}

/// Decoded image bytes with their media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub media_type: String,
    pub data: Vec<u8>,
}

impl InlineImage {
    /// Decode a `data:<type>;base64,<data>` URL or a bare base64 string.
    pub fn from_payload(payload: &str) -> Result<Self, ModelError> {
        let (media_type, encoded) = match payload.strip_prefix("data:") {
            Some(rest) => {
                let (header, data) = rest
                    .split_once(',')
                    .ok_or_else(|| ModelError::InvalidImage("data URL has no payload".to_string()))?;
                let media_type = header.strip_suffix(";base64").ok_or_else(|| {
                    ModelError::InvalidImage(format!("data URL is not base64: {header}"))
                })?;
                (media_type.to_string(), data)
            }
            None => (DEFAULT_IMAGE_MEDIA_TYPE.to_string(), payload),
        };

        let data = STANDARD
            .decode(encoded.trim())
            .map_err(|e| ModelError::InvalidImage(e.to_string()))?;

        Ok(Self { media_type, data })
    }
}

/// One coaching turn as sent to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct CoachRequest {
    /// Persona and client profile.
    pub system_prompt: String,
    /// Prior turns, oldest first.
    pub history: Vec<ChatMessage>,
    /// The new user input.
    pub input: String,
    pub image: Option<InlineImage>,
}

/// A hosted language model.
///
/// Implementations return the raw reply text; interpreting it is left to
/// [`crate::reply`].
pub trait CoachModel: Send + Sync {
    fn converse(
        &self,
        request: &CoachRequest,
    ) -> impl Future<Output = Result<String, ModelError>> + Send;

    /// Free-text generation from a system prompt and one user prompt.
    fn generate_text(
        &self,
        system_prompt: &str,
        prompt: &str,
    ) -> impl Future<Output = Result<String, ModelError>> + Send;
}
