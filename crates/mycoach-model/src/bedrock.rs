//! Bedrock Converse implementation of [`CoachModel`].
//!
//! Each coaching turn is a single user message: the role-tagged transcript
//! and the new input go in one text block, followed by an optional image
//! block. Sending the transcript as text sidesteps Converse's rule that
//! turns strictly alternate between user and assistant, which a stored
//! log with back-to-back bot messages (greeting, apology) would break.

use aws_sdk_bedrockruntime::Client;
use aws_sdk_bedrockruntime::types::{
    ContentBlock, ConversationRole, ImageBlock, ImageFormat, ImageSource, Message,
    SystemContentBlock,
};
use tracing::info;

use crate::error::ModelError;
use crate::model::{CoachModel, CoachRequest, InlineImage};
use crate::prompt;

/// A Bedrock-hosted chat model addressed by inference profile id.
#[derive(Debug, Clone)]
pub struct BedrockCoach {
    client: Client,
    model_id: String,
}

impl BedrockCoach {
    pub fn new(config: &aws_config::SdkConfig, model_id: impl Into<String>) -> Self {
        Self {
            client: Client::new(config),
            model_id: model_id.into(),
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn invoke(&self, system_prompt: &str, message: Message) -> Result<String, ModelError> {
        let response = self
            .client
            .converse()
            .model_id(&self.model_id)
            .system(SystemContentBlock::Text(system_prompt.to_string()))
            .messages(message)
            .send()
            .await
            .map_err(|e| ModelError::Invocation(e.into_service_error().to_string()))?;

        let output_message = response
            .output()
            .and_then(|o| o.as_message().ok())
            .ok_or_else(|| ModelError::ResponseParse("no message in response".to_string()))?;

        let text = output_message
            .content()
            .iter()
            .filter_map(|block| {
                if let ContentBlock::Text(text) = block {
                    Some(text.as_str())
                } else {
                    None
                }
            })
            .collect::<Vec<_>>()
            .join("");

        info!(model_id = %self.model_id, text_len = text.len(), "model responded");

        Ok(text)
    }
}

impl CoachModel for BedrockCoach {
    async fn converse(&self, request: &CoachRequest) -> Result<String, ModelError> {
        let mut builder = Message::builder()
            .role(ConversationRole::User)
            .content(ContentBlock::Text(prompt::turn_text(
                &request.history,
                &request.input,
            )));

        if let Some(image) = &request.image {
            builder = builder.content(ContentBlock::Image(image_block(image)?));
        }

        let message = builder
            .build()
            .map_err(|e| ModelError::Invocation(e.to_string()))?;

        info!(
            model_id = %self.model_id,
            history = request.history.len(),
            has_image = request.image.is_some(),
            "sending coaching turn"
        );

        self.invoke(&request.system_prompt, message).await
    }

    async fn generate_text(&self, system_prompt: &str, prompt: &str) -> Result<String, ModelError> {
        let message = Message::builder()
            .role(ConversationRole::User)
            .content(ContentBlock::Text(prompt.to_string()))
            .build()
            .map_err(|e| ModelError::Invocation(e.to_string()))?;

        self.invoke(system_prompt, message).await
    }
}

fn image_block(image: &InlineImage) -> Result<ImageBlock, ModelError> {
    let format = image_format_for_media_type(&image.media_type)
        .ok_or_else(|| ModelError::UnsupportedImage(image.media_type.clone()))?;

    ImageBlock::builder()
        .format(format)
        .source(ImageSource::Bytes(aws_smithy_types::Blob::new(
            image.data.clone(),
        )))
        .build()
        .map_err(|e| ModelError::InvalidImage(e.to_string()))
}

/// Map an image media type to a Bedrock `ImageFormat`.
///
/// Returns `None` for types Converse does not accept.
pub fn image_format_for_media_type(media_type: &str) -> Option<ImageFormat> {
    match media_type.to_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
        "image/png" => Some(ImageFormat::Png),
        "image/gif" => Some(ImageFormat::Gif),
        "image/webp" => Some(ImageFormat::Webp),
        _ => None,
    }
}
