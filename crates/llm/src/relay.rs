use std::sync::Arc;
use tracing::{debug, info};
use voicebrief_common::Result;

use crate::llm_trait::CompletionClient;
use crate::prompts::SYSTEM_PROMPT_ACK;
use crate::types::{ChatRequest, ChatResponse, Content, Role};

/// Reply used when the model produced no text
pub const FALLBACK_REPLY: &str = "Sorry, I could not generate a response.";

/// Relays client conversations to the completion backend
#[derive(Clone)]
pub struct ChatRelay {
    client: Arc<dyn CompletionClient>,
}

impl ChatRelay {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Upstream turn sequence for a request
    ///
    /// A system prompt becomes a user turn followed by a model acknowledgment,
    /// so the conversation still opens with the user and alternates.
    pub fn build_contents(request: &ChatRequest) -> Vec<Content> {
        let system_prompt = request
            .system_prompt
            .as_deref()
            .filter(|prompt| !prompt.is_empty());

        let mut contents = Vec::with_capacity(request.messages.len() + 2);

        if let Some(prompt) = system_prompt {
            contents.push(Content::user(prompt));
            contents.push(Content::model(SYSTEM_PROMPT_ACK));
        }

        for message in &request.messages {
            let role = match message.role {
                Role::User => Role::User,
                _ => Role::Model,
            };
            contents.push(Content::new(role, message.text.clone()));
        }

        contents
    }

    /// Forward a conversation and return the model's reply
    pub async fn reply(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let contents = Self::build_contents(request);
        info!(
            "Relaying chat - Messages: {}, System prompt: {}",
            request.messages.len(),
            request.system_prompt.is_some()
        );

        let text = self.client.complete(contents).await?;
        let text = text.trim();

        let reply = if text.is_empty() {
            debug!("Empty completion, using fallback reply");
            FALLBACK_REPLY.to_string()
        } else {
            text.to_string()
        };

        Ok(ChatResponse { reply })
    }
}
