//! VoiceBrief LLM Integration
//!
//! Gemini API client, chat relay and transcript summarization

mod client;
mod llm_trait;
mod prompts;
mod relay;
mod summarize;
mod types;

pub use client::{parse_success_body, upstream_error_message, GeminiClient};
pub use llm_trait::CompletionClient;
pub use prompts::{summary_prompt, SUMMARY_PROMPT, SYSTEM_PROMPT_ACK};
pub use relay::{ChatRelay, FALLBACK_REPLY};
pub use summarize::{truncate_chars, Summarizer, DEFAULT_MAX_CHARS};
pub use types::{
    Candidate, CandidateContent, ChatMessage, ChatRequest, ChatResponse, Content,
    GenerateContentRequest, GenerateContentResponse, Part, Role, Summary,
};
