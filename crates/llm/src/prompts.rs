//! Prompt templates

/// Fixed instruction for transcript summaries
pub const SUMMARY_PROMPT: &str = "You are a concise assistant. Produce a clear, human-friendly summary of the following transcript.

Requirements:
- Keep it concise (5-7 sentences) unless the content is short.
- Preserve important names, facts, and actions.
- If the transcript appears to be dialogue, indicate speaker turns concisely.";

/// Acknowledgment turn that follows an injected system prompt
pub const SYSTEM_PROMPT_ACK: &str = "I understand. I'm ready to help.";

/// Prompt for transcript summarization
pub fn summary_prompt(transcript: &str) -> String {
    format!("{}\n\nTranscript:\n\n{}", SUMMARY_PROMPT, transcript)
}
