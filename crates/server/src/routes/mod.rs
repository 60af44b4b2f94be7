pub mod chat;
pub mod system;
pub mod transcribe;
