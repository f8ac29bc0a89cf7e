// src/chat/mod.rs
//! Subject-scoped chat: one live session at a time, primed per subject,
//! backed by the generative-language upstream through `GenerativeBackend`.

pub mod provider;
pub mod session;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use session::{ChatFlow, ChatSession, SendOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// One entry of the display log. Append-only, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self { sender: Sender::User, text: text.into() }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self { sender: Sender::Assistant, text: text.into() }
    }
}

/// Seam between the chat flow and the conversational upstream. The session's
/// prior turns are replayed on every call so multi-turn context survives a
/// stateless REST upstream.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn generate(&self, system: &str, history: &[Message], input: &str) -> Result<String>;
}
