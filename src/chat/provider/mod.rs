// src/chat/provider/mod.rs

pub mod gemini;

pub use gemini::GeminiClient;
