// src/chat/provider/gemini.rs
//! Client for the generative-language `generateContent` REST upstream.
//!
//! Auth is asymmetric on purpose: the secret rides in the URL query *and* as
//! a bearer header. That mirrors the upstream contract the gateway fronts,
//! not a choice of this crate.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::super::{GenerativeBackend, Message, Sender};

pub struct GeminiClient {
    client: HttpClient,
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: HttpClient::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            timeout,
        }
    }

    fn generate_url(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        )
    }

    /// Forward a single user message and return the upstream JSON body
    /// verbatim. Used by the gateway passthrough route.
    pub async fn generate_raw(&self, model: Option<&str>, message: &str) -> Result<Value> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart { text: message.to_string() }],
            }],
            system_instruction: None,
        };

        let response = self
            .client
            .post(self.generate_url(model.unwrap_or(&self.model)))
            .bearer_auth(&self.api_key)
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error: {} - {}", status, body);
        }

        Ok(response.json().await?)
    }

    /// Build Gemini contents from prior turns plus the current input.
    fn build_contents(history: &[Message], input: &str) -> Vec<GeminiContent> {
        let mut contents = Vec::new();

        for msg in history {
            let role = match msg.sender {
                Sender::User => "user",
                Sender::Assistant => "model",
            };
            contents.push(GeminiContent {
                role: role.to_string(),
                parts: vec![GeminiPart { text: msg.text.clone() }],
            });
        }

        contents.push(GeminiContent {
            role: "user".to_string(),
            parts: vec![GeminiPart { text: input.to_string() }],
        });

        contents
    }

    /// Parse the first candidate's text parts into one reply string.
    fn parse_response(response: GeminiResponse) -> Result<String> {
        if let Some(error) = response.error {
            anyhow::bail!("Gemini error: {}", error.message);
        }

        let mut text = String::new();
        if let Some(candidates) = response.candidates {
            if let Some(candidate) = candidates.into_iter().next() {
                for part in candidate.content.parts {
                    if let Some(t) = part.text {
                        text.push_str(&t);
                    }
                }
            }
        }

        if text.is_empty() {
            anyhow::bail!("Gemini response contained no text");
        }
        Ok(text)
    }
}

#[async_trait]
impl GenerativeBackend for GeminiClient {
    async fn generate(&self, system: &str, history: &[Message], input: &str) -> Result<String> {
        let request = GeminiRequest {
            contents: Self::build_contents(history, input),
            system_instruction: Some(GeminiSystemInstruction {
                parts: vec![GeminiPart { text: system.to_string() }],
            }),
        };

        let response = self
            .client
            .post(self.generate_url(&self.model))
            .bearer_auth(&self.api_key)
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error: {} - {}", status, body);
        }

        let api_response: GeminiResponse = response.json().await?;
        Self::parse_response(api_response)
    }
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction>,
}

#[derive(Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiError>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiContentResponse,
}

#[derive(Deserialize)]
struct GeminiContentResponse {
    parts: Vec<GeminiPartResponse>,
}

#[derive(Deserialize)]
struct GeminiPartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct GeminiError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_contents() {
        let history = vec![
            Message::user("Hello"),
            Message::assistant("Hi there!"),
        ];

        let contents = GeminiClient::build_contents(&history, "How are you?");
        assert_eq!(contents.len(), 3); // 2 history + 1 current
        assert_eq!(contents[0].role, "user");
        assert_eq!(contents[1].role, "model");
        assert_eq!(contents[2].role, "user");
        assert_eq!(contents[2].parts[0].text, "How are you?");
    }

    #[test]
    fn test_parse_response_first_candidate_text() {
        let response: GeminiResponse = serde_json::from_value(serde_json::json!({
            "candidates": [
                { "content": { "parts": [ { "text": "They run " }, { "text": "a food bank." } ] } },
                { "content": { "parts": [ { "text": "ignored" } ] } }
            ]
        }))
        .unwrap();

        let text = GeminiClient::parse_response(response).unwrap();
        assert_eq!(text, "They run a food bank.");
    }

    #[test]
    fn test_parse_response_upstream_error() {
        let response: GeminiResponse = serde_json::from_value(serde_json::json!({
            "error": { "message": "quota exceeded" }
        }))
        .unwrap();

        assert!(GeminiClient::parse_response(response).is_err());
    }

    #[test]
    fn test_generate_url_keys_in_query() {
        let client = GeminiClient::new(
            "https://example.test/v1beta",
            "secret",
            "gemini-1.5-flash",
            Duration::from_secs(10),
        );
        assert_eq!(
            client.generate_url("gemini-1.5-flash"),
            "https://example.test/v1beta/models/gemini-1.5-flash:generateContent?key=secret"
        );
    }
}
