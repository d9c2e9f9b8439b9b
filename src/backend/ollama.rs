// backend/ollama.rs
// Local backend: Ollama-style model server reached over HTTP

use serde::{Deserialize, Serialize};

use super::{excerpt, BackendError};

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "deepseek-r1";

/// Client for a locally served model speaking the Ollama chat protocol.
pub struct OllamaBackend {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    format: &'a str,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatReply {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: String,
}

impl OllamaBackend {
    /// Build the client from environment variables.
    ///
    /// Reads OLLAMA_BASE_URL and OLLAMA_MODEL.
    pub fn from_env() -> Self {
        let base_url = std::env::var("OLLAMA_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Single non-streaming chat round trip requesting a JSON-formatted reply.
    pub async fn complete_json(&self, system: &str, user: &str) -> Result<String, BackendError> {
        let endpoint = format!("{}/api/chat", self.base_url);

        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            stream: false,
            format: "json",
        };

        let resp = self
            .client
            .post(&endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                endpoint,
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }

        let reply: ChatReply = resp.json().await.map_err(|e| BackendError::Deserialization {
            endpoint: endpoint.clone(),
            source: e,
        })?;

        if reply.message.content.trim().is_empty() {
            return Err(BackendError::EmptyReply);
        }

        Ok(reply.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_envelope_extracts_message_content() {
        let raw = r#"{"model":"deepseek-r1","message":{"role":"assistant","content":"{\"ok\":true}"},"done":true}"#;
        let reply: ChatReply = serde_json::from_str(raw).unwrap();
        assert_eq!(reply.message.content, r#"{"ok":true}"#);
    }

    #[test]
    fn request_body_is_non_streaming_json_mode() {
        let body = ChatRequest {
            model: "deepseek-r1",
            messages: vec![ChatMessage {
                role: "user",
                content: "hello",
            }],
            stream: false,
            format: "json",
        };
        let raw = serde_json::to_value(&body).unwrap();
        assert_eq!(raw["stream"], serde_json::Value::Bool(false));
        assert_eq!(raw["format"], "json");
        assert_eq!(raw["messages"][0]["role"], "user");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let backend = OllamaBackend {
            client: reqwest::Client::new(),
            base_url: "http://localhost:11434/".trim_end_matches('/').to_string(),
            model: DEFAULT_MODEL.to_string(),
        };
        assert_eq!(backend.base_url(), "http://localhost:11434");
    }
}
