// backend/openai.rs
// Hosted backend: OpenAI chat completions with JSON mode

use openai::chat::{
    ChatCompletion, ChatCompletionMessage, ChatCompletionMessageRole, ChatCompletionResponseFormat,
};
use openai::Credentials;

use super::BackendError;

const DEFAULT_MODEL: &str = "gpt-4-turbo";

/// Hosted chat-completion client.
///
/// Credentials come from the environment; a missing API key is detected here
/// at construction and reported on every call, so one misconfiguration is
/// one error per row rather than a crash.
pub struct OpenAiBackend {
    credentials: Option<Credentials>,
    model: String,
}

impl OpenAiBackend {
    /// Build the client from environment variables.
    ///
    /// Reads OPENAI_API_KEY (fallback OPENAI_KEY), OPENAI_BASE_URL, and
    /// OPENAI_MODEL.
    pub fn from_env() -> Self {
        let api_key = std::env::var("OPENAI_API_KEY")
            .or_else(|_| std::env::var("OPENAI_KEY"))
            .unwrap_or_default();
        let base_url = std::env::var("OPENAI_BASE_URL").unwrap_or_default();

        let credentials = if api_key.is_empty() {
            None
        } else {
            Some(Credentials::new(api_key, base_url))
        };

        Self {
            credentials,
            model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Single chat-completion round trip requesting a JSON object reply.
    pub async fn complete_json(&self, system: &str, user: &str) -> Result<String, BackendError> {
        let credentials = self
            .credentials
            .clone()
            .ok_or(BackendError::MissingApiKey)?;

        let messages = vec![
            ChatCompletionMessage {
                role: ChatCompletionMessageRole::System,
                content: Some(system.to_string()),
                name: None,
                function_call: None,
                tool_call_id: None,
                tool_calls: None,
            },
            ChatCompletionMessage {
                role: ChatCompletionMessageRole::User,
                content: Some(user.to_string()),
                name: None,
                function_call: None,
                tool_call_id: None,
                tool_calls: None,
            },
        ];

        let response = ChatCompletion::builder(&self.model, messages)
            .credentials(credentials)
            .response_format(ChatCompletionResponseFormat::json_object())
            .create()
            .await
            .map_err(|e| BackendError::Completion(e.to_string()))?;

        let content = response
            .choices
            .get(0)
            .and_then(|choice| choice.message.content.as_ref())
            .ok_or(BackendError::EmptyReply)?;

        Ok(content.clone())
    }
}
