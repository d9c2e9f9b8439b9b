// backend/mod.rs
// Model backends - one classification capability, two interchangeable clients

pub mod ollama;
pub mod openai;

use self::ollama::OllamaBackend;
use self::openai::OpenAiBackend;

/// Errors from a model backend call
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// No API key configured for the hosted backend.
    #[error("hosted backend is not configured; set OPENAI_API_KEY")]
    MissingApiKey,
    /// HTTP transport error (connection refused, DNS, timeout).
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// Backend returned a non-2xx status.
    #[error("{endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response envelope could not be deserialized.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// Hosted chat completion failed.
    #[error("chat completion failed: {0}")]
    Completion(String),
    /// Backend answered with no usable content.
    #[error("model reply was empty")]
    EmptyReply,
}

/// A model backend that answers a system+user prompt with a JSON object.
///
/// The batch driver and the analyzer only see this enum; which variant is
/// active is decided once at startup from the environment.
pub enum Backend {
    Hosted(OpenAiBackend),
    Local(OllamaBackend),
}

/// Which backend `from_env` should construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Hosted,
    Local,
}

impl Backend {
    /// Select and construct a backend from the environment.
    ///
    /// `ANALYZER_BACKEND=openai|ollama` wins when set; otherwise the hosted
    /// backend is used when an API key is present, the local one when not.
    pub fn from_env() -> Self {
        let choice = std::env::var("ANALYZER_BACKEND").unwrap_or_default();
        let has_api_key = std::env::var("OPENAI_API_KEY")
            .or_else(|_| std::env::var("OPENAI_KEY"))
            .map(|k| !k.is_empty())
            .unwrap_or(false);

        match select_backend(&choice, has_api_key) {
            Ok(BackendKind::Hosted) => Backend::Hosted(OpenAiBackend::from_env()),
            Ok(BackendKind::Local) => Backend::Local(OllamaBackend::from_env()),
            Err(unknown) => {
                tracing::warn!(
                    "unknown ANALYZER_BACKEND '{unknown}', expected 'openai' or 'ollama'"
                );
                if has_api_key {
                    Backend::Hosted(OpenAiBackend::from_env())
                } else {
                    Backend::Local(OllamaBackend::from_env())
                }
            }
        }
    }

    /// One round trip: send the prompt, return the raw reply text.
    pub async fn complete_json(&self, system: &str, user: &str) -> Result<String, BackendError> {
        match self {
            Backend::Hosted(client) => client.complete_json(system, user).await,
            Backend::Local(client) => client.complete_json(system, user).await,
        }
    }

    /// Human-readable description for the startup banner.
    pub fn describe(&self) -> String {
        match self {
            Backend::Hosted(client) => {
                format!("OpenAI chat completions (model {})", client.model())
            }
            Backend::Local(client) => {
                format!("Ollama at {} (model {})", client.base_url(), client.model())
            }
        }
    }

    /// Extra startup hint, printed under the banner when relevant.
    pub fn startup_hint(&self) -> Option<String> {
        match self {
            Backend::Hosted(_) => None,
            Backend::Local(client) => Some(format!(
                "Make sure the model server is running (ollama serve) and the model is pulled (ollama pull {})",
                client.model()
            )),
        }
    }
}

/// Pure selection rule, kept separate from env access so it can be tested.
fn select_backend(choice: &str, has_api_key: bool) -> Result<BackendKind, String> {
    match choice {
        "openai" => Ok(BackendKind::Hosted),
        "ollama" => Ok(BackendKind::Local),
        "" => Ok(if has_api_key {
            BackendKind::Hosted
        } else {
            BackendKind::Local
        }),
        other => Err(other.to_string()),
    }
}

/// Truncate a response body for error messages.
pub(crate) fn excerpt(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let cut: String = body.chars().take(MAX).collect();
        format!("{cut}...")
    }
}
