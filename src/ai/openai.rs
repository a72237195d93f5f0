use super::{ChatMessage, TextGenerator};
use crate::error::{AgileError, Result};
use crate::types::config::AiSettings;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

const USER_AGENT: &str = concat!("agilemeter/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Serialize)]
struct ChatPayload<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions client for OpenAI-compatible endpoints.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    settings: AiSettings,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>, settings: AiSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            settings,
        })
    }
}

impl TextGenerator for OpenAiClient {
    fn complete(&self, messages: &[ChatMessage], max_tokens: u32) -> Result<String> {
        let payload = ChatPayload {
            model: &self.settings.model,
            messages,
            max_tokens,
            temperature: self.settings.temperature,
        };
        tracing::debug!(model = %self.settings.model, max_tokens, "requesting completion");

        let response = self
            .client
            .post(&self.settings.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .map_err(|err| AgileError::TextGeneration(format!("request failed: {err}")))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(AgileError::TextGeneration(format!(
                "completion api error ({status}): {body}"
            )));
        }
        let parsed: ChatResponse = response
            .json()
            .map_err(|err| AgileError::TextGeneration(format!("response decode failed: {err}")))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| AgileError::TextGeneration("response missing content".to_string()))
    }
}
