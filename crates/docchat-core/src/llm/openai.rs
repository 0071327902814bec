use crate::constants::endpoints;
use crate::error::ChatError;
use crate::llm::traits::*;
use serde::{Deserialize, Serialize};

/// Client for OpenAI-compatible chat-completion endpoints (Groq by default).
pub struct OpenAiCompatClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiCompatClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: endpoints::GROQ_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    max_tokens: u32,
}

#[async_trait::async_trait]
impl LlmClient for OpenAiCompatClient {
    async fn chat(
        &self,
        messages: &[Message],
        params: &SamplingParams,
    ) -> Result<LlmResponse, ChatError> {
        let url = format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            endpoints::CHAT_COMPLETIONS_PATH
        );

        let request_body = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(ChatError::Llm(format!(
                "API error ({}): {}",
                status, response_text
            )));
        }

        let api_response: ChatCompletionResponse = serde_json::from_str(&response_text)
            .map_err(|e| ChatError::Llm(format!("Failed to parse response: {e}")))?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ChatError::Llm("No response from API".into()))?;

        Ok(LlmResponse {
            content: choice.message.content.unwrap_or_default(),
            usage: api_response.usage.map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            }),
        })
    }
}

/// Default connector: every catalogue model is served from one
/// OpenAI-compatible base URL.
#[derive(Debug, Clone)]
pub struct OpenAiCompatConnector {
    base_url: String,
}

impl OpenAiCompatConnector {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for OpenAiCompatConnector {
    fn default() -> Self {
        Self::new(endpoints::GROQ_BASE_URL)
    }
}

impl Connector for OpenAiCompatConnector {
    fn connect(&self, model_id: &str, api_key: &str) -> Result<Box<dyn LlmClient>, ChatError> {
        let client = OpenAiCompatClient::new(api_key, model_id).with_base_url(&self.base_url);
        Ok(Box::new(client))
    }
}
