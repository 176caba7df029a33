use crate::domain::model::ChatMessage;
use crate::domain::ports::{ChatModel, ConfigProvider};
use crate::utils::error::{AgentError, Result};
use crate::utils::validation::validate_required_field;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "mixtral-8x7b-32768";
pub const DEFAULT_TEMPERATURE: f32 = 0.0;
pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: AssistantMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: Option<u64>,
    completion_tokens: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

/// OpenAI 相容的 chat completions 客戶端（預設為 Groq）
#[derive(Debug, Clone)]
pub struct GroqClient {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_retries: u32,
    retry_delay: Duration,
}

impl GroqClient {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let api_key = config.api_key().filter(|key| !key.trim().is_empty());
        let api_key = validate_required_field("model.api_key", &api_key)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds()))
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base().trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: config.model().to_string(),
            temperature: config.temperature(),
            max_retries: config.max_retries(),
            retry_delay: Duration::from_millis(config.retry_delay_ms()),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }

    /// 指數退避：第 n 次重試等待 base * 2^(n-1)
    fn backoff(&self, attempt: u32) -> Duration {
        self.retry_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }

    async fn send_once(&self, messages: &[ChatMessage]) -> Result<String> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        tracing::debug!("Model API response status: {}", response.status());

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let text = response.text().await?;
        let completion: ChatCompletionResponse = serde_json::from_str(&text)?;

        if let Some(usage) = &completion.usage {
            tracing::debug!(
                "🔢 Tokens - prompt: {:?}, completion: {:?}",
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::ModelResponseError {
                status: 200,
                message: "response contained no choices".to_string(),
            })?;

        if let Some(reason) = choice.finish_reason.as_deref().filter(|r| *r != "stop") {
            tracing::warn!("⚠️ Model stopped with finish_reason '{}'", reason);
        }

        Ok(choice.message.content.unwrap_or_default())
    }

    async fn error_from_response(response: Response) -> AgentError {
        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return AgentError::ApiError(e),
        };

        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .ok()
            .and_then(|envelope| envelope.error)
            .and_then(|detail| detail.message)
            .unwrap_or(body);

        AgentError::ModelResponseError { status, message }
    }
}

#[async_trait::async_trait]
impl ChatModel for GroqClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let mut attempt = 0;
        loop {
            tracing::debug!(
                "📡 Calling {} (model: {}, attempt {}/{})",
                self.endpoint(),
                self.model,
                attempt + 1,
                self.max_retries + 1
            );

            match self.send_once(messages).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.backoff(attempt);
                    tracing::warn!(
                        "🔁 Model request failed ({}), retry {}/{} in {:?}",
                        e,
                        attempt,
                        self.max_retries,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
