use crate::domain::model::ChatMessage;
use crate::utils::error::Result;
use async_trait::async_trait;

/// 託管語言模型的介面：送出訊息，取回回覆文字
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;

    fn model_name(&self) -> &str;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base(&self) -> &str;
    fn api_key(&self) -> Option<&str>;
    fn model(&self) -> &str;
    fn temperature(&self) -> f32;
    fn max_retries(&self) -> u32;
    fn retry_delay_ms(&self) -> u64;
    fn timeout_seconds(&self) -> u64;
}
