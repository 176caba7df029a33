use crate::core::prompt::PromptSet;
use crate::domain::model::ChatMessage;
use crate::domain::ports::ChatModel;
use crate::utils::error::{AgentError, Result};
use crate::utils::validation::validate_user_input;
use std::collections::HashMap;

/// 使用者已有目的地：單一提示產生完整行程
pub async fn generate_travel_plan(
    model: &dyn ChatModel,
    prompts: &PromptSet,
    dest: &str,
) -> Result<String> {
    validate_user_input("destination", dest)?;

    let mut variables = HashMap::new();
    variables.insert("dest".to_string(), dest.trim().to_string());
    let prompt = prompts.itinerary.render(&variables)?;

    tracing::info!("🗺️ Generating itinerary for '{}'", dest.trim());
    let reply = model.complete(&[ChatMessage::user(prompt)]).await?;

    let plan = reply.trim();
    if plan.is_empty() {
        return Err(AgentError::EmptyCompletion {
            step: "itinerary".to_string(),
        });
    }
    Ok(plan.to_string())
}
