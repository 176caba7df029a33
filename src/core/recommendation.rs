use crate::core::chain::{OutputParser, PromptChain, PromptStep};
use crate::core::prompt::PromptSet;
use crate::domain::model::Recommendation;
use crate::domain::ports::ChatModel;
use crate::utils::error::{AgentError, Result};
use crate::utils::validation::validate_user_input;
use std::collections::HashMap;

pub const DESTINATION_STEP: &str = "get_destination";
pub const ABOUT_STEP: &str = "about";
pub const RESTAURANTS_STEP: &str = "restaurants";
pub const CULTURAL_ACTIVITIES_STEP: &str = "cultural_activities";

/// 推薦鏈：目的地 → 歷史 → 餐廳 → 文化活動
pub fn build_recommendation_chain(prompts: &PromptSet, chain_name: String) -> PromptChain {
    let system = prompts.system.clone();

    PromptChain::new(chain_name)
        .step(
            PromptStep::new(DESTINATION_STEP, prompts.destination.clone())
                .with_system(system.clone())
                .with_output_key("destination")
                .with_parser(OutputParser::Name),
        )
        .step(PromptStep::new(ABOUT_STEP, prompts.about.clone()).with_system(system.clone()))
        .step(
            PromptStep::new(RESTAURANTS_STEP, prompts.restaurants.clone())
                .with_system(system.clone()),
        )
        .step(
            PromptStep::new(CULTURAL_ACTIVITIES_STEP, prompts.cultural_activities.clone())
                .with_system(system),
        )
}

pub async fn get_travel_recommendation(
    model: &dyn ChatModel,
    chain: &PromptChain,
    interest: &str,
) -> Result<Recommendation> {
    validate_user_input("interest", interest)?;

    let mut variables = HashMap::new();
    variables.insert("interest".to_string(), interest.trim().to_string());

    tracing::info!("🧭 Looking for a destination matching '{}'", interest.trim());
    let context = chain.execute(model, variables).await?;

    let take = |key: &str| -> Result<String> {
        context
            .get_variable(key)
            .map(str::to_string)
            .ok_or_else(|| AgentError::ChainStepError {
                stage: key.to_string(),
                details: "step produced no output".to_string(),
            })
    };

    let recommendation = Recommendation {
        destination: take("destination")?,
        about: take(ABOUT_STEP)?,
        restaurants: take(RESTAURANTS_STEP)?,
        cultural_activities: take(CULTURAL_ACTIVITIES_STEP)?,
    };

    tracing::info!("📍 Recommended destination: {}", recommendation.destination);
    tracing::debug!(
        "📊 Chain summary: {:?}",
        PromptChain::get_execution_summary(&context.previous_results)
    );

    Ok(recommendation)
}
