use crate::core::chain::PromptChain;
use crate::core::itinerary::generate_travel_plan;
use crate::core::prompt::PromptSet;
use crate::core::recommendation::{build_recommendation_chain, get_travel_recommendation};
use crate::domain::model::{Recommendation, TravelMode};
use crate::domain::ports::ChatModel;
use crate::utils::error::Result;

/// 旅遊助手：把表單輸入分派給推薦鏈或行程產生器
pub struct TravelAgent<M: ChatModel> {
    model: M,
    prompts: PromptSet,
    chain: PromptChain,
}

impl<M: ChatModel> TravelAgent<M> {
    pub fn new(model: M, prompts: PromptSet) -> Self {
        Self::new_with_monitoring(model, prompts, false)
    }

    pub fn new_with_monitoring(model: M, prompts: PromptSet, monitor_enabled: bool) -> Self {
        let chain = build_recommendation_chain(&prompts, "trip".to_string())
            .with_monitoring(monitor_enabled);
        Self {
            model,
            prompts,
            chain,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn prompts(&self) -> &PromptSet {
        &self.prompts
    }

    pub async fn recommend(&self, interest: &str) -> Result<Recommendation> {
        get_travel_recommendation(&self.model, &self.chain, interest).await
    }

    pub async fn plan(&self, destination: &str) -> Result<String> {
        generate_travel_plan(&self.model, &self.prompts, destination).await
    }

    /// 處理表單輸入；錯誤會轉成顯示給使用者的字串
    pub async fn process_input(&self, mode: TravelMode, user_input: &str) -> String {
        tracing::info!("📝 Processing '{}' with {}", mode, self.model.model_name());

        match mode {
            TravelMode::Recommend => match self.recommend(user_input).await {
                Ok(recommendation) => recommendation.format(),
                Err(e) => {
                    tracing::error!("❌ Recommendation failed: {}", e);
                    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
                    format!("Erro ao processar a recomendação: {}", e)
                }
            },
            TravelMode::Plan => match self.plan(user_input).await {
                Ok(plan) => plan,
                Err(e) => {
                    tracing::error!("❌ Itinerary failed: {}", e);
                    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
                    format!("Erro ao gerar o roteiro: {}", e)
                }
            },
        }
    }

    /// 以下拉選單的顯示文字處理輸入；未知選項不顯示任何內容
    pub async fn process_label(&self, option: &str, user_input: &str) -> String {
        match TravelMode::from_label(option) {
            Some(mode) => self.process_input(mode, user_input).await,
            None => {
                tracing::warn!("⚠️ Unknown option '{}', nothing to do", option);
                String::new()
            }
        }
    }
}
