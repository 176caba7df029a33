use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// 表單下拉選單的兩種模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    /// 依興趣推薦城市或國家
    Recommend,
    /// 使用者已有目的地，直接產生行程
    Plan,
}

impl TravelMode {
    pub const ALL: [TravelMode; 2] = [TravelMode::Recommend, TravelMode::Plan];

    pub fn label(&self) -> &'static str {
        match self {
            TravelMode::Recommend => "Recomendar um país ou cidade",
            TravelMode::Plan => "Já tenho um lugar em mente",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|mode| mode.label() == label)
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// 單一鏈步驟的執行結果
#[derive(Debug, Clone)]
pub struct StepResult {
    pub step_name: String,
    pub output_key: String,
    pub text: String,
    pub duration: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub destination: String,
    pub about: String,
    pub restaurants: String,
    pub cultural_activities: String,
}

impl Recommendation {
    pub fn format(&self) -> String {
        format!(
            "Sobre o destino:\n{}\n\nRestaurantes recomendados:\n{}\n\nAtividades culturais sugeridas:\n{}",
            self.about, self.restaurants, self.cultural_activities
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_labels_round_trip() {
        for mode in TravelMode::ALL {
            assert_eq!(TravelMode::from_label(mode.label()), Some(mode));
        }
        assert_eq!(
            TravelMode::from_label("  Já tenho um lugar em mente \n"),
            Some(TravelMode::Plan)
        );
        assert_eq!(TravelMode::from_label("Outra opção"), None);
    }

    #[test]
    fn test_chat_message_serialization() {
        let message = ChatMessage::system("Você é um guia");
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json, serde_json::json!({"role": "system", "content": "Você é um guia"}));
    }

    #[test]
    fn test_recommendation_format() {
        let recommendation = Recommendation {
            destination: "Lisboa".to_string(),
            about: "Capital de Portugal.".to_string(),
            restaurants: "1. Cervejaria Ramiro".to_string(),
            cultural_activities: "1. Fado em Alfama".to_string(),
        };

        assert_eq!(
            recommendation.format(),
            "Sobre o destino:\nCapital de Portugal.\n\nRestaurantes recomendados:\n1. Cervejaria Ramiro\n\nAtividades culturais sugeridas:\n1. Fado em Alfama"
        );
    }
}
