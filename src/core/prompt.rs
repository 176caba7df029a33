use crate::utils::error::{AgentError, Result};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
});

pub const SYSTEM_TEMPLATE: &str = "Você é um guia turístico que recomenda cidades e países ao usuário. \
Além de contar um pouco sobre a história do local, recomendar restaurantes e lugares turísticos com base no interesse, ou no local escolhido pelo usuário";

pub const DESTINATION_TEMPLATE: &str = "Dado o meu interesse por {interest}, sugira uma cidade ou um país. \
Responda apenas com o nome da cidade ou país sugerido.";

pub const ABOUT_TEMPLATE: &str = "Conte um pouco sobre a história do país ou cidade {destination}.";

pub const RESTAURANTS_TEMPLATE: &str = "Sugira os 5 melhores restaurantes do país ou cidade {destination}.";

pub const CULTURAL_ACTIVITIES_TEMPLATE: &str = "Sugira as 5 melhores atividades culturais do país ou cidade {destination} \
e atividades relacionadas ao interesse do usuário {interest}.";

pub const ITINERARY_TEMPLATE: &str = "Dado a cidade ou país inserida pelo usuário {dest}, crie um roteiro de viagem detalhado. \
Neste roteiro conte sobre a história da cidade ou país, indique 5 restaurantes imperdiveis, além de selecionar atrações turísticas.";

/// 含 `{name}` 佔位符的提示模板
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    name: String,
    text: String,
}

impl PromptTemplate {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// 依出現順序列出不重複的佔位符名稱
    pub fn placeholders(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for caps in PLACEHOLDER.captures_iter(&self.text) {
            let name = caps[1].to_string();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// 以變數填入所有佔位符；任何缺少的變數都會回傳錯誤
    pub fn render(&self, vars: &HashMap<String, String>) -> Result<String> {
        let missing: Vec<String> = self
            .placeholders()
            .into_iter()
            .filter(|name| !vars.contains_key(name))
            .collect();

        if !missing.is_empty() {
            tracing::error!(
                "🧩 Template '{}' is missing {:?} (available: {:?})",
                self.name,
                missing,
                vars.keys().collect::<Vec<_>>()
            );
            return Err(AgentError::TemplateError {
                template: self.name.clone(),
                missing,
            });
        }

        let rendered = PLACEHOLDER.replace_all(&self.text, |caps: &Captures| {
            vars.get(&caps[1]).cloned().unwrap_or_default()
        });

        Ok(rendered.into_owned())
    }
}

/// 程式使用的全部提示模板
#[derive(Debug, Clone)]
pub struct PromptSet {
    pub system: PromptTemplate,
    pub destination: PromptTemplate,
    pub about: PromptTemplate,
    pub restaurants: PromptTemplate,
    pub cultural_activities: PromptTemplate,
    pub itinerary: PromptTemplate,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            system: PromptTemplate::new("system", SYSTEM_TEMPLATE),
            destination: PromptTemplate::new("destination", DESTINATION_TEMPLATE),
            about: PromptTemplate::new("about", ABOUT_TEMPLATE),
            restaurants: PromptTemplate::new("restaurants", RESTAURANTS_TEMPLATE),
            cultural_activities: PromptTemplate::new(
                "cultural_activities",
                CULTURAL_ACTIVITIES_TEMPLATE,
            ),
            itinerary: PromptTemplate::new("itinerary", ITINERARY_TEMPLATE),
        }
    }
}

impl PromptSet {
    /// 各模板允許與必須出現的佔位符
    fn slot_rules(key: &str) -> Option<(&'static [&'static str], &'static [&'static str])> {
        const NO_SLOTS: &[&str] = &[];
        const INTEREST: &[&str] = &["interest"];
        const DESTINATION: &[&str] = &["destination"];
        const DESTINATION_INTEREST: &[&str] = &["destination", "interest"];
        const DEST: &[&str] = &["dest"];

        match key {
            "system" => Some((NO_SLOTS, NO_SLOTS)),
            "destination" => Some((INTEREST, INTEREST)),
            "about" | "restaurants" | "cultural_activities" => {
                Some((DESTINATION_INTEREST, DESTINATION))
            }
            "itinerary" => Some((DEST, DEST)),
            _ => None,
        }
    }

    fn templates(&self) -> [&PromptTemplate; 6] {
        [
            &self.system,
            &self.destination,
            &self.about,
            &self.restaurants,
            &self.cultural_activities,
            &self.itinerary,
        ]
    }

    /// 覆寫指定的模板
    pub fn set(&mut self, key: &str, text: impl Into<String>) -> Result<()> {
        let slot = match key {
            "system" => &mut self.system,
            "destination" => &mut self.destination,
            "about" => &mut self.about,
            "restaurants" => &mut self.restaurants,
            "cultural_activities" => &mut self.cultural_activities,
            "itinerary" => &mut self.itinerary,
            _ => {
                return Err(AgentError::InvalidConfigValueError {
                    field: format!("prompts.{}", key),
                    value: key.to_string(),
                    reason: "Unknown prompt template".to_string(),
                })
            }
        };
        *slot = PromptTemplate::new(key, text);
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        for template in self.templates() {
            let Some((allowed, required)) = Self::slot_rules(template.name()) else {
                continue;
            };
            let field = format!("prompts.{}", template.name());
            let placeholders = template.placeholders();

            crate::utils::validation::validate_non_empty_string(&field, template.text())?;

            if let Some(unknown) = placeholders.iter().find(|p| !allowed.contains(&p.as_str())) {
                return Err(AgentError::InvalidConfigValueError {
                    field,
                    value: format!("{{{}}}", unknown),
                    reason: format!(
                        "Unknown placeholder. Available: {}",
                        if allowed.is_empty() {
                            "none".to_string()
                        } else {
                            allowed.join(", ")
                        }
                    ),
                });
            }

            for needed in required.iter() {
                if !placeholders.iter().any(|p| p == needed) {
                    return Err(AgentError::ConfigValidationError {
                        field,
                        message: format!("Template must contain {{{}}}", needed),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_placeholders_in_order_without_duplicates() {
        let template = PromptTemplate::new("t", "{b} e {a} e {b} e {not valid}");
        assert_eq!(template.placeholders(), vec!["b", "a"]);
    }

    #[test]
    fn test_render_fills_all_slots() {
        let set = PromptSet::default();
        let rendered = set
            .cultural_activities
            .render(&vars(&[("destination", "Kyoto"), ("interest", "templos")]))
            .unwrap();

        assert_eq!(
            rendered,
            "Sugira as 5 melhores atividades culturais do país ou cidade Kyoto e atividades relacionadas ao interesse do usuário templos."
        );
    }

    #[test]
    fn test_render_inserts_values_verbatim() {
        let template = PromptTemplate::new("t", "interesse: {interest}");
        let rendered = template
            .render(&vars(&[("interest", "$1 e {destination}")]))
            .unwrap();
        assert_eq!(rendered, "interesse: $1 e {destination}");
    }

    #[test]
    fn test_render_reports_missing_slots() {
        let set = PromptSet::default();
        let err = set
            .cultural_activities
            .render(&vars(&[("interest", "praia")]))
            .unwrap_err();

        match err {
            AgentError::TemplateError { template, missing } => {
                assert_eq!(template, "cultural_activities");
                assert_eq!(missing, vec!["destination"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_default_prompt_set_is_valid() {
        assert!(PromptSet::default().validate().is_ok());
        assert!(PromptSet::default().system.placeholders().is_empty());
    }

    #[test]
    fn test_override_with_unknown_placeholder_is_rejected() {
        let mut set = PromptSet::default();
        set.set("about", "Fale sobre {destination} em {language}").unwrap();
        assert!(set.validate().is_err());
    }

    #[test]
    fn test_override_missing_required_placeholder_is_rejected() {
        let mut set = PromptSet::default();
        set.set("itinerary", "Crie um roteiro.").unwrap();
        let err = set.validate().unwrap_err();
        assert!(matches!(err, AgentError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_set_unknown_key() {
        let mut set = PromptSet::default();
        assert!(set.set("weather", "Como está o tempo em {destination}?").is_err());
    }
}
