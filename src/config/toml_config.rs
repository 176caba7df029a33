use crate::adapters::groq::{
    DEFAULT_API_BASE, DEFAULT_MAX_RETRIES, DEFAULT_MODEL, DEFAULT_RETRY_DELAY_MS,
    DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECONDS,
};
use crate::core::prompt::PromptSet;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{AgentError, Result};
use crate::utils::validation::{self, Validate};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub prompts: PromptOverrides,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    pub api_base: Option<String>,
    pub api_key: Option<String>,
    pub name: Option<String>,
    pub temperature: Option<f32>,
    pub max_retries: Option<u32>,
    pub retry_delay_ms: Option<u64>,
    pub timeout_seconds: Option<u64>,
}

/// `[prompts]`：覆寫預設的提示模板
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptOverrides {
    pub system: Option<String>,
    pub destination: Option<String>,
    pub about: Option<String>,
    pub restaurants: Option<String>,
    pub cultural_activities: Option<String>,
    pub itinerary: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AgentError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| AgentError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${GROQ_API_KEY})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// 依 `[prompts]` 建立模板組
    pub fn prompt_set(&self) -> Result<PromptSet> {
        let mut prompts = PromptSet::default();
        let overrides = [
            ("system", &self.prompts.system),
            ("destination", &self.prompts.destination),
            ("about", &self.prompts.about),
            ("restaurants", &self.prompts.restaurants),
            ("cultural_activities", &self.prompts.cultural_activities),
            ("itinerary", &self.prompts.itinerary),
        ];

        for (key, text) in overrides {
            if let Some(text) = text {
                tracing::debug!("🧩 Using custom '{}' prompt", key);
                prompts.set(key, text.trim())?;
            }
        }

        prompts.validate()?;
        Ok(prompts)
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("model.api_base", self.api_base())?;
        validation::validate_non_empty_string("model.name", self.model())?;
        validation::validate_range("model.temperature", self.temperature(), 0.0, 2.0)?;
        validation::validate_range("model.max_retries", self.max_retries(), 0, 10)?;
        validation::validate_positive_number("model.timeout_seconds", self.timeout_seconds(), 1)?;
        self.prompt_set()?;
        Ok(())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn api_base(&self) -> &str {
        self.model.api_base.as_deref().unwrap_or(DEFAULT_API_BASE)
    }

    fn api_key(&self) -> Option<&str> {
        // 未替換的 ${VAR} 視為未設定
        self.model
            .api_key
            .as_deref()
            .filter(|key| !key.starts_with("${"))
    }

    fn model(&self) -> &str {
        self.model.name.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    fn temperature(&self) -> f32 {
        self.model.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    fn max_retries(&self) -> u32 {
        self.model.max_retries.unwrap_or(DEFAULT_MAX_RETRIES)
    }

    fn retry_delay_ms(&self) -> u64 {
        self.model.retry_delay_ms.unwrap_or(DEFAULT_RETRY_DELAY_MS)
    }

    fn timeout_seconds(&self) -> u64 {
        self.model.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();

        assert_eq!(config.api_base(), "https://api.groq.com/openai/v1");
        assert_eq!(config.model(), "mixtral-8x7b-32768");
        assert_eq!(config.temperature(), 0.0);
        assert_eq!(config.max_retries(), 2);
        assert!(config.api_key().is_none());
        assert!(!config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_model_section() {
        let toml_content = r#"
[model]
api_base = "http://localhost:8080/v1"
api_key = "secret"
name = "llama-3.1-8b-instant"
temperature = 0.7
max_retries = 4

[monitoring]
enabled = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.api_base(), "http://localhost:8080/v1");
        assert_eq!(config.api_key(), Some("secret"));
        assert_eq!(config.model(), "llama-3.1-8b-instant");
        assert_eq!(config.temperature(), 0.7);
        assert_eq!(config.max_retries(), 4);
        assert!(config.monitoring_enabled());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TRIP_CHAIN_TEST_KEY", "gsk_from_env");

        let toml_content = r#"
[model]
api_key = "${TRIP_CHAIN_TEST_KEY}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.api_key(), Some("gsk_from_env"));

        std::env::remove_var("TRIP_CHAIN_TEST_KEY");
    }

    #[test]
    fn test_unset_env_var_means_no_key() {
        let toml_content = r#"
[model]
api_key = "${TRIP_CHAIN_SURELY_UNSET_VAR}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.api_key().is_none());
    }

    #[test]
    fn test_config_validation() {
        let invalid = [
            "[model]\napi_base = \"invalid-url\"",
            "[model]\ntemperature = 3.5",
            "[model]\ntemperature = nan",
            "[model]\nmax_retries = 50",
            "[model]\ntimeout_seconds = 0",
            "[model]\nname = \"  \"",
        ];

        for toml_content in invalid {
            let config = TomlConfig::from_toml_str(toml_content).unwrap();
            assert!(config.validate().is_err(), "expected error for {toml_content}");
        }
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let err = TomlConfig::from_toml_str("[model\nname = 1").unwrap_err();
        assert!(matches!(err, AgentError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_prompt_overrides() {
        let toml_content = r#"
[prompts]
about = """
Resuma a história de {destination} em três frases.
"""
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        let prompts = config.prompt_set().unwrap();

        assert_eq!(
            prompts.about.text(),
            "Resuma a história de {destination} em três frases."
        );
        assert_eq!(prompts.restaurants, PromptSet::default().restaurants);
    }

    #[test]
    fn test_prompt_override_with_bad_placeholder_fails_validation() {
        let toml_content = r#"
[prompts]
itinerary = "Roteiro para {destination}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[model]
name = "file-model"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.model(), "file-model");
    }

    #[test]
    fn test_missing_file() {
        let err = TomlConfig::from_file("/definitely/not/here/trip-chain.toml").unwrap_err();
        assert!(matches!(err, AgentError::IoError(_)));
    }
}
