use crate::config::toml_config::TomlConfig;
use crate::domain::model::TravelMode;
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "trip-chain")]
#[command(about = "Travel recommendations and itineraries generated by a hosted LLM")]
pub struct CliConfig {
    /// recommend: suggest a destination from an interest; plan: build an itinerary
    #[arg(short, long, value_enum)]
    pub mode: Option<TravelMode>,

    /// Interest (recommend) or destination (plan); omit to open the interactive form
    #[arg(short, long)]
    pub input: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, help = "OpenAI-compatible API base URL")]
    pub api_base: Option<String>,

    #[arg(long, help = "Model name")]
    pub model: Option<String>,

    #[arg(long)]
    pub temperature: Option<f32>,

    #[arg(long)]
    pub max_retries: Option<u32>,

    #[arg(long, help = "Log process CPU/memory while the chain runs")]
    pub monitor: bool,

    #[arg(long, help = "Print the prompts that would be sent without calling the model")]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

impl CliConfig {
    /// 載入 TOML（若有）並套用命令列覆蓋設定
    pub fn resolve(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path.display());
                TomlConfig::from_file(path)?
            }
            None => TomlConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut TomlConfig) {
        if let Some(api_key) = &self.api_key {
            config.model.api_key = Some(api_key.clone());
        }
        if let Some(api_base) = &self.api_base {
            config.model.api_base = Some(api_base.clone());
        }
        if let Some(model) = &self.model {
            tracing::info!("🔧 Model overridden to: {}", model);
            config.model.name = Some(model.clone());
        }
        if let Some(temperature) = self.temperature {
            config.model.temperature = Some(temperature);
        }
        if let Some(max_retries) = self.max_retries {
            config.model.max_retries = Some(max_retries);
        }
    }

    pub fn monitoring_enabled(&self, config: &TomlConfig) -> bool {
        self.monitor || config.monitoring_enabled()
    }
}
