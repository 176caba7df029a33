pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod ui;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::groq::GroqClient;
pub use config::TomlConfig;
pub use core::{agent::TravelAgent, prompt::PromptSet};
pub use domain::model::{Recommendation, TravelMode};
pub use utils::error::{AgentError, Result};
