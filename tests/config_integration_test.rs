use anyhow::Result;
use httpmock::prelude::*;
use tempfile::TempDir;
use trip_chain::domain::ports::ConfigProvider;
use trip_chain::utils::validation::Validate;
use trip_chain::{AgentError, GroqClient, TomlConfig, TravelAgent, TravelMode};

async fn write_config(temp_dir: &TempDir, content: &str) -> Result<std::path::PathBuf> {
    let config_path = temp_dir.path().join("trip-chain.toml");
    tokio::fs::write(&config_path, content).await?;
    Ok(config_path)
}

#[tokio::test]
async fn test_custom_prompts_from_file_drive_the_chain() -> Result<()> {
    let server = MockServer::start();
    let temp_dir = TempDir::new()?;

    std::env::set_var("TRIP_CHAIN_IT_KEY", "file-key");
    let config_path = write_config(
        &temp_dir,
        &format!(
            r#"
[model]
api_base = "{}"
api_key = "${{TRIP_CHAIN_IT_KEY}}"
name = "llama-3.1-8b-instant"
temperature = 0.3
max_retries = 0

[prompts]
system = "You are a travel guide."
destination = "Pick one city for someone who likes {{interest}}. Answer with the name only."
about = "History of {{destination}}."
restaurants = "Five restaurants in {{destination}}."
cultural_activities = "Five cultural activities in {{destination}} for {{interest}} lovers."
"#,
            server.base_url()
        ),
    )
    .await?;

    let config = TomlConfig::from_file(&config_path)?;
    std::env::remove_var("TRIP_CHAIN_IT_KEY");
    config.validate()?;
    assert_eq!(config.api_key(), Some("file-key"));

    let destination_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/chat/completions")
            .header("authorization", "Bearer file-key")
            .body_contains("\"model\":\"llama-3.1-8b-instant\"")
            .body_contains("Pick one city for someone who likes jazz.");
        then.status(200).json_body(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "New Orleans"}}]
        }));
    });
    let history_mock = server.mock(|when, then| {
        when.method(POST).body_contains("History of New Orleans.");
        then.status(200).json_body(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "Founded in 1718."}}]
        }));
    });
    let restaurants_mock = server.mock(|when, then| {
        when.method(POST).body_contains("Five restaurants in New Orleans.");
        then.status(200).json_body(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "Commander's Palace"}}]
        }));
    });
    let activities_mock = server.mock(|when, then| {
        when.method(POST)
            .body_contains("Five cultural activities in New Orleans for jazz lovers.");
        then.status(200).json_body(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "Preservation Hall"}}]
        }));
    });

    let agent = TravelAgent::new(GroqClient::from_config(&config)?, config.prompt_set()?);
    let recommendation = agent.recommend("jazz").await?;

    destination_mock.assert();
    history_mock.assert();
    restaurants_mock.assert();
    activities_mock.assert();

    assert_eq!(recommendation.destination, "New Orleans");
    assert_eq!(
        recommendation.format(),
        "Sobre o destino:\nFounded in 1718.\n\nRestaurantes recomendados:\nCommander's Palace\n\nAtividades culturais sugeridas:\nPreservation Hall"
    );

    Ok(())
}

#[tokio::test]
async fn test_invalid_prompt_override_is_rejected() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config_path = write_config(
        &temp_dir,
        r#"
[prompts]
about = "Tell me about {city}."
"#,
    )
    .await?;

    let config = TomlConfig::from_file(&config_path)?;
    let err = config.validate().unwrap_err();

    match err {
        AgentError::InvalidConfigValueError { field, value, .. } => {
            assert_eq!(field, "prompts.about");
            assert_eq!(value, "{city}");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn test_missing_api_key_is_a_configuration_error() -> Result<()> {
    let config = TomlConfig::from_toml_str("[model]\nname = \"mixtral-8x7b-32768\"")?;

    let err = GroqClient::from_config(&config).unwrap_err();
    assert!(matches!(err, AgentError::MissingConfigError { ref field } if field == "model.api_key"));
    assert_eq!(err.recovery_suggestion(), "Set GROQ_API_KEY or pass --api-key");

    Ok(())
}

#[tokio::test]
async fn test_empty_input_never_reaches_the_provider() -> Result<()> {
    let server = MockServer::start();
    let any_call = server.mock(|when, then| {
        when.method(POST);
        then.status(200);
    });

    let config = TomlConfig::from_toml_str(&format!(
        "[model]\napi_base = \"{}\"\napi_key = \"k\"",
        server.base_url()
    ))?;
    let agent = TravelAgent::new(GroqClient::from_config(&config)?, config.prompt_set()?);

    let output = agent.process_input(TravelMode::Recommend, "   ").await;

    any_call.assert_hits(0);
    assert_eq!(
        output,
        "Erro ao processar a recomendação: Validation error: interest cannot be empty"
    );

    Ok(())
}
