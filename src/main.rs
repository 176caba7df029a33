use clap::Parser;
use std::collections::HashMap;
use trip_chain::core::recommendation::build_recommendation_chain;
use trip_chain::domain::ports::ConfigProvider;
use trip_chain::ui::form::run_form;
use trip_chain::utils::error::{AgentError, ErrorSeverity};
use trip_chain::utils::{logger, validation::Validate};
use trip_chain::{CliConfig, GroqClient, PromptSet, TomlConfig, TravelAgent, TravelMode};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting trip-chain");
    if cli.verbose {
        tracing::debug!("Mode: {:?}, config file: {:?}", cli.mode, cli.config);
    }

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        exit_with(&e);
    }

    let prompts = match config.prompt_set() {
        Ok(prompts) => prompts,
        Err(e) => exit_with(&e),
    };

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No model calls will be made");
        perform_dry_run(&cli, &config, &prompts);
        return Ok(());
    }

    let model = match GroqClient::from_config(&config) {
        Ok(model) => model,
        Err(e) => exit_with(&e),
    };

    let monitor_enabled = cli.monitoring_enabled(&config);
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let agent = TravelAgent::new_with_monitoring(model, prompts, monitor_enabled);

    match cli.input.as_deref() {
        Some(input) => {
            let mode = cli.mode.unwrap_or(TravelMode::Recommend);
            let result = match mode {
                TravelMode::Recommend => agent.recommend(input).await.map(|r| r.format()),
                TravelMode::Plan => agent.plan(input).await,
            };

            match result {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    tracing::error!(
                        "❌ Request failed: {} (Category: {:?}, Severity: {:?})",
                        e,
                        e.category(),
                        e.severity()
                    );
                    exit_with(&e);
                }
            }
        }
        None => {
            let stdin = std::io::stdin();
            run_form(&agent, stdin.lock(), std::io::stdout()).await?;
        }
    }

    Ok(())
}

fn exit_with(e: &AgentError) -> ! {
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 依錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low | ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

fn perform_dry_run(cli: &CliConfig, config: &TomlConfig, prompts: &PromptSet) {
    println!("📋 Configuration Summary:");
    println!("  API base: {}", config.api_base());
    println!("  Model: {}", config.model());
    println!("  Temperature: {}", config.temperature());
    println!("  Max retries: {}", config.max_retries());
    println!(
        "  API key: {}",
        if config.api_key().is_some() { "set" } else { "missing" }
    );
    println!();

    let mode = cli.mode.unwrap_or(TravelMode::Recommend);
    let input = cli.input.as_deref().unwrap_or(match mode {
        TravelMode::Recommend => "praia",
        TravelMode::Plan => "Paris",
    });
    println!("🧭 Mode: {} (input: {})", mode, input);
    println!();

    match mode {
        TravelMode::Recommend => {
            let chain = build_recommendation_chain(prompts, "dry-run".to_string());
            println!("🔗 Steps: {}", chain.step_names().join(" → "));

            let mut vars = HashMap::new();
            vars.insert("interest".to_string(), input.to_string());
            vars.insert("destination".to_string(), "<destination>".to_string());

            for template in [
                &prompts.system,
                &prompts.destination,
                &prompts.about,
                &prompts.restaurants,
                &prompts.cultural_activities,
            ] {
                print_rendered(template.name(), template.render(&vars));
            }
        }
        TravelMode::Plan => {
            let mut vars = HashMap::new();
            vars.insert("dest".to_string(), input.to_string());
            print_rendered(prompts.itinerary.name(), prompts.itinerary.render(&vars));
        }
    }
}

fn print_rendered(name: &str, rendered: trip_chain::Result<String>) {
    match rendered {
        Ok(text) => println!("[{}]\n{}\n", name, text),
        Err(e) => println!("[{}] ⚠️ {}\n", name, e),
    }
}
