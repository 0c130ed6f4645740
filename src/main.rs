use anyhow::Result;
use clap::Parser;
use deck_agent::app::App;
use deck_agent::models::{Config, ThemeColor};
use deck_agent::server;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "deck-agent")]
#[command(about = "Chat with an AI agent to turn a topic into a PowerPoint deck")]
struct CliArgs {
    /// Address to listen on (overrides BIND_ADDR).
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,

    /// Directory for generated decks (overrides OUTPUT_DIR).
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Default theme colour as #RRGGBB (overrides DEFAULT_THEME_COLOR).
    #[arg(long, value_name = "COLOR", value_parser = parse_theme_arg)]
    theme: Option<ThemeColor>,
}

fn parse_theme_arg(input: &str) -> std::result::Result<ThemeColor, String> {
    ThemeColor::parse(input)
        .map_err(|_| format!("Invalid colour '{}'. Expected format: #RRGGBB", input))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deck_agent=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting deck-agent");

    let args = CliArgs::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(output_dir) = args.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(theme) = args.theme {
        config.default_theme = theme;
    }

    let app = match App::new(&config) {
        Ok(app) => Arc::new(app),
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server::serve(app, &config.bind_addr, config.session_ttl).await {
        error!("Server failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
