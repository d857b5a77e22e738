//! Saathi CLI - multilingual wellness companion bot.

#![allow(clippy::print_stdout)] // CLI program intentionally uses stdout

use clap::{Args, Parser, Subcommand};
use saathi_bot::channels::telegram::{register_webhook, remove_webhook};
use saathi_bot::error::{BotError, Result};
use saathi_bot::prelude::*;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Saathi - wellness companion bot for Telegram
#[derive(Parser)]
#[command(name = "saathi")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the configuration file
    Init(InitArgs),

    /// Start the bot gateway (long polling)
    Gateway,

    /// Manage the production webhook registration
    Webhook(WebhookArgs),

    /// Show bot status and configuration
    Status,

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for the init command
#[derive(Args)]
struct InitArgs {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    force: bool,
}

/// Arguments for the webhook command
#[derive(Args)]
struct WebhookArgs {
    #[command(subcommand)]
    command: WebhookCommands,
}

#[derive(Subcommand)]
enum WebhookCommands {
    /// Register a webhook URL with Telegram
    Set {
        /// Public HTTPS URL Telegram should push updates to
        #[arg(long, env = "WEBHOOK_URL")]
        url: url::Url,
    },
    /// Remove the webhook and return to polling
    Delete,
}

/// Arguments for the config command
#[derive(Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Show configuration file path
    Path,
    /// Validate configuration
    Validate,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let rt = tokio::runtime::Runtime::new().expect("failed to create tokio runtime");

    match rt.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging with the given verbosity level.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "saathi_bot={level},{}",
            if verbosity >= 2 { "debug" } else { "warn" }
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init(args) => cmd_init(args).await,
        Commands::Gateway => cmd_gateway().await,
        Commands::Webhook(args) => cmd_webhook(args).await,
        Commands::Status => cmd_status().await,
        Commands::Config(args) => cmd_config(args).await,
    }
}

/// Initialize configuration.
async fn cmd_init(args: InitArgs) -> Result<()> {
    let config_file = config_path();

    if config_file.exists() && !args.force {
        println!("Configuration already exists at: {}", config_file.display());
        println!("Use --force to overwrite.");
        return Ok(());
    }

    init_config()
        .await
        .map_err(|e| BotError::config(format!("failed to initialize config: {e}")))?;

    println!("Configuration created: {}", config_file.display());
    println!();
    println!("Next steps:");
    println!("  1. export TELEGRAM_BOT_TOKEN=<token>");
    println!("  2. export GEMINI_API_KEY=<key>");
    println!("  3. saathi gateway");

    Ok(())
}

/// Start the gateway.
async fn cmd_gateway() -> Result<()> {
    tracing::info!("starting Saathi gateway...");

    let config = load_config().await?;

    // Missing secrets are fatal; do not start serving.
    config.require_secrets()?;

    let completion = GeminiClient::from_env()
        .with_model(&config.completion.model)
        .with_params(config.completion.params)
        .with_timeout(std::time::Duration::from_secs(config.completion.timeout_secs));

    let gateway = GatewayBuilder::new()
        .completion(completion)
        .bot_config(config)
        .build();

    println!("Gateway running. Press Ctrl+C to stop.\n");

    tokio::select! {
        result = gateway.run() => result,
        _ = tokio::signal::ctrl_c() => {
            println!("\nShutting down...");
            Ok(())
        }
    }
}

/// Manage the webhook registration.
async fn cmd_webhook(args: WebhookArgs) -> Result<()> {
    let config = load_config().await?;
    let token = config
        .channels
        .telegram
        .token
        .ok_or_else(|| BotError::config("no telegram token configured"))?;

    match args.command {
        WebhookCommands::Set { url } => {
            register_webhook(&token, &url).await?;
            println!("Webhook set to: {url}");
        }
        WebhookCommands::Delete => {
            remove_webhook(&token).await?;
            println!("Webhook removed; bot will use polling.");
        }
    }

    Ok(())
}

/// Show status.
async fn cmd_status() -> Result<()> {
    let config_file = config_path();

    println!("Saathi Status\n");

    println!("Configuration:");
    println!("  Path:   {}", config_file.display());
    println!(
        "  Exists: {}",
        if config_file.exists() { "yes" } else { "no" }
    );

    match load_config().await {
        Ok(config) => {
            println!("  Valid:  yes");
            println!();
            println!("Channels:");
            println!(
                "  Telegram: {}",
                if config.channels.telegram.enabled {
                    "enabled"
                } else {
                    "disabled"
                }
            );
            println!();
            println!("Completion:");
            println!("  Model:   {}", config.completion.model);
            println!("  Timeout: {}s", config.completion.timeout_secs);
        }
        Err(e) => {
            println!("  Valid:  no ({e})");
        }
    }

    println!();
    println!("Environment:");
    print_env_status(saathi_bot::config::TELEGRAM_TOKEN_ENV);
    print_env_status(saathi_bot::config::GEMINI_KEY_ENV);

    Ok(())
}

/// Configuration management.
async fn cmd_config(args: ConfigArgs) -> Result<()> {
    let config_file = config_path();

    match args.command {
        ConfigCommands::Path => {
            println!("{}", config_file.display());
        }
        ConfigCommands::Show => {
            if config_file.exists() {
                let content = tokio::fs::read_to_string(&config_file)
                    .await
                    .map_err(|e| BotError::config(format!("failed to read config: {e}")))?;
                println!("{content}");
            } else {
                println!("Configuration file does not exist.");
                println!("Run 'saathi init' to create one.");
            }
        }
        ConfigCommands::Validate => {
            let config = load_config().await?;
            let issues = config.validate();
            if issues.is_empty() {
                println!("Configuration is valid");
            } else {
                for issue in issues {
                    let tag = match issue.level {
                        IssueLevel::Error => "error",
                        IssueLevel::Warning => "warning",
                    };
                    println!("{tag}: {}", issue.message);
                }
            }
        }
    }

    Ok(())
}

/// Print environment variable status.
fn print_env_status(name: &str) {
    let status = if std::env::var(name).is_ok() {
        "set"
    } else {
        "-"
    };
    println!("  {name}: {status}");
}
