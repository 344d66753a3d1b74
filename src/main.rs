//! KhetGo CLI - render views headlessly, inspect offline routing and config

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;

use khetgo::offline::RoutePolicy;
use khetgo::services::Services;
use khetgo::{
    boot, App, EventPayload, FixSuggestion, Gateway, Intent, MemoryGateway, MemorySurface,
    ShellConfig, ShellError, View,
};

#[derive(Parser)]
#[command(name = "khetgo")]
#[command(about = "KhetGo - headless render/state core for the farmer marketplace")]
#[command(version)]
struct Cli {
    /// Path to the YAML config file
    #[arg(short, long, global = true, default_value = "khetgo.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Boot against a seeded in-memory gateway and print one view
    Render {
        /// View tag (dashboard, marketplace, listing, ...).
        /// Unknown tags are rejected here instead of falling back to the
        /// dashboard the way in-app navigation does
        #[arg(short, long, default_value = "dashboard")]
        view: String,

        /// Detail parameter, e.g. a listing id
        #[arg(short, long)]
        param: Option<String>,

        /// YAML seed with users, session and tables
        #[arg(short, long)]
        seed: Option<PathBuf>,

        /// Ignore the seed's session
        #[arg(long)]
        anonymous: bool,
    },

    /// Print the offline cache strategy for a request
    Classify {
        url: String,

        #[arg(short, long, default_value = "GET")]
        method: String,
    },

    /// Print the effective configuration (keys masked)
    Config,
}

#[tokio::main]
async fn main() {
    // Load .env file (ignore if not present)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        if let Some(suggestion) = e
            .downcast_ref::<ShellError>()
            .and_then(|e| e.fix_suggestion())
        {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ShellConfig::load(&cli.config)?.with_env();

    match cli.command {
        Commands::Render {
            view,
            param,
            seed,
            anonymous,
        } => render(config, &view, param, seed, anonymous).await,
        Commands::Classify { url, method } => {
            classify(&config, &url, &method);
            Ok(())
        }
        Commands::Config => {
            print!("{}", config.masked().to_yaml()?);
            Ok(())
        }
    }
}

async fn render(
    config: ShellConfig,
    view: &str,
    param: Option<String>,
    seed: Option<PathBuf>,
    anonymous: bool,
) -> anyhow::Result<()> {
    let view: View = view.parse().map_err(|e: String| ShellError::Config { reason: e })?;

    let gateway = match &seed {
        Some(path) => {
            let yaml = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading seed {}", path.display()))?;
            MemoryGateway::from_yaml(&yaml)?
        }
        None => MemoryGateway::new(),
    };
    if anonymous {
        gateway.sign_out().await?;
    }

    let surface = MemorySurface::new();
    let app = App::new(
        Arc::new(gateway),
        Services::disabled(),
        config,
        surface.clone(),
    );

    boot(&app).await?;
    // Dispatch surfaces its own errors as notices; the frame still renders
    let _ = app
        .dispatch(Intent::Navigate { view, param }, EventPayload::none())
        .await;
    app.stop_realtime();

    let frame = surface.snapshot();
    let shown = app.store().select(|s| s.current_view);
    eprintln!(
        "{} requested {} | shown {} | renders {}",
        "→".cyan(),
        view.tag().cyan(),
        shown.tag().cyan().bold(),
        frame.renders
    );
    println!("{}", frame.html);

    eprintln!("{} {} bindings", "→".cyan(), frame.bindings.len());
    for binding in &frame.bindings {
        let (intent, arg) = binding.intent.to_parts();
        eprintln!(
            "  {} #{} {} {}",
            binding.event.tag().dimmed(),
            binding.element_id,
            intent.green(),
            arg
        );
    }
    Ok(())
}

fn classify(config: &ShellConfig, url: &str, method: &str) {
    let policy = RoutePolicy::from_config(&config.offline);
    let strategy = policy.classify(method, url);
    println!("{}", strategy);
    if policy.is_api(url) {
        eprintln!("{} matches an API host", "→".cyan());
    }
}
