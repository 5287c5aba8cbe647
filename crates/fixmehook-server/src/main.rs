use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use fixmehook_core::HookError;
use fixmehook_server::config::ServerConfig;
use fixmehook_server::deliver;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "fixmehook",
    about = "Open GitHub issues for TODO/FIXME/XXX comments added in pushed commits"
)]
struct Cli {
    #[command(flatten)]
    config: ServerConfig,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a single push event payload and exit
    Deliver {
        /// Path to the event JSON, or `-` for stdin
        event: PathBuf,

        /// Print the issues that would be created without creating them
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = cli.config.settings()?;

    match cli.command {
        Some(Commands::Deliver { event, dry_run }) => {
            let raw = deliver::read_event(&event)
                .await
                .with_context(|| format!("reading {}", event.display()))?;
            match deliver::run(&raw, cli.config.api_key(), &settings, dry_run).await {
                Ok(result) => println!("{}", serde_json::to_string_pretty(&result)?),
                Err(e) => {
                    eprintln!("{}", e.to_response());
                    std::process::exit(1);
                }
            }
        }
        None => {
            // No token means every delivery would fail; refuse to start.
            let Some(api_key) = cli.config.api_key() else {
                bail!(HookError::MissingCredential);
            };
            let addr = cli.config.addr()?;
            info!(
                "markers: {:?}, label: {}",
                settings.markers.tokens(),
                settings.formatter.label
            );

            let listener = TcpListener::bind(addr).await?;
            info!("fixmehook listening on http://{addr}/api/webhooks/push");

            fixmehook_server::serve(listener, settings, api_key.to_string()).await?;
        }
    }

    Ok(())
}
