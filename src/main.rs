//! Strictly XO - Unified CLI
//!
//! Terminal client for networked 10x10 tic-tac-toe.

#![warn(missing_docs)]

mod cli;
mod tui;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command, ServerArgs};
use strictly_xo::{ChannelSignal, ClientConfig, Lobby, LobbyEvent, connect};
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info,strictly_xo=debug";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Play { server, log_file } => {
            initialize_file_tracing(&log_file)?;
            let config = resolve_config(&server)?;
            tui::run_tui(config).await
        }
        Command::Watch { server } => {
            initialize_stderr_tracing();
            let config = resolve_config(&server)?;
            run_watch(config).await
        }
    }
}

/// Applies config file, environment and flags, in that order.
#[instrument(skip_all, fields(config_path = %server.config.display()))]
fn resolve_config(server: &ServerArgs) -> Result<ClientConfig> {
    let mut config = ClientConfig::load(Some(&server.config))?.with_env_overrides();
    if let Some(host) = &server.host {
        config = config.with_host(host.clone());
    }
    if server.tls {
        config = config.with_tls(true);
    }
    info!(host = %config.host(), tls = config.tls(), "Configuration resolved");
    Ok(config)
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Logs go to a file so they don't tear the TUI.
fn initialize_file_tracing(path: &std::path::Path) -> Result<()> {
    let log_file = std::fs::File::create(path)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

fn initialize_stderr_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Follows the lobby channel and prints what happens until Ctrl+C.
#[instrument(skip_all, fields(host = %config.host()))]
async fn run_watch(config: ClientConfig) -> Result<()> {
    let url = config.endpoints().games_channel();
    info!(url = %url, "Watching lobby");

    // The sender must stay alive or the writer task closes the socket.
    let (_sender, mut signals) = connect(&url).await?;
    let mut lobby = Lobby::new();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
            signal = signals.recv() => match signal {
                Some(ChannelSignal::Event(event)) => report(&mut lobby, event),
                Some(ChannelSignal::Closed { reason }) => {
                    println!("channel closed: {}", reason);
                    break;
                }
                None => {
                    warn!("Lobby channel ended without a close signal");
                    break;
                }
            },
        }
    }

    println!("{} open game(s) at exit", lobby.len());
    Ok(())
}

fn report(lobby: &mut Lobby, event: LobbyEvent) {
    match event {
        LobbyEvent::Added { id } => {
            if lobby.add(&id) {
                println!("+ {} ({} open)", id, lobby.len());
            }
        }
        LobbyEvent::Removed { id } => {
            if lobby.remove(&id) {
                println!("- {} ({} open)", id, lobby.len());
            }
        }
        LobbyEvent::StartGame { id } => println!("startGame {}", id),
        LobbyEvent::Error { message } => {
            println!("error: {}", message.as_deref().unwrap_or("unspecified"));
        }
    }
}
