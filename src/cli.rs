//! Command-line interface for strictly_xo.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Strictly XO - Terminal client for networked 10x10 tic-tac-toe
#[derive(Parser, Debug)]
#[command(name = "strictly_xo")]
#[command(about = "Play 10x10 tic-tac-toe against other players on an XO server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the terminal UI client
    Play {
        /// Server connection options
        #[command(flatten)]
        server: ServerArgs,

        /// File receiving the client's logs
        #[arg(long, default_value = "strictly_xo.log")]
        log_file: PathBuf,
    },

    /// Print lobby events until interrupted
    Watch {
        /// Server connection options
        #[command(flatten)]
        server: ServerArgs,
    },
}

/// Options shared by every command that talks to a server.
#[derive(Args, Debug)]
pub struct ServerArgs {
    /// Game server host, overrides config and environment
    #[arg(long)]
    pub host: Option<String>,

    /// Use https/wss
    #[arg(long)]
    pub tls: bool,

    /// Path to a TOML config file
    #[arg(short, long, default_value = "strictly_xo.toml")]
    pub config: PathBuf,
}
