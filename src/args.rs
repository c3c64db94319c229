use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Args)]
pub struct StatusArgs {
    /// print json
    #[arg(short, long)]
    pub json: bool,
}

#[derive(Args)]
pub struct AuthArgs {
    /// text shown by the authentication prompt
    #[arg(short, long, env = "UBIO_REASON")]
    pub reason: Option<String>,

    /// print json
    #[arg(short, long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show whether biometric authentication is possible
    Status(StatusArgs),
    /// Authenticate once
    Auth(AuthArgs),
}

#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct UserArgs {
    /// verbose
    #[arg(short, long)]
    pub verbose: bool,

    /// config file
    #[arg(short, long)]
    pub config_file: Option<PathBuf>,

    /// Command
    #[command(subcommand)]
    pub command: Commands,
}
