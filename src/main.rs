use anyhow::Result;
use clap::Parser;
use log::LevelFilter;
use ubiometric::platform::default_service;

mod args;
mod commands;
mod config;

use crate::{
    args::{Commands, UserArgs},
    commands::{command_auth, command_status},
    config::UbioConfig,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = UserArgs::parse();

    let log_level = if args.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Error
    };

    env_logger::Builder::new().filter_level(log_level).init();

    let config = UbioConfig::load(args.config_file.as_deref())?;

    let service = default_service(config.helper.program.as_deref());

    match args.command {
        Commands::Status(status) => command_status(service, &status)?,
        Commands::Auth(auth) => command_auth(service, config, auth).await?,
    }

    Ok(())
}
