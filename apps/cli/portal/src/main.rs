use portal::app::App;
use portal::cli::Args;
use portal::commands;
use portal::error::PortalError;
use portal::logger::initialize as LoggerInitialize;
use portal::notifier::ConsoleNotifier;

use session_core::config::ClientConfig;
use session_core::error::CoreError;
use session_core::storage::detect_data_paths;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use log::{LevelFilter, error, info};

const APP_DIR_NAME: &str = "portal";

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<bool, PortalError> {
    let config_dir = args
        .config_dir
        .clone()
        .or_else(|| dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME)));

    let config = match &config_dir {
        Some(dir) => ClientConfig::load_with_env(dir).map_err(CoreError::from)?,
        None => {
            let mut config = ClientConfig::default();
            config.apply_env_overrides().map_err(CoreError::from)?;
            config.validate().map_err(CoreError::from)?;
            config
        }
    };

    let data_dir = match args.data_dir.clone().or_else(|| config.storage.data_dir.clone()) {
        Some(dir) => dir,
        None => detect_data_paths().map_err(CoreError::from)?.data_dir,
    };

    let console_level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    LoggerInitialize(&data_dir, console_level)?;

    info!("portal starting");
    info!("Data directory: {}", data_dir.display());
    if let Some(dir) = &config_dir {
        info!("Config directory: {}", dir.display());
    }

    let app = App::build(config, &data_dir, Arc::new(ConsoleNotifier))?.with_config_dir(config_dir);
    commands::run(&app, args.command).await
}
