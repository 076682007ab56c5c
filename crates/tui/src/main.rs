mod console;

use std::{
    fs::{self, OpenOptions},
    sync::Mutex,
};

use anyhow::{Context, Result};
use haulage_core::{config, AppConfig, CustomerStore, Dispatcher, Terminal, UserStore};
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::console::{Console, ScreenPlatform};

fn main() -> Result<()> {
    init_logging()?;

    let platform = ScreenPlatform::detect()?;
    let config_path = config::ensure_default_config()?;
    let config = AppConfig::load_from(&config_path)?;
    info!(path = %config_path.display(), "configuration loaded");

    let users = UserStore::open(&config.users.file_path).context("failed to load users")?;
    let customers =
        CustomerStore::open(&config.customers.file_path).context("failed to load customers")?;
    info!(
        users = users.len(),
        customers = customers.len(),
        "records loaded"
    );

    let mut console = Console::new(platform);
    console.clear_screen();

    let mut dispatcher = Dispatcher::new(config, console, users, customers);
    dispatcher.run().context("session ended")?;
    Ok(())
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("haulage.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Prompts own stdout, so events only go to the file.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .compact()
        .with_ansi(false)
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
