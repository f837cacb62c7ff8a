#![windows_subsystem = "windows"]

use anyhow::Result;
use proxy_batch_builder::{config::Config, gui};

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = Config::from_env().unwrap_or_else(|e| {
        tracing::warn!("{}; falling back to defaults", e);
        Config::default()
    });
    gui::launch(config)?;

    Ok(())
}
