pub mod config;
pub mod host;
pub mod watcher;

use crate::config::PadwatchConfig;
use crate::watcher::watcher_handle::WatcherHandle;
use color_eyre::eyre::{eyre, Result};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let config = PadwatchConfig::load_or_default().await?;
    info!(
        "Starting padwatch (poll every {} ms, deadzone {})",
        config.poll_interval_ms, config.joystick_deadzone
    );

    let watcher_handle = WatcherHandle::spawn(Some(config.watcher_settings()))
        .map_err(|e| eyre!("Failed to spawn watcher: {}", e))?;

    info!("Watching for gamepads, press Ctrl-C to stop");
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| eyre!("Failed to listen for shutdown signal: {}", e))?;

    info!("Shutdown requested");
    watcher_handle.shutdown().await;

    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
