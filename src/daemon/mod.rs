mod app;
mod dbus;
mod display;
mod sync;
mod visibility;

use anyhow::Result;

pub use dbus::call_daemon;

pub async fn run() -> Result<()> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting wall-dash daemon");
    app::run().await
}
