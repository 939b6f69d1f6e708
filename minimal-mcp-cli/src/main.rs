//! Launcher entry point
//!
//! Spawns the companion `minimal-mcp-server`, asks the model to sum two
//! numbers, reverse a string and fetch the current time, then prints the
//! answer. Takes no arguments.

use minimal_mcp_core::launcher;
use std::error::Error;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    info!("Starting minimal-mcp launcher");
    launcher::run().await?;
    info!("Launcher finished");
    Ok(())
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        // stdout carries the result line only
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_level(true)
            .init();
    });
}
