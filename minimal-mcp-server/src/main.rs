use minimal_mcp_server::serve;
use std::error::Error;
use tokio::io::{self, BufReader};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    info!("Minimal MCP Server started successfully");
    serve(BufReader::new(io::stdin()), io::stdout()).await?;
    Ok(())
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        // stdout is the protocol channel
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_level(true)
            .with_ansi(false)
            .init();
    });
}
