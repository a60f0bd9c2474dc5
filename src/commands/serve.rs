//! HTTP trigger

use crate::config::ScanConfig;
use crate::error::Result;
use crate::server::ScanServer;
use crate::state::AppState;
use clap::Args;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Path to a JSON configuration file
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Bind address (overrides configuration)
    #[arg(long)]
    pub host: Option<String>,

    /// Bind port (overrides configuration)
    #[arg(long, short = 'p')]
    pub port: Option<u16>,
}

/// Apply command-line overrides to the loaded configuration
pub fn apply_overrides(mut config: ScanConfig, args: &ServeArgs) -> ScanConfig {
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config
}

/// Serve until Ctrl-C
pub async fn run(args: ServeArgs) -> Result<()> {
    let config = apply_overrides(ScanConfig::load(args.config.as_deref())?, &args);
    let server_config = config.server.clone();
    let state = AppState::new(config)?;

    let mut server = ScanServer::new(state);
    server.start(&server_config).await?;

    tokio::signal::ctrl_c().await?;
    info!("Interrupt received");
    server.stop().await;
    Ok(())
}
