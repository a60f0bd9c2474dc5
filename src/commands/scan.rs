//! One-shot scan

use crate::config::ScanConfig;
use crate::error::Result;
use crate::report::{render_html, ScanDocument};
use crate::services::ScanResult;
use crate::state::AppState;
use clap::{Args, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Html,
    Json,
}

#[derive(Debug, Clone, Args)]
pub struct ScanArgs {
    /// Path to a JSON configuration file
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Output file path (default: stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "html")]
    pub format: OutputFormat,
}

/// Encode a scan result in the requested format
pub fn render(result: &ScanResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Html => Ok(render_html(result)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&ScanDocument::from(result))?),
    }
}

/// Write to `output`, or stdout when none is given
pub async fn write_output(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(path, content).await?;
            info!("Report written to {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

pub async fn run(args: ScanArgs) -> Result<()> {
    let config = ScanConfig::load(args.config.as_deref())?;
    let state = AppState::new(config)?;

    let result = state.scan().await?;
    let content = render(&result, args.format)?;
    write_output(&content, args.output.as_deref()).await
}
