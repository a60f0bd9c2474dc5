use bw_scanner_lib::commands::{self, ScanArgs, ScheduleArgs, ServeArgs};
use clap::{Parser, Subcommand};

/// Covered-call candidate scanner for leveraged ETFs
#[derive(Parser)]
#[command(name = "bw-scanner", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one scan and write the report
    Scan(ScanArgs),

    /// Serve reports over HTTP, one scan per request
    Serve(ServeArgs),

    /// Run a scan every weekday at a fixed New York time
    Schedule(ScheduleArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bw_scanner_lib::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Scan(args) => commands::scan::run(args).await?,
        Command::Serve(args) => commands::serve::run(args).await?,
        Command::Schedule(args) => commands::schedule::run(args).await?,
    }

    Ok(())
}
