use crate::report::{run_capacity_report, CapacityReportArgs};
use crate::server;
use admissions::error::AppError;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "admissions-api",
    about = "Run the admissions portal API or inspect program capacity from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Offline capacity tooling
    Capacity {
        #[command(subcommand)]
        command: CapacityCommand,
    },
}

#[derive(Subcommand, Debug)]
enum CapacityCommand {
    /// Print department and program capacity from CSV exports
    Report(CapacityReportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Program catalog CSV to seed at startup (overrides APP_CATALOG_CSV)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Capacity {
            command: CapacityCommand::Report(args),
        } => run_capacity_report(args),
    }
}
