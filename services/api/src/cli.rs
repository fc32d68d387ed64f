use crate::demo::{run_demo, run_export, RunArgs};
use crate::server;
use bird_targets::error::AppError;
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "bird-targets",
    about = "Rank under-reported bird species for a target region and serve the results on a map",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank species from a fixtures directory and write targets_ranked.csv
    Demo(RunArgs),
    /// Rank species, then write map layers and species dossiers
    Export(RunArgs),
    /// Serve an export directory over HTTP
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
pub(crate) struct ServeArgs {
    /// Export directory containing layers/, species_dossiers/ and targets_ranked.csv
    #[arg(long, default_value = "out")]
    pub(crate) out: PathBuf,
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Demo(args)) => run_demo(args),
        Some(Command::Export(args)) => run_export(args),
        Some(Command::Serve(args)) => server::run(args).await,
        None => {
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}
