use crate::lookup::run_lookup;
use crate::server;
use crate::RunError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "property-details",
    about = "Look up location, structural details, and nearby schools for a street address",
    version,
    args_conflicts_with_subcommands = true
)]
struct Cli {
    /// Address to look up, e.g. "123 Main St, San Francisco, CA 94105"
    address: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default when no address is given)
    Serve(ServeArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), RunError> {
    dispatch(Cli::parse()).await
}

async fn dispatch(cli: Cli) -> Result<(), RunError> {
    match (cli.address, cli.command) {
        (Some(address), _) => run_lookup(&address).await.map_err(RunError::Lookup),
        (None, Some(Command::Serve(args))) => server::run(args).await.map_err(RunError::Serve),
        (None, None) => server::run(ServeArgs::default())
            .await
            .map_err(RunError::Serve),
    }
}
