use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use coinrelay::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for coinrelay::AppCommand {
    fn from(cmd: Commands) -> coinrelay::AppCommand {
        match cmd {
            Commands::Serve => coinrelay::AppCommand::Serve,
            Commands::Price { symbols } => coinrelay::AppCommand::Price { symbols },
            Commands::Rate { from, to } => coinrelay::AppCommand::Rate { from, to },
            Commands::Market => coinrelay::AppCommand::Market,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Run the HTTP API
    Serve,
    /// Print latest prices for one or more symbols, e.g. BTCUSDT ETHUSDT
    Price {
        #[arg(required = true)]
        symbols: Vec<String>,
    },
    /// Print how many units of TO one unit of FROM buys
    Rate { from: String, to: String },
    /// Display the market overview of popular coins
    Market,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => coinrelay::cli::setup::setup(),
        Some(cmd) => coinrelay::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
