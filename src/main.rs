use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use oxrates::core::RateQuery;
use oxrates::core::log::init_logging;

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

#[derive(Args)]
struct PairArgs {
    /// Source currency (defaults to the base currency)
    #[arg(short, long)]
    from: Option<String>,

    /// Target currency (defaults to the base currency)
    #[arg(short, long)]
    to: Option<String>,

    /// Use historical rates for this date (yyyy-mm-dd)
    #[arg(long)]
    on: Option<String>,
}

impl From<PairArgs> for RateQuery {
    fn from(args: PairArgs) -> RateQuery {
        RateQuery {
            from: args.from,
            to: args.to,
            on: args.on.map(Into::into),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display the latest rates
    Latest,
    /// Display historical rates for a date
    On {
        /// Date in yyyy-mm-dd format
        date: String,
    },
    /// Display the exchange rate between two currencies
    Rate(PairArgs),
    /// Convert an amount between two currencies
    Convert {
        amount: f64,
        #[command(flatten)]
        pair: PairArgs,
    },
}

impl From<Commands> for oxrates::AppCommand {
    fn from(cmd: Commands) -> oxrates::AppCommand {
        match cmd {
            Commands::Latest => oxrates::AppCommand::Latest,
            Commands::On { date } => oxrates::AppCommand::On { date },
            Commands::Rate(pair) => oxrates::AppCommand::Rate { query: pair.into() },
            Commands::Convert { amount, pair } => oxrates::AppCommand::Convert {
                amount,
                query: pair.into(),
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => oxrates::cli::setup::setup(),
        Some(cmd) => oxrates::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
