use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use fxglance::core::currency::CurrencyCode;
use fxglance::core::log::init_logging;

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

#[derive(Args, Clone, Copy)]
struct SelectionArgs {
    /// Amount to convert
    #[arg(short, long)]
    amount: Option<f64>,

    /// Currency to convert from
    #[arg(short, long)]
    from: Option<CurrencyCode>,

    /// Currency to convert to
    #[arg(short, long)]
    to: Option<CurrencyCode>,
}

impl From<SelectionArgs> for fxglance::SelectionOverrides {
    fn from(args: SelectionArgs) -> Self {
        fxglance::SelectionOverrides {
            amount: args.amount,
            base: args.from,
            target: args.to,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Print the dashboard once
    Show(SelectionArgs),
    /// Interactive dashboard reading commands from stdin
    Watch(SelectionArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config_path = cli.config_path.as_deref();
    let result = match cli.command {
        Some(Commands::Setup) => fxglance::cli::setup::setup(),
        Some(Commands::Show(args)) => {
            fxglance::run_command(fxglance::AppCommand::Show(args.into()), config_path).await
        }
        Some(Commands::Watch(args)) => {
            fxglance::run_command(fxglance::AppCommand::Watch(args.into()), config_path).await
        }
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
