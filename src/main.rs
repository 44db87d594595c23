use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use currency_etl::core::CurrencyList;
use currency_etl::core::log::init_logging;
use currency_etl::{AppCommand, Overrides};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Default)]
struct PipelineArgs {
    /// Base currency to fetch rates for (e.g. gbp)
    #[arg(short, long, env = "CE_BASE_CURRENCY")]
    base: Option<String>,

    /// Comma separated target currencies (e.g. eur,usd)
    #[arg(long)]
    currencies: Option<CurrencyList>,
}

#[derive(Args, Default)]
struct BucketArg {
    /// Destination bucket
    #[arg(long, env = "CE_BUCKET")]
    bucket: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Extract, transform and load today's rates
    Run {
        #[command(flatten)]
        pipeline: PipelineArgs,
        #[command(flatten)]
        bucket: BucketArg,
    },
    /// Display today's rates without storing them
    Show {
        #[command(flatten)]
        pipeline: PipelineArgs,
    },
    /// Print today's rate table as JSON
    Extract {
        /// Base currency to fetch rates for (e.g. gbp)
        #[arg(short, long, env = "CE_BASE_CURRENCY")]
        base: Option<String>,
    },
    /// Transform a rate table event read from a file or stdin
    Transform {
        /// Event file, stdin when omitted or "-"
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Store a transformed rates event read from a file or stdin
    Load {
        /// Event file, stdin when omitted or "-"
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[command(flatten)]
        bucket: BucketArg,
    },
    /// Create the destination bucket on a local storage backend
    CreateBucket {
        #[command(flatten)]
        bucket: BucketArg,
    },
}

impl Commands {
    fn into_command(self) -> (AppCommand, Overrides) {
        match self {
            Commands::Run { pipeline, bucket } => (
                AppCommand::Run,
                Overrides {
                    base_currency: pipeline.base,
                    currencies: pipeline.currencies,
                    bucket: bucket.bucket,
                },
            ),
            Commands::Show { pipeline } => (
                AppCommand::Show,
                Overrides {
                    base_currency: pipeline.base,
                    currencies: pipeline.currencies,
                    bucket: None,
                },
            ),
            Commands::Extract { base } => (
                AppCommand::Extract,
                Overrides {
                    base_currency: base,
                    ..Overrides::default()
                },
            ),
            Commands::Transform { input } => {
                (AppCommand::Transform { input }, Overrides::default())
            }
            Commands::Load { input, bucket } => (
                AppCommand::Load { input },
                Overrides {
                    bucket: bucket.bucket,
                    ..Overrides::default()
                },
            ),
            Commands::CreateBucket { bucket } => (
                AppCommand::CreateBucket,
                Overrides {
                    bucket: bucket.bucket,
                    ..Overrides::default()
                },
            ),
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    let result = match cli.command {
        Some(Commands::Setup) => currency_etl::cli::setup::setup(),
        Some(cmd) => {
            let (command, overrides) = cmd.into_command();
            currency_etl::run_command(command, cli.config_path.as_deref(), overrides).await
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
