mod config;
mod telemetry;

use clap::{Args, Parser, Subcommand};
use config::{Config, ConfigError};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "review-analyzer", about = "Serves customer reviews annotated with sentiment")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Serve the review API
    Run(RunArgs),
    /// Load and validate a config file, then exit
    CheckConfig {
        #[arg(long)]
        config: PathBuf,
    },
}

#[derive(Args)]
struct RunArgs {
    /// YAML config file; built-in defaults are used when omitted
    #[arg(long, env = "REVIEWS_CONFIG")]
    config: Option<PathBuf>,
    /// Overrides the listener port from the config file
    #[arg(long, env = "PORT")]
    port: Option<u16>,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid config: {0}")]
    InvalidConfig(#[from] reviews::config::ValidationError),
    #[error(transparent)]
    Telemetry(#[from] telemetry::TelemetryError),
    #[error("could not start runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error(transparent)]
    Reviews(#[from] reviews::errors::ReviewsError),
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        CliCommand::Run(args) => run(args),
        CliCommand::CheckConfig { config } => check_config(&config),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn load_config(args: &RunArgs) -> Result<Config, ConfigError> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(port) = args.port {
        config.reviews.listener.port = port;
    }
    Ok(config)
}

fn run(args: RunArgs) -> Result<(), CliError> {
    let config = load_config(&args)?;

    let _sentry = telemetry::init_logging(config.common.logging.as_ref());
    telemetry::init_metrics(config.common.metrics.as_ref())?;

    tracing::info!(
        host = %config.reviews.listener.host,
        port = config.reviews.listener.port,
        "starting review-analyzer"
    );

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    rt.block_on(reviews::run(config.reviews))?;
    Ok(())
}

fn check_config(path: &std::path::Path) -> Result<(), CliError> {
    let config = Config::from_file(path)?;
    config.reviews.validate()?;
    println!("{} is valid", path.display());
    Ok(())
}
