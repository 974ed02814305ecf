mod normalize;
mod unify;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "basar-cli")]
#[command(about = "Unify retail product listings into a cross-network price catalog")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Link product records from one or more source files into a catalog
    Unify {
        /// Source JSON file; repeat for several sources. Order matters for
        /// clustering.
        #[arg(short, long = "input", required = true)]
        inputs: Vec<PathBuf>,
        /// Write the catalog here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Knowledge file overriding `BASAR_KNOWLEDGE_PATH` and the bundled tables
        #[arg(long)]
        knowledge: Option<PathBuf>,
        /// Emit single-line JSON
        #[arg(long)]
        compact: bool,
    },
    /// Print the normalized key for each product name
    Normalize {
        #[arg(required = true)]
        names: Vec<String>,
        #[arg(long)]
        knowledge: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = basar_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Unify {
            inputs,
            output,
            knowledge,
            compact,
        } => {
            let args = unify::UnifyArgs {
                inputs,
                output,
                knowledge,
                compact,
            };
            unify::run_unify(&config, &args).await
        }
        Commands::Normalize { names, knowledge } => {
            normalize::run_normalize(&config, knowledge.as_deref(), &names)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[cfg(test)]
mod tests;
