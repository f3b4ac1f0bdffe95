//! Stepwise CLI: the main entry point.
//!
//! Commands:
//! - `ask`       Answer a question with the ReAct loop
//! - `onboard`   Write a default config file
//! - `doctor`    Diagnose config, provider and lookup
//! - `providers` List supported LLM providers

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "stepwise",
    about = "Stepwise: ReAct question answering over a knowledge lookup",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging and step-by-step progress
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a question and print the final transcript
    Ask {
        /// The question to answer
        question: String,

        /// Override the step budget
        #[arg(long)]
        max_steps: Option<u32>,

        /// Override the model
        #[arg(short, long)]
        model: Option<String>,

        /// Print the full run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Initialize configuration
    Onboard,

    /// Diagnose system health
    Doctor,

    /// List supported LLM providers
    Providers,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries only the transcript
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Ask {
            question,
            max_steps,
            model,
            json,
        } => {
            commands::ask::run(commands::ask::AskOptions {
                question,
                max_steps,
                model,
                json,
                verbose: cli.verbose,
            })
            .await?
        }
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Doctor => commands::doctor::run().await?,
        Commands::Providers => commands::providers::run().await?,
    }

    Ok(())
}
