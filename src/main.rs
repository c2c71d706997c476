//! Fraud classifier - Main Entry Point
//!
//! `fraud-claims [train]` trains and persists the best model;
//! `fraud-claims predict` scores a JSON record from stdin.

use clap::Parser;
use fraud_claims::cli::{cmd_predict, cmd_train, Cli, Commands, TrainArgs};
use std::io::{Read, Write};
use std::process::ExitCode;

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Train(args)) => {
            cmd_train(&args.to_config())?;
        }
        Some(Commands::Predict { model }) => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            let output = cmd_predict(&model, &input)?;

            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", output)?;
            stdout.flush()?;
        }
        None => {
            // Default: train with the standard file names
            cmd_train(&TrainArgs::default().to_config())?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    // Logs go to stderr so stdout stays machine readable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fraud_claims=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
