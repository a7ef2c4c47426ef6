/*
 * main.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! templie CLI - Main entry point

use anyhow::Result;
use clap::{Parser, Subcommand};
use templie_core::TemplieError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "templie")]
#[command(version)]
#[command(about = "Generate text from a template and joined parameter tables", long_about = None)]
struct Cli {
    /// Print diagnostics as JSON, one object per line
    #[arg(long = "json-errors", global = true)]
    json_errors: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the template once per joined row
    Generate {
        /// Input file
        #[arg(short = 'i', long = "input")]
        input: String,

        /// Output file ('-' for stdout). An existing file is backed up first.
        #[arg(short = 'o', long = "output")]
        output: String,
    },

    /// Validate an input file without writing anything
    Check {
        /// Input file
        #[arg(short = 'i', long = "input")]
        input: String,
    },

    /// Print the compiled join plan as JSON
    Plan {
        /// Input file
        #[arg(short = 'i', long = "input")]
        input: String,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "templie=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate { input, output } => {
            commands::generate::execute(commands::generate::GenerateArgs { input, output })
        }
        Commands::Check { input } => commands::check::execute(&input),
        Commands::Plan { input } => commands::plan::execute(&input),
    };

    match result {
        Ok(()) => Ok(()),
        Err(err) => match err.downcast_ref::<TemplieError>() {
            Some(templie_error) => {
                commands::report(templie_error, cli.json_errors);
                std::process::exit(1);
            }
            None => Err(err),
        },
    }
}
