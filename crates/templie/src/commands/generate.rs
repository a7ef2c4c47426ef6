/*
 * generate.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Generate command implementation
 */

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use templie_core::{Generator, Settings};
use tracing::debug;

/// Arguments for the generate command
#[derive(Debug)]
pub struct GenerateArgs {
    /// Input file
    pub input: String,
    /// Output file, or `-` for stdout
    pub output: String,
}

/// Execute the generate command
pub fn execute(args: GenerateArgs) -> Result<()> {
    let generator = Generator::new(Settings::default())?;
    let input = Path::new(&args.input);

    if args.output == "-" {
        let rendered = generator.validate_file(input)?.render()?;
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(rendered.as_bytes())
            .and_then(|()| stdout.flush())
            .context("Failed to write to stdout")?;
        debug!(bytes = rendered.len(), "wrote output to stdout");
        return Ok(());
    }

    generator.generate_file(input, Path::new(&args.output))?;
    Ok(())
}
