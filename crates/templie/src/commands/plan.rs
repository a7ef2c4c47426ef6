/*
 * plan.rs
 * Copyright (c) 2025 Posit, PBC
 */

use std::path::Path;

use anyhow::{Context, Result};
use templie_core::{Generator, Settings};

/// Print the compiled join plan of `input` as pretty JSON.
///
/// Only the configuration and section checks run, so a plan can be shown
/// for input whose tables do not parse yet.
pub fn execute(input: &str) -> Result<()> {
    let generator = Generator::new(Settings::default())?;
    let text = generator.read_input(Path::new(input))?;
    let validator = generator.validator();
    let plan = validator.plan(&validator.scan(&text))?;
    let json = serde_json::to_string_pretty(&plan).context("Failed to serialize join plan")?;
    println!("{}", json);
    Ok(())
}
