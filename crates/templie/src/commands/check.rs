/*
 * check.rs
 * Copyright (c) 2025 Posit, PBC
 */

use std::path::Path;

use anyhow::Result;
use templie_core::{Generator, Settings};

/// Run every validation stage and print a one-line summary.
pub fn execute(input: &str) -> Result<()> {
    let generator = Generator::new(Settings::default())?;
    let validated = generator.validate_file(Path::new(input))?;
    println!(
        "{}: ok ({} table(s), {} row(s))",
        input,
        validated.tables().len(),
        validated.rows().len()
    );
    Ok(())
}
