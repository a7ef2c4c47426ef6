/*
 * generator.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Producing output from an input file.
//!
//! Nothing is written until the input has passed validation. An existing
//! output file is then backed up next to itself before being replaced.

use crate::error::{Result, TemplieError};
use crate::settings::Settings;
use crate::validator::{ValidatedInput, Validator};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Generator {
    validator: Validator,
}

impl Generator {
    pub fn new(settings: Settings) -> Result<Self> {
        Ok(Self {
            validator: Validator::new(settings)?,
        })
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn read_input(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|e| TemplieError::io(path, e))
    }

    pub fn validate_file(&self, input: &Path) -> Result<ValidatedInput> {
        let text = self.read_input(input)?;
        self.validator.validate_str(&text)
    }

    pub fn generate_string(&self, input: &str) -> Result<String> {
        self.validator.validate_str(input)?.render()
    }

    /// Where an existing `output` is moved before it is overwritten.
    pub fn backup_path(&self, output: &Path) -> PathBuf {
        let mut name = output.as_os_str().to_owned();
        name.push(&self.validator.settings().backup_suffix);
        PathBuf::from(name)
    }

    /// Validate and render `input`, then write the result to `output`.
    ///
    /// Returns the number of rendered blocks.
    pub fn generate_file(&self, input: &Path, output: &Path) -> Result<usize> {
        let validated = self.validate_file(input)?;
        let blocks = validated.render_rows()?;

        if output.exists() {
            let backup = self.backup_path(output);
            fs::copy(output, &backup).map_err(|e| TemplieError::io(&backup, e))?;
            tracing::info!(backup = %backup.display(), "backed up existing output");
        }
        fs::write(output, blocks.concat()).map_err(|e| TemplieError::io(output, e))?;

        tracing::info!(output = %output.display(), blocks = blocks.len(), "wrote output");
        Ok(blocks.len())
    }
}

/// Render an input file's text with the default settings.
pub fn generate_string(input: &str) -> Result<String> {
    Generator::new(Settings::default())?.generate_string(input)
}

/// Render `input` into `output` with the default settings.
pub fn generate_file(input: &Path, output: &Path) -> Result<usize> {
    Generator::new(Settings::default())?.generate_file(input, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const INPUT: &str = "\
[CONFIG]
template = tpl
global_parameters = globals
repeater_parameters = items
[tpl]
- $item ($unit)
[globals]
unit = kg
[items]
item
apples
pears
";

    #[test]
    fn test_generate_string() {
        assert_eq!(
            generate_string(INPUT).unwrap(),
            "- apples (kg)\n- pears (kg)\n"
        );
    }

    #[test]
    fn test_backup_path() {
        let generator = Generator::new(Settings::default()).unwrap();
        assert_eq!(
            generator.backup_path(Path::new("out/report.txt")),
            PathBuf::from("out/report.txt~")
        );
    }

    #[test]
    fn test_generate_file_backs_up_existing_output() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input.templie");
        let output = dir.path().join("output.txt");
        fs::write(&input, INPUT).unwrap();
        fs::write(&output, "previous").unwrap();

        let blocks = generate_file(&input, &output).unwrap();
        assert_eq!(blocks, 2);
        assert_eq!(fs::read_to_string(&output).unwrap(), "- apples (kg)\n- pears (kg)\n");
        assert_eq!(
            fs::read_to_string(dir.path().join("output.txt~")).unwrap(),
            "previous"
        );
    }

    #[test]
    fn test_invalid_input_leaves_output_alone() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input.templie");
        let output = dir.path().join("output.txt");
        fs::write(&input, INPUT.replace("($unit)", "($weight)")).unwrap();
        fs::write(&output, "previous").unwrap();

        let err = generate_file(&input, &output).unwrap_err();
        assert!(matches!(err, TemplieError::UndefinedVariable { .. }));
        assert_eq!(fs::read_to_string(&output).unwrap(), "previous");
        assert!(!dir.path().join("output.txt~").exists());
    }

    #[test]
    fn test_missing_input_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = generate_file(&dir.path().join("nope"), &dir.path().join("out")).unwrap_err();
        assert!(matches!(err, TemplieError::Io { .. }));
        assert_eq!(err.code(), "T-1-1");
    }
}
