/*
 * settings.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Library-level settings.
//!
//! These are the names and markers that define the input file layout. They
//! are threaded into the [`Validator`](crate::Validator) at construction time
//! so that different layouts can be validated side by side.

/// Names of the keys expected in the configuration section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigKeys {
    pub template: String,
    pub global_parameters: String,
    pub repeater_parameters: String,
    pub flat_repeater: String,
}

impl Default for ConfigKeys {
    fn default() -> Self {
        Self {
            template: "template".to_string(),
            global_parameters: "global_parameters".to_string(),
            repeater_parameters: "repeater_parameters".to_string(),
            flat_repeater: "flat_repeater".to_string(),
        }
    }
}

impl ConfigKeys {
    /// The keys that must be declared, in reporting order.
    pub fn required(&self) -> [&str; 3] {
        [
            &self.template,
            &self.global_parameters,
            &self.repeater_parameters,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Name of the section holding the configuration keys.
    pub config_section: String,
    pub keys: ConfigKeys,
    /// First line of a table section that switches it to flat layout.
    pub flat_marker: String,
    /// Appended to the output path when backing up an existing file.
    pub backup_suffix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_section: "CONFIG".to_string(),
            keys: ConfigKeys::default(),
            flat_marker: "*flat*".to_string(),
            backup_suffix: "~".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let settings = Settings::default();
        assert_eq!(settings.config_section, "CONFIG");
        assert_eq!(settings.flat_marker, "*flat*");
        assert_eq!(
            settings.keys.required(),
            ["template", "global_parameters", "repeater_parameters"]
        );
    }
}
