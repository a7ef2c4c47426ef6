/*
 * validator.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Input validation.
//!
//! Validation runs four stages in order and stops at the first failure:
//!
//! 1. **Config**: the configuration section declares every required key and
//!    its values are well formed.
//! 2. **Sections**: the template, the global parameters and every table the
//!    query names are present. The query is compiled here.
//! 3. **Structure**: parameter and table sections parse, and global names do
//!    not clash with bare column names.
//! 4. **Semantics**: template delimiters are well formed, the join runs, and
//!    every placeholder resolves.
//!
//! A [`ValidatedInput`] can only be obtained by passing all four, so
//! rendering it cannot fail on user input.

use crate::error::{AmbiguousName, ConflictScope, Result, TemplieError};
use crate::parameters::Parameters;
use crate::query::{CompiledQuery, JoinedRow, Namespace, Resolution, execute};
use crate::sections::Sections;
use crate::settings::Settings;
use crate::syntax::LineSyntax;
use crate::table::{Table, parse_table};
use crate::template::Template;

/// The values of the configuration section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputConfig {
    pub template: String,
    pub global_parameters: String,
    /// The join expression.
    pub repeater_parameters: String,
    pub flat_repeater: bool,
}

/// Input that passed every validation stage.
#[derive(Debug, Clone)]
pub struct ValidatedInput {
    config: InputConfig,
    query: CompiledQuery,
    template: Template,
    globals: Parameters,
    /// In query order.
    tables: Vec<Table>,
    namespace: Namespace,
    rows: Vec<JoinedRow>,
}

impl ValidatedInput {
    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    pub fn query(&self) -> &CompiledQuery {
        &self.query
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn globals(&self) -> &Parameters {
        &self.globals
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn rows(&self) -> &[JoinedRow] {
        &self.rows
    }

    /// Render the template once per joined row, in join order.
    pub fn render_rows(&self) -> Result<Vec<String>> {
        let tables: Vec<&Table> = self.tables.iter().collect();
        self.rows
            .iter()
            .map(|row| {
                let values = self
                    .namespace
                    .flatten(&tables, row)
                    .with_globals(&self.globals);
                self.template.substitute(&values)
            })
            .collect()
    }

    /// All rendered blocks, concatenated without separators.
    pub fn render(&self) -> Result<String> {
        Ok(self.render_rows()?.concat())
    }
}

struct Structure {
    globals: Parameters,
    tables: Vec<Table>,
    namespace: Namespace,
}

/// Validates input files of one layout.
///
/// Holds its settings and compiled line grammar, so separate validators are
/// independent.
#[derive(Debug, Clone)]
pub struct Validator {
    settings: Settings,
    syntax: LineSyntax,
}

impl Validator {
    pub fn new(settings: Settings) -> Result<Self> {
        let syntax = LineSyntax::new(&settings)?;
        Ok(Self { settings, syntax })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn syntax(&self) -> &LineSyntax {
        &self.syntax
    }

    pub fn scan(&self, input: &str) -> Sections {
        Sections::scan(input, &self.syntax)
    }

    /// Scan and validate a whole input file.
    pub fn validate_str(&self, input: &str) -> Result<ValidatedInput> {
        self.validate(&self.scan(input))
    }

    pub fn validate(&self, sections: &Sections) -> Result<ValidatedInput> {
        let config = self.check_config(sections)?;
        tracing::debug!(
            template = %config.template,
            globals = %config.global_parameters,
            "config stage passed"
        );

        let query = self.check_sections(sections, &config)?;
        tracing::debug!(query = %query, "section stage passed");

        let structure = self.check_structure(sections, &config, &query)?;
        tracing::debug!(tables = structure.tables.len(), "structural stage passed");

        let validated = self.check_semantics(sections, config, query, structure)?;
        tracing::debug!(rows = validated.rows.len(), "semantic stage passed");
        Ok(validated)
    }

    /// Run the first two stages and return the compiled join plan.
    pub fn plan(&self, sections: &Sections) -> Result<CompiledQuery> {
        let config = self.check_config(sections)?;
        self.check_sections(sections, &config)
    }

    fn section<'s>(&self, sections: &'s Sections, name: &str) -> Result<&'s [String]> {
        sections.lines(name).ok_or_else(|| TemplieError::MissingSection {
            section: name.to_string(),
        })
    }

    fn check_config(&self, sections: &Sections) -> Result<InputConfig> {
        let section = &self.settings.config_section;
        let keys = &self.settings.keys;
        let params = Parameters::parse(section, self.section(sections, section)?, &self.syntax)?;

        let missing: Vec<String> = keys
            .required()
            .into_iter()
            .filter(|key| !params.contains(key))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(TemplieError::MissingParameter {
                section: section.clone(),
                parameters: missing,
            });
        }

        let flat_repeater = match params.get(&keys.flat_repeater) {
            None | Some("false") => false,
            Some("true") => true,
            Some(other) => {
                return Err(TemplieError::WrongValue {
                    parameter: keys.flat_repeater.clone(),
                    expected: "either `true` or `false`".to_string(),
                    found: other.to_string(),
                });
            }
        };

        let value = |key: &String| params.get(key).unwrap_or_default().to_string();
        let config = InputConfig {
            template: value(&keys.template),
            global_parameters: value(&keys.global_parameters),
            repeater_parameters: value(&keys.repeater_parameters),
            flat_repeater,
        };

        if config.template == config.global_parameters {
            return Err(TemplieError::WrongValue {
                parameter: keys.global_parameters.clone(),
                expected: format!("a section other than the template `{}`", config.template),
                found: config.global_parameters,
            });
        }
        Ok(config)
    }

    fn check_sections(&self, sections: &Sections, config: &InputConfig) -> Result<CompiledQuery> {
        self.section(sections, &config.template)?;
        self.section(sections, &config.global_parameters)?;

        let query = CompiledQuery::compile(&config.repeater_parameters)?;
        for name in query.names() {
            self.section(sections, name)?;
        }
        Ok(query)
    }

    fn check_structure(
        &self,
        sections: &Sections,
        config: &InputConfig,
        query: &CompiledQuery,
    ) -> Result<Structure> {
        let globals = Parameters::parse(
            &config.global_parameters,
            self.section(sections, &config.global_parameters)?,
            &self.syntax,
        )?;

        let tables = query
            .names()
            .into_iter()
            .map(|name| -> Result<Table> {
                parse_table(
                    name,
                    self.section(sections, name)?,
                    &self.syntax,
                    config.flat_repeater,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        let namespace = Namespace::new(&tables.iter().collect::<Vec<_>>());
        let conflicts: Vec<String> = globals
            .names()
            .filter(|name| namespace.unqualified_names().any(|column| column == *name))
            .map(str::to_string)
            .collect();
        if !conflicts.is_empty() {
            return Err(TemplieError::NameConflict {
                scope: ConflictScope::GlobalsAndColumns {
                    globals: config.global_parameters.clone(),
                },
                names: conflicts,
            });
        }

        Ok(Structure {
            globals,
            tables,
            namespace,
        })
    }

    fn check_semantics(
        &self,
        sections: &Sections,
        config: InputConfig,
        query: CompiledQuery,
        structure: Structure,
    ) -> Result<ValidatedInput> {
        let template = Template::from_lines(
            &config.template,
            self.section(sections, &config.template)?,
        );
        template.validate_delimiters()?;

        let Structure {
            globals,
            tables,
            namespace,
        } = structure;

        let rows = {
            let borrowed: Vec<&Table> = tables.iter().collect();
            execute(&query, &borrowed)?.into_rows()
        };

        let mut undefined = Vec::new();
        let mut ambiguous = Vec::new();
        for name in template.placeholder_names() {
            if globals.contains(name) {
                continue;
            }
            match namespace.resolve(name) {
                Resolution::Unqualified { .. } | Resolution::Qualified { .. } => {}
                Resolution::Ambiguous { alternatives } => ambiguous.push(AmbiguousName {
                    name: name.to_string(),
                    alternatives,
                }),
                Resolution::Undefined => undefined.push(name.to_string()),
            }
        }
        if !undefined.is_empty() {
            return Err(TemplieError::UndefinedVariable {
                template: config.template,
                names: undefined,
            });
        }
        if !ambiguous.is_empty() {
            return Err(TemplieError::AmbiguousVariable {
                template: config.template,
                names: ambiguous,
            });
        }

        Ok(ValidatedInput {
            config,
            query,
            template,
            globals,
            tables,
            namespace,
            rows,
        })
    }
}
