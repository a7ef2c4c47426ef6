/*
 * integration_tests.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Integration tests for templie-core using test fixtures.
 */

use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use templie_core::{
    AmbiguousName, ConflictScope, Generator, Settings, TemplieError, Validator, generate_string,
};

/// Helper to get the path to test fixtures
fn fixture_path(name: &str) -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    Path::new(manifest_dir).join("test-fixtures").join(name)
}

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|_| panic!("Failed to load fixture: {}", name))
}

/// Render `<name>.templie` and compare with `<name>.expected`.
fn assert_renders(name: &str) {
    let input = load_fixture(&format!("{}.templie", name));
    let expected = load_fixture(&format!("{}.expected", name));
    assert_eq!(generate_string(&input).unwrap(), expected);
}

#[test]
fn test_one_to_one_join() {
    assert_renders("scenario_a");
}

#[test]
fn test_fan_out_preserves_source_order() {
    assert_renders("scenario_b");
}

#[test]
fn test_unique_bare_name_resolves() {
    let input = load_fixture("scenario_c.templie");
    assert_eq!(generate_string(&input).unwrap(), "1 for Ann (pens)\n");
}

#[test]
fn test_shared_bare_name_is_ambiguous() {
    let input = load_fixture("scenario_c_ambiguous.templie");
    match generate_string(&input).unwrap_err() {
        TemplieError::AmbiguousVariable { template, names } => {
            assert_eq!(template, "tpl");
            assert_eq!(
                names,
                vec![AmbiguousName {
                    name: "name".to_string(),
                    alternatives: vec!["orders.name".to_string(), "customers.name".to_string()],
                }]
            );
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_later_join_keys_off_base_table() {
    assert_renders("scenario_d");
}

#[test]
fn test_global_shadowing_column_is_a_conflict() {
    let input = load_fixture("scenario_e.templie");
    match generate_string(&input).unwrap_err() {
        TemplieError::NameConflict { scope, names } => {
            assert_eq!(
                scope,
                ConflictScope::GlobalsAndColumns {
                    globals: "globals".to_string()
                }
            );
            assert_eq!(names, vec!["status".to_string()]);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_composite_keys_from_several_tables() {
    assert_renders("composite_keys");
}

#[test]
fn test_flat_table() {
    assert_renders("flat");
}

#[test]
fn test_forced_flat_layout() {
    let input = load_fixture("flat.templie")
        .replace("*flat*\n", "")
        .replace(
            "repeater_parameters = people",
            "repeater_parameters = people\nflat_repeater = true",
        );
    let expected = load_fixture("flat.expected");
    assert_eq!(generate_string(&input).unwrap(), expected);
}

#[test]
fn test_validation_is_idempotent() {
    let validator = Validator::new(Settings::default()).unwrap();
    for name in ["scenario_a", "scenario_d", "composite_keys"] {
        let input = load_fixture(&format!("{}.templie", name));
        let first = validator.validate_str(&input).unwrap().render().unwrap();
        let second = validator.validate_str(&input).unwrap().render().unwrap();
        assert_eq!(first, second);
    }

    for name in ["scenario_c_ambiguous", "scenario_e"] {
        let input = load_fixture(&format!("{}.templie", name));
        let first = validator.validate_str(&input).unwrap_err();
        let second = validator.validate_str(&input).unwrap_err();
        assert_eq!(first.to_diagnostic(), second.to_diagnostic());
    }
}

#[test]
fn test_independent_validators_agree() {
    let input = load_fixture("scenario_b.templie");
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let input = input.clone();
            std::thread::spawn(move || {
                let validator = Validator::new(Settings::default()).unwrap();
                validator.validate_str(&input).unwrap().render().unwrap()
            })
        })
        .collect();
    let expected = load_fixture("scenario_b.expected");
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn test_validated_input_exposes_plan_and_rows() {
    let input = load_fixture("scenario_b.templie");
    let validated = Validator::new(Settings::default())
        .unwrap()
        .validate_str(&input)
        .unwrap();
    assert_eq!(validated.config().template, "letter");
    assert!(!validated.config().flat_repeater);
    assert_eq!(validated.query().names(), vec!["orders", "customers"]);
    assert_eq!(
        validated
            .rows()
            .iter()
            .map(|r| r.indices().to_vec())
            .collect::<Vec<_>>(),
        vec![vec![0, 0], vec![0, 2], vec![1, 1]]
    );
    assert_eq!(
        validated.render_rows().unwrap(),
        vec!["1:Ann\n", "1:Cy\n", "2:Bo\n"]
    );
}

#[test]
fn test_query_error_diagnostic_points_at_fragment() {
    let input = load_fixture("scenario_a.templie").replace(
        "orders.cust = customers.cid",
        "orders.cust, orders.id = customers.cid",
    );
    let err = generate_string(&input).unwrap_err();
    let diagnostic = err.to_diagnostic();
    assert_eq!(diagnostic.code.as_deref(), Some("T-4-1"));

    let snippet = diagnostic.snippet.as_ref().unwrap();
    assert_eq!(snippet.fragment(), "orders.cust, orders.id = customers.cid");

    let text = diagnostic.to_text();
    assert!(text.contains("[T-4-1] Query Syntax Error"));
    assert!(text.contains("left side lists 2 column(s) but right side lists 1"));
}

#[test]
fn test_generate_file_with_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("letters.txt");
    let generator = Generator::new(Settings::default()).unwrap();
    let blocks = generator
        .generate_file(&fixture_path("scenario_a.templie"), &output)
        .unwrap();
    assert_eq!(blocks, 2);
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        load_fixture("scenario_a.expected")
    );
}
