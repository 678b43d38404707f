//! Tests for the one-shot convert command

mod common;

use manaconv::cli::{run_convert, ConvertConfig};
use manaconv::pipeline::{Field, Filters, Vendor};
use std::path::{Path, PathBuf};

fn config(input: &Path, output: PathBuf) -> ConvertConfig {
    ConvertConfig {
        input: input.to_path_buf(),
        output,
        vendor: Vendor::CardKingdom,
        filters: Filters::new(),
        sorts: Vec::new(),
        preview_limit: 5,
        show_preview: true,
        report: None,
        no_confirm: true,
    }
}

#[test]
fn test_convert_writes_card_kingdom_csv() {
    let (temp_dir, csv_path) = common::create_sample_export();
    let output = temp_dir.path().join("collection_cardkingdom.csv");

    let outcome = run_convert(&config(&csv_path, output.clone())).unwrap();

    assert_eq!(outcome.conversion.converted, 5);
    assert_eq!(outcome.saved_to, Some(output.clone()));

    let contents = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines[0], "title,edition,foil,quantity");
    assert_eq!(lines[1], "Fire,Modern Horizons 2,1,3");
    assert_eq!(lines[3], "Wear,Dragon's Maze,0,1");
    assert_eq!(lines.len(), 6);
}

#[test]
fn test_convert_sorts_export_but_filters_only_view() {
    let (temp_dir, csv_path) = common::create_sample_export();
    let output = temp_dir.path().join("sorted.csv");

    let mut cfg = config(&csv_path, output.clone());
    cfg.filters = Filters::new().with(Field::Edition, "modern");
    cfg.sorts = vec![Field::Quantity, Field::Quantity];
    let outcome = run_convert(&cfg).unwrap();

    // Fire (3) and Counterspell (2) are from Modern Horizons 2
    assert_eq!(outcome.displayed.row_count, 2);
    assert_eq!(outcome.displayed.quantity_total, 5);

    let contents = std::fs::read_to_string(&output).unwrap();
    let titles: Vec<&str> = contents
        .lines()
        .skip(1)
        .map(|line| line.split(',').next().unwrap())
        .collect();
    assert_eq!(titles[0], "Lightning Bolt");
    assert_eq!(titles.len(), 5);
}

#[test]
fn test_convert_for_vendor_without_mapping() {
    let (temp_dir, csv_path) = common::create_sample_export();
    let output = temp_dir.path().join("tcg.csv");

    let mut cfg = config(&csv_path, output.clone());
    cfg.vendor = Vendor::TcgPlayer;
    let outcome = run_convert(&cfg).unwrap();

    assert_eq!(outcome.conversion.skipped, 5);
    assert_eq!(outcome.conversion.converted, 0);
    let contents = std::fs::read_to_string(&output).unwrap();
    assert_eq!(contents.trim(), "title,edition,foil,quantity");
}

#[test]
fn test_convert_missing_input_fails_without_output() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing.csv");
    let output = temp_dir.path().join("out.csv");

    let err = run_convert(&config(&missing, output.clone())).unwrap_err();

    assert!(format!("{:#}", err).contains("missing.csv"));
    assert!(!output.exists());
}

#[test]
fn test_convert_writes_json_report() {
    let (temp_dir, csv_path) = common::create_sample_export();
    let report_path = temp_dir.path().join("report.json");

    let mut cfg = config(&csv_path, temp_dir.path().join("out.csv"));
    cfg.report = Some(report_path.clone());
    cfg.filters = Filters::new().with(Field::Foil, "1");
    cfg.sorts = vec![Field::Title];
    run_convert(&cfg).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(json["conversion"]["converted"], 5);
    assert_eq!(json["conversion"]["vendor"], "CardKingdom");
    assert_eq!(json["filters"]["foil"], "1");
    assert_eq!(json["sorts"][0]["field"], "title");
    assert_eq!(json["sorts"][0]["direction"], "ascending");
    assert_eq!(json["displayed"]["row_count"], 2);
    assert_eq!(json["displayed"]["quantity_total"], 4);
    assert!(json["metadata"]["output_file"]
        .as_str()
        .unwrap()
        .ends_with("out.csv"));
}
