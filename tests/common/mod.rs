//! Shared test utilities and fixture generators

#![allow(dead_code)]

use manaconv::pipeline::{ConvertedRecord, ResultStore};
use std::path::PathBuf;
use tempfile::TempDir;

/// Header of a ManaBox collection export
pub const MANABOX_HEADER: &str = "Name,Set code,Set name,Collector number,Foil,Rarity,Quantity,ManaBox ID,Scryfall ID,Purchase price,Misprint,Altered,Condition,Language,Purchase price currency";

/// A small ManaBox export covering split cards, foils and odd quantities
pub fn sample_export() -> String {
    [
        MANABOX_HEADER,
        "Fire // Ice,MH2,Modern Horizons 2,290,foil,uncommon,3,1,a,0.5,false,false,near_mint,en,USD",
        "Lightning Bolt,2X2,Double Masters 2022,117,normal,uncommon,4,2,b,1.2,false,false,near_mint,en,USD",
        "\"Wear // Tear\",DGM,Dragon's Maze,135,normal,uncommon,1,3,c,0.3,false,false,played,en,USD",
        "Counterspell,MH2,Modern Horizons 2,267,etched,uncommon,2,4,d,2.0,false,false,near_mint,en,USD",
        "Brainstorm,STA,Strixhaven Mystical Archive,13,Foil,rare,1,5,e,6.0,false,false,near_mint,en,USD",
    ]
    .join("\n")
        + "\n"
}

/// Write `contents` to `name` inside a fresh temporary directory
pub fn create_temp_csv(name: &str, contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join(name);
    std::fs::write(&csv_path, contents).unwrap();
    (temp_dir, csv_path)
}

/// Temporary directory holding the sample export as `collection.csv`
pub fn create_sample_export() -> (TempDir, PathBuf) {
    create_temp_csv("collection.csv", &sample_export())
}

pub fn record(title: &str, edition: &str, foil: u8, quantity: i64) -> ConvertedRecord {
    ConvertedRecord {
        title: title.to_string(),
        edition: edition.to_string(),
        foil,
        quantity,
    }
}

/// Store holding a handful of records in a known order
pub fn create_test_store() -> ResultStore {
    let mut store = ResultStore::new();
    store.append(record("Lightning Bolt", "Double Masters 2022", 0, 4));
    store.append(record("fire", "Modern Horizons 2", 1, 3));
    store.append(record("Counterspell", "Modern Horizons 2", 0, 2));
    store.append(record("Brainstorm", "Strixhaven Mystical Archive", 1, 1));
    store.append(record("Bolt Bend", "War of the Spark", 0, 12));
    store
}

/// Titles of the records currently stored, in stored order
pub fn stored_titles(store: &ResultStore) -> Vec<String> {
    store.records().iter().map(|r| r.title.clone()).collect()
}

/// Titles of the records currently displayed
pub fn displayed_titles(store: &ResultStore) -> Vec<String> {
    store.displayed().map(|r| r.title.clone()).collect()
}

/// Check the summary against the displayed view
pub fn assert_summary_matches_view(store: &ResultStore) {
    let summary = store.summary();
    let displayed: Vec<&ConvertedRecord> = store.displayed().collect();
    assert_eq!(summary.row_count, displayed.len(), "row count mismatch");
    assert_eq!(
        summary.quantity_total,
        displayed.iter().map(|r| r.quantity).sum::<i64>(),
        "quantity total mismatch"
    );
}
