//! Static preview of converted rows

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Table};

use crate::pipeline::{ConvertedRecord, Field, ResultStore, SortDirection};

/// Table of the first `limit` displayed records.
///
/// Column headings carry an arrow for fields that have been sorted.
pub fn preview_table(store: &ResultStore, limit: usize) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(
        Field::ALL
            .iter()
            .map(|&field| Cell::new(heading(store, field)).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );

    for record in store.displayed().take(limit) {
        table.add_row(record_cells(record));
    }
    table
}

pub fn heading(store: &ResultStore, field: Field) -> String {
    match store.sort_direction(field) {
        Some(SortDirection::Ascending) => format!("{} ▲", field.label()),
        Some(SortDirection::Descending) => format!("{} ▼", field.label()),
        None => field.label().to_string(),
    }
}

fn record_cells(record: &ConvertedRecord) -> Vec<Cell> {
    Field::ALL
        .iter()
        .map(|&field| {
            let cell = Cell::new(record.field_text(field));
            match field {
                Field::Foil | Field::Quantity => cell.set_alignment(CellAlignment::Right),
                Field::Title | Field::Edition => cell,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_respects_limit_and_sort_marker() {
        let mut store = ResultStore::new();
        for (title, quantity) in [("Opt", 4), ("Brainstorm", 1), ("Ponder", 2)] {
            store.append(ConvertedRecord {
                title: title.to_string(),
                edition: "Ice Age".to_string(),
                foil: 0,
                quantity,
            });
        }
        store.sort(Field::Quantity);

        let rendered = preview_table(&store, 2).to_string();
        assert!(rendered.contains("Quantity ▲"));
        assert!(rendered.contains("Brainstorm"));
        assert!(rendered.contains("Ponder"));
        assert!(!rendered.contains("Opt"));
    }
}
