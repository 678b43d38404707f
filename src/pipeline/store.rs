//! In-memory result store with filtering, sort toggles and summary
//!
//! The store owns every converted record of the current run. Filtering
//! never reorders records; only `sort` does, and it does so in place so
//! that exports follow the last sort applied.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use super::record::{ConvertedRecord, Field};

/// Per-field substring predicates, combined with logical AND.
///
/// Predicates are stored lower-cased; an empty predicate matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Filters {
    predicates: HashMap<Field, String>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: Field, text: &str) -> Self {
        self.set(field, text);
        self
    }

    /// Replace the predicate of one field; empty text removes it
    pub fn set(&mut self, field: Field, text: &str) {
        let text = text.to_lowercase();
        if text.is_empty() {
            self.predicates.remove(&field);
        } else {
            self.predicates.insert(field, text);
        }
    }

    pub fn get(&self, field: Field) -> &str {
        self.predicates.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Case-insensitive substring match on every non-empty predicate
    pub fn matches(&self, record: &ConvertedRecord) -> bool {
        self.predicates.iter().all(|(field, needle)| {
            record
                .field_text(*field)
                .to_lowercase()
                .contains(needle.as_str())
        })
    }
}

/// Direction applied by the latest sort of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => f.write_str("ascending"),
            SortDirection::Descending => f.write_str("descending"),
        }
    }
}

/// Row count and quantity total of the displayed records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub row_count: usize,
    pub quantity_total: i64,
}

/// Converted records of the current run plus the view derived from them
#[derive(Debug, Default)]
pub struct ResultStore {
    records: Vec<ConvertedRecord>,
    /// `true` when the field was last sorted ascending
    ascending: HashMap<Field, bool>,
    filters: Filters,
    /// Indices into `records` that pass `filters`, in stored order
    displayed: Vec<usize>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all records. Filters and sort toggles are kept.
    pub fn clear(&mut self) {
        self.records.clear();
        self.displayed.clear();
    }

    pub fn append(&mut self, record: ConvertedRecord) {
        if self.filters.matches(&record) {
            self.displayed.push(self.records.len());
        }
        self.records.push(record);
    }

    /// Records passing `filters`, in stored order. Does not touch the view.
    pub fn filter(&self, filters: &Filters) -> Vec<&ConvertedRecord> {
        self.records
            .iter()
            .filter(|record| filters.matches(record))
            .collect()
    }

    /// Change one field's predicate and refresh the displayed view
    pub fn set_filter(&mut self, field: Field, text: &str) {
        self.filters.set(field, text);
        self.refresh();
    }

    /// Replace every predicate and refresh the displayed view
    pub fn set_filters(&mut self, filters: Filters) {
        self.filters = filters;
        self.refresh();
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    /// Toggle the direction of `field` and reorder the records in place.
    ///
    /// The first sort of a field is ascending. The sort is stable: records
    /// that compare equal keep their previous relative order.
    pub fn sort(&mut self, field: Field) -> SortDirection {
        let ascending = self.ascending.entry(field).or_insert(false);
        *ascending = !*ascending;
        let ascending = *ascending;

        if ascending {
            self.records.sort_by(|a, b| a.compare_by(b, field));
        } else {
            self.records.sort_by(|a, b| b.compare_by(a, field));
        }
        self.refresh();

        if ascending {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        }
    }

    /// Direction of the last sort of `field`, if it was ever sorted
    pub fn sort_direction(&self, field: Field) -> Option<SortDirection> {
        self.ascending.get(&field).map(|&ascending| {
            if ascending {
                SortDirection::Ascending
            } else {
                SortDirection::Descending
            }
        })
    }

    /// Every record in stored order, ignoring filters
    pub fn records(&self) -> &[ConvertedRecord] {
        &self.records
    }

    /// Records currently displayed (passing the active filters)
    pub fn displayed(&self) -> impl ExactSizeIterator<Item = &ConvertedRecord> + '_ {
        self.displayed.iter().map(move |&idx| &self.records[idx])
    }

    pub fn displayed_len(&self) -> usize {
        self.displayed.len()
    }

    /// Row count and quantity total of the displayed view.
    ///
    /// Quantities are not range-checked on input, so the total saturates
    /// at the `i64` bounds.
    pub fn summary(&self) -> Summary {
        Summary {
            row_count: self.displayed.len(),
            quantity_total: self
                .displayed()
                .fold(0i64, |total, record| total.saturating_add(record.quantity)),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn refresh(&mut self) {
        let filters = &self.filters;
        self.displayed = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, record)| filters.matches(record))
            .map(|(idx, _)| idx)
            .collect();
    }
}
