//! Raw input rows and converted vendor rows

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Column header of the card name in a ManaBox export
pub const NAME_COLUMN: &str = "Name";
/// Column header of the edition in a ManaBox export
pub const SET_NAME_COLUMN: &str = "Set name";
/// Column header of the foil indicator in a ManaBox export
pub const FOIL_COLUMN: &str = "Foil";
/// Column header of the copy count in a ManaBox export
pub const QUANTITY_COLUMN: &str = "Quantity";

/// One row of the input CSV, keyed by column header.
///
/// Empty cells are never stored, so a blank cell and a missing column
/// look the same to the converter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    fields: HashMap<String, String>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly useful when assembling rows by hand
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            return;
        }
        self.fields.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Field text, or the empty string when absent
    pub fn text(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = RawRecord::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

/// A row normalised for a vendor submission file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertedRecord {
    pub title: String,
    pub edition: String,
    /// 1 for foil copies, 0 otherwise
    pub foil: u8,
    pub quantity: i64,
}

impl ConvertedRecord {
    /// Stringified value of a field, as shown in previews and matched by filters
    pub fn field_text(&self, field: Field) -> String {
        match field {
            Field::Title => self.title.clone(),
            Field::Edition => self.edition.clone(),
            Field::Foil => self.foil.to_string(),
            Field::Quantity => self.quantity.to_string(),
        }
    }

    /// Ordering used when sorting by `field` in ascending direction.
    ///
    /// Text fields compare case-insensitively, numeric fields natively.
    pub fn compare_by(&self, other: &Self, field: Field) -> std::cmp::Ordering {
        match field {
            Field::Title => self.title.to_lowercase().cmp(&other.title.to_lowercase()),
            Field::Edition => self
                .edition
                .to_lowercase()
                .cmp(&other.edition.to_lowercase()),
            Field::Foil => self.foil.cmp(&other.foil),
            Field::Quantity => self.quantity.cmp(&other.quantity),
        }
    }
}

/// Columns of a converted record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Title,
    Edition,
    Foil,
    Quantity,
}

impl Field {
    /// All fields in output column order
    pub const ALL: [Field; 4] = [Field::Title, Field::Edition, Field::Foil, Field::Quantity];

    /// Output header name
    pub fn name(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Edition => "edition",
            Field::Foil => "foil",
            Field::Quantity => "quantity",
        }
    }

    /// Capitalised label for table headings
    pub fn label(self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::Edition => "Edition",
            Field::Foil => "Foil",
            Field::Quantity => "Quantity",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Field::Title => 0,
            Field::Edition => 1,
            Field::Foil => 2,
            Field::Quantity => 3,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "title" => Ok(Field::Title),
            "edition" => Ok(Field::Edition),
            "foil" => Ok(Field::Foil),
            "quantity" | "qty" => Ok(Field::Quantity),
            other => Err(format!(
                "unknown field '{}'. Expected one of: title, edition, foil, quantity",
                other
            )),
        }
    }
}
