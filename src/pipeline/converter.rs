//! Vendor registry and row conversion
//!
//! Each vendor is a closed enum variant. A vendor either has a converter
//! function or it does not; rows for vendors without one are skipped by the
//! caller rather than treated as errors.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::record::{
    ConvertedRecord, RawRecord, FOIL_COLUMN, NAME_COLUMN, QUANTITY_COLUMN, SET_NAME_COLUMN,
};

/// Separator between the faces of a split or double-faced card name
pub const SPLIT_CARD_SEPARATOR: &str = "//";

/// Function mapping one raw row to one vendor row
pub type ConverterFn = fn(&RawRecord) -> ConvertedRecord;

/// Buyers that accept bulk CSV submissions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Vendor {
    #[default]
    CardKingdom,
    TcgPlayer,
    CardConduit,
    StarCityGames,
}

impl Vendor {
    /// Registry order, as offered in vendor pickers
    pub const ALL: [Vendor; 4] = [
        Vendor::CardKingdom,
        Vendor::TcgPlayer,
        Vendor::CardConduit,
        Vendor::StarCityGames,
    ];

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Vendor::CardKingdom => "Card Kingdom",
            Vendor::TcgPlayer => "TCGPlayer",
            Vendor::CardConduit => "Card Conduit",
            Vendor::StarCityGames => "Star City Games",
        }
    }

    /// Lower-case name without separators, used in derived file names
    pub fn slug(self) -> &'static str {
        match self {
            Vendor::CardKingdom => "cardkingdom",
            Vendor::TcgPlayer => "tcgplayer",
            Vendor::CardConduit => "cardconduit",
            Vendor::StarCityGames => "starcitygames",
        }
    }

    /// Page where a converted file is submitted by hand
    pub fn submission_url(self) -> &'static str {
        match self {
            Vendor::CardKingdom => "https://www.cardkingdom.com/static/csvImport",
            Vendor::TcgPlayer => "https://seller.tcgplayer.com/sell-with-us/marketplace",
            Vendor::CardConduit => "https://cardconduit.com/estimates/create",
            Vendor::StarCityGames => "https://sellyourcards.starcitygames.com/mtg/upload",
        }
    }

    /// Row converter for this vendor, `None` when no mapping exists yet
    pub fn converter(self) -> Option<ConverterFn> {
        match self {
            Vendor::CardKingdom => Some(convert_card_kingdom),
            Vendor::TcgPlayer | Vendor::CardConduit | Vendor::StarCityGames => None,
        }
    }

    pub fn is_supported(self) -> bool {
        self.converter().is_some()
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Vendor {
    type Err = String;

    /// Accepts display names and slugs, ignoring case, spaces, dashes and underscores
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();

        Vendor::ALL
            .into_iter()
            .find(|vendor| vendor.slug() == normalized)
            .ok_or_else(|| {
                let names: Vec<&str> = Vendor::ALL.iter().map(|v| v.name()).collect();
                format!("unknown vendor '{}'. Known vendors: {}", s, names.join(", "))
            })
    }
}

/// Convert one raw row for `vendor`.
///
/// Returns `None` when the vendor has no mapping; the row should be skipped.
pub fn convert(raw: &RawRecord, vendor: Vendor) -> Option<ConvertedRecord> {
    vendor.converter().map(|convert_row| convert_row(raw))
}

/// Card Kingdom mapping. Never fails: absent fields fall back to defaults.
pub fn convert_card_kingdom(raw: &RawRecord) -> ConvertedRecord {
    ConvertedRecord {
        title: card_title(raw.text(NAME_COLUMN)),
        edition: raw.text(SET_NAME_COLUMN).to_string(),
        foil: foil_flag(raw.text(FOIL_COLUMN)),
        quantity: parse_quantity(raw.text(QUANTITY_COLUMN)),
    }
}

/// Front face of a card name: text before the first `//`, trimmed
pub fn card_title(name: &str) -> String {
    name.split(SPLIT_CARD_SEPARATOR)
        .next()
        .unwrap_or("")
        .trim()
        .to_string()
}

/// 1 when the foil column says "foil" (any case, surrounding spaces ignored)
pub fn foil_flag(foil: &str) -> u8 {
    u8::from(foil.trim().to_lowercase() == "foil")
}

/// Integer quantity, 0 when absent or not a number.
///
/// Whole-valued decimals ("3.0") are accepted; the sign is not checked.
pub fn parse_quantity(quantity: &str) -> i64 {
    let trimmed = quantity.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return value;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value.fract() == 0.0 => value as i64,
        _ => 0,
    }
}
