//! Error types for reading, converting and exporting card lists.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors surfaced by the conversion pipeline.
///
/// Rows for a vendor without a mapping are not errors; they are counted as
/// skipped in the run report.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Input path does not exist.
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Input exists but could not be read or parsed as CSV.
    #[error("Failed to read input CSV {}: {source}", path.display())]
    InputRead {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    /// Output file could not be created, written or moved into place.
    #[error("Failed to write output CSV {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Converted rows could not be encoded as CSV.
    #[error("Failed to encode output CSV {}: {source}", path.display())]
    OutputEncode {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    /// A run was requested while another one is still converting.
    #[error("A conversion is already in progress")]
    ConversionInFlight,

    /// The worker stopped without reporting completion.
    #[error("Conversion worker stopped before finishing")]
    WorkerDisconnected,
}

impl ConvertError {
    /// True for failures reading the input file
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ConvertError::InputNotFound(_) | ConvertError::InputRead { .. }
        )
    }

    /// True for failures writing the output file
    pub fn is_output_error(&self) -> bool {
        matches!(
            self,
            ConvertError::OutputWrite { .. } | ConvertError::OutputEncode { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
