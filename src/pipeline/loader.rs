//! Whole-file loader for ManaBox CSV exports

use std::path::Path;

use polars::prelude::*;
use tracing::{debug, info};

use super::error::{ConvertError, Result};
use super::record::RawRecord;

/// Read every row of a CSV file with a header row.
///
/// All columns are read as text (no type inference) so that values reach
/// the converter exactly as written. Null cells are left out of the row.
pub fn read_raw_records(path: &Path) -> Result<Vec<RawRecord>> {
    if !path.is_file() {
        return Err(ConvertError::InputNotFound(path.to_path_buf()));
    }

    let to_read_error = |source: PolarsError| ConvertError::InputRead {
        path: path.to_path_buf(),
        source,
    };

    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .finish()
        .and_then(|lf| lf.collect())
        .map_err(to_read_error)?;

    let records = dataframe_to_records(&df).map_err(to_read_error)?;
    info!(
        path = %path.display(),
        rows = records.len(),
        columns = df.width(),
        "loaded input CSV"
    );
    Ok(records)
}

/// Column headers of a CSV file, without reading its rows
pub fn read_column_names(path: &Path) -> Result<Vec<String>> {
    if !path.is_file() {
        return Err(ConvertError::InputNotFound(path.to_path_buf()));
    }

    let schema = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .finish()
        .and_then(|mut lf| lf.collect_schema())
        .map_err(|source| ConvertError::InputRead {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(schema.iter_names().map(|name| name.to_string()).collect())
}

fn dataframe_to_records(df: &DataFrame) -> PolarsResult<Vec<RawRecord>> {
    let mut records = vec![RawRecord::new(); df.height()];

    for column in df.get_columns() {
        let name = column.name().to_string();
        let series = column.as_materialized_series().cast(&DataType::String)?;
        let values = series.str()?;

        for (record, value) in records.iter_mut().zip(values.into_iter()) {
            if let Some(value) = value {
                record.insert(name.as_str(), value);
            }
        }
        debug!(column = %name, "collected column");
    }

    Ok(records)
}
