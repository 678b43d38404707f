//! CSV export of converted records

use std::path::Path;

use polars::prelude::*;
use tempfile::NamedTempFile;
use tracing::info;

use super::error::{ConvertError, Result};
use super::record::{ConvertedRecord, Field};

/// Write `records` with a `title,edition,foil,quantity` header, in the given order.
///
/// The CSV is written to a temporary file next to `path` and renamed into
/// place, so a failed write never leaves a truncated destination behind.
pub fn write_records(path: &Path, records: &[ConvertedRecord]) -> Result<()> {
    let mut df = records_to_dataframe(records).map_err(|source| ConvertError::OutputEncode {
        path: path.to_path_buf(),
        source,
    })?;

    let to_write_error = |source: std::io::Error| ConvertError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir).map_err(to_write_error)?;

    CsvWriter::new(temp.as_file_mut())
        .include_header(true)
        .finish(&mut df)
        .map_err(|source| ConvertError::OutputEncode {
            path: path.to_path_buf(),
            source,
        })?;

    if let Some(permissions) = output_permissions(path) {
        temp.as_file()
            .set_permissions(permissions)
            .map_err(to_write_error)?;
    }
    temp.persist(path)
        .map_err(|err| to_write_error(err.error))?;

    info!(path = %path.display(), rows = records.len(), "wrote output CSV");
    Ok(())
}

/// Mode for the finished file: the destination's own when it already
/// exists, otherwise 0644. Temp files start out owner-only.
#[cfg(unix)]
fn output_permissions(path: &Path) -> Option<std::fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;

    match std::fs::metadata(path) {
        Ok(metadata) => Some(metadata.permissions()),
        Err(_) => Some(std::fs::Permissions::from_mode(0o644)),
    }
}

#[cfg(not(unix))]
fn output_permissions(_path: &Path) -> Option<std::fs::Permissions> {
    None
}

/// Converted records as a four-column DataFrame
pub fn records_to_dataframe(records: &[ConvertedRecord]) -> PolarsResult<DataFrame> {
    let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
    let editions: Vec<&str> = records.iter().map(|r| r.edition.as_str()).collect();
    let foils: Vec<i32> = records.iter().map(|r| i32::from(r.foil)).collect();
    let quantities: Vec<i64> = records.iter().map(|r| r.quantity).collect();

    DataFrame::new(vec![
        Column::new(Field::Title.name().into(), titles),
        Column::new(Field::Edition.name().into(), editions),
        Column::new(Field::Foil.name().into(), foils),
        Column::new(Field::Quantity.name().into(), quantities),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_export_still_has_header() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.csv");

        write_records(&path, &[]).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.trim(), "title,edition,foil,quantity");
    }

    #[cfg(unix)]
    #[test]
    fn test_new_file_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("buylist.csv");

        write_records(&path, &[]).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn test_overwrite_keeps_existing_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("buylist.csv");
        std::fs::write(&path, "old").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();

        write_records(&path, &[]).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("title"));
    }

    #[test]
    fn test_unwritable_destination_is_output_error() {
        let path = Path::new("/definitely/not/a/dir/out.csv");
        let err = write_records(path, &[]).unwrap_err();
        assert!(err.is_output_error());
        assert!(!path.exists());
    }
}
