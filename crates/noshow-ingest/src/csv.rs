//! CSV reading and writing.

use std::fs::{self, File};
use std::path::Path;

use polars::prelude::{CsvReadOptions, CsvWriter, DataFrame, SerReader, SerWriter};
use tracing::debug;

use noshow_model::{NoShowError, Result};

fn csv_error(path: &Path, error: impl ToString) -> NoShowError {
    NoShowError::Csv {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}

/// Read a CSV file with a single header row into a DataFrame.
///
/// Column dtypes are inferred from the whole file so a numeric column stays
/// numeric even when its first rows are blank.
pub fn read_csv_frame(path: &Path) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(NoShowError::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| csv_error(path, e))?
        .finish()
        .map_err(|e| csv_error(path, e))?;

    if df.width() == 0 {
        return Err(csv_error(path, "no columns found"));
    }

    debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "read csv"
    );
    Ok(df)
}

/// Write a DataFrame as CSV with a header row, creating parent directories.
pub fn write_csv_frame(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| NoShowError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let mut file = File::create(path).map_err(|e| NoShowError::Io {
        operation: "create",
        path: path.to_path_buf(),
        source: e,
    })?;

    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .map_err(|e| csv_error(path, e))?;

    debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "wrote csv"
    );
    Ok(())
}
