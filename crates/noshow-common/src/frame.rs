//! DataFrame column and row helpers.
//!
//! Cell-level reads go through `AnyValue` so callers see the same values
//! regardless of the dtype Polars inferred for a column.

use polars::prelude::{
    AnyValue, BooleanChunked, DataFrame, NamedFrom, NewChunkedArray, PolarsResult, Series,
    UInt32Chunked,
};

use crate::values::{any_to_f64, any_to_string};

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok()
}

/// Column names in frame order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names_owned()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

/// Trimmed display strings for every cell in a column; nulls become `""`.
pub fn string_column(df: &DataFrame, name: &str) -> PolarsResult<Vec<String>> {
    let series = df.column(name)?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let value = any_to_string(series.get(idx).unwrap_or(AnyValue::Null));
        values.push(value.trim().to_string());
    }
    Ok(values)
}

/// Numeric values for every cell in a column; non-numeric cells become `None`.
pub fn numeric_column(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    let series = df.column(name)?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        values.push(any_to_f64(series.get(idx).unwrap_or(AnyValue::Null)));
    }
    Ok(values)
}

/// Add or replace a string column.
pub fn set_string_column(df: &mut DataFrame, name: &str, values: Vec<String>) -> PolarsResult<()> {
    let series = Series::new(name.into(), values);
    df.with_column(series)?;
    Ok(())
}

/// Add or replace a nullable float column.
pub fn set_f64_column(df: &mut DataFrame, name: &str, values: Vec<Option<f64>>) -> PolarsResult<()> {
    let series = Series::new(name.into(), values);
    df.with_column(series)?;
    Ok(())
}

/// Add or replace a nullable integer column.
pub fn set_i64_column(df: &mut DataFrame, name: &str, values: Vec<Option<i64>>) -> PolarsResult<()> {
    let series = Series::new(name.into(), values);
    df.with_column(series)?;
    Ok(())
}

/// Keep only the rows whose mask entry is `true`.
pub fn filter_rows(df: &DataFrame, keep: &[bool]) -> PolarsResult<DataFrame> {
    let mask = BooleanChunked::from_slice("keep".into(), keep);
    df.filter(&mask)
}

/// Select rows by position; indices may repeat.
pub fn take_rows(df: &DataFrame, indices: &[usize]) -> PolarsResult<DataFrame> {
    let indices: Vec<u32> = indices.iter().map(|&idx| idx as u32).collect();
    let idx = UInt32Chunked::from_vec("idx".into(), indices);
    df.take(&idx)
}
