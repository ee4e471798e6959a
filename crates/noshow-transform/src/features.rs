//! Derived features and dtype filtering.
//!
//! Date-like columns are parsed into timestamps, the scheduling-to-appointment
//! gap becomes the numeric `waiting_days` feature, and columns the
//! preprocessor cannot consume are dropped before the feature split.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use polars::prelude::{DataFrame, DataType, NamedFrom, Series, TimeUnit};
use tracing::{debug, info, warn};

use noshow_common::{column_names, has_column, set_i64_column, string_column};
use noshow_model::columns::{
    APPOINTMENT_DAY_COLUMNS, DATE_MARKER, SCHEDULED_DAY_COLUMNS, WAITING_DAYS_COLUMN,
};
use noshow_model::{FeatureColumns, Result};

use crate::datetime::{elapsed_days, parse_timestamp, to_epoch_millis};

/// How the preprocessor treats a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Standardized.
    Numeric,
    /// One-hot encoded (strings and booleans).
    Categorical,
    /// Neither; dropped before the feature split.
    Unsupported,
}

/// Classify a column by its dtype.
pub fn column_kind(dtype: &DataType) -> ColumnKind {
    match dtype {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64
        | DataType::Float32
        | DataType::Float64 => ColumnKind::Numeric,
        DataType::String | DataType::Boolean => ColumnKind::Categorical,
        _ => ColumnKind::Unsupported,
    }
}

/// Table after date parsing and feature derivation.
#[derive(Debug, Clone)]
pub struct DerivedFeatures {
    pub frame: DataFrame,
    /// Columns converted to timestamps.
    pub date_columns: Vec<String>,
    /// Whether `waiting_days` was added.
    pub waiting_days: bool,
    /// Non-empty date cells that failed to parse and became missing.
    pub unparsed_dates: usize,
}

fn first_present(names: &[String], candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .find(|candidate| names.iter().any(|name| name == *candidate))
        .map(|candidate| (*candidate).to_string())
}

/// Parse date-like columns and derive `waiting_days`.
///
/// Every column whose name contains `date`, plus the scheduled/appointment
/// pair when present, is replaced by a millisecond timestamp column.
/// Unparsable cells become null; no row is dropped. `target` is never
/// touched.
pub fn derive_features(mut df: DataFrame, target: &str) -> Result<DerivedFeatures> {
    let names = column_names(&df);
    let scheduled = first_present(&names, &SCHEDULED_DAY_COLUMNS);
    let appointment = first_present(&names, &APPOINTMENT_DAY_COLUMNS);

    let mut date_columns: Vec<String> = names
        .iter()
        .filter(|name| name.as_str() != target && name.contains(DATE_MARKER))
        .cloned()
        .collect();
    for name in [&scheduled, &appointment].into_iter().flatten() {
        if name != target && !date_columns.contains(name) {
            date_columns.push(name.clone());
        }
    }

    let mut parsed: BTreeMap<String, Vec<Option<NaiveDateTime>>> = BTreeMap::new();
    let mut unparsed_dates = 0usize;
    for name in &date_columns {
        let raw = string_column(&df, name)?;
        let values: Vec<Option<NaiveDateTime>> =
            raw.iter().map(String::as_str).map(parse_timestamp).collect();
        let failures = raw
            .iter()
            .zip(&values)
            .filter(|(text, value)| !text.is_empty() && value.is_none())
            .count();
        if failures > 0 {
            warn!(column = %name, failures, "unparsable dates set to missing");
        }
        unparsed_dates += failures;

        let millis: Vec<Option<i64>> = values.iter().map(|v| v.map(to_epoch_millis)).collect();
        let series = Series::new(name.as_str().into(), millis)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
        df.with_column(series)?;
        debug!(column = %name, "parsed date column");
        parsed.insert(name.clone(), values);
    }

    let mut waiting_days = false;
    if let (Some(scheduled), Some(appointment)) = (&scheduled, &appointment)
        && let (Some(start), Some(end)) = (parsed.get(scheduled), parsed.get(appointment))
    {
        if has_column(&df, WAITING_DAYS_COLUMN) {
            warn!(column = WAITING_DAYS_COLUMN, "replacing existing column with derived values");
        }
        let days: Vec<Option<i64>> = start
            .iter()
            .zip(end)
            .map(|(start, end)| match (start, end) {
                (Some(start), Some(end)) => Some(elapsed_days(*start, *end)),
                _ => None,
            })
            .collect();
        set_i64_column(&mut df, WAITING_DAYS_COLUMN, days)?;
        waiting_days = true;
    }

    info!(
        date_columns = date_columns.len(),
        waiting_days,
        unparsed_dates,
        "derived features"
    );
    Ok(DerivedFeatures {
        frame: df,
        date_columns,
        waiting_days,
        unparsed_dates,
    })
}

/// Drop columns that are neither numeric, string nor boolean.
///
/// Returns the filtered frame and the dropped column names. Parsed date
/// columns are dropped here.
pub fn retain_supported_columns(mut df: DataFrame) -> Result<(DataFrame, Vec<String>)> {
    let unsupported: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|column| column_kind(column.dtype()) == ColumnKind::Unsupported)
        .map(|column| column.name().to_string())
        .collect();
    for name in &unsupported {
        df.drop_in_place(name)?;
    }
    if !unsupported.is_empty() {
        debug!(columns = ?unsupported, "dropped unsupported columns");
    }
    Ok((df, unsupported))
}

/// Split the non-target columns of `df` into numeric and categorical features.
///
/// Unsupported columns are ignored; call [`retain_supported_columns`] first
/// to remove them from the frame.
pub fn classify_feature_columns(df: &DataFrame, target: &str) -> FeatureColumns {
    let mut columns = FeatureColumns::default();
    for column in df.get_columns() {
        let name = column.name().to_string();
        if name == target {
            continue;
        }
        match column_kind(column.dtype()) {
            ColumnKind::Numeric => columns.numeric.push(name),
            ColumnKind::Categorical => columns.categorical.push(name),
            ColumnKind::Unsupported => {}
        }
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use noshow_common::numeric_column;
    use polars::prelude::{Column, IntoColumn};

    fn frame() -> DataFrame {
        let columns: Vec<Column> = vec![
            Series::new("gender".into(), vec!["F", "M", "F"]).into_column(),
            Series::new("age".into(), vec![30i64, 41, 52]).into_column(),
            Series::new(
                "scheduledday".into(),
                vec!["2024-01-01T08:00:00Z", "2024-01-05T09:00:00Z", "garbage"],
            )
            .into_column(),
            Series::new(
                "appointmentday".into(),
                vec!["2024-01-04T00:00:00Z", "2024-01-03T00:00:00Z", "2024-01-10T00:00:00Z"],
            )
            .into_column(),
            Series::new("visit_date".into(), vec!["2024-02-01", "", "02/03/2024"]).into_column(),
            Series::new("no_show".into(), vec![0i64, 1, 0]).into_column(),
        ];
        DataFrame::new(columns).unwrap()
    }

    #[test]
    fn derives_waiting_days_including_negative_spans() {
        let derived = derive_features(frame(), "no_show").unwrap();
        assert!(derived.waiting_days);
        assert_eq!(
            numeric_column(&derived.frame, WAITING_DAYS_COLUMN).unwrap(),
            vec![Some(2.0), Some(-3.0), None]
        );
        assert_eq!(derived.unparsed_dates, 1);
    }

    #[test]
    fn parses_every_date_column() {
        let derived = derive_features(frame(), "no_show").unwrap();
        assert_eq!(
            derived.date_columns,
            vec!["visit_date", "scheduledday", "appointmentday"]
        );
        for name in &derived.date_columns {
            let column = derived.frame.column(name).unwrap();
            assert!(matches!(column.dtype(), DataType::Datetime(_, _)));
        }
        assert_eq!(derived.frame.height(), 3);
    }

    #[test]
    fn no_pair_means_no_waiting_days() {
        let df = frame().drop("appointmentday").unwrap();
        let derived = derive_features(df, "no_show").unwrap();
        assert!(!derived.waiting_days);
        assert!(derived.frame.column(WAITING_DAYS_COLUMN).is_err());
    }

    #[test]
    fn drops_temporal_columns_and_classifies_rest() {
        let derived = derive_features(frame(), "no_show").unwrap();
        let (df, dropped) = retain_supported_columns(derived.frame).unwrap();
        assert_eq!(dropped, vec!["scheduledday", "appointmentday", "visit_date"]);

        let columns = classify_feature_columns(&df, "no_show");
        assert_eq!(columns.numeric, vec!["age", WAITING_DAYS_COLUMN]);
        assert_eq!(columns.categorical, vec!["gender"]);
        assert!(!columns.contains("no_show"));
    }

    #[test]
    fn column_kinds() {
        assert_eq!(column_kind(&DataType::Float64), ColumnKind::Numeric);
        assert_eq!(column_kind(&DataType::Boolean), ColumnKind::Categorical);
        assert_eq!(column_kind(&DataType::String), ColumnKind::Categorical);
        assert_eq!(
            column_kind(&DataType::Datetime(TimeUnit::Milliseconds, None)),
            ColumnKind::Unsupported
        );
    }
}
