//! Outcome column discovery and label coercion.
//!
//! The outcome column is found by substring match on normalized names, and
//! its heterogeneous encodings (`Yes`/`No`, `Y`/`N`, `1`/`0`, booleans) are
//! coerced to `{0, 1}`. Rows whose label cannot be mapped are dropped.

use polars::prelude::{AnyValue, DataFrame};
use tracing::{debug, warn};

use noshow_common::{column_names, filter_rows, numeric_column, set_i64_column};
use noshow_model::columns::TARGET_PATTERNS;
use noshow_model::{NoShowError, Result};

/// Outcome of scanning column names for the outcome column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetResolution {
    /// First column whose name contains one of the outcome patterns.
    Found(String),
    NotFound,
}

impl TargetResolution {
    pub fn column(&self) -> Option<&str> {
        match self {
            TargetResolution::Found(name) => Some(name),
            TargetResolution::NotFound => None,
        }
    }
}

/// Find the first column whose name contains `no_show`, `no-show` or `noshow`.
///
/// Matching is case-insensitive so it also works on un-normalized names.
///
/// # Examples
///
/// ```
/// use noshow_transform::{TargetResolution, resolve_target_column};
///
/// let columns = ["gender", "No-Show", "age"];
/// assert_eq!(
///     resolve_target_column(&columns),
///     TargetResolution::Found("No-Show".to_string())
/// );
/// assert_eq!(resolve_target_column(&["age"]), TargetResolution::NotFound);
/// ```
pub fn resolve_target_column<S: AsRef<str>>(columns: &[S]) -> TargetResolution {
    columns
        .iter()
        .map(AsRef::as_ref)
        .find(|name| {
            let lower = name.to_lowercase();
            TARGET_PATTERNS.iter().any(|pattern| lower.contains(pattern))
        })
        .map_or(TargetResolution::NotFound, |name| {
            TargetResolution::Found(name.to_string())
        })
}

/// Resolve the outcome column of `df` or fail with [`NoShowError::Schema`].
pub fn require_target_column(df: &DataFrame) -> Result<String> {
    let available = column_names(df);
    match resolve_target_column(&available) {
        TargetResolution::Found(name) => {
            debug!(target_column = %name, "resolved outcome column");
            Ok(name)
        }
        TargetResolution::NotFound => Err(NoShowError::Schema {
            patterns: TARGET_PATTERNS.iter().map(|p| (*p).to_string()).collect(),
            available,
        }),
    }
}

/// Map one raw outcome cell to `0` or `1`.
///
/// Accepted encodings: `"Yes"`/`"Y"` → 1, `"No"`/`"N"` → 0, numeric or
/// string `1`/`0`, and booleans. Everything else is `None`.
pub fn map_outcome(value: AnyValue<'_>) -> Option<i64> {
    match value {
        AnyValue::String(s) => map_outcome_str(s),
        AnyValue::StringOwned(s) => map_outcome_str(&s),
        AnyValue::Boolean(b) => Some(i64::from(b)),
        AnyValue::Null => None,
        other => match noshow_common::any_to_f64(other) {
            Some(v) if v == 1.0 => Some(1),
            Some(v) if v == 0.0 => Some(0),
            _ => None,
        },
    }
}

fn map_outcome_str(value: &str) -> Option<i64> {
    match value {
        "Yes" | "Y" | "1" => Some(1),
        "No" | "N" | "0" => Some(0),
        _ => None,
    }
}

/// Table after outcome coercion.
#[derive(Debug, Clone)]
pub struct ResolvedOutcomes {
    /// Rows with a valid outcome; the outcome column holds `0`/`1` integers.
    pub frame: DataFrame,
    /// Name of the outcome column.
    pub target: String,
    /// Rows dropped because their outcome could not be mapped.
    pub dropped: usize,
}

/// Coerce the outcome column to `{0, 1}` and drop unmappable rows.
///
/// Fails with [`NoShowError::InsufficientData`] when no row survives.
pub fn resolve_outcomes(df: DataFrame, target: &str) -> Result<ResolvedOutcomes> {
    let series = df.column(target)?;
    let mapped: Vec<Option<i64>> = (0..df.height())
        .map(|idx| map_outcome(series.get(idx).unwrap_or(AnyValue::Null)))
        .collect();

    let keep: Vec<bool> = mapped.iter().map(Option::is_some).collect();
    let dropped = keep.iter().filter(|kept| !**kept).count();
    if dropped > 0 {
        warn!(
            target_column = target,
            dropped,
            total = df.height(),
            "dropped rows with an unmappable outcome"
        );
    }

    let mut frame = if dropped > 0 {
        filter_rows(&df, &keep)?
    } else {
        df
    };
    if frame.height() == 0 {
        return Err(NoShowError::insufficient(format!(
            "outcome column '{target}' has no rows with a recognizable value"
        )));
    }

    let labels: Vec<Option<i64>> = mapped.into_iter().flatten().map(Some).collect();
    set_i64_column(&mut frame, target, labels)?;

    Ok(ResolvedOutcomes {
        frame,
        target: target.to_string(),
        dropped,
    })
}

/// Read a resolved outcome column back as labels.
pub fn outcome_values(df: &DataFrame, target: &str) -> Result<Vec<u8>> {
    numeric_column(df, target)?
        .into_iter()
        .map(|value| match value {
            Some(v) if v == 1.0 => Ok(1),
            Some(v) if v == 0.0 => Ok(0),
            _ => Err(NoShowError::insufficient(format!(
                "outcome column '{target}' contains values outside {{0, 1}}"
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{Column, IntoColumn, NamedFrom, Series};

    #[test]
    fn maps_mixed_label_encodings() {
        let raw = [
            AnyValue::String("Yes"),
            AnyValue::String("No"),
            AnyValue::String("Y"),
            AnyValue::String("N"),
            AnyValue::Int64(1),
            AnyValue::Int64(0),
        ];
        let mapped: Vec<Option<i64>> = raw.into_iter().map(map_outcome).collect();
        assert_eq!(
            mapped,
            vec![Some(1), Some(0), Some(1), Some(0), Some(1), Some(0)]
        );
    }

    #[test]
    fn unknown_labels_are_missing() {
        assert_eq!(map_outcome(AnyValue::String("yes")), None);
        assert_eq!(map_outcome(AnyValue::String("Maybe")), None);
        assert_eq!(map_outcome(AnyValue::Int64(2)), None);
        assert_eq!(map_outcome(AnyValue::Null), None);
        assert_eq!(map_outcome(AnyValue::Float64(1.0)), Some(1));
        assert_eq!(map_outcome(AnyValue::Boolean(true)), Some(1));
    }

    #[test]
    fn finds_first_matching_column() {
        let columns = ["patientid", "noshow_flag", "no_show"];
        assert_eq!(
            resolve_target_column(&columns).column(),
            Some("noshow_flag")
        );
    }

    #[test]
    fn resolves_and_drops_unmappable_rows() {
        let columns: Vec<Column> = vec![
            Series::new("age".into(), vec![30i64, 41, 52, 63]).into_column(),
            Series::new("no-show".into(), vec!["Yes", "No", "maybe", "N"]).into_column(),
        ];
        let df = DataFrame::new(columns).unwrap();
        let target = require_target_column(&df).unwrap();
        let resolved = resolve_outcomes(df, &target).unwrap();

        assert_eq!(resolved.dropped, 1);
        assert_eq!(resolved.frame.height(), 3);
        assert_eq!(outcome_values(&resolved.frame, &target).unwrap(), vec![1, 0, 0]);
        assert_eq!(
            numeric_column(&resolved.frame, "age").unwrap(),
            vec![Some(30.0), Some(41.0), Some(63.0)]
        );
    }

    #[test]
    fn no_valid_rows_is_insufficient() {
        let columns: Vec<Column> =
            vec![Series::new("no_show".into(), vec!["?", "unknown"]).into_column()];
        let df = DataFrame::new(columns).unwrap();
        let err = resolve_outcomes(df, "no_show").unwrap_err();
        assert!(matches!(err, NoShowError::InsufficientData { .. }));
    }

    #[test]
    fn missing_target_is_schema_error() {
        let columns: Vec<Column> =
            vec![Series::new("age".into(), vec![1i64]).into_column()];
        let df = DataFrame::new(columns).unwrap();
        match require_target_column(&df).unwrap_err() {
            NoShowError::Schema { available, .. } => assert_eq!(available, vec!["age"]),
            other => panic!("unexpected error: {other}"),
        }
    }
}
