//! Column transformer: standard scaling for numeric features, one-hot
//! encoding for categorical ones.
//!
//! Statistics and category sets are learned once from the training
//! partition and then applied unchanged to every later batch.

use std::collections::BTreeSet;

use ndarray::Array2;
use polars::prelude::{AnyValue, DataFrame};
use serde::{Deserialize, Serialize};
use tracing::debug;

use noshow_common::{category_key, has_column, numeric_column};
use noshow_model::{FeatureColumns, NoShowError, Result};

/// Label used in feature names for the missing-value category.
const MISSING_CATEGORY: &str = "nan";

/// Standardizes one numeric column to zero mean and unit variance.
///
/// Missing cells are imputed with the training mean, so they transform to 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub column: String,
    pub mean: f64,
    /// Population standard deviation; 1 for constant columns.
    pub scale: f64,
}

impl StandardScaler {
    fn fit(df: &DataFrame, column: &str) -> Result<Self> {
        let values: Vec<f64> = numeric_column(df, column)?.into_iter().flatten().collect();
        if values.is_empty() {
            return Err(NoShowError::NonNumericColumn {
                column: column.to_string(),
            });
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();
        let scale = if std > 0.0 && std.is_finite() { std } else { 1.0 };
        Ok(Self {
            column: column.to_string(),
            mean,
            scale,
        })
    }

    pub fn transform_value(&self, value: Option<f64>) -> f64 {
        value.map_or(0.0, |v| (v - self.mean) / self.scale)
    }
}

/// One-hot encodes one categorical column.
///
/// Missing cells are their own category. Values not seen during fitting
/// encode as all zeros.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    pub column: String,
    /// Sorted categories; `None` is the missing-value category.
    pub categories: Vec<Option<String>>,
}

impl OneHotEncoder {
    fn fit(df: &DataFrame, column: &str) -> Result<Self> {
        let series = df.column(column)?;
        let categories: BTreeSet<Option<String>> = (0..df.height())
            .map(|idx| category_key(series.get(idx).unwrap_or(AnyValue::Null)))
            .collect();
        Ok(Self {
            column: column.to_string(),
            categories: categories.into_iter().collect(),
        })
    }

    pub fn width(&self) -> usize {
        self.categories.len()
    }

    /// Position of the active indicator, or `None` for an unseen value.
    pub fn position(&self, key: Option<&str>) -> Option<usize> {
        self.categories
            .binary_search_by(|category| category.as_deref().cmp(&key))
            .ok()
    }
}

/// Fitted column transformer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preprocessor {
    numeric: Vec<StandardScaler>,
    categorical: Vec<OneHotEncoder>,
}

impl Preprocessor {
    /// Learn scaling statistics and category sets from `df`.
    ///
    /// Fails with [`NoShowError::MissingColumn`] if a declared column is
    /// absent and [`NoShowError::NonNumericColumn`] if a numeric column has
    /// no numeric value at all.
    pub fn fit(df: &DataFrame, columns: &FeatureColumns) -> Result<Self> {
        require_columns(df, columns)?;
        let numeric = columns
            .numeric
            .iter()
            .map(|name| StandardScaler::fit(df, name))
            .collect::<Result<Vec<_>>>()?;
        let categorical = columns
            .categorical
            .iter()
            .map(|name| OneHotEncoder::fit(df, name))
            .collect::<Result<Vec<_>>>()?;
        let preprocessor = Self {
            numeric,
            categorical,
        };
        debug!(
            numeric = preprocessor.numeric.len(),
            categorical = preprocessor.categorical.len(),
            features = preprocessor.n_features(),
            "fitted preprocessor"
        );
        Ok(preprocessor)
    }

    /// Width of the transformed matrix.
    pub fn n_features(&self) -> usize {
        self.numeric.len() + self.categorical.iter().map(OneHotEncoder::width).sum::<usize>()
    }

    /// Feature columns this transformer consumes.
    pub fn columns(&self) -> FeatureColumns {
        FeatureColumns::new(
            self.numeric.iter().map(|s| s.column.clone()).collect(),
            self.categorical.iter().map(|e| e.column.clone()).collect(),
        )
    }

    pub fn scalers(&self) -> &[StandardScaler] {
        &self.numeric
    }

    /// Output feature names: `num__<column>` then `cat__<column>_<value>`.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .numeric
            .iter()
            .map(|scaler| format!("num__{}", scaler.column))
            .collect();
        for encoder in &self.categorical {
            for category in &encoder.categories {
                let label = category.as_deref().unwrap_or(MISSING_CATEGORY);
                names.push(format!("cat__{}_{label}", encoder.column));
            }
        }
        names
    }

    /// Transform `df` into a row-major feature matrix.
    ///
    /// Extra columns are ignored. The matrix width never depends on the
    /// values in `df`.
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        require_columns(df, &self.columns())?;
        let mut matrix = Array2::<f64>::zeros((df.height(), self.n_features()));

        for (offset, scaler) in self.numeric.iter().enumerate() {
            let values = numeric_column(df, &scaler.column)?;
            for (row, value) in values.into_iter().enumerate() {
                matrix[[row, offset]] = scaler.transform_value(value);
            }
        }

        let mut offset = self.numeric.len();
        for encoder in &self.categorical {
            let series = df.column(&encoder.column)?;
            let mut unseen = 0usize;
            for row in 0..df.height() {
                let key = category_key(series.get(row).unwrap_or(AnyValue::Null));
                match encoder.position(key.as_deref()) {
                    Some(position) => matrix[[row, offset + position]] = 1.0,
                    None => unseen += 1,
                }
            }
            if unseen > 0 {
                debug!(column = %encoder.column, unseen, "unseen categories encoded as zeros");
            }
            offset += encoder.width();
        }
        Ok(matrix)
    }
}

fn require_columns(df: &DataFrame, columns: &FeatureColumns) -> Result<()> {
    match columns.iter().find(|name| !has_column(df, name)) {
        Some(missing) => Err(NoShowError::MissingColumn {
            column: missing.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::s;
    use polars::prelude::{Column, IntoColumn, NamedFrom, Series};

    fn training_frame() -> DataFrame {
        let columns: Vec<Column> = vec![
            Series::new("age".into(), vec![Some(20.0), Some(40.0), None, Some(60.0)]).into_column(),
            Series::new("gender".into(), vec![Some("F"), Some("M"), Some("F"), None]).into_column(),
            Series::new("sms_received".into(), vec![true, false, true, true]).into_column(),
        ];
        DataFrame::new(columns).unwrap()
    }

    fn feature_columns() -> FeatureColumns {
        FeatureColumns::new(
            vec!["age".to_string()],
            vec!["gender".to_string(), "sms_received".to_string()],
        )
    }

    #[test]
    fn standardizes_with_training_statistics() {
        let preprocessor = Preprocessor::fit(&training_frame(), &feature_columns()).unwrap();
        let scaler = &preprocessor.scalers()[0];
        assert!((scaler.mean - 40.0).abs() < 1e-12);
        let expected_std = (800.0f64 / 3.0).sqrt();
        assert!((scaler.scale - expected_std).abs() < 1e-12);

        let matrix = preprocessor.transform(&training_frame()).unwrap();
        assert!((matrix[[0, 0]] + 20.0 / expected_std).abs() < 1e-12);
        assert_eq!(matrix[[2, 0]], 0.0);
    }

    #[test]
    fn feature_names_follow_layout() {
        let preprocessor = Preprocessor::fit(&training_frame(), &feature_columns()).unwrap();
        assert_eq!(
            preprocessor.feature_names(),
            vec![
                "num__age",
                "cat__gender_nan",
                "cat__gender_F",
                "cat__gender_M",
                "cat__sms_received_false",
                "cat__sms_received_true",
            ]
        );
        assert_eq!(preprocessor.n_features(), 6);
    }

    #[test]
    fn one_hot_rows_have_one_active_indicator_per_column() {
        let preprocessor = Preprocessor::fit(&training_frame(), &feature_columns()).unwrap();
        let matrix = preprocessor.transform(&training_frame()).unwrap();
        for row in matrix.rows() {
            assert_eq!(row.slice(s![1..]).sum(), 2.0);
        }
        // Missing gender on the last row hits the missing-value category.
        assert_eq!(matrix[[3, 1]], 1.0);
    }

    #[test]
    fn unseen_category_encodes_as_zeros() {
        let preprocessor = Preprocessor::fit(&training_frame(), &feature_columns()).unwrap();
        let columns: Vec<Column> = vec![
            Series::new("age".into(), vec![30.0]).into_column(),
            Series::new("gender".into(), vec!["X"]).into_column(),
            Series::new("sms_received".into(), vec![false]).into_column(),
        ];
        let batch = DataFrame::new(columns).unwrap();
        let matrix = preprocessor.transform(&batch).unwrap();
        assert_eq!(matrix.ncols(), preprocessor.n_features());
        assert_eq!(matrix.slice(s![0, 1..4]).to_vec(), vec![0.0, 0.0, 0.0]);
        assert_eq!(matrix.slice(s![0, 4..]).to_vec(), vec![1.0, 0.0]);
    }

    #[test]
    fn constant_column_keeps_unit_scale() {
        let columns: Vec<Column> =
            vec![Series::new("age".into(), vec![5.0, 5.0, 5.0]).into_column()];
        let df = DataFrame::new(columns).unwrap();
        let preprocessor =
            Preprocessor::fit(&df, &FeatureColumns::new(vec!["age".into()], vec![])).unwrap();
        assert_eq!(preprocessor.scalers()[0].scale, 1.0);
    }

    #[test]
    fn missing_and_non_numeric_columns_fail() {
        let df = training_frame();
        let err = Preprocessor::fit(
            &df,
            &FeatureColumns::new(vec!["weight".into()], vec![]),
        )
        .unwrap_err();
        assert!(matches!(err, NoShowError::MissingColumn { column } if column == "weight"));

        let err = Preprocessor::fit(
            &df,
            &FeatureColumns::new(vec!["gender".into()], vec![]),
        )
        .unwrap_err();
        assert!(matches!(err, NoShowError::NonNumericColumn { column } if column == "gender"));
    }

    #[test]
    fn transform_requires_every_fitted_column() {
        let preprocessor = Preprocessor::fit(&training_frame(), &feature_columns()).unwrap();
        let batch = training_frame().drop("gender").unwrap();
        assert!(matches!(
            preprocessor.transform(&batch),
            Err(NoShowError::MissingColumn { .. })
        ));
    }
}
