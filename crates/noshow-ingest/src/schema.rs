//! Column identifier normalization.

use std::collections::HashMap;

use polars::prelude::DataFrame;
use tracing::debug;

use noshow_common::column_names;
use noshow_model::{NoShowError, Result};

/// How aggressively column identifiers are rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizeMode {
    /// Trim, lowercase, and replace internal whitespace with `_`.
    ///
    /// Used on training tables whose headers are free-form.
    #[default]
    Full,
    /// Lowercase only.
    ///
    /// Used on inference batches, where headers are expected to differ from
    /// the training table by case alone.
    LowercaseOnly,
}

/// Normalize one column identifier.
///
/// # Examples
///
/// ```
/// use noshow_ingest::{NormalizeMode, normalize_column_name};
///
/// assert_eq!(normalize_column_name(" Scheduled Day ", NormalizeMode::Full), "scheduled_day");
/// assert_eq!(normalize_column_name("No-show", NormalizeMode::LowercaseOnly), "no-show");
/// ```
pub fn normalize_column_name(raw: &str, mode: NormalizeMode) -> String {
    match mode {
        NormalizeMode::Full => raw
            .trim_matches(|ch: char| ch.is_whitespace() || ch == '\u{feff}')
            .chars()
            .map(|ch| if ch.is_whitespace() { '_' } else { ch })
            .collect::<String>()
            .to_lowercase(),
        NormalizeMode::LowercaseOnly => raw.to_lowercase(),
    }
}

/// Rename every column of `df` with [`normalize_column_name`].
///
/// Rows are neither dropped nor reordered. Fails when two columns collapse
/// onto the same normalized name.
pub fn normalize_columns(mut df: DataFrame, mode: NormalizeMode) -> Result<DataFrame> {
    let original = column_names(&df);
    let mut seen: HashMap<String, &str> = HashMap::with_capacity(original.len());
    let mut renamed = Vec::with_capacity(original.len());
    for name in &original {
        let normalized = normalize_column_name(name, mode);
        if let Some(first) = seen.get(&normalized) {
            return Err(NoShowError::DuplicateColumn {
                first: (*first).to_string(),
                second: name.clone(),
                normalized,
            });
        }
        seen.insert(normalized.clone(), name.as_str());
        renamed.push(normalized);
    }

    if renamed != original {
        df.set_column_names(renamed.iter().map(String::as_str))?;
        debug!(?mode, columns = ?renamed, "normalized column names");
    }
    Ok(df)
}
