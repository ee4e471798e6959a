//! Shared utilities for the no-show crates.
//!
//! - **values**: Polars `AnyValue` conversions
//! - **frame**: column extraction, replacement and row selection

pub mod frame;
pub mod values;

pub use frame::{
    column_names, filter_rows, has_column, numeric_column, set_f64_column, set_i64_column,
    set_string_column, string_column, take_rows,
};
pub use values::{any_to_f64, any_to_string, category_key, format_numeric, parse_f64};
