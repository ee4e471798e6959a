//! Appointment table ingestion.
//!
//! This crate loads appointment tables from CSV into Polars DataFrames,
//! writes annotated tables back out, and normalizes column identifiers so
//! every downstream stage sees one consistent key space.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use noshow_ingest::{NormalizeMode, normalize_columns, read_csv_frame};
//!
//! let raw = read_csv_frame(Path::new("appointments.csv"))?;
//! let df = normalize_columns(raw, NormalizeMode::Full)?;
//! ```

mod csv;
mod schema;

// === CSV ===
pub use csv::{read_csv_frame, write_csv_frame};

// === Schema Normalization ===
pub use schema::{NormalizeMode, normalize_column_name, normalize_columns};
