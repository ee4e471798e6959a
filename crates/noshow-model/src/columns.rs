//! Well-known column names.
//!
//! Source columns are matched after normalization, so every pattern here is
//! lowercase. Output columns keep the names downstream reports expect.

/// Substrings that identify the outcome column.
pub const TARGET_PATTERNS: [&str; 3] = ["no_show", "no-show", "noshow"];

/// Columns whose name contains this marker are parsed as timestamps.
pub const DATE_MARKER: &str = "date";

/// Names accepted for the scheduling timestamp.
pub const SCHEDULED_DAY_COLUMNS: [&str; 4] = [
    "scheduledday",
    "scheduled_day",
    "scheduled_date",
    "scheduleddate",
];

/// Names accepted for the appointment timestamp.
pub const APPOINTMENT_DAY_COLUMNS: [&str; 4] = [
    "appointmentday",
    "appointment_day",
    "appointment_date",
    "appointmentdate",
];

/// Derived elapsed days between scheduling and appointment.
pub const WAITING_DAYS_COLUMN: &str = "waiting_days";

pub const ACTUAL_COLUMN: &str = "Actual_NoShow";
pub const PREDICTED_COLUMN: &str = "Predicted_NoShow";
pub const PROBABILITY_COLUMN: &str = "No_Show_Probability";
pub const RISK_LEVEL_COLUMN: &str = "Risk_Level";
