use thiserror::Error;

/// The source table does not match the expected measurement schema.
///
/// Fatal for a load: the dashboard cannot proceed until another file is
/// opened.
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("row {row}: unparsable date '{value}'")]
    UnparsableDate { row: usize, value: String },

    #[error("row {row}: invalid value '{value}' in column '{column}'")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("row {row}: missing value in column '{column}'")]
    MissingValue { row: usize, column: String },

    #[error("source is not a table of records: {0}")]
    NotTabular(String),
}

/// A statistic was requested over too few measurements to be defined.
///
/// Recoverable: callers render an explicit "no data" state instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("not enough data to compute {statistic} ({observations} observation(s))")]
pub struct InsufficientDataError {
    pub statistic: &'static str,
    pub observations: usize,
}

impl InsufficientDataError {
    pub fn new(statistic: &'static str, observations: usize) -> Self {
        Self {
            statistic,
            observations,
        }
    }
}
