//! Errors raised by the aggregation engine.

use crate::models::GroupKey;
use thiserror::Error;

/// Failure to compute a summary table.
///
/// Undefined rates (groups without population) are not errors; they are
/// carried in the result as [`crate::models::Rate::UNDEFINED`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregationError {
    /// A required column is missing from the dataset.
    #[error("schema error: missing required column '{column}'")]
    MissingColumn { column: String },

    /// A required field holds a value that cannot be interpreted.
    #[error("schema error: row {row}, column '{column}': {reason}")]
    MalformedField {
        row: usize,
        column: String,
        reason: String,
    },

    /// A category order names a value outside the key's closed set.
    #[error("invalid category order for {key}: '{value}' is not a valid category")]
    InvalidCategoryOrder { key: GroupKey, value: String },

    /// A category order lists the same value more than once.
    #[error("invalid category order for {key}: '{value}' is listed more than once")]
    DuplicateCategory { key: GroupKey, value: String },
}

impl AggregationError {
    /// Schema errors abort every table computed from the dataset.
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            AggregationError::MissingColumn { .. } | AggregationError::MalformedField { .. }
        )
    }

    /// Category order errors only affect the table they were supplied for.
    pub fn is_category_order_error(&self) -> bool {
        matches!(
            self,
            AggregationError::InvalidCategoryOrder { .. }
                | AggregationError::DuplicateCategory { .. }
        )
    }
}
