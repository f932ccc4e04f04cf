//! Record validation errors

use thiserror::Error;

use crate::record::Field;

/// A record set failed one of the validation gates
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing values in {field} ({count} record(s))")]
    MissingValue { field: Field, count: usize },

    #[error("Negative values in free_slots ({count} record(s))")]
    NegativeValue { count: usize },
}
