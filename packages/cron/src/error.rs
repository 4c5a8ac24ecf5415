use thiserror::Error;

/// Errors raised while parsing or evaluating a CRON expression.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CronError {
    #[error("schedule must have exactly 6 fields, got {0}")]
    WrongFieldCount(usize),

    #[error("invalid {field} field {raw:?}: {reason}")]
    InvalidField {
        field: &'static str,
        raw: String,
        reason: String,
    },

    #[error("no instant satisfies schedule within the search horizon")]
    Unsatisfiable,
}
