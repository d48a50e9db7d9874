//! Record management errors.

use vitals_storage::StorageError;

/// Result type for record operations.
pub type Result<T> = std::result::Result<T, RecordError>;

/// Errors surfaced by the record manager.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// Underlying storage failure
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// No such record for this subject
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Record kind, e.g. "Goal"
        kind: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// Rejected input
    #[error("invalid input: {0}")]
    Validation(String),
}

impl RecordError {
    pub(crate) fn not_found(kind: &'static str, id: impl ToString) -> Self {
        RecordError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}
