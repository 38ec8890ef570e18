use thiserror::Error;

/// Result alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Everything a store operation can fail with.
///
/// The HTTP layer maps each variant to exactly one status code and adds no
/// kinds of its own.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A field is missing, not coercible or out of range.
    #[error("invalid field `{field}`: {reason}")]
    Validation { field: &'static str, reason: String },

    /// No report carries the requested id.
    #[error("report `{id}` not found")]
    NotFound { id: String },

    /// The backing storage cannot be read or written.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        StoreError::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Name of the offending field for validation failures.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            StoreError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}
