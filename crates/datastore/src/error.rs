use thiserror::Error;

/// Failures surfaced by a [`Repository`](crate::Repository) call
#[derive(Debug, Error)]
pub enum StoreError {
    /// The id did not resolve to a record
    #[error("{0}")]
    NotFound(String),

    /// The write would break a uniqueness rule
    #[error("{0}")]
    Conflict(String),

    /// The actor does not own the record it tried to mutate
    #[error("{0}")]
    Forbidden(String),

    /// The request is structurally valid but not acceptable to the store
    #[error("{0}")]
    Invalid(String),

    /// The backing store could not serve the request
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn not_found(kind: &str) -> Self {
        StoreError::NotFound(format!("{kind} not found"))
    }

    pub fn not_owner(kind: &str) -> Self {
        StoreError::Forbidden(format!("Only the owner may modify this {kind}"))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
