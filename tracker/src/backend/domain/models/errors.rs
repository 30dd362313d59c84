//! Error types surfaced by the student store and form validation.
use thiserror::Error;

use crate::backend::storage::StorageError;

/// Durable state could not be turned into a collection. The store is empty
/// whenever one of these is returned.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Nothing stored yet
    #[error("No saved student data")]
    NoData,
    #[error("Saved student data is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("Saved student data could not be read: {0}")]
    Unreadable(#[from] StorageError),
}

/// The durable write failed. The in-memory collection keeps the mutation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SaveError {
    #[error("Data is too large ({size} bytes, limit {limit}); please delete some records")]
    TooLarge { size: usize, limit: usize },
    #[error("Storage is full; please delete some data")]
    QuotaExceeded,
    #[error("An error occurred while saving data: {0}")]
    Unknown(String),
}

impl From<StorageError> for SaveError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::QuotaExceeded { .. } => SaveError::QuotaExceeded,
            StorageError::Unknown(message) => SaveError::Unknown(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("Student not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Save(#[from] SaveError),
}

/// A required form field is missing or invalid
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter the student's name")]
    EmptyFullName,
    #[error("Please choose a grade")]
    MissingGrade,
    #[error("Please choose a registration date")]
    MissingRegistrationDate,
    #[error("Registration date is not a valid date: {0}")]
    InvalidRegistrationDate(String),
    #[error("Please choose the number of payment months")]
    MissingPaymentPlan,
    #[error("Please enter a valid amount")]
    AmountNotPositive,
}
