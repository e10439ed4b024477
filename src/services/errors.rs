use thiserror::Error;

use crate::forms::FormError;
use crate::repository::errors::RepositoryError;
use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("authentication required")]
    Unauthorized,

    #[error("access denied")]
    Forbidden,

    #[error("not found")]
    NotFound,

    #[error("{0}")]
    Form(String),

    #[error("invalid value: {0}")]
    TypeConstraint(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::NotFound,
            RepositoryError::Duplicate(message) => ServiceError::Conflict(message),
            RepositoryError::ValidationError(message) => ServiceError::TypeConstraint(message),
            RepositoryError::ConstraintViolation(message) => ServiceError::Form(message),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) => ServiceError::NotFound,
            other => ServiceError::Storage(other.to_string()),
        }
    }
}

impl From<FormError> for ServiceError {
    fn from(err: FormError) -> Self {
        ServiceError::Form(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_rows_become_conflicts() {
        let err = ServiceError::from(RepositoryError::Duplicate(
            "UNIQUE constraint failed".to_string(),
        ));
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[test]
    fn missing_rows_and_blobs_become_not_found() {
        assert!(matches!(
            ServiceError::from(RepositoryError::NotFound),
            ServiceError::NotFound
        ));
        assert!(matches!(
            ServiceError::from(StorageError::NotFound("1/a.pdf".to_string())),
            ServiceError::NotFound
        ));
    }

    #[test]
    fn connection_failures_are_internal() {
        let err = ServiceError::from(RepositoryError::ConnectionError("pool".to_string()));
        assert!(matches!(err, ServiceError::Internal(_)));
    }
}
