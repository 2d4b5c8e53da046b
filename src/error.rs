use thiserror::Error;

use crate::model::PersonId;

/// Main error type for kingraph
#[derive(Error, Debug)]
pub enum KingraphError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A primary node referenced by the caller does not exist
    #[error("Person not found: {0}")]
    NotFound(PersonId),

    /// A mutation plan was applied partially and the graph may be
    /// inconsistent; the caller must retry or compensate
    #[error("Mutation plan partially applied: {0}")]
    Inconsistent(String),

    /// A role binding named the same person on both sides
    #[error("Person {0} cannot be bound to themselves")]
    SelfRelation(PersonId),

    /// A role binding would make a person their own ancestor
    #[error("Binding would create an ancestry cycle through person {0}")]
    AncestryCycle(PersonId),
}

/// Convenient Result type using KingraphError
pub type Result<T> = std::result::Result<T, KingraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = KingraphError::Config("missing db_path".to_string());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("missing db_path"));
    }

    #[test]
    fn test_error_from_rusqlite() {
        let rusqlite_err = rusqlite::Error::InvalidQuery;
        let err: KingraphError = rusqlite_err.into();
        assert!(matches!(err, KingraphError::Database(_)));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: KingraphError = io_err.into();
        assert!(matches!(err, KingraphError::Io(_)));
    }

    #[test]
    fn test_not_found_names_person() {
        let err = KingraphError::NotFound(PersonId(42));
        assert!(err.to_string().contains("42"));
    }
}
