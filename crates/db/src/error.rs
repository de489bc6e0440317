use thiserror::Error;

/// Unified error type for database operations that application code can handle
#[derive(Error, Debug)]
pub enum DbError {
    /// Entity not found by the given identifier
    #[error("entity not found")]
    NotFound,

    /// Unique constraint violation
    #[error("unique constraint violation: {message}")]
    UniqueViolation {
        constraint: Option<String>,
        message: String,
    },

    /// Foreign key constraint violation
    #[error("foreign key constraint violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Catch-all for non-recoverable errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convert from sqlx::Error using sqlx's backend-neutral error categorization
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => DbError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DbError::UniqueViolation {
                    constraint: db_err.constraint().map(|s| s.to_string()),
                    message: db_err.message().to_string(),
                }
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                DbError::ForeignKeyViolation {
                    message: db_err.message().to_string(),
                }
            }
            _ => DbError::Other(anyhow::Error::from(err)),
        }
    }
}

/// Type alias for database operation results
pub type Result<T> = std::result::Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        assert!(matches!(
            DbError::from(sqlx::Error::RowNotFound),
            DbError::NotFound
        ));
    }

    #[test]
    fn unexpected_errors_are_wrapped() {
        let err = DbError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, DbError::Other(_)));
    }
}
