use thiserror::Error;

/// Result type for executor operations.
pub type XsqlResult<T> = Result<T, XsqlError>;

/// Executor-layer errors.
#[derive(Debug, Error)]
pub enum XsqlError {
    /// A single-row scan matched nothing. Callers that treat absence as a
    /// normal state check for this with [`XsqlError::is_no_rows`].
    #[error("no rows in result set")]
    NoRows,

    /// The connection could not be established or was lost.
    #[error("connection error: {0}")]
    Connection(String),

    /// The database rejected or failed to execute a command.
    #[error("query error: {0}")]
    Query(String),
}

impl XsqlError {
    /// Whether this error is the no-rows classification.
    pub fn is_no_rows(&self) -> bool {
        matches!(self, XsqlError::NoRows)
    }
}

impl From<sqlx::Error> for XsqlError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => XsqlError::NoRows,
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                XsqlError::Connection(err.to_string())
            }
            other => XsqlError::Query(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_rows_classification() {
        assert!(XsqlError::NoRows.is_no_rows());
        assert!(!XsqlError::Query("boom".to_string()).is_no_rows());
        assert!(XsqlError::from(sqlx::Error::RowNotFound).is_no_rows());
    }
}
