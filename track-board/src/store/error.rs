//! Store error types.

/// Errors from the train store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// SQLite operation failed
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Could not prepare the database location
    #[error("failed to create database directory {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A stored row could not be turned back into a train
    #[error("corrupt row: {message}")]
    Corrupt { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = StoreError::Corrupt {
            message: "bad day \"yesterday\"".into(),
        };
        assert_eq!(err.to_string(), "corrupt row: bad day \"yesterday\"");

        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(err.to_string().starts_with("database error:"));
    }
}
