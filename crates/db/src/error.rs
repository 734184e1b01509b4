use thiserror::Error;

pub type DbResult<T> = Result<T, DbError>;

/// Failures raised by the activity store.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("failed to open activity store: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("transaction failed: {0}")]
    Transaction(String),

    #[error("table access failed: {0}")]
    Table(#[from] redb::TableError),

    #[error("storage failure: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("commit failed: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("record encoding failed: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("an activity with uniqueId '{0}' already exists")]
    UniqueViolation(String),
}

// Transaction errors can carry a live read transaction; keep only the message.
impl From<redb::TransactionError> for DbError {
    fn from(err: redb::TransactionError) -> Self {
        DbError::Transaction(err.to_string())
    }
}
