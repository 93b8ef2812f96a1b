use sqlx::FromRow;
use thiserror::Error as ThisError;

/// Model errors
#[derive(Debug, Clone, ThisError)]
pub enum QueryError {
    #[error("Not found")]
    NotFound,
    #[error("Ambiguous results ({0:?}) for query")]
    Ambiguous(usize),
}

#[derive(Debug, Clone, FromRow)]
pub struct Id<T> {
    pub id: T,
}

/// Expect exactly one row.
pub fn single<T>(mut rows: Vec<T>) -> Result<T, QueryError> {
    match rows.len() {
        0 => Err(QueryError::NotFound),
        1 => Ok(rows.remove(0)),
        n => Err(QueryError::Ambiguous(n)),
    }
}
