use anyhow::Result;
use tracing::debug;

use crate::Connection;

const SCHEMA: &str = include_str!("../db/schema.sql");

/// Install the database schema. Safe to run on an
/// existing database.
pub async fn install(db: &Connection) -> Result<()> {
    let mut conn = db.lock().await;
    for statement in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(statement).execute(&mut *conn).await?;
    }
    debug!("schema installed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_install_is_idempotent() {
        let (_handle, db) = Connection::open_test().await.unwrap();
        install(&db).await.unwrap();
        install(&db).await.unwrap();
    }
}
