use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Result;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteConnection},
    Connection as SqlConnection,
};
use tokio::sync::{broadcast, Mutex, MutexGuard};
use tracing::{debug, info};

use exm_data::{Observe, StoreChange, Subscription, Table};

use crate::schema;

/// Change notifications buffered per subscriber.
const CHANGE_BUFFER: usize = 64;

/// A thread safe connection to the database, which also
/// announces every mutation made through it.
#[derive(Clone)]
pub struct Connection {
    conn: Arc<Mutex<SqliteConnection>>,
    changes: broadcast::Sender<StoreChange>,
    subscriptions: Arc<AtomicU64>,
}

impl Connection {
    /// Open a connection to the database, creating it
    /// and installing the schema if needed.
    pub async fn open(filename: &str) -> Result<Connection> {
        let options = SqliteConnectOptions::from_str(filename)?
            .create_if_missing(true)
            .foreign_keys(true);
        let conn = SqliteConnection::connect_with(&options).await?;
        let db = Self::wrap(conn);
        schema::install(&db).await?;
        info!(filename, "database opened");
        Ok(db)
    }

    /// Open a new test database connection.
    /// The database will be created on each open and removed
    /// when the handle is dropped.
    pub async fn open_test() -> Result<(TestHandle, Connection)> {
        let filename = format!("/tmp/exm_test_{}.sqlite3", rand::random::<u64>());
        let handle = TestHandle {
            filename: filename.clone(),
        };
        let db = Self::open(&filename).await?;
        Ok((handle, db))
    }

    fn wrap(conn: SqliteConnection) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_BUFFER);
        Self {
            conn: Arc::new(Mutex::new(conn)),
            changes,
            subscriptions: Arc::new(AtomicU64::new(0)),
        }
    }

    pub async fn lock(&self) -> MutexGuard<'_, SqliteConnection> {
        self.conn.lock().await
    }

    /// Announce a mutation to all subscribers.
    pub(crate) fn notify(&self, table: Table, group_id: Option<u32>) {
        // No receivers is not an error.
        let _ = self.changes.send(StoreChange { table, group_id });
    }
}

impl Observe for Connection {
    fn subscribe(&self) -> Subscription {
        let id = self.subscriptions.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(subscription = id, "store subscription opened");
        Subscription::new(id, self.changes.subscribe())
    }

    fn unsubscribe(&self, subscription: Subscription) {
        debug!(subscription = subscription.id, "store subscription closed");
        drop(subscription);
    }
}

pub struct TestHandle {
    filename: String,
}

impl Drop for TestHandle {
    fn drop(&mut self) {
        let path = Path::new(&self.filename);
        if path.exists() {
            let _ = fs::remove_file(path);
        }
    }
}
