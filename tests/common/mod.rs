use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Result};
use tempfile::NamedTempFile;
use tracing_subscriber::EnvFilter;
use user_store::{SqliteConfig, UserStore};

// Route store logs through the test harness; RUST_LOG=debug to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// The schema is owned by the embedding application, so tests apply it here.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE Users (
            ID INTEGER PRIMARY KEY,
            Username TEXT
        );
        CREATE TABLE UserData (
            UserID INTEGER NOT NULL,
            Name TEXT,
            Surname TEXT,
            Description TEXT
        );
        "#,
    )
}

// Helper function to create a store over a fresh temporary database file.
// Keep the NamedTempFile alive for as long as the store is used.
pub fn create_temp_store() -> anyhow::Result<(UserStore, NamedTempFile)> {
    init_tracing();
    let temp_file = NamedTempFile::new()?;
    let conn = Connection::open(temp_file.path())?;
    initialize_schema(&conn)?;
    drop(conn);

    let store = UserStore::new(SqliteConfig::new(temp_file.path()));
    Ok((store, temp_file))
}

#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// Run `f` with every event written to the returned buffer.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, CapturedLogs) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(move || writer.clone())
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, logs)
}
