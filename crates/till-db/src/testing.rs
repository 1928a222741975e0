//! File-backed databases for tests that need more than one connection.
//!
//! `DbConfig::in_memory()` pins the pool to a single connection, which
//! serializes every caller. Concurrency tests open a real file instead.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{Database, DbConfig};

static NEXT: AtomicU64 = AtomicU64::new(0);

/// A migrated database in the system temp directory, deleted on drop.
pub struct TempDb {
    pub db: Database,
    path: PathBuf,
}

impl TempDb {
    pub async fn open(max_connections: u32) -> TempDb {
        let path = std::env::temp_dir().join(format!(
            "till-test-{}-{}.db",
            std::process::id(),
            NEXT.fetch_add(1, Ordering::Relaxed)
        ));
        let _ = std::fs::remove_file(&path);

        let db = Database::new(DbConfig::new(path.clone()).max_connections(max_connections))
            .await
            .unwrap();

        TempDb { db, path }
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}
