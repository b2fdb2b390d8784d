// Embedded schema migrations for PostgreSQL
// MigrationHarness only works on a sync connection, so every call runs on the blocking pool

use crate::db::MIGRATIONS;
use diesel::{Connection, PgConnection};
use diesel_migrations::MigrationHarness;
use std::error::Error;
use tracing::{debug, info};

type MigrationResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationStatus {
    pub applied_count: usize,
    pub pending_count: usize,
}

impl MigrationStatus {
    pub fn is_up_to_date(&self) -> bool {
        self.pending_count == 0
    }
}

/// Open a sync connection on the blocking pool and hand it to `f`
async fn with_sync_connection<T, F>(database_url: &str, f: F) -> MigrationResult<T>
where
    T: Send + 'static,
    F: FnOnce(&mut PgConnection) -> MigrationResult<T> + Send + 'static,
{
    let database_url = database_url.to_string();

    tokio::task::spawn_blocking(move || {
        let mut conn = PgConnection::establish(&database_url)
            .map_err(|e| format!("Failed to establish sync connection: {}", e))?;
        f(&mut conn)
    })
    .await
    .map_err(|e| format!("Migration task panicked: {}", e))?
}

/// Apply every pending migration; returns how many ran
pub async fn run_migrations(database_url: &str) -> MigrationResult<usize> {
    let applied = with_sync_connection(database_url, |conn| {
        let versions = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| format!("Failed to run migrations: {}", e))?;

        for version in &versions {
            debug!("[MIGRATIONS] Applied {}", version);
        }
        Ok(versions.len())
    })
    .await?;

    info!(applied, "[MIGRATIONS] Schema is up to date");
    Ok(applied)
}

/// Count applied and pending migrations without running anything
pub async fn check_migration_status(database_url: &str) -> MigrationResult<MigrationStatus> {
    with_sync_connection(database_url, |conn| {
        let applied_count = conn
            .applied_migrations()
            .map_err(|e| format!("Failed to read applied migrations: {}", e))?
            .len();
        let pending_count = conn
            .pending_migrations(MIGRATIONS)
            .map_err(|e| format!("Failed to read pending migrations: {}", e))?
            .len();

        Ok(MigrationStatus {
            applied_count,
            pending_count,
        })
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_up_to_date() {
        let status = MigrationStatus {
            applied_count: 1,
            pending_count: 0,
        };
        assert!(status.is_up_to_date());
        assert!(!MigrationStatus {
            pending_count: 1,
            ..status
        }
        .is_up_to_date());
    }

    #[tokio::test]
    async fn test_unreachable_database_is_an_error() {
        assert!(check_migration_status("postgresql://nobody@127.0.0.1:9/none")
            .await
            .is_err());
    }
}
