use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::str::FromStr;
use std::time::Duration;

use super::types::DatabaseError;
use crate::config::DatabaseConfig;

const MEMORY_PATH: &str = ":memory:";

// ============================================================================
// Database
// ============================================================================

/// Pooled handle to the catalogue database.
///
/// Cheap to clone; every clone shares the same pool. Handlers receive it as
/// router state rather than reaching for a global.
#[derive(Clone)]
pub struct Database {
    pub(crate) pool: SqlitePool,
}

impl Database {
    /// Open a database at `path` with default pool settings and run migrations.
    ///
    /// `":memory:"` yields a private in-memory database shared by every
    /// connection of this pool.
    pub async fn open(path: &str) -> Result<Self, DatabaseError> {
        let config = DatabaseConfig {
            path: path.to_string(),
            ..DatabaseConfig::default()
        };
        Self::connect(&config).await
    }

    /// Open a database using explicit pool settings and run migrations.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let url = format!("sqlite:{}?mode=rwc", config.path);

        // busy_timeout makes SQLite wait for competing writers instead of failing
        // immediately with SQLITE_BUSY. Set through pragma() so every pooled
        // connection inherits it.
        let options = SqliteConnectOptions::from_str(&url)?
            .pragma("busy_timeout", config.busy_timeout_ms.to_string());

        let pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs));

        // An in-memory database lives only as long as one connection to it,
        // so that connection must never be reaped or recycled.
        let pool_options = if config.path == MEMORY_PATH {
            pool_options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_options.idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        };

        let pool = pool_options.connect_with(options).await?;

        tracing::info!(
            path = %config.path,
            max_connections = config.max_connections,
            "Connected to database"
        );

        let db = Self { pool };
        db.migrate()
            .await
            .map_err(|e| DatabaseError::Migration(e.to_string()))?;
        Ok(db)
    }

    /// Create tables and seed the fixed price lists inside one transaction.
    ///
    /// Every statement is idempotent, so running this against an existing
    /// database is a no-op.
    async fn migrate(&self) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _articulos (
                codart INTEGER PRIMARY KEY CHECK (codart BETWEEN 1 AND 99999),
                npm TEXT DEFAULT NULL CHECK (npm IS NULL OR length(npm) <= 200),
                stock INTEGER CHECK (stock IS NULL OR stock BETWEEN 0 AND 9999999999),
                pcosto REAL DEFAULT NULL CHECK (pcosto IS NULL OR abs(pcosto) < 10000000),
                pordif REAL DEFAULT NULL CHECK (pordif IS NULL OR abs(pordif) < 10000)
            )
        "#,
        )
        .execute(&mut *tx)
        .await?;
        tracing::debug!("Table _articulos ready");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _listas (
                codlis INTEGER PRIMARY KEY CHECK (codlis BETWEEN -32768 AND 32767),
                nomlis TEXT DEFAULT NULL CHECK (nomlis IS NULL OR length(nomlis) <= 50),
                porlis REAL DEFAULT NULL CHECK (porlis IS NULL OR abs(porlis) < 100)
            )
        "#,
        )
        .execute(&mut *tx)
        .await?;
        tracing::debug!("Table _listas ready");

        // Fixed price lists; existing rows are left untouched
        sqlx::query(
            r#"
            INSERT INTO _listas (codlis, nomlis, porlis) VALUES
                (1, 'ENTIDADES PUBLICAS', 45.00),
                (2, 'INSTITUCIONES PRIVADAS', 40.00),
                (3, 'FARMACIAS', 37.00)
            ON CONFLICT (codlis) DO NOTHING
        "#,
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!("Schema verified and price lists seeded");

        Ok(())
    }

    /// Round-trip a trivial query to prove the database is reachable
    pub async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close every pooled connection. Later queries fail with `PoolClosed`.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_in_memory_and_ping() {
        let db = Database::open(":memory:").await.unwrap();
        db.ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_in_memory_schema_survives_idle_timeout() {
        let config = DatabaseConfig {
            path: ":memory:".to_string(),
            idle_timeout_secs: 1,
            ..DatabaseConfig::default()
        };
        let db = Database::connect(&config).await.unwrap();
        assert_eq!(db.list_price_lists().await.unwrap().len(), 3);

        tokio::time::sleep(Duration::from_secs(3)).await;

        assert_eq!(db.list_price_lists().await.unwrap().len(), 3);
        assert_eq!(db.count_articles().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let db = Database::open(":memory:").await.unwrap();
        db.migrate().await.unwrap();
        db.migrate().await.unwrap();

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM _listas")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(count.0, 3);
    }

    #[tokio::test]
    async fn test_check_constraints_reject_out_of_range_code() {
        let db = Database::open(":memory:").await.unwrap();
        let result = sqlx::query("INSERT INTO _articulos (codart) VALUES (100000)")
            .execute(&db.pool)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_reopen_file_database_keeps_seed_unique() {
        let dir = std::env::temp_dir().join("catalogo_schema_test_reopen");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("catalogo.db");
        let _ = std::fs::remove_file(&path);
        let path_str = path.to_str().unwrap();

        {
            let db = Database::open(path_str).await.unwrap();
            db.close().await;
        }
        let db = Database::open(path_str).await.unwrap();
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM _listas")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(count.0, 3);
        db.close().await;

        std::fs::remove_dir_all(&dir).ok();
    }
}
