use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::time::Duration;

use crate::codec::encode_timestamp;
use crate::error::StorageError;
use crate::migrations::{Migration, MIGRATIONS};

pub type DbPool = Pool<Sqlite>;

/// Opens (creating if needed) the ledger database without touching the schema.
pub async fn open_db(path: &Path) -> Result<DbPool, StorageError> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await?;

    Ok(pool)
}

/// Opens the database and brings the schema up to date.
pub async fn create_db(path: &Path) -> Result<DbPool, StorageError> {
    let pool = open_db(path).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

pub async fn applied_versions(pool: &DbPool) -> Result<Vec<i64>, StorageError> {
    let rows = sqlx::query_as::<_, (i64,)>("SELECT version FROM schema_migrations ORDER BY version")
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(|r| r.0).collect())
}

/// Applies every pending migration in version order and returns the names applied.
pub async fn run_migrations(pool: &DbPool) -> Result<Vec<&'static str>, StorageError> {
    let applied = applied_versions(pool).await?;
    let mut names = Vec::new();

    for migration in MIGRATIONS.iter().filter(|m| !applied.contains(&m.version)) {
        apply(pool, migration).await?;
        tracing::info!(version = migration.version, "Applied migration {}", migration.name);
        names.push(migration.name);
    }

    Ok(names)
}

/// Reverts the newest applied migration, if any.
pub async fn revert_last_migration(pool: &DbPool) -> Result<Option<&'static str>, StorageError> {
    let applied = applied_versions(pool).await?;
    let Some(last) = applied.last() else {
        return Ok(None);
    };
    let Some(migration) = MIGRATIONS.iter().find(|m| m.version == *last) else {
        return Err(StorageError::Decode {
            column: "schema_migrations.version",
            value: last.to_string(),
        });
    };

    let mut tx = pool.begin().await?;
    for statement in migration.down {
        sqlx::query(*statement).execute(&mut *tx).await?;
    }
    sqlx::query("DELETE FROM schema_migrations WHERE version = ?")
        .bind(migration.version)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::info!(version = migration.version, "Reverted migration {}", migration.name);
    Ok(Some(migration.name))
}

async fn apply(pool: &DbPool, migration: &Migration) -> Result<(), StorageError> {
    let mut tx = pool.begin().await?;
    for statement in migration.up {
        sqlx::query(*statement).execute(&mut *tx).await?;
    }
    sqlx::query("INSERT INTO schema_migrations (version, name, applied_at) VALUES (?, ?, ?)")
        .bind(migration.version)
        .bind(migration.name)
        .bind(encode_timestamp(Utc::now()))
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn table_names(pool: &DbPool) -> Vec<String> {
        sqlx::query_as::<_, (String,)>(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(pool)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.0)
        .collect()
    }

    async fn transaction_columns(pool: &DbPool) -> Vec<String> {
        sqlx::query_as::<_, (String,)>("SELECT name FROM pragma_table_info('transactions')")
            .fetch_all(pool)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.0)
            .collect()
    }

    #[tokio::test]
    async fn create_db_applies_all_migrations_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");

        let pool = create_db(&path).await.unwrap();
        assert_eq!(applied_versions(&pool).await.unwrap().len(), MIGRATIONS.len());
        assert_eq!(
            table_names(&pool).await,
            vec!["categories", "schema_migrations", "transactions"]
        );
        assert!(transaction_columns(&pool).await.contains(&"category_id".to_string()));

        // Second run is a no-op.
        assert!(run_migrations(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn category_foreign_key_is_named_and_enforced() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_db(&dir.path().join("ledger.db")).await.unwrap();

        let sql: (String,) = sqlx::query_as(
            "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = 'transactions'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert!(sql.0.contains("transactions_category_id_fkey"));

        let orphan = sqlx::query(
            "INSERT INTO transactions (id, title, type, value, category_id, created_at, updated_at) \
             VALUES ('a', 'x', 'income', '1', 'missing', 't', 't')",
        )
        .execute(&pool)
        .await;
        assert!(orphan.is_err());
    }

    #[tokio::test]
    async fn revert_drops_category_column_then_tables() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_db(&dir.path().join("ledger.db")).await.unwrap();

        assert_eq!(
            revert_last_migration(&pool).await.unwrap(),
            Some("add_category_id_to_transactions")
        );
        assert!(!transaction_columns(&pool).await.contains(&"category_id".to_string()));

        assert_eq!(revert_last_migration(&pool).await.unwrap(), Some("create_transactions"));
        assert_eq!(revert_last_migration(&pool).await.unwrap(), Some("create_categories"));
        assert_eq!(revert_last_migration(&pool).await.unwrap(), None);
        assert_eq!(table_names(&pool).await, vec!["schema_migrations"]);

        assert_eq!(run_migrations(&pool).await.unwrap().len(), MIGRATIONS.len());
        assert!(transaction_columns(&pool).await.contains(&"category_id".to_string()));
    }
}
