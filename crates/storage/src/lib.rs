pub mod codec;
pub mod db;
pub mod error;
pub mod migrations;
pub mod repository;

pub use db::{applied_versions, create_db, open_db, revert_last_migration, run_migrations, DbPool};
pub use error::StorageError;
pub use migrations::{Migration, MIGRATIONS};
pub use repository::{SqliteCategoryRepository, SqliteTransactionRepository};
