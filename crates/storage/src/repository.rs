use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};
use tally_core::{
    Category, CategoryId, CategoryRepository, RepositoryError, Transaction, TransactionId,
    TransactionRepository,
};

use crate::codec::{decode_money, decode_timestamp, decode_type, decode_uuid, encode_money, encode_timestamp};
use crate::db::DbPool;
use crate::error::StorageError;

// SQLite caps bound parameters per statement; seven columns per row keeps a
// chunk of this size well under the limit.
const INSERT_CHUNK: usize = 500;

type CategoryRow = (String, String);
type TransactionRow = (String, String, String, String, String, String, String, String);

const SELECT_TRANSACTIONS: &str = r#"
    SELECT t.id, t.title, t.type, t.value, t.created_at, t.updated_at, c.id, c.title
    FROM transactions t
    JOIN categories c ON c.id = t.category_id
    ORDER BY t.created_at, t.rowid
"#;

fn category_from_row(r: CategoryRow) -> Result<Category, StorageError> {
    Ok(Category {
        id: CategoryId(decode_uuid("categories.id", &r.0)?),
        title: r.1,
    })
}

fn transaction_from_row(r: TransactionRow) -> Result<Transaction, StorageError> {
    Ok(Transaction {
        id: TransactionId(decode_uuid("transactions.id", &r.0)?),
        title: r.1,
        kind: decode_type(&r.2)?,
        value: decode_money(&r.3)?,
        created_at: decode_timestamp("created_at", &r.4)?,
        updated_at: decode_timestamp("updated_at", &r.5)?,
        category: Category {
            id: CategoryId(decode_uuid("categories.id", &r.6)?),
            title: r.7,
        },
    })
}

#[derive(Debug, Clone)]
pub struct SqliteCategoryRepository {
    pool: DbPool,
}

impl SqliteCategoryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for SqliteCategoryRepository {
    async fn find_all(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>("SELECT id, title FROM categories ORDER BY rowid")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        rows.into_iter()
            .map(category_from_row)
            .collect::<Result<_, _>>()
            .map_err(Into::into)
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, title FROM categories WHERE title = ? ORDER BY rowid LIMIT 1",
        )
        .bind(title)
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::from)?;

        Ok(row.map(category_from_row).transpose()?)
    }

    async fn find_by_titles(&self, titles: &[String]) -> Result<Vec<Category>, RepositoryError> {
        if titles.is_empty() {
            return Ok(Vec::new());
        }

        let mut found = Vec::new();
        for chunk in titles.chunks(INSERT_CHUNK) {
            let mut query = QueryBuilder::<Sqlite>::new("SELECT id, title FROM categories WHERE title IN (");
            let mut separated = query.separated(", ");
            for title in chunk {
                separated.push_bind(title.clone());
            }
            separated.push_unseparated(") ORDER BY rowid");

            let rows = query
                .build_query_as::<CategoryRow>()
                .fetch_all(&self.pool)
                .await
                .map_err(StorageError::from)?;
            for row in rows {
                found.push(category_from_row(row)?);
            }
        }

        Ok(found)
    }

    async fn insert(&self, category: &Category) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO categories (id, title) VALUES (?, ?)")
            .bind(category.id.to_string())
            .bind(&category.title)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }

    async fn bulk_insert(&self, categories: &[Category]) -> Result<(), RepositoryError> {
        if categories.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(StorageError::from)?;
        for chunk in categories.chunks(INSERT_CHUNK) {
            let mut query = QueryBuilder::<Sqlite>::new("INSERT INTO categories (id, title) ");
            query.push_values(chunk, |mut row, category| {
                row.push_bind(category.id.to_string())
                    .push_bind(category.title.clone());
            });
            query.build().execute(&mut *tx).await.map_err(StorageError::from)?;
        }
        tx.commit().await.map_err(StorageError::from)?;

        tracing::debug!(count = categories.len(), "Inserted categories");
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SqliteTransactionRepository {
    pool: DbPool,
}

impl SqliteTransactionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionRepository for SqliteTransactionRepository {
    async fn find_all(&self) -> Result<Vec<Transaction>, RepositoryError> {
        let rows = sqlx::query_as::<_, TransactionRow>(SELECT_TRANSACTIONS)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        rows.into_iter()
            .map(transaction_from_row)
            .collect::<Result<_, _>>()
            .map_err(Into::into)
    }

    async fn insert(&self, transaction: &Transaction) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO transactions (id, title, type, value, category_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(transaction.id.to_string())
        .bind(&transaction.title)
        .bind(transaction.kind.as_str())
        .bind(encode_money(transaction.value))
        .bind(transaction.category.id.to_string())
        .bind(encode_timestamp(transaction.created_at))
        .bind(encode_timestamp(transaction.updated_at))
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(())
    }

    async fn bulk_insert(&self, transactions: &[Transaction]) -> Result<(), RepositoryError> {
        if transactions.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(StorageError::from)?;
        for chunk in transactions.chunks(INSERT_CHUNK) {
            let mut query = QueryBuilder::<Sqlite>::new(
                "INSERT INTO transactions (id, title, type, value, category_id, created_at, updated_at) ",
            );
            query.push_values(chunk, |mut row, t| {
                row.push_bind(t.id.to_string())
                    .push_bind(t.title.clone())
                    .push_bind(t.kind.as_str())
                    .push_bind(encode_money(t.value))
                    .push_bind(t.category.id.to_string())
                    .push_bind(encode_timestamp(t.created_at))
                    .push_bind(encode_timestamp(t.updated_at));
            });
            query.build().execute(&mut *tx).await.map_err(StorageError::from)?;
        }
        tx.commit().await.map_err(StorageError::from)?;

        tracing::debug!(count = transactions.len(), "Inserted transactions");
        Ok(())
    }
}
