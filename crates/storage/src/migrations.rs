/// One reversible schema step. `up` and `down` run inside a single database
/// transaction together with the bookkeeping row in `schema_migrations`.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i64,
    pub name: &'static str,
    pub up: &'static [&'static str],
    pub down: &'static [&'static str],
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1588515000001,
        name: "create_categories",
        up: &[
            r#"
            CREATE TABLE categories (
                id TEXT PRIMARY KEY NOT NULL,
                title TEXT NOT NULL
            )
            "#,
            "CREATE INDEX idx_categories_title ON categories (title)",
        ],
        down: &["DROP INDEX idx_categories_title", "DROP TABLE categories"],
    },
    Migration {
        version: 1588515000002,
        name: "create_transactions",
        up: &[r#"
            CREATE TABLE transactions (
                id TEXT PRIMARY KEY NOT NULL,
                title TEXT NOT NULL,
                type TEXT NOT NULL,
                value TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#],
        down: &["DROP TABLE transactions"],
    },
    // SQLite cannot add a NOT NULL column or a named constraint in place, so
    // both directions rebuild the table. Going up fails on a non-empty table
    // because existing rows have no category to point at.
    Migration {
        version: 1588516401283,
        name: "add_category_id_to_transactions",
        up: &[
            r#"
            CREATE TABLE transactions_next (
                id TEXT PRIMARY KEY NOT NULL,
                title TEXT NOT NULL,
                type TEXT NOT NULL,
                value TEXT NOT NULL,
                category_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                CONSTRAINT transactions_category_id_fkey
                    FOREIGN KEY (category_id) REFERENCES categories (id)
            )
            "#,
            r#"
            INSERT INTO transactions_next (id, title, type, value, category_id, created_at, updated_at)
            SELECT id, title, type, value, NULL, created_at, updated_at FROM transactions
            "#,
            "DROP TABLE transactions",
            "ALTER TABLE transactions_next RENAME TO transactions",
        ],
        down: &[
            r#"
            CREATE TABLE transactions_prev (
                id TEXT PRIMARY KEY NOT NULL,
                title TEXT NOT NULL,
                type TEXT NOT NULL,
                value TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
            r#"
            INSERT INTO transactions_prev (id, title, type, value, created_at, updated_at)
            SELECT id, title, type, value, created_at, updated_at FROM transactions
            "#,
            "DROP TABLE transactions",
            "ALTER TABLE transactions_prev RENAME TO transactions",
        ],
    },
];
