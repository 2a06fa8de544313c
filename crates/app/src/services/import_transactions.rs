use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tally_core::{Category, CategoryRepository, LedgerError, Transaction, TransactionRepository};
use tally_import::{CsvError, CsvImportProfile, ParsedImport};

/// Bulk-loads transactions from a CSV file, creating any categories it names.
///
/// Categories are committed before the transactions; a failure while
/// inserting transactions leaves the new categories in place.
pub struct ImportTransactionsService<T, C> {
    transactions: T,
    categories: C,
    profile: CsvImportProfile,
}

impl<T, C> ImportTransactionsService<T, C>
where
    T: TransactionRepository,
    C: CategoryRepository,
{
    pub fn new(transactions: T, categories: C, profile: CsvImportProfile) -> Self {
        Self {
            transactions,
            categories,
            profile,
        }
    }

    pub async fn execute(&self, path: &Path) -> Result<Vec<Transaction>, LedgerError> {
        let parsed = self.parse_file(path).await?;
        let categories = self.find_or_create_categories(&parsed.categories).await?;

        let mut by_title: HashMap<&str, &Category> = HashMap::new();
        for category in &categories {
            by_title.entry(category.title.as_str()).or_insert(category);
        }

        let transactions = parsed
            .transactions
            .iter()
            .map(|row| -> Result<Transaction, LedgerError> {
                let category = by_title.get(row.category.as_str()).ok_or_else(|| {
                    LedgerError::InvalidFile(format!("Unresolved category '{}'", row.category))
                })?;
                Ok(Transaction::new(&row.title, row.kind, row.value, (*category).clone()))
            })
            .collect::<Result<Vec<_>, LedgerError>>()?;

        self.transactions.bulk_insert(&transactions).await?;

        tracing::info!(
            path = %path.display(),
            transactions = transactions.len(),
            categories = categories.len(),
            "Imported transactions"
        );
        Ok(transactions)
    }

    async fn parse_file(&self, path: &Path) -> Result<ParsedImport, LedgerError> {
        let owned = path.to_path_buf();
        let profile = self.profile.clone();

        let result = tokio::task::spawn_blocking(move || -> Result<ParsedImport, CsvError> {
            let file = File::open(&owned)?;
            tally_import::csv::import_csv(BufReader::new(file), &profile)
        })
        .await
        .map_err(|e| LedgerError::InvalidFile(e.to_string()))?;

        result.map_err(|e| {
            tracing::warn!(path = %path.display(), "Rejected import: {e}");
            LedgerError::InvalidFile(e.to_string())
        })
    }

    /// Returns existing categories for `titles` plus newly stored ones for
    /// every title with no exact match.
    async fn find_or_create_categories(&self, titles: &[String]) -> Result<Vec<Category>, LedgerError> {
        let existing = self.categories.find_by_titles(titles).await?;

        let known: HashSet<&str> = existing.iter().map(|c| c.title.as_str()).collect();
        let created: Vec<Category> = titles
            .iter()
            .filter(|title| !known.contains(title.as_str()))
            .map(|title| Category::new(title))
            .collect();

        self.categories.bulk_insert(&created).await?;
        tracing::debug!(
            existing = existing.len(),
            created = created.len(),
            "Reconciled categories"
        );

        Ok(existing.into_iter().chain(created).collect())
    }
}
