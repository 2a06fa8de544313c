pub mod csv;

pub use crate::csv::{import_csv, CsvError, CsvImportProfile, CsvTransaction, ParsedImport};
