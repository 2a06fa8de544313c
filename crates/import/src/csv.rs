use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;
use tally_core::{Money, TransactionType};
use thiserror::Error;

/// Dialect of an import file. The first character of `delimiter` separates
/// fields; whitespace after it (the rest of the default `", "`) is skipped
/// outside quotes, so quoted fields may follow the space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvImportProfile {
    pub delimiter: String,
    pub has_header: bool,
}

impl Default for CsvImportProfile {
    fn default() -> Self {
        Self {
            delimiter: ", ".to_string(),
            has_header: true,
        }
    }
}

/// A row waiting for its category to be resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvTransaction {
    pub title: String,
    pub value: Money,
    pub kind: TransactionType,
    pub category: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedImport {
    pub transactions: Vec<CsvTransaction>,
    /// Distinct category titles in order of first appearance.
    pub categories: Vec<String>,
}

#[derive(Error, Debug)]
pub enum CsvError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Invalid amount on line {line}: '{value}'")]
    InvalidAmount { line: u64, value: String },
    #[error("Negative amount on line {line}: '{value}'")]
    NegativeAmount { line: u64, value: String },
    #[error("Invalid transaction type on line {line}: '{value}'")]
    InvalidType { line: u64, value: String },
    #[error("Unclosed quote starting on line {line}")]
    UnclosedQuote { line: u64 },
}

/// Column layout of one row; with a header row columns are matched by name,
/// otherwise by position. Extra columns are ignored.
#[derive(Debug, Deserialize)]
struct CsvRow {
    title: String,
    value: String,
    #[serde(rename = "type")]
    kind: String,
    category: String,
}

#[derive(Clone, Copy, PartialEq)]
enum Field {
    Start,
    Unquoted,
    Quoted,
    QuoteInQuoted,
}

/// Rewrites `input` so every separator is the single delimiter character,
/// dropping whitespace that opens a field outside quotes. Fails when the
/// input ends inside a quoted field, which the csv reader would accept.
fn normalize(input: &str, sep: char, delimiter: &str) -> Result<String, CsvError> {
    let mut out = String::with_capacity(input.len());
    let mut state = Field::Start;
    let mut line = 1;
    let mut quote_line = 1;

    let mut rest = input;
    while let Some(c) = rest.chars().next() {
        let mut width = c.len_utf8();
        let outside = state != Field::Quoted;

        if outside && c == sep {
            if rest.starts_with(delimiter) {
                width = delimiter.len();
            }
            out.push(sep);
            state = Field::Start;
        } else if outside && (c == '\n' || c == '\r') {
            out.push(c);
            state = Field::Start;
        } else {
            match (state, c) {
                (Field::Start, ' ' | '\t') => {}
                (Field::Start, '"') => {
                    out.push(c);
                    quote_line = line;
                    state = Field::Quoted;
                }
                (Field::Quoted, '"') => {
                    out.push(c);
                    state = Field::QuoteInQuoted;
                }
                (Field::QuoteInQuoted, '"') => {
                    out.push(c);
                    state = Field::Quoted;
                }
                (Field::Quoted, _) => out.push(c),
                _ => {
                    out.push(c);
                    state = Field::Unquoted;
                }
            }
        }

        if c == '\n' {
            line += 1;
        }
        rest = &rest[width..];
    }

    if state == Field::Quoted {
        return Err(CsvError::UnclosedQuote { line: quote_line });
    }
    Ok(out)
}

fn parse_records<R: Read>(
    reader: &mut csv::Reader<R>,
    has_header: bool,
) -> Result<ParsedImport, CsvError> {
    let headers = if has_header {
        Some(reader.headers()?.clone())
    } else {
        None
    };

    let mut parsed = ParsedImport::default();
    let mut seen = HashSet::new();

    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let row: CsvRow = record.deserialize(headers.as_ref())?;

        let value = row
            .value
            .parse::<Money>()
            .map_err(|_| CsvError::InvalidAmount {
                line,
                value: row.value.clone(),
            })?;
        if value.is_negative() {
            return Err(CsvError::NegativeAmount {
                line,
                value: row.value,
            });
        }

        let kind = row
            .kind
            .parse::<TransactionType>()
            .map_err(|_| CsvError::InvalidType {
                line,
                value: row.kind.clone(),
            })?;

        if seen.insert(row.category.clone()) {
            parsed.categories.push(row.category.clone());
        }

        parsed.transactions.push(CsvTransaction {
            title: row.title,
            value,
            kind,
            category: row.category,
        });
    }

    Ok(parsed)
}

pub fn import_csv<R: Read>(mut data: R, profile: &CsvImportProfile) -> Result<ParsedImport, CsvError> {
    let mut raw = String::new();
    data.read_to_string(&mut raw)?;
    // The csv reader only splits on a single byte.
    let sep = profile
        .delimiter
        .chars()
        .next()
        .filter(char::is_ascii)
        .unwrap_or(',');
    let text = normalize(&raw, sep, &profile.delimiter)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(profile.has_header)
        .delimiter(sep as u8)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    parse_records(&mut reader, profile.has_header)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(data: &[u8]) -> Result<ParsedImport, CsvError> {
        import_csv(data, &CsvImportProfile::default())
    }

    #[test]
    fn import_csv_basic() {
        let data = b"title, value, type, category\n\
                     Salary, 5000, income, Salary\n\
                     Rent, 1200, outcome, Housing\n";
        let parsed = run(data).unwrap();
        assert_eq!(
            parsed.transactions,
            vec![
                CsvTransaction {
                    title: "Salary".into(),
                    value: Money::from_cents(500_000),
                    kind: TransactionType::Income,
                    category: "Salary".into(),
                },
                CsvTransaction {
                    title: "Rent".into(),
                    value: Money::from_cents(120_000),
                    kind: TransactionType::Outcome,
                    category: "Housing".into(),
                },
            ]
        );
        assert_eq!(parsed.categories, vec!["Salary", "Housing"]);
    }

    #[test]
    fn categories_deduplicated_in_first_seen_order() {
        let data = b"title, value, type, category\n\
                     Lunch, 12.50, outcome, Food\n\
                     Pay, 100, income, Work\n\
                     Dinner, 30, outcome, Food\n\
                     Bonus, 10, income, Work\n";
        let parsed = run(data).unwrap();
        assert_eq!(parsed.transactions.len(), 4);
        assert_eq!(parsed.categories, vec!["Food", "Work"]);
        assert_eq!(parsed.transactions[0].value, Money::from_cents(1250));
    }

    #[test]
    fn columns_matched_by_header_name() {
        let data = b"category, type, title, value, note\n\
                     Food, outcome, Lunch, 9.99, ignored\n";
        let parsed = run(data).unwrap();
        assert_eq!(parsed.transactions[0].title, "Lunch");
        assert_eq!(parsed.transactions[0].category, "Food");
        assert_eq!(parsed.transactions[0].value, Money::from_cents(999));
    }

    #[test]
    fn headerless_profile_is_positional() {
        let profile = CsvImportProfile {
            delimiter: ";".to_string(),
            has_header: false,
        };
        let data = b"Gift;25;income;Family\n";
        let parsed = import_csv(data.as_ref(), &profile).unwrap();
        assert_eq!(parsed.transactions[0].kind, TransactionType::Income);
        assert_eq!(parsed.categories, vec!["Family"]);
    }

    #[test]
    fn header_only_yields_nothing() {
        let parsed = run(b"title, value, type, category\n").unwrap();
        assert_eq!(parsed, ParsedImport::default());
    }

    #[test]
    fn unterminated_quote_is_rejected() {
        let data = b"title, value, type, category\n\
                     Salary, 5000, income, Salary\n\
                     \"Rent, 1200, outcome, Housing\n";
        assert!(matches!(run(data), Err(CsvError::UnclosedQuote { line: 3 })));
    }

    #[test]
    fn unterminated_quote_in_last_field_is_rejected() {
        let data = b"title, value, type, category\nSalary, 5000, income, \"Salary\n";
        assert!(matches!(run(data), Err(CsvError::UnclosedQuote { line: 2 })));

        let plain = CsvImportProfile {
            delimiter: ",".to_string(),
            has_header: true,
        };
        let data = b"title,value,type,category\nSalary,5000,income,\"Salary";
        assert!(matches!(
            import_csv(data.as_ref(), &plain),
            Err(CsvError::UnclosedQuote { .. })
        ));
    }

    #[test]
    fn quoted_field_after_delimiter_space() {
        let data = b"title, value, type, category\n\
                     Salary, 5000, income, \"Pay, Bonus\"\n\
                     \"Rent \"\"flat\"\"\", \"1200.50\", outcome, Housing\n";
        let parsed = run(data).unwrap();
        assert_eq!(parsed.transactions.len(), 2);
        assert_eq!(parsed.transactions[0].category, "Pay, Bonus");
        assert_eq!(parsed.transactions[1].title, "Rent \"flat\"");
        assert_eq!(parsed.transactions[1].value, Money::from_cents(120_050));
        assert_eq!(parsed.categories, vec!["Pay, Bonus", "Housing"]);
    }

    #[test]
    fn quoted_field_may_span_lines() {
        let data = b"title, value, type, category\n\"Rent\nMay\", 1200, outcome, Housing\n";
        let parsed = run(data).unwrap();
        assert_eq!(parsed.transactions[0].title, "Rent\nMay");
    }

    #[test]
    fn quote_inside_unquoted_field_is_literal() {
        let data = b"title, value, type, category\n5\" screws, 3, outcome, Hardware\n";
        let parsed = run(data).unwrap();
        assert_eq!(parsed.transactions[0].title, "5\" screws");
    }

    #[test]
    fn delimiter_without_space_still_splits() {
        let data = b"title,value, type ,category\nBus,2.75,outcome,Transport\n";
        let parsed = run(data).unwrap();
        assert_eq!(parsed.transactions[0].value, Money::from_cents(275));
        assert_eq!(parsed.categories, vec!["Transport"]);
    }

    #[test]
    fn ragged_row_is_rejected() {
        let data = b"title, value, type, category\nSalary, 5000, income\n";
        assert!(matches!(run(data), Err(CsvError::CsvError(_))));
    }

    #[test]
    fn missing_column_is_rejected() {
        let data = b"title, value, type\nSalary, 5000, income\n";
        assert!(matches!(run(data), Err(CsvError::CsvError(_))));
    }

    #[test]
    fn bad_amount_reports_line() {
        let data = b"title, value, type, category\nA, 1, income, X\nB, lots, income, X\n";
        match run(data) {
            Err(CsvError::InvalidAmount { line, value }) => {
                assert_eq!(line, 3);
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn oversized_amount_is_rejected() {
        let data = b"title, value, type, category\nJackpot, 79228162514264337593543950335, income, Luck\n";
        assert!(matches!(run(data), Err(CsvError::InvalidAmount { line: 2, .. })));
    }

    #[test]
    fn negative_amount_is_rejected() {
        let data = b"title, value, type, category\nRefund, -5, outcome, Shop\n";
        assert!(matches!(run(data), Err(CsvError::NegativeAmount { .. })));
    }

    #[test]
    fn unknown_type_is_rejected() {
        let data = b"title, value, type, category\nMove, 5, transfer, Bank\n";
        assert!(matches!(run(data), Err(CsvError::InvalidType { .. })));
    }
}
