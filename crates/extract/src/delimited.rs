use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

use kharcha_core::{DateGrammar, RawRecord, SkipReason, Transaction};

use crate::types::{Extraction, SkippedRow};

/// Leading slice the delimiter sniffer inspects.
const SNIFF_SAMPLE: usize = 2048;

#[derive(Error, Debug)]
pub enum DelimitedError {
    #[error("could not detect a delimiter: expected comma- or tab-separated data")]
    UnknownDelimiter,
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Parses comma- or tab-separated statement exports.
///
/// Headers are matched case-insensitively after trimming, so `Date`,
/// ` DATE ` and `date` all bind the date column. A row missing any of
/// the three required fields is skipped with a diagnostic; it never
/// aborts the batch. Amounts are cleaned of currency glyphs and
/// separators, then forced negative, since every row in scope is spend.
pub struct DelimitedExtractor;

impl DelimitedExtractor {
    pub fn extract(text: &str) -> Result<Extraction, DelimitedError> {
        // Emptiness is judged one layer up, once both formats have had
        // their chance to produce rows.
        if text.trim().is_empty() {
            return Ok(Extraction::default());
        }

        let delimiter = sniff_delimiter(text)?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        let columns = ColumnMap::locate(&headers);

        let mut out = Extraction::default();
        for (i, result) in reader.records().enumerate() {
            let row = i + 1;
            let record = result?;

            if record.is_empty() {
                continue;
            }

            let date = field(&record, columns.date);
            let description = field(&record, columns.description);
            let amount_text = field(&record, columns.amount);

            let missing = if date.is_empty() {
                Some("date")
            } else if description.is_empty() {
                Some("description")
            } else if amount_text.is_empty() {
                Some("amount")
            } else {
                None
            };
            if let Some(name) = missing {
                out.skipped.push(SkippedRow {
                    row,
                    reason: SkipReason::MissingField(name),
                });
                continue;
            }

            let amount = match parse_amount(amount_text) {
                Some(value) => value,
                None => {
                    out.skipped.push(SkippedRow {
                        row,
                        reason: SkipReason::BadAmount(amount_text.to_string()),
                    });
                    continue;
                }
            };

            let raw = RawRecord {
                date: date.to_string(),
                description: description.to_string(),
                // Statement rows are spend, whatever sign the export used.
                amount: -amount.abs(),
            };
            match Transaction::from_raw(raw, DateGrammar::Iso) {
                Ok(tx) => out.transactions.push(tx),
                Err(reason) => out.skipped.push(SkippedRow { row, reason }),
            }
        }

        Ok(out)
    }
}

struct ColumnMap {
    date: Option<usize>,
    description: Option<usize>,
    amount: Option<usize>,
}

impl ColumnMap {
    /// First header matching each canonical name wins. A header can carry
    /// a BOM when the export was written as utf-8-sig.
    fn locate(headers: &csv::StringRecord) -> Self {
        let mut map = ColumnMap {
            date: None,
            description: None,
            amount: None,
        };
        for (i, name) in headers.iter().enumerate() {
            let name = name.trim_start_matches('\u{feff}').trim().to_lowercase();
            match name.as_str() {
                "date" if map.date.is_none() => map.date = Some(i),
                "description" if map.description.is_none() => map.description = Some(i),
                "amount" if map.amount.is_none() => map.amount = Some(i),
                _ => {}
            }
        }
        map
    }
}

/// Missing column or short row both read as an empty field; the caller
/// turns that into a skip, not an error.
fn field<'r>(record: &'r csv::StringRecord, column: Option<usize>) -> &'r str {
    column
        .and_then(|c| record.get(c))
        .unwrap_or_default()
        .trim()
}

fn parse_amount(s: &str) -> Option<Decimal> {
    let s = s.replace(['₹', '$', ',', ' '], "");
    Decimal::from_str(&s).ok()
}

/// Count candidate delimiters in the leading sample and take the one that
/// dominates. Neither appearing at all means there is no basis for
/// splitting rows.
fn sniff_delimiter(text: &str) -> Result<u8, DelimitedError> {
    let sample = &text.as_bytes()[..text.len().min(SNIFF_SAMPLE)];
    let commas = sample.iter().filter(|&&b| b == b',').count();
    let tabs = sample.iter().filter(|&&b| b == b'\t').count();
    if commas == 0 && tabs == 0 {
        return Err(DelimitedError::UnknownDelimiter);
    }
    Ok(if tabs > commas { b'\t' } else { b',' })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kharcha_core::Money;

    fn money(s: &str) -> Money {
        Money::new(Decimal::from_str(s).unwrap())
    }

    // ── sniff_delimiter ───────────────────────────────────────────────────────

    #[test]
    fn sniff_prefers_commas() {
        assert_eq!(sniff_delimiter("a,b,c\n1,2,3\n").unwrap(), b',');
    }

    #[test]
    fn sniff_detects_tabs() {
        assert_eq!(sniff_delimiter("a\tb\tc\n1\t2\t3\n").unwrap(), b'\t');
    }

    #[test]
    fn sniff_tab_wins_when_it_dominates() {
        // A comma inside a description must not flip a TSV to comma mode.
        let text = "date\tdescription\tamount\n2024-01-01\tCafe, Indiranagar\t100\n";
        assert_eq!(sniff_delimiter(text).unwrap(), b'\t');
    }

    #[test]
    fn sniff_fails_without_either_delimiter() {
        assert!(matches!(
            sniff_delimiter("just some text\nwith lines\n"),
            Err(DelimitedError::UnknownDelimiter)
        ));
    }

    // ── parse_amount ──────────────────────────────────────────────────────────

    #[test]
    fn parse_amount_plain() {
        assert_eq!(parse_amount("123.45").unwrap(), Decimal::from_str("123.45").unwrap());
    }

    #[test]
    fn parse_amount_strips_rupee_sign_and_commas() {
        assert_eq!(
            parse_amount("₹1,234.56").unwrap(),
            Decimal::from_str("1234.56").unwrap()
        );
    }

    #[test]
    fn parse_amount_strips_dollar_and_spaces() {
        assert_eq!(parse_amount("$ 99.99").unwrap(), Decimal::from_str("99.99").unwrap());
    }

    #[test]
    fn parse_amount_invalid() {
        assert!(parse_amount("abc").is_none());
        assert!(parse_amount("12.3.4").is_none());
    }

    // ── extract ───────────────────────────────────────────────────────────────

    #[test]
    fn extract_basic_csv() {
        let text = "date,description,amount\n\
                    2024-01-01,Uber ride,100\n\
                    2024-01-01,Swiggy order,200\n\
                    2024-01-02,Amazon purchase,50\n";
        let extraction = DelimitedExtractor::extract(text).unwrap();
        assert_eq!(extraction.transactions.len(), 3);
        assert!(extraction.skipped.is_empty());
        assert_eq!(extraction.transactions[1].description, "Swiggy order");
        assert_eq!(extraction.transactions[1].amount, money("-200"));
    }

    #[test]
    fn extract_tsv() {
        let text = "date\tdescription\tamount\n2024-01-01\tUber ride\t100\n";
        let extraction = DelimitedExtractor::extract(text).unwrap();
        assert_eq!(extraction.transactions.len(), 1);
        assert_eq!(extraction.transactions[0].amount, money("-100"));
    }

    #[test]
    fn header_aliases_extract_identically_to_canonical_form() {
        let canonical = "date,description,amount\n2024-01-01,Uber ride,100\n";
        let aliased = " Date ,DESCRIPTION,Amount \n2024-01-01,Uber ride,100\n";
        assert_eq!(
            DelimitedExtractor::extract(canonical).unwrap().transactions,
            DelimitedExtractor::extract(aliased).unwrap().transactions
        );
    }

    #[test]
    fn bom_on_first_header_is_ignored() {
        let text = "\u{feff}date,description,amount\n2024-01-01,Uber ride,100\n";
        let extraction = DelimitedExtractor::extract(text).unwrap();
        assert_eq!(extraction.transactions.len(), 1);
    }

    #[test]
    fn positive_and_negative_amounts_both_read_as_spend() {
        let text = "date,description,amount\n\
                    2024-01-01,Listed positive,500\n\
                    2024-01-02,Listed negative,-500\n";
        let extraction = DelimitedExtractor::extract(text).unwrap();
        assert_eq!(extraction.transactions[0].amount, money("-500"));
        assert_eq!(extraction.transactions[1].amount, money("-500"));
    }

    #[test]
    fn formatted_amounts_are_cleaned() {
        let text = "date,description,amount\n2024-01-01,Rent transfer,\"₹1,250.50\"\n";
        let extraction = DelimitedExtractor::extract(text).unwrap();
        assert_eq!(extraction.transactions[0].amount, money("-1250.50"));
    }

    #[test]
    fn zero_amount_rows_survive_extraction() {
        let text = "date,description,amount\n2024-01-01,Reversed charge,0\n";
        let extraction = DelimitedExtractor::extract(text).unwrap();
        assert_eq!(extraction.transactions.len(), 1);
        assert!(extraction.transactions[0].amount.is_zero());
    }

    #[test]
    fn rows_with_empty_fields_are_skipped_with_diagnostics() {
        let text = "date,description,amount\n\
                    2024-01-01,Uber ride,100\n\
                    ,Missing date,50\n\
                    2024-01-02,,50\n\
                    2024-01-03,Missing amount,\n";
        let extraction = DelimitedExtractor::extract(text).unwrap();
        assert_eq!(extraction.transactions.len(), 1);
        assert_eq!(
            extraction.skipped,
            vec![
                SkippedRow { row: 2, reason: SkipReason::MissingField("date") },
                SkippedRow { row: 3, reason: SkipReason::MissingField("description") },
                SkippedRow { row: 4, reason: SkipReason::MissingField("amount") },
            ]
        );
    }

    #[test]
    fn unparseable_amount_is_skipped() {
        let text = "date,description,amount\n2024-01-01,Oddity,12.3.4\n";
        let extraction = DelimitedExtractor::extract(text).unwrap();
        assert!(extraction.transactions.is_empty());
        assert_eq!(
            extraction.skipped[0].reason,
            SkipReason::BadAmount("12.3.4".to_string())
        );
    }

    #[test]
    fn bad_date_is_skipped() {
        let text = "date,description,amount\n01/15/2024,US style date,100\n";
        let extraction = DelimitedExtractor::extract(text).unwrap();
        assert!(extraction.transactions.is_empty());
        assert!(matches!(extraction.skipped[0].reason, SkipReason::BadDate(_)));
    }

    #[test]
    fn short_rows_read_as_missing_fields() {
        let text = "date,description,amount\n2024-01-01,Only two fields\n";
        let extraction = DelimitedExtractor::extract(text).unwrap();
        assert_eq!(
            extraction.skipped[0].reason,
            SkipReason::MissingField("amount")
        );
    }

    #[test]
    fn missing_required_column_skips_every_row() {
        let text = "date,narration,amount\n2024-01-01,Uber ride,100\n";
        let extraction = DelimitedExtractor::extract(text).unwrap();
        assert!(extraction.transactions.is_empty());
        assert_eq!(
            extraction.skipped[0].reason,
            SkipReason::MissingField("description")
        );
    }

    #[test]
    fn extra_columns_are_ignored() {
        let text = "date,description,amount,balance,branch\n\
                    2024-01-01,Uber ride,100,4000,BLR\n";
        let extraction = DelimitedExtractor::extract(text).unwrap();
        assert_eq!(extraction.transactions.len(), 1);
        assert_eq!(extraction.transactions[0].description, "Uber ride");
    }

    #[test]
    fn empty_input_yields_empty_extraction() {
        let extraction = DelimitedExtractor::extract("").unwrap();
        assert!(extraction.transactions.is_empty());
        assert!(extraction.skipped.is_empty());

        let extraction = DelimitedExtractor::extract("   \n  \n").unwrap();
        assert!(extraction.transactions.is_empty());
    }

    #[test]
    fn header_only_input_yields_empty_extraction() {
        let extraction = DelimitedExtractor::extract("date,description,amount\n").unwrap();
        assert!(extraction.transactions.is_empty());
        assert!(extraction.skipped.is_empty());
    }

    #[test]
    fn source_order_is_preserved() {
        let text = "date,description,amount\n\
                    2024-01-03,Third,1\n\
                    2024-01-01,First,2\n\
                    2024-01-02,Second,3\n";
        let extraction = DelimitedExtractor::extract(text).unwrap();
        let order: Vec<&str> = extraction
            .transactions
            .iter()
            .map(|t| t.description.as_str())
            .collect();
        assert_eq!(order, vec!["Third", "First", "Second"]);
    }
}
