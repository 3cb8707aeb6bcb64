use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::money::Money;

/// One row or line as an extractor found it. The amount is already
/// numeric and sign-forced; the date is still source-format text.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub date: String,
    pub description: String,
    pub amount: Decimal,
}

/// Date syntax a statement source is allowed to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateGrammar {
    /// `YYYY-MM-DD`, as written by delimited exports.
    Iso,
    /// `DD/MM/YYYY` with a `DD/MM/YY` fallback, as printed on narrative
    /// statements.
    DayMonthYear,
}

/// Why a raw record was dropped instead of becoming a [`Transaction`].
/// A bad record never aborts the batch; the caller records these as
/// diagnostics and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("missing {0} field")]
    MissingField(&'static str),
    #[error("unparseable amount '{0}'")]
    BadAmount(String),
    #[error("date '{0}' does not match the expected format")]
    BadDate(String),
}

/// Canonical transaction every later stage consumes. Only
/// [`Transaction::from_raw`] builds one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Money,
}

impl Transaction {
    /// Validate one raw record: the date must parse under `grammar` and
    /// the description must be non-empty after trimming.
    pub fn from_raw(raw: RawRecord, grammar: DateGrammar) -> Result<Transaction, SkipReason> {
        let date = parse_date(raw.date.trim(), grammar).ok_or(SkipReason::BadDate(raw.date))?;
        let description = raw.description.trim().to_string();
        if description.is_empty() {
            return Err(SkipReason::MissingField("description"));
        }
        Ok(Transaction {
            date,
            description,
            amount: Money::new(raw.amount),
        })
    }
}

fn parse_date(s: &str, grammar: DateGrammar) -> Option<NaiveDate> {
    match grammar {
        DateGrammar::Iso => {
            // chrono's %Y swallows two-digit years, which would read
            // 24-01-05 as year 24. Require the full width.
            let (year, _) = s.split_once('-')?;
            if year.len() != 4 {
                return None;
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
        }
        DateGrammar::DayMonthYear => {
            // Same gating: pick the format by the width of the year part,
            // so 31/08/25 lands in 2025 instead of year 25.
            match s.rsplit('/').next().map(str::len) {
                Some(4) => NaiveDate::parse_from_str(s, "%d/%m/%Y").ok(),
                Some(2) => NaiveDate::parse_from_str(s, "%d/%m/%y").ok(),
                _ => None,
            }
        }
    }
}
