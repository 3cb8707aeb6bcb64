//! Line-pattern extraction for narrative statement text.
//!
//! Grammar v1, tuned to the text layer of HDFC-style account statements.
//! A transaction line is `<date> <narration> <amount>` where the date is
//! `DD/MM/YY` or `DD/MM/YYYY`, the narration is free text, and the
//! amount has optional thousands commas and exactly two decimals:
//!
//! ```text
//! 31/08/25 POS 5129XXXX BLINKIT 323.00 164.32
//! ```
//!
//! The match is anchored nowhere: the first matching span on each line
//! wins, so the trailing running balance (`164.32` above) is never read
//! as the amount. Lines without a span are headers, footers, or balance
//! rows and produce no diagnostic.

use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use kharcha_core::{DateGrammar, RawRecord, SkipReason, Transaction};

use crate::types::{Extraction, SkippedRow};

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(
    re_txn_line,
    r"(\d{2}/\d{2}/\d{2,4})\s+(.*?)\s+(\d{1,3}(?:,\d{3})*\.\d{2})"
);

/// Scans statement text line by line for transaction spans.
pub struct NarrativeExtractor;

impl NarrativeExtractor {
    /// Extract from pre-split pages, preserving page order and in-page
    /// line order. Line numbers in diagnostics run across all pages.
    pub fn extract_pages<'a, I>(pages: I) -> Extraction
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut out = Extraction::default();
        let mut line_no = 0;
        for page in pages {
            for line in page.lines() {
                line_no += 1;
                let Some(caps) = re_txn_line().captures(line) else {
                    continue;
                };

                let amount = match parse_amount(&caps[3]) {
                    Some(value) => value,
                    None => {
                        out.skipped.push(SkippedRow {
                            row: line_no,
                            reason: SkipReason::BadAmount(caps[3].to_string()),
                        });
                        continue;
                    }
                };

                let raw = RawRecord {
                    date: caps[1].to_string(),
                    description: caps[2].to_string(),
                    // Narrative statements list debits unsigned.
                    amount: -amount.abs(),
                };
                match Transaction::from_raw(raw, DateGrammar::DayMonthYear) {
                    Ok(tx) => out.transactions.push(tx),
                    Err(reason) => out.skipped.push(SkippedRow {
                        row: line_no,
                        reason,
                    }),
                }
            }
        }
        out
    }

    /// Extract from a single text blob. Form feeds, the page separator
    /// `pdftotext` emits, split pages.
    pub fn extract_text(text: &str) -> Extraction {
        Self::extract_pages(text.split('\u{c}'))
    }
}

fn parse_amount(s: &str) -> Option<Decimal> {
    Decimal::from_str(&s.replace(',', "")).ok()
}
