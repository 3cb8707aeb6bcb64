use kharcha_core::{SkipReason, Transaction};

/// Everything one extraction produced: transactions in source order plus
/// a diagnostic for every row or line that was dropped on the way.
#[derive(Debug, Default)]
pub struct Extraction {
    pub transactions: Vec<Transaction>,
    pub skipped: Vec<SkippedRow>,
}

/// One dropped row. `row` is 1-based: the data-row number for delimited
/// input (header excluded), the global line number for narrative input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub row: usize,
    pub reason: SkipReason,
}
