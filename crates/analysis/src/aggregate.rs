use chrono::{DateTime, Local, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use kharcha_core::{Money, Transaction};

use crate::categorize::{Categorizer, Category};

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("Could not extract any transactions. Is the file a valid statement export?")]
    NoTransactions,
}

/// Insertion-ordered running totals.
///
/// A plain vec instead of a hash map on purpose: keys keep their
/// first-seen position, [`RunningTotals::max_entry`] returns the first
/// key that reached the maximum, and the descending sort is stable. Tie
/// breaks are therefore reproducible run to run.
#[derive(Debug)]
struct RunningTotals<K> {
    entries: Vec<(K, Money)>,
}

impl<K: Copy + PartialEq> RunningTotals<K> {
    fn new() -> Self {
        Self { entries: Vec::new() }
    }

    fn add(&mut self, key: K, amount: Money) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, total)) => *total += amount,
            None => self.entries.push((key, amount)),
        }
    }

    /// First entry holding the maximum total.
    fn max_entry(&self) -> Option<(K, Money)> {
        let mut best: Option<(K, Money)> = None;
        for &(key, total) in &self.entries {
            let beats = match best {
                None => true,
                Some((_, best_total)) => total > best_total,
            };
            if beats {
                best = Some((key, total));
            }
        }
        best
    }

    /// Largest total first; equal totals keep first-seen order.
    fn sorted_desc(&self) -> Vec<(K, Money)> {
        let mut entries = self.entries.clone();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }

    fn into_entries(self) -> Vec<(K, Money)> {
        self.entries
    }
}

/// One category's spend, as reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub amount: Money,
}

/// The single artifact of a pipeline run. All money fields are rounded
/// to two places; intermediate accumulation is exact.
#[derive(Debug, Clone, Serialize)]
pub struct SpendingSummary {
    pub total_spent: Money,
    pub transaction_count: usize,
    pub average_spend: Money,
    pub max_expense: Money,
    pub max_expense_desc: Option<String>,
    pub highest_category: Option<Category>,
    pub top_3_categories: Vec<CategoryTotal>,
    pub highest_spending_day: Option<NaiveDate>,
    pub category_totals: Vec<CategoryTotal>,
    pub generated: DateTime<Local>,
}

/// Folds canonical transactions into a [`SpendingSummary`].
pub struct Aggregator {
    categorizer: Categorizer,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(Categorizer::default())
    }
}

impl Aggregator {
    pub fn new(categorizer: Categorizer) -> Self {
        Self { categorizer }
    }

    /// Single pass over the batch. Only strictly negative amounts count
    /// as expenses; extractors emit nothing else, so the filter guards
    /// against hand-built input. An empty batch is the caller's signal
    /// that extraction found nothing usable.
    pub fn aggregate(
        &self,
        transactions: &[Transaction],
    ) -> Result<SpendingSummary, AggregateError> {
        if transactions.is_empty() {
            return Err(AggregateError::NoTransactions);
        }

        let mut total_spent = Money::zero();
        let mut transaction_count = 0usize;
        let mut max_expense = Money::zero();
        let mut max_expense_desc: Option<String> = None;
        let mut category_totals = RunningTotals::new();
        let mut daily_totals = RunningTotals::new();

        for tx in transactions {
            if !tx.amount.is_negative() {
                continue;
            }
            let spend = tx.amount.abs();

            total_spent += spend;
            transaction_count += 1;
            category_totals.add(self.categorizer.categorize(&tx.description), spend);
            daily_totals.add(tx.date, spend);

            if spend > max_expense {
                max_expense = spend;
                max_expense_desc = Some(tx.description.clone());
            }
        }

        let average_spend = if transaction_count == 0 {
            Money::zero()
        } else {
            Money::new(total_spent.as_decimal() / Decimal::from(transaction_count as u64))
        };

        let highest_category = category_totals.max_entry().map(|(category, _)| category);
        let highest_spending_day = daily_totals.max_entry().map(|(day, _)| day);

        let mut top_3_categories = category_totals.sorted_desc();
        top_3_categories.truncate(3);

        Ok(SpendingSummary {
            total_spent: total_spent.rounded(),
            transaction_count,
            average_spend: average_spend.rounded(),
            max_expense: max_expense.rounded(),
            max_expense_desc,
            highest_category,
            top_3_categories: as_category_totals(top_3_categories),
            highest_spending_day,
            category_totals: as_category_totals(category_totals.into_entries()),
            generated: Local::now(),
        })
    }
}

fn as_category_totals(entries: Vec<(Category, Money)>) -> Vec<CategoryTotal> {
    entries
        .into_iter()
        .map(|(category, amount)| CategoryTotal {
            category,
            amount: amount.rounded(),
        })
        .collect()
}
