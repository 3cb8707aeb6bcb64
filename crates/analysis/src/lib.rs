pub mod aggregate;
pub mod categorize;

pub use aggregate::{AggregateError, Aggregator, CategoryTotal, SpendingSummary};
pub use categorize::{Categorizer, Category, KeywordRule, KeywordTable};
