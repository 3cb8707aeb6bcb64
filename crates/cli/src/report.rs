use std::path::Path;

use kharcha_analysis::{CategoryTotal, SpendingSummary};

/// Plain-text report: a summary block, the top three categories, and
/// the full category breakdown. Fields with nothing to show render as
/// `N/A`, never as an empty cell.
pub fn render_text(summary: &SpendingSummary, source: &Path) -> String {
    let mut lines = vec![
        "Personal Expense Report".to_string(),
        format!("File analyzed: {}", source.display()),
        format!("Generated on: {}", summary.generated.format("%d %b %Y, %I:%M %p")),
        String::new(),
        "Summary:".to_string(),
    ];

    let highest_expense = match &summary.max_expense_desc {
        Some(description) => format!("{} ({})", summary.max_expense, description),
        None => summary.max_expense.to_string(),
    };
    let highest_day = summary
        .highest_spending_day
        .map(|day| day.to_string())
        .unwrap_or_else(|| "N/A".to_string());
    let top_category = summary
        .highest_category
        .map(|category| category.name().to_string())
        .unwrap_or_else(|| "N/A".to_string());

    lines.push(row("Total Spent", &summary.total_spent.to_string()));
    lines.push(row("Transactions", &summary.transaction_count.to_string()));
    lines.push(row("Average Spend", &summary.average_spend.to_string()));
    lines.push(row("Highest Expense", &highest_expense));
    lines.push(row("Highest Spending Day", &highest_day));
    lines.push(row("Top Category", &top_category));

    lines.push(String::new());
    lines.push("Top 3 Categories:".to_string());
    if summary.top_3_categories.is_empty() {
        lines.push("  (none)".to_string());
    }
    for (rank, entry) in summary.top_3_categories.iter().enumerate() {
        lines.push(format!(
            "  {}. {:<20} {}",
            rank + 1,
            entry.category.name(),
            entry.amount
        ));
    }

    lines.push(String::new());
    lines.push("Category Breakdown:".to_string());
    if summary.category_totals.is_empty() {
        lines.push("  (none)".to_string());
    }
    for CategoryTotal { category, amount } in &summary.category_totals {
        lines.push(format!("  {:<23} {}", category.name(), amount));
    }

    lines.join("\n")
}

fn row(label: &str, value: &str) -> String {
    format!("  {:<23} {}", label, value)
}
