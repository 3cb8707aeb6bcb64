use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Spending categories. A closed set: every description lands in exactly
/// one, with [`Category::Other`] as the floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Food & Delivery")]
    FoodAndDelivery,
    #[serde(rename = "Shopping")]
    Shopping,
    #[serde(rename = "Subscriptions")]
    Subscriptions,
    #[serde(rename = "Transport")]
    Transport,
    #[serde(rename = "Bills & Utilities")]
    BillsAndUtilities,
    #[serde(rename = "Investments")]
    Investments,
    #[serde(rename = "Bank Transfers")]
    BankTransfers,
    #[serde(rename = "Cash Withdrawal")]
    CashWithdrawal,
    #[serde(rename = "UPI Transfer")]
    UpiTransfer,
    #[serde(rename = "Other")]
    Other,
}

impl Category {
    /// Display name, as printed on reports and written in rule files.
    pub fn name(self) -> &'static str {
        match self {
            Category::FoodAndDelivery => "Food & Delivery",
            Category::Shopping => "Shopping",
            Category::Subscriptions => "Subscriptions",
            Category::Transport => "Transport",
            Category::BillsAndUtilities => "Bills & Utilities",
            Category::Investments => "Investments",
            Category::BankTransfers => "Bank Transfers",
            Category::CashWithdrawal => "Cash Withdrawal",
            Category::UpiTransfer => "UPI Transfer",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Food & Delivery" => Ok(Category::FoodAndDelivery),
            "Shopping" => Ok(Category::Shopping),
            "Subscriptions" => Ok(Category::Subscriptions),
            "Transport" => Ok(Category::Transport),
            "Bills & Utilities" => Ok(Category::BillsAndUtilities),
            "Investments" => Ok(Category::Investments),
            "Bank Transfers" => Ok(Category::BankTransfers),
            "Cash Withdrawal" => Ok(Category::CashWithdrawal),
            "UPI Transfer" => Ok(Category::UpiTransfer),
            "Other" => Ok(Category::Other),
            other => Err(format!("Unknown category: '{other}'")),
        }
    }
}

/// One keyword rule: any listed keyword appearing anywhere in the
/// lowercased description assigns the category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordRule {
    pub category: Category,
    pub keywords: Vec<String>,
}

#[derive(Deserialize)]
struct TableFile {
    rules: Vec<KeywordRule>,
}

/// Ordered keyword rules. Order is part of the contract: rules are tried
/// top to bottom and the first hit wins, so a description matching
/// several rules always resolves the same way.
#[derive(Debug, Clone)]
pub struct KeywordTable {
    rules: Vec<KeywordRule>,
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl KeywordTable {
    /// The built-in ruleset, tuned for Indian consumer statements.
    pub fn builtin() -> Self {
        fn rule(category: Category, keywords: &[&str]) -> KeywordRule {
            KeywordRule {
                category,
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
            }
        }
        KeywordTable {
            rules: vec![
                rule(
                    Category::FoodAndDelivery,
                    &[
                        "swiggy", "zomato", "blinkit", "domino", "pizza", "restaurant", "cafe",
                        "food",
                    ],
                ),
                rule(
                    Category::Shopping,
                    &["amazon", "flipkart", "myntra", "ajio", "meesho"],
                ),
                rule(
                    Category::Subscriptions,
                    &["netflix", "spotify", "prime", "hotstar", "youtube"],
                ),
                rule(
                    Category::Transport,
                    &["uber", "ola", "rapido", "metro", "irctc"],
                ),
                rule(
                    Category::BillsAndUtilities,
                    &["electricity", "water", "broadband", "airtel", "jio", "recharge"],
                ),
                rule(
                    Category::Investments,
                    &["zerodha", "groww", "coin", "mutual", "sip"],
                ),
                rule(Category::BankTransfers, &["imps", "neft", "rtgs"]),
            ],
        }
    }

    /// Load a replacement table from `[[rules]]` entries:
    ///
    /// ```toml
    /// [[rules]]
    /// category = "Food & Delivery"
    /// keywords = ["swiggy", "zomato"]
    /// ```
    ///
    /// Keywords are lowercased on load; matching is case-insensitive
    /// either way.
    pub fn from_toml(toml_content: &str) -> Result<Self, String> {
        let file: TableFile =
            toml::from_str(toml_content).map_err(|e| format!("Failed to parse TOML: {e}"))?;
        let rules = file
            .rules
            .into_iter()
            .map(|mut rule| {
                for keyword in &mut rule.keywords {
                    *keyword = keyword.to_lowercase();
                }
                rule
            })
            .collect();
        Ok(KeywordTable { rules })
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }
}

/// Maps a transaction description to its [`Category`]. Pure: same
/// description plus same table always gives the same answer.
pub struct Categorizer {
    table: KeywordTable,
}

impl Default for Categorizer {
    fn default() -> Self {
        Self::new(KeywordTable::builtin())
    }
}

impl Categorizer {
    pub fn new(table: KeywordTable) -> Self {
        Self { table }
    }

    pub fn categorize(&self, description: &str) -> Category {
        let text = description.to_lowercase();
        for rule in &self.table.rules {
            if rule.keywords.iter().any(|k| text.contains(k.as_str())) {
                return rule.category;
            }
        }
        // Fallbacks run after the whole table so a table hit always wins.
        if text.contains("atm") {
            Category::CashWithdrawal
        } else if text.contains("upi") {
            Category::UpiTransfer
        } else {
            Category::Other
        }
    }

    pub fn table(&self) -> &KeywordTable {
        &self.table
    }
}
