use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use kharcha_analysis::{Aggregator, Categorizer, KeywordTable};

mod report;

#[derive(Parser)]
#[command(name = "kharcha", version, about = "Bank statement expense analyzer")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract, categorize, and summarize one statement file
    Analyze {
        /// Statement file: .csv/.tsv export, or .txt statement text
        file: PathBuf,

        /// Keyword table (TOML) replacing the built-in categories
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Emit the summary as JSON instead of the text report
        #[arg(long)]
        json: bool,
    },

    /// Print the active keyword table
    Categories {
        /// Keyword table (TOML) replacing the built-in categories
        #[arg(long)]
        rules: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr so `--json` output stays parseable.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Analyze { file, rules, json } => analyze(&file, rules.as_deref(), json),
        Command::Categories { rules } => categories(rules.as_deref()),
    }
}

fn analyze(file: &Path, rules: Option<&Path>, json: bool) -> Result<()> {
    let extraction = kharcha_extract::extract_file(file)
        .with_context(|| format!("could not extract {}", file.display()))?;

    for skip in &extraction.skipped {
        tracing::warn!(row = skip.row, "skipped: {}", skip.reason);
    }
    tracing::info!(
        transactions = extraction.transactions.len(),
        skipped = extraction.skipped.len(),
        "extraction finished"
    );

    let aggregator = Aggregator::new(Categorizer::new(load_table(rules)?));
    let summary = aggregator.aggregate(&extraction.transactions)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", report::render_text(&summary, file));
    }
    Ok(())
}

fn categories(rules: Option<&Path>) -> Result<()> {
    let table = load_table(rules)?;
    for rule in table.rules() {
        println!("{}: {}", rule.category, rule.keywords.join(", "));
    }
    println!("Cash Withdrawal: any description containing \"atm\"");
    println!("UPI Transfer: any remaining description containing \"upi\"");
    println!("Other: everything else");
    Ok(())
}

fn load_table(rules: Option<&Path>) -> Result<KeywordTable> {
    match rules {
        None => Ok(KeywordTable::builtin()),
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("could not read {}", path.display()))?;
            KeywordTable::from_toml(&content).map_err(anyhow::Error::msg)
        }
    }
}
