use anyhow::{Result, bail};
use clap::{Subcommand, ValueEnum};
use std::path::Path;
use tally_core::{Direction, JOURNAL, JournalRecord, summarize, summarize_sorted};
use tally_ledger::{Classifier, JournalLedger};
use tracing::info;

use crate::chart;
use crate::config::Config;
use crate::llm::build_classifier;
use crate::report;

pub const PIE_FILE: &str = "expense_distribution.svg";

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Kind {
    Expense,
    Income,
}

impl From<Kind> for Direction {
    fn from(k: Kind) -> Self {
        match k {
            Kind::Expense => Direction::Expense,
            Kind::Income => Direction::Income,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum JournalCommand {
    /// Append an entry to the journal
    Add {
        /// Date or timestamp, stored as given (e.g. "2025-08-22 19:30")
        #[arg(long)]
        date: String,

        /// Leave empty to have `journal categorize` fill it in
        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        note: String,

        #[arg(long)]
        amount: f64,

        #[arg(long, value_enum, default_value_t = Kind::Expense)]
        kind: Kind,
    },

    /// Show the latest entries
    View {
        #[arg(short, long, default_value_t = 10)]
        n: usize,
    },

    /// Expense totals by category, largest first
    Summary,

    /// Predict categories for entries that have none (not written back)
    Categorize {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Pie chart of expense share by category
    Chart {
        /// Output directory (default: config ledger.chart_dir)
        #[arg(long)]
        out: Option<std::path::PathBuf>,
    },
}

pub fn run(cfg: &Config, csv: &Path, cmd: JournalCommand) -> Result<()> {
    match cmd {
        JournalCommand::Add {
            date,
            category,
            note,
            amount,
            kind,
        } => {
            let record = add_entry(csv, date, category, note, amount, kind.into())?;
            println!(
                "Added: {} - {:.2} ({}) on {} as {}",
                record.note.as_deref().unwrap_or_default(),
                amount,
                record.category.as_deref().unwrap_or("uncategorized"),
                record.date.as_deref().unwrap_or_default(),
                kind.as_direction_str(),
            );
            Ok(())
        }
        JournalCommand::View { n } => view(csv, n),
        JournalCommand::Summary => summary(csv),
        JournalCommand::Categorize { limit } => {
            let classifier = build_classifier(&cfg.llm, &JOURNAL)?;
            categorize(csv, &classifier, limit)
        }
        JournalCommand::Chart { out } => {
            let classifier = build_classifier(&cfg.llm, &JOURNAL)?;
            let dir = out.unwrap_or_else(|| cfg.ledger.chart_dir.clone());
            chart(csv, &classifier, &dir)
        }
    }
}

impl Kind {
    fn as_direction_str(self) -> &'static str {
        Direction::from(self).as_str()
    }
}

pub fn add_entry(
    csv: &Path,
    date: String,
    category: Option<String>,
    note: String,
    amount: f64,
    direction: Direction,
) -> Result<JournalRecord> {
    if !amount.is_finite() || amount < 0.0 {
        bail!("amount must be zero or more, got {amount}");
    }
    let mut ledger = JournalLedger::load(csv)?;
    let record = JournalRecord {
        date: Some(date),
        category: category.filter(|c| !c.trim().is_empty()),
        note: Some(note),
        amount: Some(amount),
        direction: Some(direction),
    };
    ledger.append(record.clone());
    ledger.persist()?;
    info!(path = %csv.display(), rows = ledger.len(), "journal entry added");
    Ok(record)
}

fn view(csv: &Path, n: usize) -> Result<()> {
    let ledger = JournalLedger::load(csv)?;
    if ledger.is_empty() {
        println!("Journal is empty ({}).", csv.display());
        return Ok(());
    }
    println!("Recent expenses:\n");
    print!(
        "{}",
        report::format_table(ledger.columns(), &report::journal_rows(ledger.tail(n)))
    );
    Ok(())
}

fn summary(csv: &Path) -> Result<()> {
    let ledger = JournalLedger::load(csv)?;
    let sorted = summarize_sorted(ledger.records());
    if sorted.is_empty() {
        println!("No expenses to summarize.");
        return Ok(());
    }
    println!("Expense summary by category:\n");
    print!("{}", report::format_summary(&sorted));
    Ok(())
}

fn categorize(csv: &Path, classifier: &Classifier, limit: usize) -> Result<()> {
    let ledger = JournalLedger::load(csv)?;
    let filled = classifier.categorize_missing(ledger.records());
    let rows: Vec<Vec<String>> = filled
        .iter()
        .take(limit)
        .map(|r| {
            vec![
                r.note.clone().unwrap_or_default(),
                r.category.clone().unwrap_or_default(),
            ]
        })
        .collect();
    println!("Auto-categorization complete.\n");
    print!("{}", report::format_table(&["Note", "Category"], &rows));
    Ok(())
}

/// Categorize the gaps, then draw a single pie of expense share
pub fn chart(csv: &Path, classifier: &Classifier, out_dir: &Path) -> Result<()> {
    let ledger = JournalLedger::load(csv)?;
    let filled = classifier.categorize_missing(ledger.records());
    let path = out_dir.join(PIE_FILE);
    if chart::render_pie(&summarize(&filled), "Expense Distribution by Category", &path)? {
        println!("Expense distribution chart saved as '{}'.", path.display());
    } else {
        println!("Nothing to chart yet.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tally_core::LedgerRow;
    use tempfile::tempdir;

    #[test]
    fn test_add_entry_round_trips() {
        let dir = tempdir().unwrap();
        let csv = dir.path().join("datasets").join("expense_data_1.csv");

        add_entry(&csv, "2025-08-22 19:30".into(), Some("Food".into()), "Shawarma".into(), 2500.0, Direction::Expense)
            .unwrap();
        let uncategorized =
            add_entry(&csv, "2025-08-23 08:00".into(), Some("  ".into()), "Netflix".into(), 4500.0, Direction::Expense)
                .unwrap();
        assert_eq!(uncategorized.category(), None);

        let ledger = JournalLedger::load(&csv).unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.records()[1], uncategorized);

        let text = fs::read_to_string(&csv).unwrap();
        assert!(text.starts_with("Date,Category,Note,Amount,Income/Expense\n"));
        assert!(text.contains("2025-08-22 19:30,Food,Shawarma,2500.0,Expense"));
    }

    #[test]
    fn test_chart_uses_expenses_only() {
        let dir = tempdir().unwrap();
        let csv = dir.path().join("j.csv");
        add_entry(&csv, "2025-08-01".into(), Some("Salary".into()), "Pay".into(), 90000.0, Direction::Income).unwrap();
        add_entry(&csv, "2025-08-22".into(), None, "Shawarma".into(), 2500.0, Direction::Expense).unwrap();

        let classifier = Classifier::offline(&JOURNAL);
        chart(&csv, &classifier, dir.path()).unwrap();

        let svg = fs::read_to_string(dir.path().join(PIE_FILE)).unwrap();
        assert!(svg.contains("Others"));
        assert!(svg.contains("100.0%"));
        assert!(!svg.contains("Salary"));
    }

    #[test]
    fn test_chart_with_only_income_draws_nothing() {
        let dir = tempdir().unwrap();
        let csv = dir.path().join("j.csv");
        add_entry(&csv, "2025-08-01".into(), Some("Salary".into()), "Pay".into(), 90000.0, Direction::Income).unwrap();

        chart(&csv, &Classifier::offline(&JOURNAL), dir.path()).unwrap();
        assert!(!dir.path().join(PIE_FILE).exists());
    }

    #[test]
    fn test_negative_amount_rejected() {
        let dir = tempdir().unwrap();
        let csv = dir.path().join("j.csv");
        add_entry(&csv, "2025-08-22".into(), Some("Food".into()), "Groceries".into(), 100.0, Direction::Expense)
            .unwrap();

        let err = add_entry(&csv, "2025-08-23".into(), Some("Food".into()), "refund".into(), -50.0, Direction::Expense)
            .unwrap_err();
        assert!(err.to_string().contains("zero or more"));
        assert!(add_entry(&csv, "2025-08-23".into(), None, "x".into(), f64::NAN, Direction::Expense).is_err());
        assert_eq!(JournalLedger::load(&csv).unwrap().len(), 1);
    }

    #[test]
    fn test_chart_ignores_negative_rows_from_file() {
        let dir = tempdir().unwrap();
        let csv = dir.path().join("j.csv");
        fs::write(
            &csv,
            "Date,Category,Note,Amount,Income/Expense\n\
             2025-08-22,Food,Groceries,100,Expense\n\
             2025-08-23,Shopping,refund,-50,Expense\n",
        )
        .unwrap();

        chart(&csv, &Classifier::offline(&JOURNAL), dir.path()).unwrap();
        let svg = fs::read_to_string(dir.path().join(PIE_FILE)).unwrap();
        assert!(svg.contains("100.0%"));
        assert!(!svg.contains("200.0%"));
        assert!(!svg.contains("-100.0%"));
        assert!(!svg.contains("Shopping"));
    }
}
