use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use std::io::{self, BufRead, Write};
use std::path::Path;
use tally_core::{LedgerRow, TRACKER, TrackerRecord, summarize, summarize_sorted};
use tally_ledger::TrackerLedger;
use tracing::info;

use crate::chart;
use crate::config::Config;
use crate::form::{self, ExpenseForm};
use crate::llm::build_classifier;
use crate::report;

pub const BAR_FILE: &str = "expense_by_category.svg";
pub const PIE_FILE: &str = "category_distribution.svg";

/// Flag values for `tally add`; when description and amount are both
/// missing the form is run on stdin, with `date` and `category` as its
/// defaults
#[derive(Debug, Default)]
pub struct AddArgs {
    pub date: Option<String>,
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<String>,
}

pub fn add(cfg: &Config, csv: &Path, args: AddArgs) -> Result<()> {
    let classifier = build_classifier(&cfg.llm, &TRACKER)?;
    let predict = |d: &str| classifier.classify(d).label.to_string();

    let form = match (args.description, args.amount) {
        (Some(description), Some(amount)) => {
            let date = today_or(args.date.as_deref())?;
            if description.trim().is_empty() {
                bail!("description must not be empty");
            }
            if !amount.is_finite() || amount < 0.0 {
                bail!("amount must be zero or more, got {amount}");
            }
            let category = args
                .category
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| predict(&description));
            ExpenseForm {
                date,
                description: description.trim().to_string(),
                amount,
                category,
            }
        }
        _ => {
            let stdin = io::stdin();
            prompt_form(&mut stdin.lock(), &mut io::stdout(), args.date.as_deref(), args.category.as_deref(), predict)?
        }
    };

    let record = add_expense(csv, &form)?;
    println!(
        "Added: {} - {:.2} ({})",
        form.description,
        form.amount,
        record.category().unwrap_or_default()
    );
    Ok(())
}

/// Run the form with `--date` and `--category` as its defaults
fn prompt_form<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    date: Option<&str>,
    category: Option<&str>,
    predict: impl Fn(&str) -> String,
) -> Result<ExpenseForm> {
    form::run_form(input, out, today_or(date)?, category, predict)
}

/// Append one submitted form to the tracker file and persist it
pub fn add_expense(csv: &Path, form: &ExpenseForm) -> Result<TrackerRecord> {
    let mut ledger = TrackerLedger::load(csv)?;
    let record = TrackerRecord::new(
        form.date.format("%Y-%m-%d").to_string(),
        form.description.clone(),
        form.amount,
        form.category.clone(),
    );
    ledger.append(record.clone());
    ledger.persist()?;
    info!(path = %csv.display(), rows = ledger.len(), "expense added");
    Ok(record)
}

pub fn list(csv: &Path) -> Result<()> {
    let ledger = TrackerLedger::load(csv)?;
    if ledger.is_empty() {
        println!("No expenses recorded yet ({}).", csv.display());
        return Ok(());
    }
    print!(
        "{}",
        report::format_table(ledger.columns(), &report::tracker_rows(ledger.records()))
    );
    Ok(())
}

pub fn summary(csv: &Path) -> Result<()> {
    let ledger = TrackerLedger::load(csv)?;
    let sorted = summarize_sorted(ledger.records());
    if sorted.is_empty() {
        println!("No expenses to summarize.");
        return Ok(());
    }
    println!("Expense summary by category:\n");
    print!("{}", report::format_summary(&sorted));
    Ok(())
}

pub fn chart(csv: &Path, out_dir: &Path) -> Result<()> {
    let ledger = TrackerLedger::load(csv)?;
    let totals = summarize(ledger.records());

    let bar = out_dir.join(BAR_FILE);
    let pie = out_dir.join(PIE_FILE);
    let drew_bar = chart::render_bar(&totals, "Expense Breakdown by Category", &bar)?;
    let drew_pie = chart::render_pie(&totals, "Category Distribution", &pie)?;

    if !drew_bar && !drew_pie {
        println!("Nothing to chart yet.");
        return Ok(());
    }
    for (drew, path) in [(drew_bar, &bar), (drew_pie, &pie)] {
        if drew {
            println!("Chart saved as '{}'.", path.display());
        }
    }
    Ok(())
}

/// Parse a `--date` flag, defaulting to today
pub fn today_or(date: Option<&str>) -> Result<NaiveDate> {
    match date {
        Some(d) => form::parse_date(d)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("invalid --date {d:?}")),
        None => Ok(Local::now().date_naive()),
    }
}
