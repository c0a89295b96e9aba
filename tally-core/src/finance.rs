//! Expense record types for the two ledger schemas

use serde::{Deserialize, Serialize};

/// Whether a journal row is money going out or coming in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Expense,
    Income,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Expense => "Expense",
            Direction::Income => "Income",
        }
    }
}

/// A row of a ledger file.
///
/// Every column is optional: a column missing from the file, or an empty
/// cell, loads as `None`. `COLUMNS` is the header written on persist and
/// must list the struct fields in declaration order.
pub trait LedgerRow: Clone {
    const COLUMNS: &'static [&'static str];

    fn category(&self) -> Option<&str>;

    fn amount(&self) -> Option<f64>;

    /// Free text the classifier reads (description or note)
    fn text(&self) -> Option<&str>;

    /// `None` for schemas without a direction column
    fn direction(&self) -> Option<Direction> {
        None
    }

    /// Copy of this row with the category replaced
    fn with_category(&self, label: &str) -> Self;

    /// Rows with no direction count as expenses
    fn is_expense(&self) -> bool {
        self.direction().unwrap_or_default() == Direction::Expense
    }
}

/// Interactive tracker row: `Date, Description, Amount, Category`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TrackerRecord {
    #[serde(rename = "Date", default)]
    pub date: Option<String>,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "Amount", default)]
    pub amount: Option<f64>,
    #[serde(rename = "Category", default)]
    pub category: Option<String>,
}

impl TrackerRecord {
    pub fn new(
        date: impl Into<String>,
        description: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
    ) -> Self {
        Self {
            date: Some(date.into()),
            description: Some(description.into()),
            amount: Some(amount),
            category: Some(category.into()),
        }
    }
}

impl LedgerRow for TrackerRecord {
    const COLUMNS: &'static [&'static str] = &["Date", "Description", "Amount", "Category"];

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    fn amount(&self) -> Option<f64> {
        self.amount
    }

    fn text(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn with_category(&self, label: &str) -> Self {
        Self {
            category: Some(label.to_string()),
            ..self.clone()
        }
    }
}

/// Batch journal row: `Date, Category, Note, Amount, Income/Expense`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct JournalRecord {
    /// Date or timestamp, kept verbatim (e.g. `2025-08-22 19:30`)
    #[serde(rename = "Date", default)]
    pub date: Option<String>,
    #[serde(rename = "Category", default)]
    pub category: Option<String>,
    #[serde(rename = "Note", default)]
    pub note: Option<String>,
    #[serde(rename = "Amount", default)]
    pub amount: Option<f64>,
    #[serde(rename = "Income/Expense", default)]
    pub direction: Option<Direction>,
}

impl JournalRecord {
    pub fn new(
        date: impl Into<String>,
        category: impl Into<String>,
        note: impl Into<String>,
        amount: f64,
        direction: Direction,
    ) -> Self {
        Self {
            date: Some(date.into()),
            category: Some(category.into()),
            note: Some(note.into()),
            amount: Some(amount),
            direction: Some(direction),
        }
    }
}

impl LedgerRow for JournalRecord {
    const COLUMNS: &'static [&'static str] = &["Date", "Category", "Note", "Amount", "Income/Expense"];

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    fn amount(&self) -> Option<f64> {
        self.amount
    }

    fn text(&self) -> Option<&str> {
        self.note.as_deref()
    }

    fn direction(&self) -> Option<Direction> {
        self.direction
    }

    fn with_category(&self, label: &str) -> Self {
        Self {
            category: Some(label.to_string()),
            ..self.clone()
        }
    }
}
