//! Spend totals grouped by category.

use std::collections::BTreeMap;

use crate::finance::LedgerRow;

/// Category label to total amount, in label order.
///
/// Derived on demand from ledger rows; never persisted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CategorySummary {
    totals: BTreeMap<String, f64>,
}

impl CategorySummary {
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.totals.get(label).copied()
    }

    /// Groups in label order, as drawn by the charts
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.totals.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn total(&self) -> f64 {
        self.totals.values().sum()
    }

    /// Percentage share of each group with a positive total. Groups at or
    /// below zero are left out, and the result is empty when none remain.
    pub fn shares(&self) -> Vec<(&str, f64)> {
        let positive: Vec<(&str, f64)> = self.iter().filter(|(_, v)| *v > 0.0).collect();
        let total: f64 = positive.iter().map(|(_, v)| v).sum();
        if total <= 0.0 {
            return Vec::new();
        }
        positive.into_iter().map(|(k, v)| (k, v / total * 100.0)).collect()
    }

    /// Groups ordered by total, largest first. Ties keep label order.
    pub fn sorted_desc(&self) -> Vec<(String, f64)> {
        let mut out: Vec<(String, f64)> = self.totals.iter().map(|(k, v)| (k.clone(), *v)).collect();
        out.sort_by(|a, b| b.1.total_cmp(&a.1));
        out
    }
}

/// Sum expense amounts per category.
///
/// Income rows are excluded; rows without a direction count as expenses.
/// Rows missing a category or an amount are skipped.
pub fn summarize<R: LedgerRow>(rows: &[R]) -> CategorySummary {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for row in rows.iter().filter(|r| r.is_expense()) {
        let (Some(category), Some(amount)) = (row.category(), row.amount()) else {
            continue;
        };
        *totals.entry(category.to_string()).or_insert(0.0) += amount;
    }
    CategorySummary { totals }
}

/// Report variant of [`summarize`]: sorted by total, descending
pub fn summarize_sorted<R: LedgerRow>(rows: &[R]) -> Vec<(String, f64)> {
    summarize(rows).sorted_desc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finance::{Direction, JournalRecord, TrackerRecord};

    fn rows() -> Vec<TrackerRecord> {
        vec![
            TrackerRecord::new("2025-08-22", "Shawarma", 2500.0, "Food"),
            TrackerRecord::new("2025-08-24", "Outdoor Games", 7000.0, "Entertainment"),
            TrackerRecord::new("2025-08-25", "Pizza slice", 100.0, "Food"),
        ]
    }

    #[test]
    fn test_groups_and_sums() {
        let s = summarize(&rows());
        assert_eq!(s.len(), 2);
        assert_eq!(s.get("Food"), Some(2600.0));
        assert_eq!(s.get("Entertainment"), Some(7000.0));
        assert_eq!(s.total(), 9600.0);
    }

    #[test]
    fn test_chart_order_is_by_label() {
        let s = summarize(&rows());
        let labels: Vec<_> = s.iter().map(|(k, _)| k).collect();
        assert_eq!(labels, vec!["Entertainment", "Food"]);
    }

    #[test]
    fn test_report_order_is_by_total() {
        let mut data = rows();
        data.push(TrackerRecord::new("2025-08-26", "Bus", 9000.0, "Transportation"));
        assert_eq!(
            summarize_sorted(&data),
            vec![
                ("Transportation".to_string(), 9000.0),
                ("Entertainment".to_string(), 7000.0),
                ("Food".to_string(), 2600.0),
            ]
        );
    }

    #[test]
    fn test_ties_keep_label_order() {
        let data = vec![
            TrackerRecord::new("d", "x", 10.0, "Shopping"),
            TrackerRecord::new("d", "y", 10.0, "Food"),
        ];
        let sorted = summarize_sorted(&data);
        assert_eq!(sorted[0].0, "Food");
        assert_eq!(sorted[1].0, "Shopping");
    }

    #[test]
    fn test_income_rows_excluded() {
        let data = vec![
            JournalRecord::new("2025-08-22 19:30", "Food", "Shawarma", 2500.0, Direction::Expense),
            JournalRecord::new("2025-08-25 09:00", "Salary", "August", 90000.0, Direction::Income),
            JournalRecord {
                direction: None,
                ..JournalRecord::new("2025-08-26 10:00", "Food", "Bread", 300.0, Direction::Expense)
            },
        ];
        let s = summarize(&data);
        assert_eq!(s.get("Salary"), None);
        assert_eq!(s.get("Food"), Some(2800.0));
    }

    #[test]
    fn test_rows_missing_fields_skipped() {
        let data = vec![
            TrackerRecord {
                category: None,
                ..TrackerRecord::new("d", "x", 50.0, "")
            },
            TrackerRecord {
                amount: None,
                ..TrackerRecord::new("d", "y", 0.0, "Food")
            },
            TrackerRecord::new("d", "z", 5.0, "Food"),
        ];
        let s = summarize(&data);
        assert_eq!(s.len(), 1);
        assert_eq!(s.get("Food"), Some(5.0));
    }

    #[test]
    fn test_empty_input_is_empty_summary() {
        let s = summarize::<TrackerRecord>(&[]);
        assert!(s.is_empty());
        assert!(s.shares().is_empty());
        assert!(summarize_sorted::<JournalRecord>(&[]).is_empty());
    }

    #[test]
    fn test_summarize_is_pure() {
        let data = rows();
        let before = data.clone();
        let first = summarize(&data);
        let second = summarize(&data);
        assert_eq!(first, second);
        assert_eq!(data, before);
    }

    #[test]
    fn test_shares_sum_to_hundred() {
        let s = summarize(&rows());
        let shares = s.shares();
        let sum: f64 = shares.iter().map(|(_, p)| p).sum();
        assert!((sum - 100.0).abs() < 1e-9);
        let food = shares.iter().find(|(k, _)| *k == "Food").unwrap().1;
        assert!((food - 2600.0 / 9600.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_shares_skip_non_positive_groups() {
        let data = vec![
            TrackerRecord::new("2025-08-22", "Groceries", 100.0, "Food"),
            TrackerRecord::new("2025-08-23", "Refund", -50.0, "Shopping"),
            TrackerRecord::new("2025-08-24", "Free trial", 0.0, "Entertainment"),
        ];
        let s = summarize(&data);
        assert_eq!(s.get("Shopping"), Some(-50.0));
        assert_eq!(s.shares(), vec![("Food", 100.0)]);

        let only_refunds = summarize(&[TrackerRecord::new("d", "Refund", -5.0, "Shopping")]);
        assert!(only_refunds.shares().is_empty());
    }
}
