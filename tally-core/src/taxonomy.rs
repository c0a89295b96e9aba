//! Closed category label sets and the prompts that go with them.
//!
//! Each ledger schema has its own taxonomy. The tracker taxonomy carries
//! ordered keyword rules for offline classification; the journal taxonomy
//! has none and falls back to its catch-all label.

use crate::categorizer::{self, KeywordRule};

/// Placeholder substituted with the expense text when building a prompt
const TEXT_SLOT: &str = "{text}";

#[derive(Debug)]
pub struct Taxonomy {
    pub name: &'static str,
    pub labels: &'static [&'static str],
    /// Label used when no rule matches
    pub catch_all: &'static str,
    pub rules: &'static [KeywordRule],
    prompt_template: &'static str,
}

pub const TRACKER: Taxonomy = Taxonomy {
    name: "tracker",
    labels: &[
        "Food",
        "Transportation",
        "Entertainment",
        "Utilities",
        "Shopping",
        "Others",
    ],
    catch_all: "Others",
    rules: &[
        KeywordRule::new("Food", &["food", "restaurant", "shawarma", "pizza"]),
        KeywordRule::new("Transportation", &["uber", "bus", "taxi", "transport"]),
        KeywordRule::new("Entertainment", &["movie", "game", "netflix", "music"]),
        KeywordRule::new("Utilities", &["electricity", "water", "internet", "bill"]),
        KeywordRule::new("Shopping", &["mall", "clothes", "shop", "buy"]),
    ],
    prompt_template: "You are a financial assistant. Categorize this expense into one of:\n\
['Food', 'Transportation', 'Entertainment', 'Utilities', 'Shopping', 'Others'].\n\
\n\
Expense: \"{text}\"\n\
Just return the category name.",
};

pub const JOURNAL: Taxonomy = Taxonomy {
    name: "journal",
    labels: &[
        "Food",
        "Transport",
        "Entertainment",
        "Utilities",
        "Subscriptions",
        "Health",
        "Education",
        "Shopping",
        "Others",
    ],
    catch_all: "Others",
    rules: &[],
    prompt_template: "Categorize the following expense note into one of these categories:\n\
Food, Transport, Entertainment, Utilities, Subscriptions, Health, Education, Shopping, Others.\n\
Note: {text}",
};

impl Taxonomy {
    /// Instruction sent to the completion service for `text`
    pub fn prompt(&self, text: &str) -> String {
        self.prompt_template.replace(TEXT_SLOT, text)
    }

    /// Map a model reply onto a label of this taxonomy.
    ///
    /// Surrounding whitespace, quotes and a trailing period are ignored and
    /// the comparison is case-insensitive. Anything else is rejected.
    pub fn canonical(&self, reply: &str) -> Option<&'static str> {
        let cleaned = reply
            .trim_matches(|c: char| c.is_whitespace() || matches!(c, '"' | '\'' | '`' | '.'));
        self.labels
            .iter()
            .copied()
            .find(|label| label.eq_ignore_ascii_case(cleaned))
    }

    /// Offline label for `description` using the ordered keyword rules
    pub fn fallback(&self, description: &str) -> &'static str {
        categorizer::categorize(description, self.rules).unwrap_or(self.catch_all)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(&label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_text_and_labels() {
        for tax in [&TRACKER, &JOURNAL] {
            let p = tax.prompt("Shawarma at the corner");
            assert!(p.contains("Shawarma at the corner"));
            assert!(!p.contains(TEXT_SLOT));
            for label in tax.labels {
                assert!(p.contains(label), "{} prompt is missing {label}", tax.name);
            }
        }
    }

    #[test]
    fn test_tracker_prompt_quotes_expense() {
        let p = TRACKER.prompt("Pizza");
        assert!(p.contains("Expense: \"Pizza\""));
        assert!(p.ends_with("Just return the category name."));
    }

    #[test]
    fn test_canonical_accepts_members() {
        assert_eq!(TRACKER.canonical("Food"), Some("Food"));
        assert_eq!(TRACKER.canonical("  transportation \n"), Some("Transportation"));
        assert_eq!(TRACKER.canonical("\"Shopping\""), Some("Shopping"));
        assert_eq!(TRACKER.canonical("Utilities."), Some("Utilities"));
        assert_eq!(JOURNAL.canonical("subscriptions"), Some("Subscriptions"));
    }

    #[test]
    fn test_canonical_rejects_non_members() {
        assert_eq!(TRACKER.canonical("Groceries"), None);
        assert_eq!(TRACKER.canonical("The category is Food"), None);
        assert_eq!(TRACKER.canonical(""), None);
        // Label sets differ between schemas
        assert_eq!(TRACKER.canonical("Transport"), None);
        assert_eq!(JOURNAL.canonical("Transportation"), None);
    }

    #[test]
    fn test_rule_labels_belong_to_taxonomy() {
        for tax in [&TRACKER, &JOURNAL] {
            assert!(tax.contains(tax.catch_all));
            for rule in tax.rules {
                assert!(tax.contains(rule.label), "{} not in {}", rule.label, tax.name);
            }
        }
    }

    #[test]
    fn test_journal_fallback_is_catch_all() {
        assert_eq!(JOURNAL.fallback("Pizza with friends"), "Others");
        assert_eq!(TRACKER.fallback("Pizza with friends"), "Food");
    }
}
