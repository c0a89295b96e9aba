//! tally-core: expense record types, category taxonomies and aggregation

pub mod finance;
pub mod summary;
pub mod taxonomy;

pub use finance::{Direction, JournalRecord, LedgerRow, TrackerRecord};
pub use summary::{CategorySummary, summarize, summarize_sorted};
pub use taxonomy::{JOURNAL, TRACKER, Taxonomy};

/// Keyword matching used when no remote model is available
pub mod categorizer {
    /// Assigns `label` when the description contains any of `keywords`
    #[derive(Debug, Clone, Copy)]
    pub struct KeywordRule {
        pub label: &'static str,
        pub keywords: &'static [&'static str],
    }

    impl KeywordRule {
        pub const fn new(label: &'static str, keywords: &'static [&'static str]) -> Self {
            Self { label, keywords }
        }

        pub fn matches(&self, lowered: &str) -> bool {
            self.keywords.iter().any(|k| lowered.contains(k))
        }
    }

    /// Categorize a description with ordered substring rules.
    ///
    /// Matching is case-insensitive and the first matching rule wins.
    /// Returns `None` when no rule matches.
    pub fn categorize(description: &str, rules: &[KeywordRule]) -> Option<&'static str> {
        let desc = description.to_lowercase();
        rules.iter().find(|r| r.matches(&desc)).map(|r| r.label)
    }

}

pub use categorizer::{KeywordRule, categorize};
