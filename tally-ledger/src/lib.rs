//! tally-ledger: CSV expense store and category classifier

pub mod classifier;
pub mod error;
pub mod store;

pub use classifier::{Classification, Classifier, CompletionBackend, Source};
pub use error::{Error, Result};
pub use store::Ledger;

/// Tracker ledger: `Date, Description, Amount, Category`
pub type TrackerLedger = Ledger<tally_core::TrackerRecord>;

/// Journal ledger: `Date, Category, Note, Amount, Income/Expense`
pub type JournalLedger = Ledger<tally_core::JournalRecord>;
