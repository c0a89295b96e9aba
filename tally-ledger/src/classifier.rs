//! Category inference for expense descriptions.
//!
//! A remote completion backend is asked first. Its reply must name a label
//! of the taxonomy; a failed call or an unrecognised reply falls back to the
//! taxonomy's keyword rules. Classification itself never fails.

use tally_core::{LedgerRow, Taxonomy};
use tracing::{debug, warn};

use crate::error::Result;

/// A text-completion service that answers a single prompt.
///
/// Implementations make one request per call with deterministic decoding
/// and return the first choice's text.
pub trait CompletionBackend: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String>;

    /// Model identifier, for logging
    fn model(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Remote,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub label: &'static str,
    pub source: Source,
}

pub struct Classifier {
    taxonomy: &'static Taxonomy,
    backend: Option<Box<dyn CompletionBackend>>,
}

impl Classifier {
    pub fn new(taxonomy: &'static Taxonomy, backend: Box<dyn CompletionBackend>) -> Self {
        Self {
            taxonomy,
            backend: Some(backend),
        }
    }

    /// Keyword rules only; used when no API key is configured
    pub fn offline(taxonomy: &'static Taxonomy) -> Self {
        Self {
            taxonomy,
            backend: None,
        }
    }

    pub fn taxonomy(&self) -> &'static Taxonomy {
        self.taxonomy
    }

    pub fn is_offline(&self) -> bool {
        self.backend.is_none()
    }

    /// Pick a label for `description`
    pub fn classify(&self, description: &str) -> Classification {
        if let Some(label) = self.ask_remote(description) {
            return Classification {
                label,
                source: Source::Remote,
            };
        }
        let label = self.taxonomy.fallback(description);
        debug!(taxonomy = self.taxonomy.name, label, "keyword fallback");
        Classification {
            label,
            source: Source::Fallback,
        }
    }

    fn ask_remote(&self, description: &str) -> Option<&'static str> {
        let backend = self.backend.as_ref()?;
        if description.trim().is_empty() {
            return None;
        }

        let reply = match backend.complete(&self.taxonomy.prompt(description)) {
            Ok(reply) => reply,
            Err(e) => {
                warn!(model = backend.model(), "classification request failed: {e}");
                return None;
            }
        };

        match self.taxonomy.canonical(&reply) {
            Some(label) => {
                debug!(model = backend.model(), label, "remote classification");
                Some(label)
            }
            None => {
                warn!(
                    model = backend.model(),
                    reply = reply.trim(),
                    "reply is not a {} category",
                    self.taxonomy.name
                );
                None
            }
        }
    }

    /// Copy of `rows` where every row without a category is classified
    /// from its text. Rows that already carry a category are left as is.
    pub fn categorize_missing<R: LedgerRow>(&self, rows: &[R]) -> Vec<R> {
        rows.iter()
            .map(|row| {
                let has_category = row.category().is_some_and(|c| !c.trim().is_empty());
                if has_category {
                    return row.clone();
                }
                let label = self.classify(row.text().unwrap_or_default()).label;
                row.with_category(label)
            })
            .collect()
    }
}
