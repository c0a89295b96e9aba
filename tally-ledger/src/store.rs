//! CSV-backed expense store.
//!
//! The file is the only durable copy: it is read in full on load and
//! rewritten in full on persist. There is no locking and no atomic
//! rename, so a crash mid-write can truncate the file and two processes
//! persisting the same ledger will race.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tally_core::LedgerRow;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// An append-only table of ledger rows bound to its backing file
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger<R> {
    path: PathBuf,
    records: Vec<R>,
}

impl<R> Ledger<R>
where
    R: LedgerRow + Serialize + DeserializeOwned,
{
    /// Load the ledger at `path`.
    ///
    /// A missing file yields an empty ledger. Columns outside the schema
    /// are ignored and schema columns absent from the file load as `None`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            debug!(path = %path.display(), "no ledger file yet, starting empty");
            return Ok(Self::empty(path));
        }

        let read_err = |source| Error::Read {
            path: path.clone(),
            source,
        };

        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&path)
            .map_err(read_err)?;

        let headers = rdr.headers().map_err(read_err)?.clone();
        for col in R::COLUMNS {
            if !headers.iter().any(|h| h == *col) {
                debug!(path = %path.display(), column = col, "column missing, filling with empty values");
            }
        }

        let records = rdr
            .deserialize::<R>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(read_err)?;

        debug!(path = %path.display(), rows = records.len(), "loaded ledger");
        Ok(Self { path, records })
    }

    /// A ledger with no rows that will persist to `path`
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Vec::new(),
        }
    }

    /// Add a row at the end. No deduplication or validation.
    pub fn append(&mut self, record: R) {
        self.records.push(record);
    }

    /// Rewrite the backing file from memory, header included
    pub fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| Error::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let write_err = |source| Error::Write {
            path: self.path.clone(),
            source,
        };

        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&self.path)
            .map_err(write_err)?;

        wtr.write_record(R::COLUMNS).map_err(write_err)?;
        for record in &self.records {
            wtr.serialize(record).map_err(write_err)?;
        }
        wtr.flush().map_err(|source| Error::Io {
            path: self.path.clone(),
            source,
        })?;

        info!(path = %self.path.display(), rows = self.records.len(), "persisted ledger");
        Ok(())
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// The last `n` rows, oldest first
    pub fn tail(&self, n: usize) -> &[R] {
        let start = self.records.len().saturating_sub(n);
        &self.records[start..]
    }

    pub fn columns(&self) -> &'static [&'static str] {
        R::COLUMNS
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
