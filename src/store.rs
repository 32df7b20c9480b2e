//! Canonical combination store
//!
//! An append-only CSV log of every combination ever scraped, in discovery
//! order. The store is the source of truth: the page cache is rebuilt from
//! it whenever the two disagree. Rows carry the page number so windowed
//! reports can resolve each record to a date through the cache.

use std::collections::BTreeSet;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};
use tracing::{debug, info};

use crate::extract::Combination;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl From<StoreError> for crate::error::Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Io(e) => crate::error::Error::Io(e),
            StoreError::Csv(e) => crate::error::Error::Csv(e),
        }
    }
}

type Result<T> = std::result::Result<T, StoreError>;

/// Append-only record store backed by a CSV file
#[derive(Debug)]
pub struct RecordStore {
    path: PathBuf,
    records: Vec<Combination>,
}

impl RecordStore {
    /// Open a store, reading all existing records into memory.
    ///
    /// A missing file is an empty store (first-ever-run semantics); a
    /// malformed file is an error, not an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if !path.exists() {
            info!("No canonical store at {}; starting empty", path.display());
            return Ok(Self {
                path,
                records: Vec::new(),
            });
        }

        let mut reader = ReaderBuilder::new().from_path(&path)?;
        let records = reader
            .deserialize()
            .collect::<std::result::Result<Vec<Combination>, _>>()?;

        debug!(
            "Loaded {} records from {}",
            records.len(),
            path.display()
        );

        Ok(Self { path, records })
    }

    /// All records, in insertion order
    pub fn records(&self) -> &[Combination] {
        &self.records
    }

    /// Distinct pages that contributed records to the store
    pub fn pages(&self) -> BTreeSet<u32> {
        self.records.iter().map(|r| r.page).collect()
    }

    /// Number of records in the store
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds any records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Path of the backing CSV file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append records to the backing file and to memory.
    ///
    /// The write is append-only; the header row is emitted only when the
    /// file is new or empty.
    pub fn append(&mut self, new_records: &[Combination]) -> Result<()> {
        if new_records.is_empty() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let needs_header = match std::fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == io::ErrorKind::NotFound => true,
            Err(e) => return Err(e.into()),
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = WriterBuilder::new().has_headers(needs_header).from_writer(file);

        for record in new_records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        self.records.extend_from_slice(new_records);
        Ok(())
    }
}
