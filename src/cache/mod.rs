//! Page cache
//!
//! A persisted mapping from thread page number to the last post date seen
//! on that page, plus metadata: the fixed start page and the list of fully
//! scraped pages. The cache decides which pages the incremental scrape
//! still has to fetch; the canonical store remains the ground truth and
//! wins every disagreement (see [`reconcile`]).
//!
//! The cache is an explicit value passed through each pipeline stage
//! (load, reconcile, scrape, persist) so tests can inject arbitrary states.

mod reconcile;

pub use reconcile::{reconcile, DateProbe};

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use tokio::fs;
use tracing::{debug, warn};

/// First page of the year-to-date range, fixed at first discovery
pub const DEFAULT_START_PAGE: u32 = 22;

/// Cache file key holding the start page
const METADATA_START_PAGE: &str = "_metadata_ytd_start_page";

/// Cache file key holding the ordered scraped-pages list
const METADATA_SCRAPED_PAGES: &str = "_metadata_ytd_scraped_pages";

/// Error type for cache persistence
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<CacheError> for crate::error::Error {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::Io(e) => crate::error::Error::Io(e),
            CacheError::Json(e) => crate::error::Error::Json(e),
        }
    }
}

/// Scrape-state cache: which pages are done, and the last post date seen
/// on each.
///
/// A page can be marked scraped with an unknown date (`None`); such pages
/// are skipped by the incremental scrape but excluded from windowed
/// reports until a date is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCache {
    start_page: u32,
    dates: BTreeMap<u32, Option<DateTime<Utc>>>,
}

impl Default for PageCache {
    fn default() -> Self {
        Self::new(DEFAULT_START_PAGE)
    }
}

impl PageCache {
    /// Create an empty cache with the given start page
    pub fn new(start_page: u32) -> Self {
        Self {
            start_page,
            dates: BTreeMap::new(),
        }
    }

    /// The fixed first page of the tracked range
    pub fn start_page(&self) -> u32 {
        self.start_page
    }

    /// Whether a page has already been fully scraped
    pub fn is_scraped(&self, page: u32) -> bool {
        self.dates.contains_key(&page)
    }

    /// Mark a page scraped with its last post date.
    ///
    /// Idempotent: a later date overwrites an earlier one, but an unknown
    /// date never erases a known one.
    pub fn record_scraped(&mut self, page: u32, last_post_date: Option<DateTime<Utc>>) {
        match (self.dates.get(&page).copied().flatten(), last_post_date) {
            (Some(existing), Some(new)) if new < existing => {}
            (Some(_), None) => {}
            (_, date) => {
                self.dates.insert(page, date);
            }
        }
    }

    /// The cached last post date for a page, if known
    pub fn date_for(&self, page: u32) -> Option<DateTime<Utc>> {
        self.dates.get(&page).copied().flatten()
    }

    /// Set of pages marked scraped
    pub fn scraped_pages(&self) -> BTreeSet<u32> {
        self.dates.keys().copied().collect()
    }

    /// Highest page marked scraped, if any
    pub fn max_scraped_page(&self) -> Option<u32> {
        self.dates.keys().next_back().copied()
    }

    /// First page the next scrape run should fetch
    pub fn resume_page(&self) -> u32 {
        match self.max_scraped_page() {
            Some(max) => max + 1,
            None => self.start_page,
        }
    }

    /// Number of pages marked scraped
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether any page is marked scraped
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Load a cache from disk.
    ///
    /// Never fails: a missing or malformed file yields an empty cache and
    /// defers correctness to reconciliation against the canonical store.
    pub async fn load(path: &Path) -> Self {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No cache file at {}; starting empty", path.display());
                return Self::default();
            }
            Err(e) => {
                warn!("Could not read cache file {}: {}", path.display(), e);
                return Self::default();
            }
        };

        let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&content) else {
            warn!(
                "Cache file {} is malformed; starting empty",
                path.display()
            );
            return Self::default();
        };

        Self::from_map(&map)
    }

    fn from_map(map: &Map<String, Value>) -> Self {
        let start_page = map
            .get(METADATA_START_PAGE)
            .and_then(Value::as_u64)
            .map(|n| n as u32)
            .unwrap_or(DEFAULT_START_PAGE);

        let mut cache = Self::new(start_page);

        for (key, value) in map {
            let Ok(page) = key.parse::<u32>() else {
                continue;
            };
            let date = match value {
                Value::Null => None,
                Value::String(s) => match DateTime::parse_from_rfc3339(s) {
                    Ok(dt) => Some(dt.with_timezone(&Utc)),
                    Err(e) => {
                        warn!("Unparseable date for cached page {}: {}", page, e);
                        None
                    }
                },
                other => {
                    warn!("Unexpected cache value for page {}: {}", page, other);
                    None
                }
            };
            cache.dates.insert(page, date);
        }

        // Pages listed in the metadata but missing a date entry were
        // scraped with their date since lost; keep them with the unknown
        // sentinel so they are not re-fetched.
        if let Some(listed) = map.get(METADATA_SCRAPED_PAGES).and_then(Value::as_array) {
            for page in listed.iter().filter_map(Value::as_u64) {
                cache.dates.entry(page as u32).or_insert(None);
            }
        }

        cache
    }

    /// Persist the cache to disk as a single JSON object: page number keys
    /// mapping to ISO-8601 timestamps (or null when the date is unknown),
    /// plus the two metadata keys.
    pub async fn persist(&self, path: &Path) -> Result<(), CacheError> {
        let mut map = Map::new();
        for (page, date) in &self.dates {
            let value = match date {
                Some(d) => Value::String(d.to_rfc3339()),
                None => Value::Null,
            };
            map.insert(page.to_string(), value);
        }
        map.insert(METADATA_START_PAGE.to_string(), json!(self.start_page));
        map.insert(
            METADATA_SCRAPED_PAGES.to_string(),
            json!(self.scraped_pages().into_iter().collect::<Vec<_>>()),
        );

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(&Value::Object(map))?;
        fs::write(path, content).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_record_and_query() {
        let mut cache = PageCache::new(22);
        assert!(!cache.is_scraped(22));

        cache.record_scraped(22, Some(date(3)));
        cache.record_scraped(23, None);

        assert!(cache.is_scraped(22));
        assert!(cache.is_scraped(23));
        assert_eq!(cache.date_for(22), Some(date(3)));
        assert_eq!(cache.date_for(23), None);
        assert_eq!(cache.max_scraped_page(), Some(23));
    }

    #[test]
    fn test_record_scraped_is_idempotent_and_dates_move_forward() {
        let mut cache = PageCache::new(22);
        cache.record_scraped(22, Some(date(3)));
        cache.record_scraped(22, Some(date(5)));
        assert_eq!(cache.date_for(22), Some(date(5)));

        // an earlier or unknown date never wins
        cache.record_scraped(22, Some(date(4)));
        assert_eq!(cache.date_for(22), Some(date(5)));
        cache.record_scraped(22, None);
        assert_eq!(cache.date_for(22), Some(date(5)));
    }

    #[test]
    fn test_resume_page() {
        let mut cache = PageCache::new(22);
        assert_eq!(cache.resume_page(), 22);

        cache.record_scraped(22, Some(date(1)));
        cache.record_scraped(23, Some(date(2)));
        assert_eq!(cache.resume_page(), 24);
    }

    #[tokio::test]
    async fn test_persist_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page_cache.json");

        let mut cache = PageCache::new(22);
        cache.record_scraped(22, Some(date(3)));
        cache.record_scraped(24, None);
        cache.persist(&path).await.unwrap();

        let loaded = PageCache::load(&path).await;
        assert_eq!(loaded, cache);
    }

    #[tokio::test]
    async fn test_persist_writes_expected_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page_cache.json");

        let mut cache = PageCache::new(22);
        cache.record_scraped(22, Some(date(3)));
        cache.persist(&path).await.unwrap();

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        let value: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["_metadata_ytd_start_page"], json!(22));
        assert_eq!(value["_metadata_ytd_scraped_pages"], json!([22]));
        assert!(value["22"].as_str().unwrap().starts_with("2026-01-03"));
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PageCache::load(&dir.path().join("nope.json")).await;
        assert!(cache.is_empty());
        assert_eq!(cache.start_page(), DEFAULT_START_PAGE);
    }

    #[tokio::test]
    async fn test_load_malformed_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page_cache.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let cache = PageCache::load(&path).await;
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_load_fills_listed_pages_with_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page_cache.json");
        let content = json!({
            "22": "2026-01-03T12:00:00+00:00",
            "_metadata_ytd_start_page": 22,
            "_metadata_ytd_scraped_pages": [22, 23],
        });
        tokio::fs::write(&path, content.to_string()).await.unwrap();

        let cache = PageCache::load(&path).await;
        assert!(cache.is_scraped(23));
        assert_eq!(cache.date_for(23), None);
        assert_eq!(cache.date_for(22), Some(date(3)));
    }

    #[tokio::test]
    async fn test_load_skips_bad_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page_cache.json");
        let content = json!({
            "22": "not a date",
            "23": "2026-01-05T12:00:00+00:00",
        });
        tokio::fs::write(&path, content.to_string()).await.unwrap();

        let cache = PageCache::load(&path).await;
        // page 22 survives as scraped-with-unknown-date
        assert!(cache.is_scraped(22));
        assert_eq!(cache.date_for(22), None);
        assert_eq!(cache.date_for(23), Some(date(5)));
    }
}
