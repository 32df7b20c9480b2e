//! Cache reconciliation against the canonical store
//!
//! The store is ground truth: whenever the cache's scraped-pages set
//! disagrees with the set of pages actually present in the store, the
//! cache is rebuilt from the store. Runs before every incremental-scrape
//! decision, so a corrupted or deleted cache file can neither duplicate
//! records nor silently skip pages.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::PageCache;
use crate::fetcher::{FetchError, ForumClient};

/// Source of last-post dates for pages whose cached date was lost.
///
/// Implemented by [`ForumClient`] for live repair; tests inject fakes. A
/// probe failure degrades to the unknown-date sentinel rather than failing
/// reconciliation.
pub trait DateProbe {
    /// Latest post date of a page, or `None` when no date can be read
    async fn page_date(&self, page: u32) -> Result<Option<DateTime<Utc>>, FetchError>;
}

impl DateProbe for ForumClient {
    async fn page_date(&self, page: u32) -> Result<Option<DateTime<Utc>>, FetchError> {
        ForumClient::page_date(self, page).await
    }
}

/// Reconcile a cache against the set of pages present in the canonical
/// store, returning the corrected cache.
///
/// When the sets already agree the cache is returned untouched, so running
/// reconciliation twice in a row is a no-op. Otherwise the scraped-pages
/// set becomes exactly `pages_in_store`; dates are carried over where the
/// cache has them and probed for where it does not.
pub async fn reconcile<P: DateProbe>(
    cache: PageCache,
    pages_in_store: &BTreeSet<u32>,
    probe: &P,
) -> PageCache {
    if cache.scraped_pages() == *pages_in_store {
        debug!("Cache agrees with store ({} pages)", pages_in_store.len());
        return cache;
    }

    info!(
        "Cache ({} pages) disagrees with store ({} pages); rebuilding from store",
        cache.len(),
        pages_in_store.len()
    );

    let mut rebuilt = PageCache::new(cache.start_page());
    for &page in pages_in_store {
        let date = match cache.date_for(page) {
            Some(date) => Some(date),
            None => match probe.page_date(page).await {
                Ok(date) => date,
                Err(e) => {
                    warn!(
                        "Could not repair date for page {}: {}; marking date unknown",
                        page, e
                    );
                    None
                }
            },
        };
        rebuilt.record_scraped(page, date);
    }

    rebuilt
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn date(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, day, 12, 0, 0).unwrap()
    }

    /// Probe that answers with a fixed date and counts its calls
    struct FixedProbe {
        date: DateTime<Utc>,
        calls: AtomicUsize,
    }

    impl FixedProbe {
        fn new(date: DateTime<Utc>) -> Self {
            Self {
                date,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl DateProbe for FixedProbe {
        async fn page_date(&self, _page: u32) -> Result<Option<DateTime<Utc>>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(self.date))
        }
    }

    /// Probe that always fails, standing in for an unreachable forum
    struct FailingProbe;

    impl DateProbe for FailingProbe {
        async fn page_date(&self, _page: u32) -> Result<Option<DateTime<Utc>>, FetchError> {
            Err(FetchError::LastPageUnknown)
        }
    }

    #[tokio::test]
    async fn test_matching_sets_leave_cache_untouched() {
        let mut cache = PageCache::new(22);
        cache.record_scraped(22, Some(date(3)));
        cache.record_scraped(23, Some(date(4)));
        let pages: BTreeSet<u32> = [22, 23].into();

        let probe = FixedProbe::new(date(9));
        let reconciled = reconcile(cache.clone(), &pages, &probe).await;

        assert_eq!(reconciled, cache);
        assert_eq!(probe.calls(), 0);
    }

    #[tokio::test]
    async fn test_store_wins_over_extra_cached_page() {
        let mut cache = PageCache::new(22);
        cache.record_scraped(22, Some(date(3)));
        cache.record_scraped(23, Some(date(4)));
        // store never saw page 23
        let pages: BTreeSet<u32> = [22].into();

        let reconciled = reconcile(cache, &pages, &FailingProbe).await;

        assert!(reconciled.is_scraped(22));
        assert!(!reconciled.is_scraped(23));
        // a subsequent run resumes at the dropped page
        assert_eq!(reconciled.resume_page(), 23);
    }

    #[tokio::test]
    async fn test_missing_date_is_probed() {
        // cache file deleted: empty cache, store holds pages 22 and 23
        let cache = PageCache::new(22);
        let pages: BTreeSet<u32> = [22, 23].into();

        let probe = FixedProbe::new(date(5));
        let reconciled = reconcile(cache, &pages, &probe).await;

        assert_eq!(reconciled.scraped_pages(), pages);
        assert_eq!(reconciled.date_for(22), Some(date(5)));
        assert_eq!(probe.calls(), 2);
        assert_eq!(reconciled.resume_page(), 24);
    }

    #[tokio::test]
    async fn test_probe_failure_degrades_to_unknown_date() {
        let cache = PageCache::new(22);
        let pages: BTreeSet<u32> = [22].into();

        let reconciled = reconcile(cache, &pages, &FailingProbe).await;

        assert!(reconciled.is_scraped(22));
        assert_eq!(reconciled.date_for(22), None);
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent() {
        let mut cache = PageCache::new(22);
        cache.record_scraped(22, Some(date(3)));
        let pages: BTreeSet<u32> = [22, 23].into();

        let probe = FixedProbe::new(date(6));
        let once = reconcile(cache, &pages, &probe).await;
        let twice = reconcile(once.clone(), &pages, &probe).await;

        assert_eq!(once, twice);
        // second pass found nothing to repair
        assert_eq!(probe.calls(), 1);
    }

    #[tokio::test]
    async fn test_kept_dates_survive_rebuild() {
        let mut cache = PageCache::new(22);
        cache.record_scraped(22, Some(date(3)));
        let pages: BTreeSet<u32> = [22, 23].into();

        let probe = FixedProbe::new(date(6));
        let reconciled = reconcile(cache, &pages, &probe).await;

        assert_eq!(reconciled.date_for(22), Some(date(3)));
        assert_eq!(reconciled.date_for(23), Some(date(6)));
    }
}
