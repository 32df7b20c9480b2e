//! Incremental scrape driver
//!
//! One run: load-state reconciliation, range determination, the scrape
//! loop, and finalization. Pages already marked scraped are skipped with
//! no fetch and no delay; the steady state for frequent runs is a single
//! "where does the thread end now" request and zero page fetches.
//!
//! The true last page of the thread is never scraped, because it may still
//! be accumulating posts; only pages strictly below it are eligible.

use std::path::Path;

use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::cache::{reconcile, PageCache};
use crate::error::Result;
use crate::extract::{extract_combinations, Translations};
use crate::fetcher::ForumClient;
use crate::store::RecordStore;

/// Progress event emitted per fetched page: (page number, records found)
pub type ProgressEvent = (u32, usize);

/// What a single scrape run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeOutcome {
    /// Highest page eligible for scraping this run (forum last page - 1)
    pub last_complete_page: u32,

    /// Pages fetched this run, in order
    pub pages_fetched: Vec<u32>,

    /// Records appended to the canonical store this run
    pub new_records: usize,
}

/// Run one incremental scrape.
///
/// Reconciles the cache against the store, persists the corrected cache,
/// then fetches every not-yet-scraped page up to the last complete page,
/// appending extracted records to the store as each page lands. The cache
/// is persisted again before returning, including on a mid-loop fetch
/// failure, so everything that completed stays completed.
#[instrument(skip_all)]
pub async fn run(
    client: &ForumClient,
    cache: PageCache,
    store: &mut RecordStore,
    translations: &Translations,
    cache_path: &Path,
    progress: Option<mpsc::Sender<ProgressEvent>>,
) -> Result<(PageCache, ScrapeOutcome)> {
    let mut cache = reconcile(cache, &store.pages(), client).await;
    cache.persist(cache_path).await?;

    let last_page = client.last_page_number().await?;
    let last_complete = last_page.saturating_sub(1);
    info!(
        "Thread last page is {}; pages up to {} are complete",
        last_page, last_complete
    );

    let mut outcome = ScrapeOutcome {
        last_complete_page: last_complete,
        ..ScrapeOutcome::default()
    };

    // Thread shrank below what we already scraped (deletion or pruning).
    // Policy: stop scraping, leave cache and store untouched.
    if let Some(max) = cache.max_scraped_page() {
        if last_complete < max {
            warn!(
                "Thread last complete page {} is below cached page {}; not scraping",
                last_complete, max
            );
            return Ok((cache, outcome));
        }
    }

    let start = cache.resume_page();
    if start > last_complete {
        debug!("No new complete pages (start {} > {})", start, last_complete);
        return Ok((cache, outcome));
    }

    info!("Scraping pages {} to {}", start, last_complete);

    let mut fetch_failure = None;
    for page in start..=last_complete {
        if cache.is_scraped(page) {
            continue;
        }

        let fetched = match client.fetch_page(page).await {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!("Fetch failed on page {}; stopping this run: {}", page, e);
                fetch_failure = Some(e);
                break;
            }
        };

        let records = extract_combinations(&fetched.html, page, translations);
        if records.is_empty() {
            warn!("Page {} yielded no combinations", page);
        } else {
            debug!("Page {} yielded {} combinations", page, records.len());
        }

        store.append(&records)?;
        cache.record_scraped(page, fetched.last_post_date);

        outcome.pages_fetched.push(page);
        outcome.new_records += records.len();

        if let Some(sender) = &progress {
            let _ = sender.send((page, records.len())).await;
        }
    }

    cache.persist(cache_path).await?;

    match fetch_failure {
        Some(e) => Err(e.into()),
        None => {
            info!(
                "Scraped {} pages, {} new records",
                outcome.pages_fetched.len(),
                outcome.new_records
            );
            Ok((cache, outcome))
        }
    }
}
