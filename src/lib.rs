//! # beymeta: incremental WBO winning-combination scraper
//!
//! This crate scrapes the WBO forum thread of winning Beyblade X
//! combinations, incrementally caches scraped pages, and produces
//! time-windowed frequency reports.
//!
//! ## Features
//!
//! - Polite page fetching with a fixed inter-request delay
//! - Combination extraction from post bodies with bit-name translation
//! - A persisted page cache deciding which pages still need fetching
//! - Cache reconciliation against the canonical CSV store (store wins)
//! - 30-day / 90-day / year-to-date reports derived with zero network
//!   access: raw CSVs, frequency CSVs, and static chart pages
//!
//! ## Example
//!
//! ```rust,no_run
//! use beymeta::cache::PageCache;
//! use beymeta::extract::Translations;
//! use beymeta::fetcher::{FetcherConfig, ForumClient};
//! use beymeta::store::RecordStore;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ForumClient::new(FetcherConfig::default());
//!     let cache = PageCache::load(Path::new("data/page_cache.json")).await;
//!     let mut store = RecordStore::open("data/ytd.csv")?;
//!
//!     let (cache, outcome) = beymeta::scrape::run(
//!         &client,
//!         cache,
//!         &mut store,
//!         &Translations::empty(),
//!         Path::new("data/page_cache.json"),
//!         None,
//!     )
//!     .await?;
//!
//!     println!("Fetched {} pages", outcome.pages_fetched.len());
//!     beymeta::report::generate_all(
//!         store.records(),
//!         &cache,
//!         Path::new("reports"),
//!         chrono::Utc::now(),
//!     )?;
//!     Ok(())
//! }
//! ```

mod error;

pub mod cache;
pub mod extract;
pub mod fetcher;
pub mod report;
pub mod scrape;
pub mod store;

pub use error::{Error, Result};
