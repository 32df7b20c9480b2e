//! Forum page fetching
//!
//! This module provides the HTTP client for pulling thread pages from the
//! forum, plus the HTML helpers that read the current page number and the
//! post dates out of a fetched page.

mod client;
mod config;
mod error;
mod page;

pub use client::ForumClient;
pub use config::{FetcherConfig, FetcherConfigBuilder};
pub use error::FetchError;
pub use page::{current_page_number, latest_post_date, parse_post_date, post_dates};

use std::fmt;

use chrono::{DateTime, Utc};

/// Target of a single page fetch: a concrete page number or the forum's
/// "last page" redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRef {
    /// A specific page number
    Number(u32),
    /// The newest page of the thread
    Last,
}

impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageRef::Number(n) => write!(f, "{}", n),
            PageRef::Last => write!(f, "last"),
        }
    }
}

/// A fetched thread page with everything later stages need
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Page number within the thread
    pub number: u32,

    /// Raw page HTML
    pub html: String,

    /// Latest post date found on the page, if any date parsed
    pub last_post_date: Option<DateTime<Utc>>,
}
