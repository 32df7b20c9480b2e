//! HTML helpers for fetched thread pages
//!
//! Reads the pagination marker and the post dates out of a page. Everything
//! here is pure string/DOM work; no network access.

use chrono::{DateTime, NaiveDateTime, Utc};
use scraper::{Html, Selector};
use tracing::warn;

/// Date formats used by the forum's post timestamps
const POST_DATE_FORMATS: [&str; 2] = ["%b. %d, %Y %I:%M %p", "%b %d, %Y %I:%M %p"];

/// Read the page number the forum reports for this page.
///
/// The pagination bar marks the current page with
/// `<li class="active multipage-current">`, whose link text is the page
/// number followed by a "(current)" suffix. Fetching the "last" page and
/// reading this marker is how the thread's length is discovered.
pub fn current_page_number(html: &str) -> Option<u32> {
    let document = Html::parse_document(html);

    let selector = match Selector::parse("li.active.multipage-current a") {
        Ok(s) => s,
        Err(e) => {
            warn!("Failed to parse pagination selector: {}", e);
            return None;
        }
    };

    let link = document.select(&selector).next()?;
    let text = link.text().collect::<String>();
    let text = text.replace("(current)", "");
    text.trim().parse().ok()
}

/// Parse a forum post date string.
///
/// Timestamps carry no timezone; they are taken as UTC. Relative dates
/// ("Yesterday", "2 hours ago") do not parse and yield None.
pub fn parse_post_date(date_str: &str) -> Option<DateTime<Utc>> {
    let date_str = date_str.replace('\u{a0}', " ");
    let date_str = date_str.trim();

    for fmt in POST_DATE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date_str, fmt) {
            return Some(dt.and_utc());
        }
    }

    None
}

/// Extract all parseable post dates from a page, in document order
pub fn post_dates(html: &str) -> Vec<DateTime<Utc>> {
    let document = Html::parse_document(html);

    let selector = match Selector::parse("span.post_date") {
        Ok(s) => s,
        Err(e) => {
            warn!("Failed to parse post date selector: {}", e);
            return Vec::new();
        }
    };

    document
        .select(&selector)
        .filter_map(|element| {
            let text = element.text().collect::<String>();
            parse_post_date(&text)
        })
        .collect()
}

/// Latest post date on a page, if any date parsed
pub fn latest_post_date(html: &str) -> Option<DateTime<Utc>> {
    post_dates(html).into_iter().max()
}
