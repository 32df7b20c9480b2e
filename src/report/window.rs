//! Time-window filtering of the canonical store
//!
//! Pure derivation: a record is in a window iff its page's cached date
//! falls inside the window. No network access happens here; pages whose
//! date is unknown (a reconciliation gap) are excluded from every window
//! until their date is known.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};

use crate::cache::PageCache;
use crate::extract::Combination;

/// Reporting window over the canonical store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportWindow {
    /// Trailing 30 days
    Last30Days,
    /// Trailing 90 days
    Last90Days,
    /// January 1 of the current year to now
    YearToDate,
}

impl ReportWindow {
    /// All windows, narrowest first
    pub const ALL: [ReportWindow; 3] = [
        ReportWindow::Last30Days,
        ReportWindow::Last90Days,
        ReportWindow::YearToDate,
    ];

    /// Human-readable title, used in chart pages
    pub fn title(&self) -> &'static str {
        match self {
            ReportWindow::Last30Days => "Last 30 Days",
            ReportWindow::Last90Days => "Last 90 Days",
            ReportWindow::YearToDate => "Year to Date",
        }
    }

    /// Filename prefix for this window's artifacts
    pub fn prefix(&self) -> &'static str {
        match self {
            ReportWindow::Last30Days => "30days",
            ReportWindow::Last90Days => "90days",
            ReportWindow::YearToDate => "ytd",
        }
    }

    /// Start of the window relative to the run's `now` snapshot
    pub fn start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            ReportWindow::Last30Days => now - Duration::days(30),
            ReportWindow::Last90Days => now - Duration::days(90),
            ReportWindow::YearToDate => Utc
                .with_ymd_and_hms(now.year(), 1, 1, 0, 0, 0)
                .single()
                .expect("January 1 is a valid UTC timestamp"),
        }
    }
}

/// Select the records whose page date falls within `[window start, now]`.
///
/// The same `now` snapshot must be used for all three windows of a run so
/// the reports nest consistently.
pub fn filter_records<'a>(
    records: &'a [Combination],
    cache: &PageCache,
    window: ReportWindow,
    now: DateTime<Utc>,
) -> Vec<&'a Combination> {
    let start = window.start(now);
    records
        .iter()
        .filter(|record| match cache.date_for(record.page) {
            Some(date) => start <= date && date <= now,
            None => false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn combo(page: u32) -> Combination {
        Combination {
            blade: "DranSword".to_string(),
            ratchet: "3-60".to_string(),
            bit: "F".to_string(),
            page,
        }
    }

    fn setup() -> (Vec<Combination>, PageCache, DateTime<Utc>) {
        let now = Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap();
        let mut cache = PageCache::new(22);
        // page 22: early in the year; 23: ~60 days back; 24: ~10 days back
        cache.record_scraped(22, Some(Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap()));
        cache.record_scraped(23, Some(Utc.with_ymd_and_hms(2026, 6, 2, 0, 0, 0).unwrap()));
        cache.record_scraped(24, Some(Utc.with_ymd_and_hms(2026, 7, 22, 0, 0, 0).unwrap()));
        cache.record_scraped(25, None); // unknown date
        let records = vec![combo(22), combo(23), combo(24), combo(25)];
        (records, cache, now)
    }

    #[test]
    fn test_window_bounds() {
        let (records, cache, now) = setup();
        let last30 = filter_records(&records, &cache, ReportWindow::Last30Days, now);
        assert_eq!(last30.iter().map(|r| r.page).collect::<Vec<_>>(), vec![24]);

        let start = ReportWindow::Last30Days.start(now);
        for record in last30 {
            let date = cache.date_for(record.page).unwrap();
            assert!(start <= date && date <= now);
        }
    }

    #[test]
    fn test_windows_nest() {
        let (records, cache, now) = setup();
        let last30 = filter_records(&records, &cache, ReportWindow::Last30Days, now);
        let last90 = filter_records(&records, &cache, ReportWindow::Last90Days, now);
        let ytd = filter_records(&records, &cache, ReportWindow::YearToDate, now);

        assert!(last30.len() <= last90.len());
        assert!(last90.len() <= ytd.len());
        for record in &last30 {
            assert!(last90.contains(record));
        }
        for record in &last90 {
            assert!(ytd.contains(record));
        }
    }

    #[test]
    fn test_unknown_date_excluded_from_all_windows() {
        let (records, cache, now) = setup();
        for window in ReportWindow::ALL {
            let subset = filter_records(&records, &cache, window, now);
            assert!(subset.iter().all(|r| r.page != 25));
        }
    }

    #[test]
    fn test_ytd_starts_at_january_first() {
        let now = Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap();
        let start = ReportWindow::YearToDate.start(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_future_dates_excluded() {
        let now = Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap();
        let mut cache = PageCache::new(22);
        cache.record_scraped(22, Some(now + Duration::days(1)));
        let records = vec![combo(22)];

        let subset = filter_records(&records, &cache, ReportWindow::YearToDate, now);
        assert!(subset.is_empty());
    }
}
