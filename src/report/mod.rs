//! Windowed report generation
//!
//! Derives the 30-day, 90-day, and year-to-date subsets from the canonical
//! store and writes each window's artifacts: the raw record CSV, the
//! per-component and per-combination frequency CSVs, and a static chart
//! page, plus one landing page linking the chart pages. Everything here
//! works from the store and the page cache alone; report generation never
//! touches the network.

mod charts;
mod summary;
mod window;

pub use summary::{combination_counts, component_counts, ComponentCounts};
pub use window::{filter_records, ReportWindow};

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use csv::{Writer, WriterBuilder};
use tracing::{info, warn};

use crate::cache::PageCache;
use crate::extract::Combination;

/// Error type for report generation
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl From<ReportError> for crate::error::Error {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::Io(e) => crate::error::Error::Io(e),
            ReportError::Csv(e) => crate::error::Error::Csv(e),
        }
    }
}

type Result<T> = std::result::Result<T, ReportError>;

/// What was generated for one window
#[derive(Debug, Clone)]
pub struct WindowReport {
    /// The window this report covers
    pub window: ReportWindow,

    /// Records that fell inside the window
    pub records: usize,

    /// Chart page path, when the window was non-empty
    pub chart_file: Option<PathBuf>,
}

fn write_raw_csv(records: &[&Combination], path: &Path) -> Result<()> {
    let mut writer = Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_summary_csv(counts: &ComponentCounts, path: &Path) -> Result<()> {
    // Rows vary in length (blank separators vs. section rows), so the writer
    // must be built in flexible mode.
    let mut writer = WriterBuilder::new().flexible(true).from_path(path)?;

    let sections: [(&str, &[(String, usize)]); 3] = [
        ("Blades", &counts.blades),
        ("Ratchets", &counts.ratchets),
        ("Bits", &counts.bits),
    ];

    for (i, (header, rows)) in sections.iter().enumerate() {
        if i > 0 {
            // blank row between sections
            writer.write_record([""])?;
        }
        writer.write_record([*header, "Count"])?;
        for (name, count) in rows.iter() {
            writer.write_record([name.as_str(), &count.to_string()])?;
        }
    }

    writer.flush()?;
    Ok(())
}

fn write_combo_counts_csv(
    combos: &[((String, String, String), usize)],
    path: &Path,
) -> Result<()> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record(["Blade", "Ratchet", "Bit", "Count"])?;
    for ((blade, ratchet, bit), count) in combos {
        writer.write_record([blade, ratchet, bit, &count.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Generate all three windowed reports into `out_dir`.
///
/// Takes one `now` snapshot for every window so the subsets nest. Empty
/// windows produce no files and are left off the landing page.
pub fn generate_all(
    records: &[Combination],
    cache: &PageCache,
    out_dir: &Path,
    now: DateTime<Utc>,
) -> Result<Vec<WindowReport>> {
    std::fs::create_dir_all(out_dir)?;
    let timestamp = now.format("%m-%d-%Y").to_string();

    let mut reports = Vec::new();
    let mut landing_entries = Vec::new();

    for window in ReportWindow::ALL {
        let subset = filter_records(records, cache, window, now);
        if subset.is_empty() {
            warn!("No records in window {:?}; skipping its report", window);
            reports.push(WindowReport {
                window,
                records: 0,
                chart_file: None,
            });
            continue;
        }

        let prefix = window.prefix();
        let counts = component_counts(&subset);
        let combos = combination_counts(&subset);

        write_raw_csv(&subset, &out_dir.join(format!("{}.csv", prefix)))?;
        write_summary_csv(&counts, &out_dir.join(format!("{}_summary.csv", prefix)))?;
        write_combo_counts_csv(
            &combos,
            &out_dir.join(format!("{}_combo_counts.csv", prefix)),
        )?;

        let chart_file = out_dir.join(format!("{}_charts.html", prefix));
        let html = charts::charts_html(window.title(), &timestamp, &combos, &counts);
        std::fs::write(&chart_file, html)?;

        info!(
            "Window {}: {} records, report written",
            window.title(),
            subset.len()
        );

        landing_entries.push((
            window.title().to_string(),
            format!("{}_charts.html", prefix),
        ));
        reports.push(WindowReport {
            window,
            records: subset.len(),
            chart_file: Some(chart_file),
        });
    }

    let landing = charts::landing_html(&landing_entries, &timestamp);
    std::fs::write(out_dir.join("index.html"), landing)?;

    Ok(reports)
}
