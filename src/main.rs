//! # beymeta CLI
//!
//! Command-line interface for the incremental scraper and report
//! generator.
//!
//! ## Key Components
//!
//! - CLI argument parsing with clap
//! - Subcommands:
//!   - `run` (the default): incremental scrape, then all windowed reports
//!   - `report`: regenerate reports from disk with zero network access
//!   - `range`: scrape a fixed page range to a standalone CSV
//! - Progress reporting for the scrape loop
//!
//! Invoked with no arguments, the binary performs the full automated
//! pipeline: reconcile the page cache against the canonical store, fetch
//! whatever thread pages are new, and rewrite the 30-day / 90-day /
//! year-to-date reports.

use std::path::PathBuf;

use anyhow::bail;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tracing::instrument;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use beymeta::cache::PageCache;
use beymeta::extract::{extract_combinations, Translations};
use beymeta::fetcher::{FetcherConfig, ForumClient};
use beymeta::report;
use beymeta::scrape;
use beymeta::store::RecordStore;

const DEFAULT_STORE: &str = "data/ytd.csv";
const DEFAULT_CACHE: &str = "data/page_cache.json";
const DEFAULT_TRANSLATIONS: &str = "InitialsName.txt";
const DEFAULT_OUT_DIR: &str = "reports";

#[derive(Parser)]
#[command(author, version, about = "Incremental scraper and meta reports for WBO winning-combination threads", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scrape new thread pages, then regenerate all windowed reports
    Run(RunArgs),

    /// Regenerate windowed reports from the existing store and cache
    Report(ReportArgs),

    /// Scrape a fixed page range to a standalone CSV, bypassing the cache
    Range(RangeArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Canonical store CSV path
    #[arg(long, default_value = DEFAULT_STORE)]
    store: PathBuf,

    /// Page cache path
    #[arg(long, default_value = DEFAULT_CACHE)]
    cache: PathBuf,

    /// Bit name translation file
    #[arg(short, long, default_value = DEFAULT_TRANSLATIONS)]
    translations: PathBuf,

    /// Report output directory
    #[arg(short, long, default_value = DEFAULT_OUT_DIR)]
    out_dir: PathBuf,

    /// Delay in milliseconds before each request
    #[arg(short, long, default_value = "2000")]
    rate: u64,

    /// Thread URL override
    #[arg(long)]
    thread_url: Option<String>,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            store: PathBuf::from(DEFAULT_STORE),
            cache: PathBuf::from(DEFAULT_CACHE),
            translations: PathBuf::from(DEFAULT_TRANSLATIONS),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            rate: 2000,
            thread_url: None,
        }
    }
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// Canonical store CSV path
    #[arg(long, default_value = DEFAULT_STORE)]
    store: PathBuf,

    /// Page cache path
    #[arg(long, default_value = DEFAULT_CACHE)]
    cache: PathBuf,

    /// Report output directory
    #[arg(short, long, default_value = DEFAULT_OUT_DIR)]
    out_dir: PathBuf,
}

#[derive(Args, Debug)]
struct RangeArgs {
    /// First page to scrape
    #[arg(short, long)]
    start: u32,

    /// Last page to scrape (defaults to the thread's current last page)
    #[arg(short, long)]
    end: Option<u32>,

    /// Output CSV path
    #[arg(short, long, default_value = "combinations.csv")]
    output: PathBuf,

    /// Bit name translation file
    #[arg(short, long, default_value = DEFAULT_TRANSLATIONS)]
    translations: PathBuf,

    /// Delay in milliseconds before each request
    #[arg(short, long, default_value = "2000")]
    rate: u64,

    /// Thread URL override
    #[arg(long)]
    thread_url: Option<String>,
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn build_client(thread_url: Option<String>, rate: u64) -> ForumClient {
    let mut builder = FetcherConfig::builder().rate_limit_ms(rate);
    if let Some(url) = thread_url {
        builder = builder.thread_url(url);
    }
    ForumClient::new(builder.build())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run(args)) => run_command(args).await?,
        Some(Commands::Report(args)) => report_command(args).await?,
        Some(Commands::Range(args)) => range_command(args).await?,
        None => run_command(RunArgs::default()).await?,
    }

    Ok(())
}

#[instrument(skip_all)]
async fn run_command(args: RunArgs) -> anyhow::Result<()> {
    let client = build_client(args.thread_url, args.rate);
    client.warm_up().await;

    let translations = Translations::load(&args.translations);
    let cache = PageCache::load(&args.cache).await;
    let mut store = RecordStore::open(&args.store)?;

    println!(
        "Resuming from {} cached pages, {} stored combinations",
        cache.len(),
        store.len()
    );

    // Feed scrape progress into a spinner (page totals are unknown until
    // the thread's last page has been fetched)
    let (progress_sender, mut progress_receiver) = mpsc::channel(100);
    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .unwrap(),
    );

    let progress_handle = tokio::spawn({
        let progress_bar = progress_bar.clone();
        async move {
            while let Some((page, found)) = progress_receiver.recv().await {
                progress_bar.set_message(format!("Page {}: {} combinations", page, found));
                progress_bar.tick();
            }
            progress_bar.finish_and_clear();
        }
    });

    let result = scrape::run(
        &client,
        cache,
        &mut store,
        &translations,
        &args.cache,
        Some(progress_sender),
    )
    .await;

    let _ = progress_handle.await;
    let (cache, outcome) = result?;

    println!(
        "Scraped {} new pages, {} new combinations (store now holds {})",
        outcome.pages_fetched.len(),
        outcome.new_records,
        store.len()
    );

    let now = Utc::now();
    let reports = report::generate_all(store.records(), &cache, &args.out_dir, now)?;
    for window_report in &reports {
        println!(
            "  {}: {} combinations",
            window_report.window.title(),
            window_report.records
        );
    }
    println!(
        "Reports written to {}",
        args.out_dir.join("index.html").display()
    );

    Ok(())
}

#[instrument(skip_all)]
async fn report_command(args: ReportArgs) -> anyhow::Result<()> {
    let cache = PageCache::load(&args.cache).await;
    let store = RecordStore::open(&args.store)?;

    println!(
        "Regenerating reports from {} stored combinations",
        store.len()
    );

    let now = Utc::now();
    let reports = report::generate_all(store.records(), &cache, &args.out_dir, now)?;
    for window_report in &reports {
        println!(
            "  {}: {} combinations",
            window_report.window.title(),
            window_report.records
        );
    }
    println!(
        "Reports written to {}",
        args.out_dir.join("index.html").display()
    );

    Ok(())
}

#[instrument(skip_all)]
async fn range_command(args: RangeArgs) -> anyhow::Result<()> {
    let client = build_client(args.thread_url, args.rate);
    client.warm_up().await;

    let translations = Translations::load(&args.translations);

    let end = match args.end {
        Some(end) => end,
        None => {
            let last = client.last_page_number().await?;
            println!("Thread's last page is {}", last);
            last
        }
    };
    if args.start > end {
        bail!("start page {} is beyond end page {}", args.start, end);
    }

    let progress_bar = ProgressBar::new(u64::from(end - args.start + 1));
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );

    let mut all = Vec::new();
    for page in args.start..=end {
        let fetched = client.fetch_page(page).await?;
        let records = extract_combinations(&fetched.html, page, &translations);
        progress_bar.set_message(format!("page {}: {} combinations", page, records.len()));
        progress_bar.inc(1);
        all.extend(records);
    }
    progress_bar.finish_with_message("done");

    let mut writer = csv::Writer::from_path(&args.output)?;
    for record in &all {
        writer.serialize(record)?;
    }
    writer.flush()?;

    println!(
        "Saved {} combinations to {}",
        all.len(),
        args.output.display()
    );

    Ok(())
}
