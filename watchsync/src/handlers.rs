use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use url::Url;
use watchsync_core::reconcile::remove_duplicates;
use watchsync_core::sync::{SyncReport, import_urls};
use watchsync_core::{Config, Phase, WatchClient, YearFilter};
use watchsync_crawler::{CrawlScope, CrawlSummary, Crawler};

// Helper functions shared by the run handler and its tests

/// Layer CLI flags over the env-built configuration. CLI wins over env,
/// env wins over defaults.
pub fn apply_cli_overrides(mut config: Config, args: &ArgMatches) -> Result<Config, String> {
    if let Some(raw) = args.get_one::<String>("phases") {
        config.phases =
            watchsync_core::config::parse_phases(raw).map_err(|e| e.to_string())?;
    }
    if let Some(base_url) = args.get_one::<String>("base-url") {
        config.base_url = base_url.clone();
    }
    if let Some(key) = args.get_one::<String>("api-key") {
        config.api_key = Some(key.clone());
    }
    if let Some(tag) = args.get_one::<String>("tag") {
        config.tag = tag.clone();
    }
    if let Some(dir) = args.get_one::<PathBuf>("data-dir") {
        config.data_dir = dir.clone();
    }
    let seeds: Vec<String> = args
        .get_many::<Url>("seed")
        .map(|urls| urls.map(|u| u.as_str().to_string()).collect())
        .unwrap_or_default();
    if !seeds.is_empty() {
        config.seeds = seeds;
    }
    if let Some(marker) = args.get_one::<String>("marker") {
        config.scope_marker = marker.clone();
    }
    if args.get_flag("no-year-filter") {
        config.filter_by_year = false;
    }
    Ok(config)
}

/// Scheme + host (+ port) of the first seed; root-relative links resolve
/// against this.
pub fn site_origin(seeds: &[String]) -> Result<String, String> {
    let first = seeds.first().ok_or("no crawl seed configured")?;
    let url = Url::parse(first).map_err(|e| format!("invalid seed URL '{}': {}", first, e))?;
    let host = url
        .host_str()
        .ok_or_else(|| format!("seed URL '{}' has no host", first))?;
    match url.port() {
        Some(port) => Ok(format!("{}://{}:{}", url.scheme(), host, port)),
        None => Ok(format!("{}://{}", url.scheme(), host)),
    }
}

/// Trim a URL for single-line progress display.
pub fn shorten(url: &str, max: usize) -> String {
    if url.chars().count() <= max {
        url.to_string()
    } else {
        let cut: String = url.chars().take(max).collect();
        format!("{}...", cut)
    }
}

fn phase_header(name: &str) {
    println!();
    println!("{}", format!("── Phase: {} ", name).bright_blue().bold());
}

/// Run the configured phases strictly in order. A phase-level failure is
/// logged and the remaining phases still run; only a missing API key stops
/// the run before it starts.
pub async fn handle_run(config: Config) -> anyhow::Result<()> {
    let api_key = config.require_api_key()?.to_string();
    fs::create_dir_all(&config.data_dir)?;

    let client = WatchClient::new(&config.base_url, &api_key)?;
    let list_path = config.url_list_path();
    info!(
        "Running phases {:?} against {}",
        config.phases, config.base_url
    );

    let mut removed: Option<usize> = None;
    let mut crawl: Option<CrawlSummary> = None;
    let mut synced: Option<SyncReport> = None;

    if config.runs_phase(Phase::Reconcile) {
        phase_header("reconcile");
        match remove_duplicates(&client).await {
            Ok(n) => removed = Some(n),
            Err(e) => error!("Reconciliation aborted: {}", e),
        }
    }

    if config.runs_phase(Phase::Crawl) {
        phase_header("crawl");
        match run_crawl(&config, &list_path).await {
            Ok(summary) => crawl = Some(summary),
            Err(e) => error!("Crawl aborted: {}", e),
        }
    }

    if config.runs_phase(Phase::Sync) {
        phase_header("sync");
        let filter = config
            .filter_by_year
            .then(|| YearFilter::recent(chrono::Local::now().date_naive()));
        if let Some(ref f) = filter {
            info!("Year filter active for: {}", f.allowed_years().join(", "));
        } else {
            info!("Year filter disabled");
        }
        match run_sync(&client, &config, &list_path, filter.as_ref()).await {
            Ok(report) => synced = Some(report),
            Err(e) => error!("Sync aborted: {}", e),
        }
    }

    print_summary(removed, crawl.as_ref(), synced.as_ref());
    Ok(())
}

async fn run_crawl(config: &Config, list_path: &std::path::Path) -> anyhow::Result<CrawlSummary> {
    let origin = site_origin(&config.seeds).map_err(anyhow::Error::msg)?;
    let scope = CrawlScope::new(&origin, &config.scope_marker)?;
    let crawler = Crawler::with_timeout(scope, 15, config.accept_invalid_certs)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));

    let spinner_for_cb = spinner.clone();
    let progress: watchsync_crawler::crawler::ProgressCallback = Arc::new(move |count: usize, url: String| {
        spinner_for_cb.set_message(format!("{} pages - {}", count, shorten(&url, 70)));
    });

    let summary = crawler
        .with_progress_callback(progress)
        .crawl(&config.seeds, list_path)
        .await?;
    spinner.finish_and_clear();
    Ok(summary)
}

async fn run_sync(
    client: &WatchClient,
    config: &Config,
    list_path: &std::path::Path,
    filter: Option<&YearFilter>,
) -> anyhow::Result<SyncReport> {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/blue} {pos}/{len} sent")
            .unwrap(),
    );

    let bar_for_cb = bar.clone();
    let progress: watchsync_core::sync::SyncProgressCallback = Arc::new(move |done: usize, total: usize| {
        bar_for_cb.set_length(total as u64);
        bar_for_cb.set_position(done as u64);
    });

    let report = import_urls(client, list_path, &config.tag, filter, Some(progress)).await?;
    bar.finish_and_clear();
    Ok(report)
}

fn print_summary(
    removed: Option<usize>,
    crawl: Option<&CrawlSummary>,
    synced: Option<&SyncReport>,
) {
    println!();
    println!("{}", "═".repeat(60).bright_blue().bold());
    println!("{}", "  RUN SUMMARY".bright_white().bold());
    println!("{}", "═".repeat(60).bright_blue().bold());

    match removed {
        Some(n) => println!("  Duplicate watches removed: {}", n),
        None => println!("  Reconcile phase: {}", "not run / aborted".dimmed()),
    }
    match crawl {
        Some(s) => println!(
            "  Pages visited: {} ({} saved, {} fetch failures)",
            s.visited, s.saved, s.failed
        ),
        None => println!("  Crawl phase: {}", "not run / aborted".dimmed()),
    }
    match synced {
        Some(r) => println!(
            "  Watches created: {} ({} failed, {} already watched)",
            r.created, r.failed, r.skipped_existing
        ),
        None => println!("  Sync phase: {}", "not run / aborted".dimmed()),
    }
    println!();
}
