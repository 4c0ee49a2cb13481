use crate::client::WatchClient;
use crate::error::Result;
use crate::filter::YearFilter;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

pub type SyncProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Delay between consecutive creation calls, to stay inside the watch
/// service's rate tolerance.
const CREATE_THROTTLE: Duration = Duration::from_millis(50);

/// Outcome counts of one sync pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub created: usize,
    pub failed: usize,
    pub skipped_existing: usize,
}

/// Create a watch for every persisted URL not yet represented remotely.
///
/// The remote collection is fetched once and turned into a URL set; the
/// persisted list is read from disk, optionally narrowed by the year
/// filter, and the set difference is sent as creation calls in
/// lexicographic order with a fixed tag. URLs already present remotely are
/// never re-sent, whatever tag they carry. Individual creation failures are
/// counted and logged, never retried, and never stop the loop.
///
/// Fatal for this phase only: the collection fetch failing, or the
/// persisted list being missing.
pub async fn import_urls(
    client: &WatchClient,
    list_path: &Path,
    tag: &str,
    filter: Option<&YearFilter>,
    progress: Option<SyncProgressCallback>,
) -> Result<SyncReport> {
    info!("Fetching existing watches before import");
    let existing: HashSet<String> = client
        .list_watches()
        .await?
        .into_values()
        .map(|w| w.url)
        .collect();
    info!("Found {} URL(s) already watched", existing.len());

    let local = read_url_list(list_path)?;
    let eligible: HashSet<String> = match filter {
        Some(f) => local.into_iter().filter(|u| f.is_allowed(u)).collect(),
        None => local,
    };

    let mut candidates: Vec<String> = eligible.difference(&existing).cloned().collect();
    candidates.sort();

    if candidates.is_empty() {
        info!("No new URLs to import");
        return Ok(SyncReport {
            skipped_existing: existing.len(),
            ..SyncReport::default()
        });
    }

    info!("Importing {} new URL(s)", candidates.len());
    let total = candidates.len();
    let mut report = SyncReport {
        skipped_existing: existing.len(),
        ..SyncReport::default()
    };

    for (i, url) in candidates.iter().enumerate() {
        match client.create_watch(url, tag).await {
            Ok(()) => report.created += 1,
            Err(e) => {
                error!("Failed to create watch for {}: {}", url, e);
                report.failed += 1;
            }
        }
        if let Some(ref callback) = progress {
            callback(i + 1, total);
        }
        tokio::time::sleep(CREATE_THROTTLE).await;
    }

    info!(
        "Import finished: {} created, {} failed",
        report.created, report.failed
    );
    Ok(report)
}

/// Read the persisted URL list: one URL per line, blank lines dropped.
fn read_url_list(path: &Path) -> Result<HashSet<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}
