use crate::error::Result;
use crate::scope::CrawlScope;
use crate::summary::CrawlSummary;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::{HashSet, VecDeque};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

const DEFAULT_USER_AGENT: &str = "watchsync/0.2 (+https://github.com/rokuma/watchsync)";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Breadth-first frontier crawler over one site subsection.
///
/// The frontier is an explicit FIFO queue paired with a seen-set, so every
/// URL is fetched at most once and traversal order is a design choice rather
/// than whatever a hash set happens to pop. Every successfully fetched URL
/// is appended to the output file and flushed before link extraction, so an
/// interrupted run keeps all progress made up to that point.
pub struct Crawler {
    client: Client,
    scope: CrawlScope,
    progress_callback: Option<ProgressCallback>,
}

impl Crawler {
    pub fn new(scope: CrawlScope) -> Result<Self> {
        Self::with_timeout(scope, DEFAULT_TIMEOUT_SECS, false)
    }

    /// Build a crawler with an explicit per-request timeout. Some university
    /// hosts serve stale certificate chains, so certificate verification can
    /// be switched off for the crawl client only.
    pub fn with_timeout(scope: CrawlScope, timeout_secs: u64, accept_invalid_certs: bool) -> Result<Self> {
        let client = Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .danger_accept_invalid_certs(accept_invalid_certs)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            scope,
            progress_callback: None,
        })
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Traverse the crawl scope starting from `seeds`, persisting every
    /// successfully fetched URL to `output_path` (truncated at start, one
    /// URL per line, flushed line by line).
    pub async fn crawl(&self, seeds: &[String], output_path: &Path) -> Result<CrawlSummary> {
        let mut frontier: VecDeque<String> = VecDeque::new();
        let mut seen: HashSet<String> = HashSet::new();

        for seed in seeds {
            if seen.insert(seed.clone()) {
                frontier.push_back(seed.clone());
            }
        }

        let mut output = File::create(output_path)?;
        let mut summary = CrawlSummary::new(output_path.to_path_buf());

        info!(
            "Starting crawl of {} (marker {:?}), saving to {}",
            self.scope.origin(),
            self.scope.marker(),
            output_path.display()
        );

        while let Some(url) = frontier.pop_front() {
            summary.visited += 1;

            if let Some(ref callback) = self.progress_callback {
                callback(summary.visited, url.clone());
            }

            let body = match self.fetch_page(&url).await {
                Ok(body) => body,
                Err(e) => {
                    error!("Failed to fetch {}: {}", url, e);
                    summary.failed += 1;
                    continue;
                }
            };

            // Persist before extracting so a crash never loses this page.
            output.write_all(url.as_bytes())?;
            output.write_all(b"\n")?;
            output.flush()?;
            summary.saved += 1;

            for link in extract_links(&body, &self.scope) {
                if seen.insert(link.clone()) {
                    debug!("Queuing {}", link);
                    frontier.push_back(link);
                }
            }
        }

        info!(
            "Crawl complete. Visited {} pages, saved {}, {} fetch failures",
            summary.visited, summary.saved, summary.failed
        );
        Ok(summary)
    }

    async fn fetch_page(&self, url: &str) -> std::result::Result<String, reqwest::Error> {
        debug!("Fetching {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        response.text().await
    }
}

/// Pull every `a[href]` out of a document and keep the in-scope ones,
/// normalized by the crawl scope.
fn extract_links(html: &str, scope: &CrawlScope) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").expect("static selector");

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| scope.resolve(href))
        .collect()
}
