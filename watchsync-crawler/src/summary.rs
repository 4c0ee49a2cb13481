use std::path::PathBuf;

/// Outcome of a traversal run, for the caller's summary line.
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    /// URLs that completed a fetch attempt (success or failure).
    pub visited: usize,
    /// URLs written to the persisted list (successful fetches only).
    pub saved: usize,
    /// Individual fetch failures that were skipped.
    pub failed: usize,
    /// Where the persisted list was written.
    pub output_path: PathBuf,
}

impl CrawlSummary {
    pub fn new(output_path: PathBuf) -> Self {
        Self {
            visited: 0,
            saved: 0,
            failed: 0,
            output_path,
        }
    }
}
