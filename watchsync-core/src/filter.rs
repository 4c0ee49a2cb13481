use chrono::Datelike;
use std::collections::HashSet;

/// Decides whether a URL is still current based on year tokens embedded in
/// its path (e.g. `/editais/2024/ingresso`).
///
/// A URL with no recognizable year token is always allowed; the absence of
/// a year signal is not disqualifying. A URL that does carry year tokens is
/// allowed only when at least one of them belongs to the allowed set.
#[derive(Debug, Clone)]
pub struct YearFilter {
    allowed: HashSet<String>,
}

impl YearFilter {
    pub fn new(allowed: HashSet<String>) -> Self {
        Self { allowed }
    }

    /// Allowed set for "still relevant" content: the current year and the
    /// two before it. Built fresh every run, never cached across runs,
    /// because the current year obviously changes between invocations.
    pub fn recent(today: chrono::NaiveDate) -> Self {
        let year = today.year();
        let allowed = (year - 2..=year).map(|y| y.to_string()).collect();
        Self { allowed }
    }

    pub fn allowed_years(&self) -> Vec<String> {
        let mut years: Vec<String> = self.allowed.iter().cloned().collect();
        years.sort();
        years
    }

    pub fn is_allowed(&self, url: &str) -> bool {
        let mut found_any = false;
        for token in year_tokens(url) {
            found_any = true;
            if self.allowed.contains(&token) {
                return true;
            }
        }
        !found_any
    }
}

/// Yields every 4-digit substring of the form `20dd`.
fn year_tokens(url: &str) -> impl Iterator<Item = String> + '_ {
    let bytes = url.as_bytes();
    (0..bytes.len().saturating_sub(3)).filter_map(move |i| {
        let w = &bytes[i..i + 4];
        if w[0] == b'2' && w[1] == b'0' && w[2].is_ascii_digit() && w[3].is_ascii_digit() {
            Some(String::from_utf8_lossy(w).into_owned())
        } else {
            None
        }
    })
}
