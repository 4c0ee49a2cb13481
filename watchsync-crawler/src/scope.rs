use crate::error::{CrawlError, Result};
use url::Url;

/// Decides which extracted hrefs stay inside the crawl and normalizes them.
///
/// A link is in scope when it contains the configured path marker (the site
/// subsection being mirrored), resolves against the site origin, and stays
/// on the origin's host. Fragments are stripped before comparison so that
/// `/page` and `/page#top` are the same URL.
#[derive(Debug, Clone)]
pub struct CrawlScope {
    origin: Url,
    marker: String,
}

impl CrawlScope {
    pub fn new(origin: &str, marker: &str) -> Result<Self> {
        let origin = Url::parse(origin)
            .map_err(|e| CrawlError::InvalidUrl(format!("{}: {}", origin, e)))?;
        if origin.host_str().is_none() {
            return Err(CrawlError::InvalidUrl(format!(
                "origin has no host: {}",
                origin
            )));
        }
        Ok(Self {
            origin,
            marker: marker.to_string(),
        })
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Resolve an href into a normalized in-scope URL, or None if the link
    /// falls outside the crawl scope.
    pub fn resolve(&self, href: &str) -> Option<String> {
        if href.is_empty() || !href.contains(&self.marker) {
            return None;
        }

        let resolved = if href.starts_with('/') {
            self.origin.join(href).ok()?
        } else {
            Url::parse(href).ok()?
        };

        // Links resolving off the site's own host are discarded.
        if resolved.host_str() != self.origin.host_str() {
            return None;
        }

        let mut url = resolved;
        url.set_fragment(None);
        Some(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> CrawlScope {
        CrawlScope::new("https://www.example.edu", "/programs/").unwrap()
    }

    #[test]
    fn root_relative_href_resolves_against_origin() {
        let url = scope().resolve("/programs/2024/intake");
        assert_eq!(
            url.as_deref(),
            Some("https://www.example.edu/programs/2024/intake")
        );
    }

    #[test]
    fn absolute_same_host_href_is_kept() {
        let url = scope().resolve("https://www.example.edu/programs/list");
        assert_eq!(url.as_deref(), Some("https://www.example.edu/programs/list"));
    }

    #[test]
    fn href_without_marker_is_rejected() {
        assert_eq!(scope().resolve("/admissions/contact"), None);
    }

    #[test]
    fn foreign_host_is_rejected_even_with_marker() {
        assert_eq!(scope().resolve("https://evil.example.com/programs/list"), None);
    }

    #[test]
    fn fragment_is_stripped() {
        let url = scope().resolve("/programs/list#section-3");
        assert_eq!(url.as_deref(), Some("https://www.example.edu/programs/list"));
    }

    #[test]
    fn fragment_only_difference_normalizes_to_same_url() {
        let s = scope();
        assert_eq!(s.resolve("/programs/list"), s.resolve("/programs/list#top"));
    }

    #[test]
    fn empty_href_is_rejected() {
        assert_eq!(scope().resolve(""), None);
    }
}
