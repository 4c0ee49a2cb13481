use crate::error::{Result, SyncError};
use crate::model::{NewWatch, Watch};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

const LIST_TIMEOUT: Duration = Duration::from_secs(60);
const MUTATE_TIMEOUT: Duration = Duration::from_secs(20);

/// Thin client for the watch service's `/api/v1/watch` surface.
///
/// Every request carries the static `x-api-key` header. Listing uses a
/// longer timeout than mutations because the collection response grows with
/// the number of watches.
pub struct WatchClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl WatchClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn watch_url(&self) -> String {
        format!("{}/api/v1/watch", self.base_url)
    }

    /// Fetch the whole watch collection as id -> entry.
    ///
    /// Values that are not objects or lack a `url` field are skipped rather
    /// than failing the whole fetch. The BTreeMap keeps iteration order
    /// deterministic within a call, which is what the reconciler's
    /// keep-the-first policy leans on.
    pub async fn list_watches(&self) -> Result<BTreeMap<String, Watch>> {
        let response = self
            .client
            .get(self.watch_url())
            .header("x-api-key", &self.api_key)
            .timeout(LIST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        let raw: BTreeMap<String, serde_json::Value> = response.json().await?;
        let watches = raw
            .into_iter()
            .filter_map(|(id, value)| {
                serde_json::from_value::<Watch>(value).ok().map(|w| (id, w))
            })
            .collect();
        Ok(watches)
    }

    pub async fn create_watch(&self, url: &str, tag: &str) -> Result<()> {
        debug!("POST watch for {}", url);
        let response = self
            .client
            .post(self.watch_url())
            .header("x-api-key", &self.api_key)
            .timeout(MUTATE_TIMEOUT)
            .json(&NewWatch { url, tag })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::ApiError {
                status,
                context: format!("create of {}", url),
            });
        }
        Ok(())
    }

    pub async fn delete_watch(&self, id: &str) -> Result<()> {
        debug!("DELETE watch {}", id);
        let response = self
            .client
            .delete(format!("{}/{}", self.watch_url(), id))
            .header("x-api-key", &self.api_key)
            .timeout(MUTATE_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::ApiError {
                status,
                context: format!("delete of {}", id),
            });
        }
        Ok(())
    }
}
