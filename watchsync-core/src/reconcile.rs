use crate::client::WatchClient;
use crate::error::Result;
use tracing::{error, info, warn};

/// Remove redundant watch entries that point at the same URL.
///
/// Entries are grouped by URL in the collection's own iteration order; the
/// first entry of each group survives and every later one is deleted. Which
/// duplicate survives is arbitrary but deterministic within a call. Each
/// delete is independent: one failure does not stop the remaining deletes.
///
/// Only the initial collection fetch is fatal for this phase. Returns the
/// number of entries actually deleted, which is zero on a second pass over
/// an unchanged collection.
pub async fn remove_duplicates(client: &WatchClient) -> Result<usize> {
    let watches = client.list_watches().await?;

    // Group ids by URL, preserving first-encountered order inside a group.
    let mut by_url: Vec<(String, Vec<String>)> = Vec::new();
    for (id, watch) in watches {
        match by_url.iter_mut().find(|(url, _)| *url == watch.url) {
            Some((_, ids)) => ids.push(id),
            None => by_url.push((watch.url, vec![id])),
        }
    }

    let mut deleted = 0;
    for (url, ids) in by_url {
        if ids.len() < 2 {
            continue;
        }
        warn!(
            "Duplicate watches for {}: keeping {}, deleting {} other(s)",
            url,
            ids[0],
            ids.len() - 1
        );
        for id in &ids[1..] {
            match client.delete_watch(id).await {
                Ok(()) => {
                    info!("Deleted duplicate watch {}", id);
                    deleted += 1;
                }
                Err(e) => error!("Failed to delete watch {}: {}", id, e),
            }
        }
    }

    if deleted == 0 {
        info!("No duplicate watches found");
    } else {
        info!("Removed {} duplicate watch(es)", deleted);
    }
    Ok(deleted)
}
