//! Report search over the metadata records in the backing store.
//!
//! There is no separate index: the finder lists metadata keys, fetches the
//! records, and filters in memory. The fetch ceiling bounds how many
//! objects a single search may pull from the store; `include_ancient`
//! lifts it. Because listings are ordered newest-first, the bounded window
//! always covers the most recent reports.

use std::sync::Arc;

use tracing::{debug, warn};

use fieldpost_core::{normalize_tag, ReportError, ReportMetadata, ReportResult};
use fieldpost_storage::keys::{agent_prefix, is_metadata_key};
use fieldpost_storage::ReportStore;

/// What to search for. All filters are conjunctive; an empty criteria set
/// matches every report in the fetch window.
#[derive(Debug, Clone, Default)]
pub struct SearchCriteria {
    /// 4-character tag; compared case-insensitively.
    pub tag: Option<String>,
    pub agent_name: Option<String>,
    /// YYYY-MM-DD.
    pub date: Option<String>,
    pub hour: Option<u8>,
    pub minute: Option<u8>,
    /// Lift the fetch ceiling and scan the whole store.
    pub include_ancient: bool,
    /// Result cap; falls back to the configured default.
    pub max_results: Option<usize>,
}

impl SearchCriteria {
    pub fn for_tag(tag: impl Into<String>) -> Self {
        SearchCriteria {
            tag: Some(tag.into()),
            ..Default::default()
        }
    }
}

/// Searches reports by tag or by agent/time coordinates.
#[derive(Clone)]
pub struct ReportFinder {
    store: Arc<dyn ReportStore>,
    fetch_ceiling: usize,
    default_max_results: usize,
}

impl ReportFinder {
    pub fn new(store: Arc<dyn ReportStore>, fetch_ceiling: usize, default_max_results: usize) -> Self {
        ReportFinder {
            store,
            fetch_ceiling,
            default_max_results,
        }
    }

    /// Find all reports matching the criteria, newest first.
    ///
    /// Metadata records that fail to parse are skipped with a warning; one
    /// corrupt record never fails the whole search.
    pub async fn find(&self, criteria: &SearchCriteria) -> ReportResult<Vec<ReportMetadata>> {
        let prefix = criteria
            .agent_name
            .as_deref()
            .map(agent_prefix)
            .unwrap_or_default();
        let ceiling = if criteria.include_ancient {
            None
        } else {
            Some(self.fetch_ceiling)
        };

        let objects = self.store.list(&prefix, ceiling).await?;
        let normalized_tag = criteria.tag.as_deref().map(normalize_tag);

        let mut matches = Vec::new();
        for object in objects.iter().filter(|o| is_metadata_key(&o.key)) {
            let bytes = match self.store.fetch(&object.key).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(key = %object.key, error = %e, "Skipping unreadable metadata record");
                    continue;
                }
            };
            let meta: ReportMetadata = match serde_json::from_slice(&bytes) {
                Ok(meta) => meta,
                Err(e) => {
                    warn!(key = %object.key, error = %e, "Skipping corrupt metadata record");
                    continue;
                }
            };

            if let Some(tag) = &normalized_tag {
                if normalize_tag(&meta.tag) != *tag {
                    continue;
                }
            }
            if let Some(date) = &criteria.date {
                if &meta.date != date {
                    continue;
                }
            }
            if let Some(hour) = criteria.hour {
                if meta.hour != hour {
                    continue;
                }
            }
            if let Some(minute) = criteria.minute {
                if meta.minute != minute {
                    continue;
                }
            }
            matches.push(meta);
        }

        matches.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        let cap = criteria.max_results.unwrap_or(self.default_max_results);
        matches.truncate(cap);

        debug!(
            results = matches.len(),
            include_ancient = criteria.include_ancient,
            "Search completed"
        );
        Ok(matches)
    }

    /// Fetch exactly one report: the newest match, or `NotFound`.
    pub async fn get(&self, criteria: &SearchCriteria) -> ReportResult<ReportMetadata> {
        let mut matches = self.find(criteria).await?;
        if matches.is_empty() {
            let what = match &criteria.tag {
                Some(tag) => format!("no report with tag {}", normalize_tag(tag)),
                None => "no report matching the given coordinates".to_string(),
            };
            return Err(ReportError::NotFound(what));
        }
        Ok(matches.remove(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use fieldpost_core::ReportMode;
    use fieldpost_storage::keys::metadata_key;
    use fieldpost_storage::LocalStore;
    use tempfile::TempDir;

    async fn seed(
        store: &LocalStore,
        tag: &str,
        agent: &str,
        y: i32,
        mo: u32,
        d: u32,
        h: u32,
        mi: u32,
    ) -> ReportMetadata {
        let ts = Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap();
        let meta = ReportMetadata::new(
            tag.to_string(),
            agent.to_string(),
            format!("report by {agent}"),
            ts,
            "loc".to_string(),
            "host".to_string(),
            ReportMode::Local,
        );
        let bytes = serde_json::to_vec_pretty(&meta).unwrap();
        store
            .persist(&metadata_key(agent, ts), bytes, "application/json")
            .await
            .unwrap();
        meta
    }

    fn finder(store: LocalStore) -> ReportFinder {
        ReportFinder::new(Arc::new(store), 600, 20)
    }

    #[tokio::test]
    async fn finds_by_tag_case_insensitively() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path()).await.unwrap();
        seed(&store, "A1B2", "bot1", 2025, 3, 7, 14, 42).await;
        seed(&store, "ZZZZ", "bot2", 2025, 3, 7, 15, 0).await;

        let finder = finder(store);
        let got = finder.get(&SearchCriteria::for_tag("a1b2")).await.unwrap();
        assert_eq!(got.tag, "A1B2");
        assert_eq!(got.agent_name, "bot1");
    }

    #[tokio::test]
    async fn missing_tag_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path()).await.unwrap();
        seed(&store, "A1B2", "bot1", 2025, 3, 7, 14, 42).await;

        let finder = finder(store);
        let err = finder
            .get(&SearchCriteria::for_tag("XXXX"))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), "NotFound");
    }

    #[tokio::test]
    async fn coordinates_narrow_the_match() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path()).await.unwrap();
        seed(&store, "AAAA", "bot1", 2025, 3, 7, 14, 42).await;
        seed(&store, "BBBB", "bot1", 2025, 3, 7, 14, 43).await;
        seed(&store, "CCCC", "bot1", 2025, 3, 8, 14, 42).await;

        let finder = finder(store);
        let criteria = SearchCriteria {
            agent_name: Some("bot1".to_string()),
            date: Some("2025-03-07".to_string()),
            hour: Some(14),
            minute: Some(42),
            ..Default::default()
        };
        let results = finder.find(&criteria).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].tag, "AAAA");
    }

    #[tokio::test]
    async fn results_come_newest_first_and_capped() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path()).await.unwrap();
        for minute in 0..5 {
            seed(&store, "AAAA", "bot1", 2025, 3, 7, 10, minute).await;
        }

        let finder = finder(store);
        let criteria = SearchCriteria {
            agent_name: Some("bot1".to_string()),
            max_results: Some(3),
            ..Default::default()
        };
        let results = finder.find(&criteria).await.unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
        assert_eq!(results[0].minute, 4);
    }

    #[tokio::test]
    async fn ceiling_window_covers_the_newest_records() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path()).await.unwrap();
        // Written oldest-first; the mtime order matches.
        seed(&store, "AAAA", "bot1", 2025, 3, 5, 10, 0).await;
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        seed(&store, "BBBB", "bot1", 2025, 3, 6, 10, 0).await;
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        seed(&store, "CCCC", "bot1", 2025, 3, 7, 10, 0).await;

        let finder = ReportFinder::new(Arc::new(store), 2, 20);

        // The bounded fetch window holds the two newest records, so the
        // freshest tag resolves while the oldest falls outside it.
        let newest = finder.get(&SearchCriteria::for_tag("CCCC")).await.unwrap();
        assert_eq!(newest.tag, "CCCC");

        let err = finder
            .get(&SearchCriteria::for_tag("AAAA"))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), "NotFound");

        // include_ancient lifts the ceiling and finds it.
        let criteria = SearchCriteria {
            tag: Some("AAAA".to_string()),
            include_ancient: true,
            ..Default::default()
        };
        let ancient = finder.get(&criteria).await.unwrap();
        assert_eq!(ancient.tag, "AAAA");
    }

    #[tokio::test]
    async fn searching_twice_returns_the_same_results() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path()).await.unwrap();
        seed(&store, "AAAA", "bot1", 2025, 3, 7, 10, 0).await;
        seed(&store, "BBBB", "bot1", 2025, 3, 7, 11, 0).await;

        let finder = finder(store);
        let first = finder.find(&SearchCriteria::default()).await.unwrap();
        let second = finder.find(&SearchCriteria::default()).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn corrupt_metadata_is_skipped() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path()).await.unwrap();
        seed(&store, "AAAA", "bot1", 2025, 3, 7, 10, 0).await;
        store
            .persist(
                "bot1/2025-03-07_11-00-00/metadata.json",
                b"not json".to_vec(),
                "application/json",
            )
            .await
            .unwrap();

        let finder = finder(store);
        let results = finder.find(&SearchCriteria::default()).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].tag, "AAAA");
    }

    #[tokio::test]
    async fn agent_filter_ignores_other_agents() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path()).await.unwrap();
        seed(&store, "AAAA", "bot1", 2025, 3, 7, 10, 0).await;
        seed(&store, "BBBB", "bot2", 2025, 3, 7, 11, 0).await;

        let finder = finder(store);
        let criteria = SearchCriteria {
            agent_name: Some("bot2".to_string()),
            ..Default::default()
        };
        let results = finder.find(&criteria).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].tag, "BBBB");
    }
}
