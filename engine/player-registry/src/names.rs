use crate::types::{PlayerName, RegistryError, MAX_NAME_BATCH};
use savant_fetcher::fields::{int_field, text_field};
use savant_fetcher::{PlayerId, ProviderQuery, StatsProvider};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Resolves MLBAM IDs to display names in bounded batches
///
/// A failed batch is logged and skipped; its players simply stay unresolved
/// and fall back to a placeholder name.
pub struct NameResolver<P: StatsProvider> {
    provider: Arc<P>,
    batch_size: usize,
    request_delay: Duration,
}

impl<P: StatsProvider> NameResolver<P> {
    /// Create a new resolver; `batch_size` must be within 1..=200
    pub fn new(provider: Arc<P>, batch_size: usize) -> Result<Self, RegistryError> {
        if batch_size == 0 || batch_size > MAX_NAME_BATCH {
            return Err(RegistryError::InvalidBatchSize(batch_size));
        }
        Ok(Self { provider, batch_size, request_delay: Duration::ZERO })
    }

    /// Courtesy delay between batches
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    async fn resolve_batch(
        &self,
        batch: &[PlayerId],
    ) -> savant_fetcher::Result<Vec<(PlayerId, String)>> {
        let query = ProviderQuery::PeopleLookup { ids: batch.to_vec() };
        let rows = self.provider.query(&query).await?;

        Ok(rows
            .iter()
            .filter_map(|row| {
                let id = PlayerId::try_from(int_field(row, &["key_mlbam"]))
                    .ok()
                    .filter(|id| *id > 0)?;
                let name = PlayerName::new(
                    &text_field(row, &["name_first"]),
                    &text_field(row, &["name_last"]),
                );
                Some((id, name.display()?))
            })
            .collect())
    }

    /// Resolve every ID it can; misses are simply absent from the result
    pub async fn resolve<I>(&self, ids: I) -> BTreeMap<PlayerId, String>
    where
        I: IntoIterator<Item = PlayerId>,
    {
        let ids: Vec<PlayerId> =
            ids.into_iter().filter(|id| *id > 0).collect::<BTreeSet<_>>().into_iter().collect();
        info!("Looking up names for {} players...", ids.len());

        let mut names = BTreeMap::new();
        for (index, batch) in ids.chunks(self.batch_size).enumerate() {
            if index > 0 {
                sleep(self.request_delay).await;
            }
            match self.resolve_batch(batch).await {
                Ok(resolved) => {
                    for (id, name) in resolved {
                        if batch.contains(&id) {
                            names.entry(id).or_insert(name);
                        }
                    }
                }
                Err(e) => warn!("Name lookup failed for batch {}: {}", index + 1, e),
            }
        }

        info!("Found names for {}/{} players", names.len(), ids.len());
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use savant_fetcher::{FetchError, Row};
    use serde_json::json;
    use std::sync::Mutex;

    /// Answers people lookups from a fixed directory; batches containing `poison` fail
    struct Directory {
        people: BTreeMap<PlayerId, (&'static str, &'static str)>,
        poison: Option<PlayerId>,
        batches: Mutex<Vec<usize>>,
    }

    #[async_trait::async_trait]
    impl StatsProvider for Directory {
        async fn query(&self, query: &ProviderQuery) -> savant_fetcher::Result<Vec<Row>> {
            let ProviderQuery::PeopleLookup { ids } = query else {
                return Err(FetchError::invalid_request("unexpected query"));
            };
            self.batches.lock().unwrap().push(ids.len());
            if self.poison.is_some_and(|p| ids.contains(&p)) {
                return Err(FetchError::Status { status: 500, url: "people".to_string() });
            }

            Ok(ids
                .iter()
                .filter_map(|id| self.people.get(id).map(|name| (id, name)))
                .map(|(id, (first, last))| {
                    json!({"key_mlbam": id, "name_first": first, "name_last": last})
                        .as_object()
                        .cloned()
                        .unwrap()
                })
                .collect())
        }
    }

    fn directory(poison: Option<PlayerId>) -> Arc<Directory> {
        Arc::new(Directory {
            people: BTreeMap::from([
                (1, ("Aaron", "Judge")),
                (2, ("Mookie", "Betts")),
                (3, ("", "Nomiddle")),
                (4, ("Shohei", "Ohtani")),
            ]),
            poison,
            batches: Mutex::new(Vec::new()),
        })
    }

    #[tokio::test]
    async fn test_resolves_in_bounded_batches() {
        let provider = directory(None);
        let resolver = NameResolver::new(Arc::clone(&provider), 2).unwrap();

        let names = resolver.resolve([4, 1, 2, 3, 1, 5]).await;

        assert_eq!(names.get(&1).map(String::as_str), Some("Aaron Judge"));
        assert_eq!(names.get(&2).map(String::as_str), Some("Mookie Betts"));
        assert_eq!(names.get(&4).map(String::as_str), Some("Shohei Ohtani"));
        // Missing first name and unknown player
        assert!(!names.contains_key(&3));
        assert!(!names.contains_key(&5));

        // 5 distinct IDs in batches of 2
        assert_eq!(*provider.batches.lock().unwrap(), vec![2, 2, 1]);
    }

    #[tokio::test]
    async fn test_failed_batch_is_skipped() {
        let provider = directory(Some(1));
        let resolver = NameResolver::new(provider, 2).unwrap();

        // Batches: [1, 2] fails, [4] succeeds
        let names = resolver.resolve([1, 2, 4]).await;
        assert_eq!(names.len(), 1);
        assert_eq!(names[&4], "Shohei Ohtani");
    }

    #[test]
    fn test_batch_size_bounds() {
        assert!(NameResolver::new(directory(None), 0).is_err());
        assert!(NameResolver::new(directory(None), 201).is_err());
        assert_eq!(NameResolver::new(directory(None), 200).unwrap().batch_size(), 200);
    }
}
