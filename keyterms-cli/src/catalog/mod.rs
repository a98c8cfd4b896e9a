//! Transform key catalog
//!
//! Holds the transformation keys offered by the keyterms service and answers
//! the hierarchical availability queries used to pick a transformation:
//! sources, then targets for a source, then schemes for a (source, target)
//! pair, and finally the exact key for a full selection.
//!
//! Two indexes are kept: the full index over every key and the custom index
//! over keys flagged as curated. Both live in an immutable snapshot that is
//! rebuilt on every successful load and published with a single atomic swap,
//! so queries never observe a half-built index.

pub mod index;
pub mod key;

pub use index::{KeyIndex, sort_case_insensitive};
pub use key::{EndPoint, KeyParseError, KeyPath, Scheme, TransformKey};

use arc_swap::ArcSwap;
use async_trait::async_trait;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use log::{debug, error, info};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Backend collaborator that supplies the full key list
#[async_trait]
pub trait KeySource: Send + Sync {
    async fn fetch_keys(&self) -> anyhow::Result<Vec<TransformKey>>;
}

/// Immutable view of one loaded catalog
#[derive(Debug, Default)]
pub struct CatalogSnapshot {
    keys: Arc<Vec<TransformKey>>,
    full: KeyIndex,
    custom: KeyIndex,
}

impl CatalogSnapshot {
    /// Sort the keys by identifier and build both indexes from scratch
    pub fn build(mut keys: Vec<TransformKey>) -> Self {
        sort_case_insensitive(&mut keys, |k| k.text.as_str());

        let full = KeyIndex::build(&keys);
        let custom = KeyIndex::build(keys.iter().filter(|k| k.custom));

        debug!(
            "Built transform key indexes: {} full paths, {} custom paths",
            full.len(),
            custom.len()
        );

        Self {
            keys: Arc::new(keys),
            full,
            custom,
        }
    }

    /// Keys in display order
    pub fn keys(&self) -> &Arc<Vec<TransformKey>> {
        &self.keys
    }

    pub fn full(&self) -> &KeyIndex {
        &self.full
    }

    pub fn custom(&self) -> &KeyIndex {
        &self.custom
    }

    /// Full index when `all`, custom index otherwise
    pub fn index(&self, all: bool) -> &KeyIndex {
        if all { &self.full } else { &self.custom }
    }
}

type PendingLoad = Shared<BoxFuture<'static, Option<Arc<CatalogSnapshot>>>>;

/// Session-wide cache of transform keys with its lookup indexes
pub struct TransformCatalog {
    source: Arc<dyn KeySource>,
    snapshot: ArcSwap<CatalogSnapshot>,
    single_flight: bool,
    in_flight: Mutex<Option<PendingLoad>>,
}

impl TransformCatalog {
    /// Create an empty catalog backed by the given source
    pub fn new(source: Arc<dyn KeySource>) -> Self {
        Self {
            source,
            snapshot: ArcSwap::from_pointee(CatalogSnapshot::default()),
            single_flight: false,
            in_flight: Mutex::new(None),
        }
    }

    /// Share one outstanding fetch between concurrent forced loads
    ///
    /// When disabled, concurrent loads each fetch and the last response to
    /// arrive is the one that stays published.
    pub fn with_single_flight(mut self, enabled: bool) -> Self {
        self.single_flight = enabled;
        self
    }

    /// Load the key list, using the cache unless `force_refresh` is set
    ///
    /// A cached list is reused only when it holds at least one key. Fetch
    /// failures are logged and leave the current snapshot untouched; the
    /// previously cached list (possibly empty) is returned.
    pub async fn load(&self, force_refresh: bool) -> Arc<Vec<TransformKey>> {
        if !force_refresh {
            let current = self.snapshot.load();
            if !current.keys.is_empty() {
                debug!("Using {} cached transformation keys", current.keys.len());
                return Arc::clone(&current.keys);
            }
        }

        let loaded = if self.single_flight {
            self.fetch_shared().await
        } else {
            fetch_snapshot(Arc::clone(&self.source)).await
        };

        match loaded {
            Some(snapshot) => {
                let keys = Arc::clone(&snapshot.keys);
                self.snapshot.store(snapshot);
                keys
            }
            None => self.keys(),
        }
    }

    async fn fetch_shared(&self) -> Option<Arc<CatalogSnapshot>> {
        let pending = {
            let mut slot = self.in_flight.lock().await;
            match slot.as_ref() {
                Some(pending) => {
                    debug!("Joining in-flight transform key fetch");
                    pending.clone()
                }
                None => {
                    let pending = fetch_snapshot(Arc::clone(&self.source)).boxed().shared();
                    *slot = Some(pending.clone());
                    pending
                }
            }
        };

        let loaded = pending.clone().await;

        let mut slot = self.in_flight.lock().await;
        if slot.as_ref().is_some_and(|current| current.ptr_eq(&pending)) {
            *slot = None;
        }

        loaded
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.snapshot.load_full()
    }

    /// Currently cached keys in display order
    pub fn keys(&self) -> Arc<Vec<TransformKey>> {
        Arc::clone(&self.snapshot.load().keys)
    }

    /// Whether a load has cached at least one key
    pub fn is_loaded(&self) -> bool {
        !self.snapshot.load().keys.is_empty()
    }

    /// Every source when `all`, otherwise only sources of custom keys
    pub fn sources(&self, all: bool) -> Vec<String> {
        self.snapshot.load().index(all).sources().to_vec()
    }

    /// Targets reachable from `source` in the selected index
    pub fn targets(&self, source: Option<&str>, all: bool) -> Vec<String> {
        let Some(source) = selected(source) else {
            return Vec::new();
        };
        self.snapshot.load().index(all).targets(source).to_vec()
    }

    /// Schemes available between `source` and `target` in the selected index
    pub fn schemes(&self, source: Option<&str>, target: Option<&str>, all: bool) -> Vec<Scheme> {
        let (Some(source), Some(target)) = (selected(source), selected(target)) else {
            return Vec::new();
        };
        self.snapshot
            .load()
            .index(all)
            .schemes(source, target)
            .to_vec()
    }

    /// Exact key for a selection; a missing scheme means the default scheme
    ///
    /// Always resolved against the full index, so a selection made from the
    /// custom view still maps to its catalog key.
    pub fn resolve_key(
        &self,
        source: Option<&str>,
        target: Option<&str>,
        scheme: Option<&Scheme>,
    ) -> Option<TransformKey> {
        let (Some(source), Some(target)) = (selected(source), selected(target)) else {
            return None;
        };
        let path = KeyPath::new(source, target, scheme.cloned().unwrap_or_default());
        self.snapshot.load().full().get(&path).cloned()
    }
}

/// Treat an empty selection the same as no selection
fn selected(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

async fn fetch_snapshot(source: Arc<dyn KeySource>) -> Option<Arc<CatalogSnapshot>> {
    match source.fetch_keys().await {
        Ok(keys) => {
            let snapshot = CatalogSnapshot::build(keys);
            info!("Found {} transformation keys.", snapshot.keys.len());
            Some(Arc::new(snapshot))
        }
        Err(e) => {
            error!("Error getting text transformation keys: {:#}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    type Scripted = Result<Vec<TransformKey>, String>;

    /// Scripted key source: each fetch claims the next response when it starts
    struct FakeSource {
        responses: std::sync::Mutex<VecDeque<(Scripted, Option<Duration>)>>,
        fetches: AtomicUsize,
        delay: Option<Duration>,
        gate: Option<Arc<Notify>>,
    }

    impl FakeSource {
        fn new(responses: Vec<Scripted>) -> Self {
            Self::timed(responses.into_iter().map(|r| (r, None)).collect())
        }

        /// Responses that each take their own time to arrive
        fn timed(responses: Vec<(Scripted, Option<Duration>)>) -> Self {
            Self {
                responses: std::sync::Mutex::new(responses.into()),
                fetches: AtomicUsize::new(0),
                delay: None,
                gate: None,
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        fn with_gate(mut self, gate: Arc<Notify>) -> Self {
            self.gate = Some(gate);
            self
        }

        fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl KeySource for FakeSource {
        async fn fetch_keys(&self) -> anyhow::Result<Vec<TransformKey>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let next = self.responses.lock().unwrap().pop_front();
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            let Some((response, own_delay)) = next else {
                return Err(anyhow::anyhow!("no scripted response"));
            };
            if let Some(delay) = own_delay.or(self.delay) {
                tokio::time::sleep(delay).await;
            }
            response.map_err(|message| anyhow::anyhow!(message))
        }
    }

    fn key(source: &str, target: &str, scheme: &str, custom: bool, text: &str) -> TransformKey {
        TransformKey {
            source: EndPoint::new(source, ""),
            target: EndPoint::new(target, ""),
            scheme: Scheme::from_text(scheme),
            scheme_code: scheme.to_lowercase(),
            custom,
            text: text.to_string(),
        }
    }

    fn sample_keys() -> Vec<TransformKey> {
        vec![
            key("Cyrillic", "Latin", "", true, "cyr2lat"),
            key("Arabic", "Latin", "ALA-LC", false, "ar2lat-alalc"),
        ]
    }

    fn catalog_with(source: FakeSource) -> (TransformCatalog, Arc<FakeSource>) {
        let source = Arc::new(source);
        let catalog = TransformCatalog::new(source.clone());
        (catalog, source)
    }

    #[tokio::test]
    async fn test_sample_catalog_queries() {
        let (catalog, _) = catalog_with(FakeSource::new(vec![Ok(sample_keys())]));
        let keys = catalog.load(true).await;
        assert_eq!(keys.len(), 2);

        assert_eq!(catalog.sources(true), vec!["Arabic", "Cyrillic"]);
        assert_eq!(catalog.sources(false), vec!["Cyrillic"]);
        assert_eq!(catalog.targets(Some("Cyrillic"), false), vec!["Latin"]);
        assert!(catalog.targets(Some("Arabic"), false).is_empty());
        assert_eq!(
            catalog.schemes(Some("Arabic"), Some("Latin"), true),
            vec![Scheme::Named("ALA-LC".to_string())]
        );

        let alalc = Scheme::Named("ALA-LC".to_string());
        let resolved = catalog
            .resolve_key(Some("Arabic"), Some("Latin"), Some(&alalc))
            .unwrap();
        assert_eq!(resolved.text, "ar2lat-alalc");
        assert!(
            catalog
                .resolve_key(Some("Arabic"), Some("Latin"), Some(&Scheme::Default))
                .is_none()
        );
        assert!(catalog.resolve_key(Some("Arabic"), Some("Latin"), None).is_none());
    }

    #[tokio::test]
    async fn test_keys_sorted_by_text_case_insensitively() {
        let (catalog, _) = catalog_with(FakeSource::new(vec![Ok(vec![
            key("B", "X", "", false, "beta"),
            key("A", "X", "", false, "Alpha"),
            key("C", "X", "", false, "alpha"),
        ])]));
        let keys = catalog.load(true).await;
        let texts: Vec<&str> = keys.iter().map(|k| k.text.as_str()).collect();
        assert_eq!(texts, vec!["Alpha", "alpha", "beta"]);
    }

    #[tokio::test]
    async fn test_queries_empty_before_load() {
        let (catalog, source) = catalog_with(FakeSource::new(vec![]));
        assert!(!catalog.is_loaded());
        assert!(catalog.sources(true).is_empty());
        assert!(catalog.targets(Some("Cyrillic"), true).is_empty());
        assert!(catalog.schemes(Some("Cyrillic"), Some("Latin"), true).is_empty());
        assert!(catalog.resolve_key(Some("Cyrillic"), Some("Latin"), None).is_none());
        assert_eq!(source.fetches(), 0);
    }

    #[tokio::test]
    async fn test_empty_catalog() {
        let (catalog, _) = catalog_with(FakeSource::new(vec![Ok(Vec::new())]));
        assert!(catalog.load(true).await.is_empty());
        assert!(catalog.sources(true).is_empty());
        assert!(catalog.sources(false).is_empty());
        assert!(catalog.targets(Some("Cyrillic"), true).is_empty());
        assert!(catalog.resolve_key(Some("Cyrillic"), Some("Latin"), None).is_none());
    }

    #[tokio::test]
    async fn test_unset_selection_yields_nothing() {
        let (catalog, _) = catalog_with(FakeSource::new(vec![Ok(sample_keys())]));
        catalog.load(true).await;

        assert!(catalog.targets(None, true).is_empty());
        assert!(catalog.targets(Some(""), true).is_empty());
        assert!(catalog.schemes(Some("Cyrillic"), None, true).is_empty());
        assert!(catalog.schemes(None, Some("Latin"), true).is_empty());
        assert!(catalog.resolve_key(None, Some("Latin"), None).is_none());
        assert!(catalog.resolve_key(Some("Cyrillic"), Some(""), None).is_none());
        assert!(catalog.resolve_key(Some("Cyrillic"), Some("Latin"), None).is_some());
    }

    #[tokio::test]
    async fn test_cached_load_skips_fetch() {
        let (catalog, source) = catalog_with(FakeSource::new(vec![Ok(sample_keys())]));

        let first = catalog.load(true).await;
        let second = catalog.load(false).await;
        let third = catalog.load(false).await;

        assert_eq!(source.fetches(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&second, &third));
    }

    #[tokio::test]
    async fn test_unforced_load_fetches_when_cache_empty() {
        let (catalog, source) =
            catalog_with(FakeSource::new(vec![Ok(Vec::new()), Ok(sample_keys())]));

        assert!(catalog.load(false).await.is_empty());
        assert_eq!(catalog.load(false).await.len(), 2);
        assert_eq!(source.fetches(), 2);
    }

    #[tokio::test]
    async fn test_failed_first_load_then_recovery() {
        let (catalog, _) = catalog_with(FakeSource::new(vec![
            Err("connection refused".to_string()),
            Ok(sample_keys()),
        ]));

        assert!(catalog.load(false).await.is_empty());
        assert!(catalog.sources(true).is_empty());

        let keys = catalog.load(true).await;
        assert_eq!(keys.len(), 2);
        assert_eq!(catalog.sources(true), vec!["Arabic", "Cyrillic"]);
        assert_eq!(catalog.sources(false), vec!["Cyrillic"]);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_snapshot() {
        let (catalog, _) = catalog_with(FakeSource::new(vec![
            Ok(sample_keys()),
            Err("HTTP 503".to_string()),
        ]));

        let first = catalog.load(true).await;
        let after_failure = catalog.load(true).await;

        assert!(Arc::ptr_eq(&first, &after_failure));
        assert_eq!(catalog.sources(true), vec!["Arabic", "Cyrillic"]);
    }

    #[tokio::test]
    async fn test_reload_replaces_indexes() {
        let (catalog, _) = catalog_with(FakeSource::new(vec![
            Ok(sample_keys()),
            Ok(vec![key("Greek", "Latin", "", false, "gre2lat")]),
        ]));

        catalog.load(true).await;
        catalog.load(true).await;

        assert_eq!(catalog.sources(true), vec!["Greek"]);
        assert!(catalog.sources(false).is_empty());
        assert!(catalog.resolve_key(Some("Cyrillic"), Some("Latin"), None).is_none());
    }

    #[tokio::test]
    async fn test_duplicate_path_resolves_first_after_sort() {
        let (catalog, _) = catalog_with(FakeSource::new(vec![Ok(vec![
            key("Cyrillic", "Latin", "", false, "cyr2lat-z"),
            key("Cyrillic", "Latin", "", true, "cyr2lat-a"),
        ])]));

        let keys = catalog.load(true).await;
        assert_eq!(keys.len(), 2);
        let resolved = catalog.resolve_key(Some("Cyrillic"), Some("Latin"), None).unwrap();
        assert_eq!(resolved.text, "cyr2lat-a");
    }

    #[tokio::test]
    async fn test_custom_selection_resolves_through_full_index() {
        let (catalog, _) = catalog_with(FakeSource::new(vec![Ok(vec![
            key("Cyrillic", "Latin", "", false, "a-system"),
            key("Cyrillic", "Latin", "", true, "b-custom"),
        ])]));
        catalog.load(true).await;

        assert_eq!(catalog.targets(Some("Cyrillic"), false), vec!["Latin"]);
        let resolved = catalog.resolve_key(Some("Cyrillic"), Some("Latin"), None).unwrap();
        assert_eq!(resolved.text, "a-system");
        let custom = catalog.snapshot();
        let custom_key = custom
            .custom()
            .get(&KeyPath::new("Cyrillic", "Latin", Scheme::Default))
            .unwrap();
        assert_eq!(custom_key.text, "b-custom");
    }

    #[tokio::test]
    async fn test_custom_sources_subset_of_all() {
        let (catalog, _) = catalog_with(FakeSource::new(vec![Ok(vec![
            key("Hangul", "Latin", "RR", true, "kor-lat/rr"),
            key("hebrew", "Latin", "", false, "heb-lat"),
            key("Arabic", "Latin", "", true, "ara-lat"),
            key("Arabic", "Latin", "", false, "ara-lat-dup"),
            key("greek", "Latin", "", true, "gre-lat"),
        ])]));
        catalog.load(true).await;

        let all = catalog.sources(true);
        let custom = catalog.sources(false);
        assert_eq!(all, vec!["Arabic", "greek", "Hangul", "hebrew"]);
        assert_eq!(custom, vec!["Arabic", "greek", "Hangul"]);
        assert!(custom.iter().all(|s| all.contains(s)));
    }

    #[tokio::test]
    async fn test_readers_see_old_snapshot_during_load() {
        let gate = Arc::new(Notify::new());
        let (catalog, _) = catalog_with(
            FakeSource::new(vec![Ok(sample_keys())]).with_gate(gate.clone()),
        );

        let (keys, ()) = tokio::join!(catalog.load(true), async {
            assert!(catalog.sources(true).is_empty());
            gate.notify_one();
        });

        assert_eq!(keys.len(), 2);
        assert_eq!(catalog.sources(true).len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_forced_loads_last_response_wins() {
        // first request answers slowly, second quickly
        let (catalog, source) = catalog_with(FakeSource::timed(vec![
            (Ok(sample_keys()), Some(Duration::from_millis(80))),
            (
                Ok(vec![key("Greek", "Latin", "", true, "gre2lat")]),
                Some(Duration::from_millis(5)),
            ),
        ]));

        let (slow, fast) = tokio::join!(catalog.load(true), catalog.load(true));

        assert_eq!(source.fetches(), 2);
        assert_eq!(slow.len(), 2);
        assert_eq!(fast.len(), 1);
        assert_eq!(catalog.sources(true), vec!["Arabic", "Cyrillic"]);
        assert!(Arc::ptr_eq(&catalog.keys(), &slow));
        assert!(catalog.resolve_key(Some("Greek"), Some("Latin"), None).is_none());
    }

    #[tokio::test]
    async fn test_concurrent_forced_loads_fast_last_response_wins() {
        let (catalog, _) = catalog_with(FakeSource::timed(vec![
            (Ok(sample_keys()), Some(Duration::from_millis(5))),
            (
                Ok(vec![key("Greek", "Latin", "", true, "gre2lat")]),
                Some(Duration::from_millis(80)),
            ),
        ]));

        tokio::join!(catalog.load(true), catalog.load(true));

        assert_eq!(catalog.sources(true), vec!["Greek"]);
    }

    #[tokio::test]
    async fn test_schemes_differing_only_in_whitespace_stay_distinct() {
        let (catalog, _) = catalog_with(FakeSource::new(vec![Ok(vec![
            key("Greek", "Latin", "ISO", false, "el2lat-iso"),
            key("Greek", "Latin", "ISO ", false, "el2lat-iso-b"),
        ])]));
        catalog.load(true).await;

        let schemes = catalog.schemes(Some("Greek"), Some("Latin"), true);
        assert_eq!(schemes.len(), 2);

        let padded = Scheme::Named("ISO ".to_string());
        let resolved = catalog.resolve_key(Some("Greek"), Some("Latin"), Some(&padded));
        assert_eq!(resolved.map(|k| k.text), Some("el2lat-iso-b".to_string()));

        let plain = Scheme::Named("ISO".to_string());
        let resolved = catalog.resolve_key(Some("Greek"), Some("Latin"), Some(&plain));
        assert_eq!(resolved.map(|k| k.text), Some("el2lat-iso".to_string()));
    }

    #[tokio::test]
    async fn test_single_flight_shares_one_fetch() {
        let source = Arc::new(
            FakeSource::new(vec![Ok(sample_keys()), Ok(Vec::new())])
                .with_delay(Duration::from_millis(20)),
        );
        let catalog = TransformCatalog::new(source.clone()).with_single_flight(true);

        let (a, b) = tokio::join!(catalog.load(true), catalog.load(true));

        assert_eq!(source.fetches(), 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(catalog.sources(true), vec!["Arabic", "Cyrillic"]);

        // the guard is released once the shared fetch completes
        catalog.load(true).await;
        assert_eq!(source.fetches(), 2);
        assert!(catalog.sources(true).is_empty());
    }
}
