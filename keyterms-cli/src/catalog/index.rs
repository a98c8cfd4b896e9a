//! Lookup index over transform keys
//!
//! Keys are stored under their composite (source, target, scheme) path. The
//! source list, targets per source and schemes per (source, target) are
//! derived once at build time and kept in case-insensitive order.

use super::key::{KeyPath, Scheme, TransformKey};
use log::debug;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// Stable sort comparing lower-cased text; original case is preserved
pub fn sort_case_insensitive<T, F>(items: &mut [T], text: F)
where
    F: Fn(&T) -> &str,
{
    items.sort_by_cached_key(|item| text(item).to_lowercase());
}

/// Read-only index built from a key list
#[derive(Debug, Clone, Default)]
pub struct KeyIndex {
    entries: HashMap<KeyPath, TransformKey>,
    sources: Vec<String>,
    targets: HashMap<String, Vec<String>>,
    schemes: HashMap<String, HashMap<String, Vec<Scheme>>>,
}

impl KeyIndex {
    /// Build an index from keys in display order
    ///
    /// The first key seen for a path wins; later keys with the same path are
    /// dropped.
    pub fn build<'a, I>(keys: I) -> Self
    where
        I: IntoIterator<Item = &'a TransformKey>,
    {
        let mut entries = HashMap::new();
        let mut inserted: Vec<KeyPath> = Vec::new();

        for key in keys {
            let path = key.path();
            match entries.entry(path.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(key.clone());
                    inserted.push(path);
                }
                Entry::Occupied(existing) => {
                    debug!(
                        "Dropping duplicate transform key '{}' (path {} already held by '{}')",
                        key.text,
                        key.path_label(),
                        existing.get().text
                    );
                }
            }
        }

        let mut sources = Vec::new();
        let mut targets: HashMap<String, Vec<String>> = HashMap::new();
        let mut schemes: HashMap<String, HashMap<String, Vec<Scheme>>> = HashMap::new();

        for path in inserted {
            let by_target = schemes.entry(path.source.clone()).or_insert_with(|| {
                sources.push(path.source.clone());
                HashMap::new()
            });
            let scheme_list = by_target.entry(path.target.clone()).or_insert_with(|| {
                targets
                    .entry(path.source.clone())
                    .or_default()
                    .push(path.target.clone());
                Vec::new()
            });
            scheme_list.push(path.scheme);
        }

        sort_case_insensitive(&mut sources, |s| s.as_str());
        for list in targets.values_mut() {
            sort_case_insensitive(list, |s| s.as_str());
        }
        for by_target in schemes.values_mut() {
            for list in by_target.values_mut() {
                sort_case_insensitive(list, |s| s.as_str());
            }
        }

        Self {
            entries,
            sources,
            targets,
            schemes,
        }
    }

    /// Number of distinct key paths
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sources in case-insensitive order
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Targets available for a source, empty when the source is unknown
    pub fn targets(&self, source: &str) -> &[String] {
        self.targets
            .get(source)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Schemes available for a (source, target) pair, empty when unknown
    pub fn schemes(&self, source: &str, target: &str) -> &[Scheme] {
        self.schemes
            .get(source)
            .and_then(|by_target| by_target.get(target))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Exact lookup by path
    pub fn get(&self, path: &KeyPath) -> Option<&TransformKey> {
        self.entries.get(path)
    }
}
