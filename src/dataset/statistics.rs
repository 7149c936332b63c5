//! Accepted-patch distributions and source id assignment

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A key with its number of accepted patches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountEntry {
    /// Label or source url
    pub name: String,
    /// Number of accepted patches
    pub count: usize,
}

/// Counter ranking keys by count, ties broken by first observation
#[derive(Debug, Clone, Default)]
pub struct RankedCounter {
    // key -> (count, first-seen sequence number)
    entries: HashMap<String, (usize, u64)>,
    next_sequence: u64,
}

impl RankedCounter {
    /// Create an empty counter
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `key`
    pub fn increment(&mut self, key: &str) {
        if let Some((count, _)) = self.entries.get_mut(key) {
            *count += 1;
            return;
        }
        self.entries
            .insert(key.to_string(), (1, self.next_sequence));
        self.next_sequence += 1;
    }

    /// Occurrences of `key`
    pub fn count(&self, key: &str) -> usize {
        self.entries.get(key).map_or(0, |&(count, _)| count)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was counted
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries by descending count, then first-seen order
    pub fn ranked(&self) -> Vec<CountEntry> {
        let mut ranked: Vec<(&String, usize, u64)> = self
            .entries
            .iter()
            .map(|(name, &(count, sequence))| (name, count, sequence))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

        ranked
            .into_iter()
            .map(|(name, count, _)| CountEntry {
                name: name.clone(),
                count,
            })
            .collect()
    }
}

/// Label and source distributions of the accepted patches
#[derive(Debug, Clone, Default)]
pub struct DatasetStatistics {
    /// Accepted patches per composite label
    pub labels: RankedCounter,
    /// Accepted patches per source url
    pub sources: RankedCounter,
}

impl DatasetStatistics {
    /// Record one accepted patch
    pub fn record(&mut self, label: &str, url: &str) {
        self.labels.increment(label);
        self.sources.increment(url);
    }
}

/// One-based source ids in order of first acceptance
#[derive(Debug, Clone, Default)]
pub struct SourceIds {
    ids: HashMap<String, u32>,
    urls: Vec<String>,
}

impl SourceIds {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of `url`, assigning the next one on first use
    pub fn assign(&mut self, url: &str) -> u32 {
        if let Some(&id) = self.ids.get(url) {
            return id;
        }
        self.urls.push(url.to_string());
        let id = self.urls.len() as u32;
        self.ids.insert(url.to_string(), id);
        id
    }

    /// Url registered under `id`
    pub fn url(&self, id: u32) -> Option<&str> {
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        self.urls.get(index).map(String::as_str)
    }

    /// Number of registered sources
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Whether no source was registered
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Reverse mapping id -> url
    pub fn to_map(&self) -> BTreeMap<u32, String> {
        (1..)
            .zip(self.urls.iter())
            .map(|(id, url)| (id, url.clone()))
            .collect()
    }
}
