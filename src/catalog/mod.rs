//! Channel catalogs: per-source accumulation and cross-source merging
//!
//! A catalog maps normalized channel names to their stream entries. Plain
//! and hotel runs use a flat `name → entries` shape; multicast runs nest
//! `name → region → stream type → urls`. All levels preserve first-seen
//! key order, and the innermost sequences reject structural duplicates on
//! insert.
//!
//! Merging is an order-sensitive left fold: for shared keys the left
//! side's entries stay in front and duplicates arriving from the right
//! are dropped, so the caller controls precedence by feeding per-source
//! catalogs in source-processing order.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::warn;

use crate::models::{StreamEntry, SubscribeMode};

/// stream type → urls
pub type MulticastTypeMap = IndexMap<String, Vec<String>>;
/// region → stream type → urls
pub type MulticastRegionMap = IndexMap<String, MulticastTypeMap>;

/// Catalog for plain and hotel runs: name → entries
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PlainCatalog {
    channels: IndexMap<String, Vec<StreamEntry>>,
}

impl PlainCatalog {
    /// Append an entry under `name` unless an identical one is already there
    pub fn push(&mut self, name: &str, entry: StreamEntry) {
        let entries = self.channels.entry(name.to_string()).or_default();
        if !entries.contains(&entry) {
            entries.push(entry);
        }
    }

    pub fn get(&self, name: &str) -> Option<&[StreamEntry]> {
        self.channels.get(name).map(Vec::as_slice)
    }

    /// Channel names in first-seen order
    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn entry_count(&self) -> usize {
        self.channels.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Fold `other` into `self`, keeping existing entries in front and
    /// dropping structural duplicates
    pub fn merge(&mut self, other: Self) {
        for (name, entries) in other.channels {
            let slot = self.channels.entry(name).or_default();
            for entry in entries {
                if !slot.contains(&entry) {
                    slot.push(entry);
                }
            }
        }
    }
}

/// Catalog for multicast runs: name → region → stream type → urls
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MulticastCatalog {
    channels: IndexMap<String, MulticastRegionMap>,
}

impl MulticastCatalog {
    /// Append a url under `(name, region, stream_type)` unless already there
    pub fn push(&mut self, name: &str, region: &str, stream_type: &str, url: String) {
        let urls = self
            .channels
            .entry(name.to_string())
            .or_default()
            .entry(region.to_string())
            .or_default()
            .entry(stream_type.to_string())
            .or_default();
        if !urls.contains(&url) {
            urls.push(url);
        }
    }

    pub fn get(&self, name: &str, region: &str, stream_type: &str) -> Option<&[String]> {
        self.channels
            .get(name)?
            .get(region)?
            .get(stream_type)
            .map(Vec::as_slice)
    }

    /// Channel names in first-seen order
    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn entry_count(&self) -> usize {
        self.channels
            .values()
            .flat_map(|regions| regions.values())
            .flat_map(|types| types.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Fold `other` into `self`, recursing the merge rule through the
    /// region and stream-type levels
    pub fn merge(&mut self, other: Self) {
        for (name, regions) in other.channels {
            let region_slot = self.channels.entry(name).or_default();
            for (region, types) in regions {
                let type_slot = region_slot.entry(region).or_default();
                for (stream_type, urls) in types {
                    let slot = type_slot.entry(stream_type).or_default();
                    for url in urls {
                        if !slot.contains(&url) {
                            slot.push(url);
                        }
                    }
                }
            }
        }
    }
}

/// The run-wide catalog, shaped once by the run's mode
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SubscribeCatalog {
    Plain(PlainCatalog),
    Multicast(MulticastCatalog),
}

impl SubscribeCatalog {
    pub fn empty(mode: SubscribeMode) -> Self {
        if mode.is_multicast() {
            Self::Multicast(MulticastCatalog::default())
        } else {
            Self::Plain(PlainCatalog::default())
        }
    }

    pub fn as_plain(&self) -> Option<&PlainCatalog> {
        match self {
            Self::Plain(catalog) => Some(catalog),
            Self::Multicast(_) => None,
        }
    }

    pub fn as_multicast(&self) -> Option<&MulticastCatalog> {
        match self {
            Self::Multicast(catalog) => Some(catalog),
            Self::Plain(_) => None,
        }
    }

    pub fn channel_count(&self) -> usize {
        match self {
            Self::Plain(catalog) => catalog.channel_count(),
            Self::Multicast(catalog) => catalog.channel_count(),
        }
    }

    pub fn entry_count(&self) -> usize {
        match self {
            Self::Plain(catalog) => catalog.entry_count(),
            Self::Multicast(catalog) => catalog.entry_count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Plain(catalog) => catalog.is_empty(),
            Self::Multicast(catalog) => catalog.is_empty(),
        }
    }

    /// Fold `other` into `self`
    ///
    /// Both sides of a run always share the same shape; a mismatch keeps
    /// the left side untouched rather than panicking.
    pub fn merge(&mut self, other: SubscribeCatalog) {
        match (self, other) {
            (Self::Plain(a), Self::Plain(b)) => a.merge(b),
            (Self::Multicast(a), Self::Multicast(b)) => a.merge(b),
            _ => warn!("cannot merge catalogs of different shapes; right side dropped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(url: &str, extra_info: &str) -> StreamEntry {
        StreamEntry::new(url).with_extra_info(extra_info)
    }

    #[test]
    fn duplicate_insertion_is_idempotent() {
        let mut catalog = PlainCatalog::default();
        catalog.push("CCTV1", entry("http://a/live", "x"));
        let snapshot = catalog.clone();
        catalog.push("CCTV1", entry("http://a/live", "x"));
        assert_eq!(catalog, snapshot);
        assert_eq!(catalog.entry_count(), 1);
    }

    #[test]
    fn entries_differing_in_extra_info_both_survive() {
        let mut catalog = PlainCatalog::default();
        catalog.push("CCTV1", entry("http://a/live", "x"));
        catalog.push("CCTV1", entry("http://a/live", "y"));
        assert_eq!(catalog.entry_count(), 2);
    }

    #[test]
    fn merge_keeps_left_entries_first_and_drops_duplicates() {
        let mut left = PlainCatalog::default();
        left.push("CCTV1", entry("http://a/live", ""));

        let mut right = PlainCatalog::default();
        right.push("CCTV1", entry("http://a/live", ""));
        right.push("CCTV1", entry("http://b/live", ""));
        right.push("CCTV2", entry("http://c/live", ""));

        left.merge(right);

        let cctv1 = left.get("CCTV1").unwrap();
        assert_eq!(cctv1.len(), 2);
        assert_eq!(cctv1[0].url, "http://a/live");
        assert_eq!(cctv1[1].url, "http://b/live");
        assert_eq!(left.get("CCTV2").unwrap().len(), 1);
    }

    #[test]
    fn merge_preserves_first_seen_channel_order() {
        let mut left = PlainCatalog::default();
        left.push("ESPN", entry("http://a/1", ""));
        left.push("CNN", entry("http://a/2", ""));

        let mut right = PlainCatalog::default();
        right.push("HBO", entry("http://b/1", ""));
        right.push("ESPN", entry("http://b/2", ""));

        left.merge(right);

        let names: Vec<&str> = left.channel_names().collect();
        assert_eq!(names, vec!["ESPN", "CNN", "HBO"]);
    }

    #[test]
    fn merge_is_associative_for_fixed_order() {
        let make = |url: &str, name: &str| {
            let mut catalog = PlainCatalog::default();
            catalog.push(name, entry(url, ""));
            catalog.push("SHARED", entry(url, "shared"));
            catalog
        };
        let a = make("http://a/live", "A");
        let b = make("http://b/live", "B");
        let c = make("http://c/live", "C");

        // (a ⊕ b) ⊕ c
        let mut left_assoc = a.clone();
        left_assoc.merge(b.clone());
        left_assoc.merge(c.clone());

        // a ⊕ (b ⊕ c)
        let mut bc = b;
        bc.merge(c);
        let mut right_assoc = a;
        right_assoc.merge(bc);

        assert_eq!(left_assoc, right_assoc);
        assert_eq!(
            left_assoc.channel_names().collect::<Vec<_>>(),
            right_assoc.channel_names().collect::<Vec<_>>()
        );
        let shared: Vec<&str> = left_assoc
            .get("SHARED")
            .unwrap()
            .iter()
            .map(|e| e.url.as_str())
            .collect();
        assert_eq!(shared, vec!["http://a/live", "http://b/live", "http://c/live"]);
    }

    #[test]
    fn multicast_dedup_and_nested_merge() {
        let mut left = MulticastCatalog::default();
        left.push("CCTV1", "广东", "组播", "rtp://239.0.0.1:5000".into());

        let mut right = MulticastCatalog::default();
        right.push("CCTV1", "广东", "组播", "rtp://239.0.0.1:5000".into());
        right.push("CCTV1", "广东", "单播", "http://a/live".into());
        right.push("CCTV1", "北京", "组播", "rtp://239.0.0.2:5000".into());

        left.merge(right);

        assert_eq!(left.get("CCTV1", "广东", "组播").unwrap().len(), 1);
        assert_eq!(left.get("CCTV1", "广东", "单播").unwrap().len(), 1);
        assert_eq!(left.get("CCTV1", "北京", "组播").unwrap().len(), 1);
        assert_eq!(left.entry_count(), 3);
    }

    #[test]
    fn empty_catalog_matches_mode() {
        assert!(SubscribeCatalog::empty(SubscribeMode::Plain).as_plain().is_some());
        assert!(SubscribeCatalog::empty(SubscribeMode::Hotel).as_plain().is_some());
        assert!(SubscribeCatalog::empty(SubscribeMode::Multicast)
            .as_multicast()
            .is_some());
    }

    #[test]
    fn mismatched_shapes_keep_left_side() {
        let mut plain = SubscribeCatalog::empty(SubscribeMode::Plain);
        if let SubscribeCatalog::Plain(catalog) = &mut plain {
            catalog.push("CCTV1", entry("http://a/live", ""));
        }
        plain.merge(SubscribeCatalog::empty(SubscribeMode::Multicast));
        assert_eq!(plain.entry_count(), 1);
    }
}
