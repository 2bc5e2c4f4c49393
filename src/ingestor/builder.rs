//! Conversion of raw playlist tuples into catalog entries
//!
//! The builder applies the per-source context (mode, filter set,
//! whitelist membership, region/type metadata) to every raw tuple and
//! accumulates the survivors into a fresh per-source catalog.

use std::collections::HashSet;

use crate::catalog::SubscribeCatalog;
use crate::models::{EntryOrigin, StreamEntry, SubscribeMode, SubscribeSource, HOTEL_MARKER};
use crate::playlist::RawEntry;
use crate::utils::channel_name::format_channel_name;

pub struct EntryBuilder<'a> {
    mode: SubscribeMode,
    filter_names: Option<&'a HashSet<String>>,
    whitelisted: bool,
    region: &'a str,
    stream_type: &'a str,
}

impl<'a> EntryBuilder<'a> {
    pub fn new(
        mode: SubscribeMode,
        filter_names: Option<&'a HashSet<String>>,
        source: &'a SubscribeSource,
        whitelisted: bool,
    ) -> Self {
        Self {
            mode,
            filter_names,
            whitelisted,
            region: source.region.as_deref().unwrap_or(""),
            stream_type: source.stream_type.as_deref().unwrap_or(""),
        }
    }

    /// Fold raw entries into one source's catalog contribution
    pub fn accumulate(&self, raw_entries: Vec<RawEntry>) -> SubscribeCatalog {
        let mut catalog = SubscribeCatalog::empty(self.mode);
        for raw in raw_entries {
            self.push(&mut catalog, raw);
        }
        catalog
    }

    fn push(&self, catalog: &mut SubscribeCatalog, raw: RawEntry) {
        if raw.name.is_empty() || raw.url.is_empty() {
            return;
        }

        let name = format_channel_name(&raw.name);
        if let Some(filter) = self.filter_names {
            if !filter.contains(&name) {
                return;
            }
        }

        let (url, extra_info) = split_extra_info(&raw.url);
        match catalog {
            SubscribeCatalog::Multicast(multicast) => {
                multicast.push(&name, self.region, self.stream_type, url.to_string());
            }
            SubscribeCatalog::Plain(plain) => {
                let extra_info = if self.mode.is_hotel() {
                    format!("{}{}", self.region, HOTEL_MARKER)
                } else {
                    extra_info.to_string()
                };
                plain.push(
                    &name,
                    StreamEntry {
                        url: url.to_string(),
                        headers: raw.headers,
                        extra_info,
                        origin: self.whitelisted.then_some(EntryOrigin::Whitelist),
                    },
                );
            }
        }
    }
}

/// Split a playlist URL on the first `$`: the left part is the canonical
/// URL, the right part carries free-form extra info
pub(crate) fn split_extra_info(url: &str) -> (&str, &str) {
    match url.split_once('$') {
        Some((canonical, info)) => (canonical, info),
        None => (url, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, url: &str) -> RawEntry {
        RawEntry {
            name: name.to_string(),
            url: url.to_string(),
            headers: None,
        }
    }

    fn plain_source() -> SubscribeSource {
        SubscribeSource::new("http://example.com/list.m3u")
    }

    #[test]
    fn splits_url_on_first_dollar() {
        assert_eq!(split_extra_info("http://a/live$extra"), ("http://a/live", "extra"));
        assert_eq!(split_extra_info("http://a/live"), ("http://a/live", ""));
        assert_eq!(split_extra_info("http://a/live$x$y"), ("http://a/live", "x$y"));
    }

    #[test]
    fn empty_name_or_url_is_skipped() {
        let source = plain_source();
        let builder = EntryBuilder::new(SubscribeMode::Plain, None, &source, false);
        let catalog = builder.accumulate(vec![raw("", "http://a/live"), raw("ESPN", "")]);
        assert!(catalog.is_empty());
    }

    #[test]
    fn filter_names_drop_everything_else() {
        let source = plain_source();
        let filter: HashSet<String> = ["CNN".to_string()].into();
        let builder = EntryBuilder::new(SubscribeMode::Plain, Some(&filter), &source, false);
        let catalog = builder.accumulate(vec![
            raw("CNN", "http://a/cnn"),
            raw("ESPN", "http://a/espn"),
        ]);
        let plain = catalog.as_plain().unwrap();
        assert!(plain.get("CNN").is_some());
        assert!(plain.get("ESPN").is_none());
    }

    #[test]
    fn filter_matches_normalized_names() {
        let source = plain_source();
        let filter: HashSet<String> = ["CCTV1".to_string()].into();
        let builder = EntryBuilder::new(SubscribeMode::Plain, Some(&filter), &source, false);
        let catalog = builder.accumulate(vec![raw("cctv-1 综合", "http://a/cctv1")]);
        assert_eq!(catalog.as_plain().unwrap().get("CCTV1").unwrap().len(), 1);
    }

    #[test]
    fn plain_entry_carries_extra_info_and_headers() {
        let source = plain_source();
        let builder = EntryBuilder::new(SubscribeMode::Plain, None, &source, false);
        let mut entry = raw("ESPN", "http://a/live$backup");
        entry.headers = Some([("User-Agent".to_string(), "okhttp".to_string())].into());
        let catalog = builder.accumulate(vec![entry]);

        let entries = catalog.as_plain().unwrap().get("ESPN").unwrap();
        assert_eq!(entries[0].url, "http://a/live");
        assert_eq!(entries[0].extra_info, "backup");
        assert!(entries[0].headers.is_some());
        assert!(entries[0].origin.is_none());
    }

    #[test]
    fn whitelisted_source_tags_entries() {
        let source = plain_source();
        let builder = EntryBuilder::new(SubscribeMode::Plain, None, &source, true);
        let catalog = builder.accumulate(vec![raw("ESPN", "http://a/live")]);
        let entries = catalog.as_plain().unwrap().get("ESPN").unwrap();
        assert_eq!(entries[0].origin, Some(EntryOrigin::Whitelist));
    }

    #[test]
    fn hotel_mode_overwrites_extra_info_with_region_marker() {
        let source = SubscribeSource::new("http://example.com/hotel.m3u").with_region("北京");
        let builder = EntryBuilder::new(SubscribeMode::Hotel, None, &source, false);
        let catalog = builder.accumulate(vec![raw("CCTV1", "http://a/live$ignored")]);
        let entries = catalog.as_plain().unwrap().get("CCTV1").unwrap();
        assert_eq!(entries[0].extra_info, "北京酒店");
    }

    #[test]
    fn multicast_entries_are_bare_urls_under_region_and_type() {
        let source = SubscribeSource::new("http://example.com/rtp.txt")
            .with_region("广东")
            .with_stream_type("组播");
        // Whitelist tagging has nowhere to go on a bare URL; flag is ignored
        let builder = EntryBuilder::new(SubscribeMode::Multicast, None, &source, true);
        let catalog = builder.accumulate(vec![raw("CCTV1", "rtp://239.0.0.1:5000$tag")]);

        let multicast = catalog.as_multicast().unwrap();
        let urls = multicast.get("CCTV1", "广东", "组播").unwrap();
        assert_eq!(urls, ["rtp://239.0.0.1:5000"]);
    }

    #[test]
    fn duplicates_within_a_source_collapse() {
        let source = plain_source();
        let builder = EntryBuilder::new(SubscribeMode::Plain, None, &source, false);
        let catalog = builder.accumulate(vec![
            raw("ESPN", "http://a/live$x"),
            raw("ESPN", "http://a/live$x"),
            raw("ESPN", "http://a/live$y"),
        ]);
        assert_eq!(catalog.as_plain().unwrap().get("ESPN").unwrap().len(), 2);
    }
}
