//! Playlist format detection and raw entry extraction
//!
//! Two wire formats are handled: extended M3U (`#EXTM3U` header with
//! `#EXTINF` metadata lines) and the delimited `name,url` text format used
//! by plain-text subscription lists. Extraction yields raw (name, url,
//! headers) tuples; normalization and filtering happen downstream in the
//! entry builder.

use std::collections::HashMap;

use regex::Regex;
use tracing::debug;

/// One (name, url, headers) tuple extracted from playlist text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub name: String,
    pub url: String,
    pub headers: Option<HashMap<String, String>>,
}

/// Wire format of a fetched playlist body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistFormat {
    M3u,
    Txt,
}

impl PlaylistFormat {
    /// Detect the format of fetched playlist content
    pub fn detect(content: &str) -> Self {
        if content.contains("#EXTM3U") {
            Self::M3u
        } else {
            Self::Txt
        }
    }
}

/// Extractor for raw channel tuples from playlist text
pub struct PlaylistParser {
    extinf: Regex,
    vlcopt: Regex,
}

impl PlaylistParser {
    pub fn new() -> Self {
        Self {
            // Attribute lists may contain commas inside quotes; the
            // channel title is everything after the last comma
            extinf: Regex::new(r"^#EXTINF:.*,(?P<name>[^,]*)$").unwrap(),
            vlcopt: Regex::new(r"^#EXTVLCOPT:http-(user-agent|referrer)=(.+)$").unwrap(),
        }
    }

    /// Extract raw entries from playlist content
    ///
    /// `headers_enabled` gates `#EXTVLCOPT`/`#EXTHTTP` header capture and
    /// is only meaningful for M3U content.
    pub fn extract(
        &self,
        content: &str,
        format: PlaylistFormat,
        headers_enabled: bool,
    ) -> Vec<RawEntry> {
        match format {
            PlaylistFormat::M3u => self.extract_m3u(content, headers_enabled),
            PlaylistFormat::Txt => self.extract_txt(content),
        }
    }

    fn extract_m3u(&self, content: &str, headers_enabled: bool) -> Vec<RawEntry> {
        let mut entries = Vec::new();
        let mut current_name: Option<String> = None;
        let mut current_headers: HashMap<String, String> = HashMap::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(caps) = self.extinf.captures(line) {
                current_name = Some(caps["name"].trim().to_string());
                current_headers.clear();
                continue;
            }

            if line.starts_with('#') {
                if headers_enabled {
                    self.capture_header_line(line, &mut current_headers);
                }
                continue;
            }

            // Anything else is a stream URL for the pending EXTINF line
            match current_name.take() {
                Some(name) => {
                    let headers = if headers_enabled && !current_headers.is_empty() {
                        Some(std::mem::take(&mut current_headers))
                    } else {
                        current_headers.clear();
                        None
                    };
                    entries.push(RawEntry {
                        name,
                        url: line.to_string(),
                        headers,
                    });
                }
                None => debug!("stream URL without EXTINF metadata: {}", line),
            }
        }

        entries
    }

    fn capture_header_line(&self, line: &str, headers: &mut HashMap<String, String>) {
        if let Some(caps) = self.vlcopt.captures(line) {
            let key = match &caps[1] {
                "user-agent" => "User-Agent",
                _ => "Referer",
            };
            headers.insert(key.to_string(), caps[2].trim().to_string());
        } else if let Some(blob) = line.strip_prefix("#EXTHTTP:") {
            match serde_json::from_str::<HashMap<String, String>>(blob.trim()) {
                Ok(parsed) => headers.extend(parsed),
                Err(e) => debug!("unparseable #EXTHTTP header blob: {}", e),
            }
        }
    }

    fn extract_txt(&self, content: &str) -> Vec<RawEntry> {
        let mut entries = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((name, url)) = line.split_once(',') else {
                continue;
            };
            let url = url.trim();
            // Category separator lines ("央视频道,#genre#") are not channels
            if url.starts_with("#genre#") {
                continue;
            }
            entries.push(RawEntry {
                name: name.trim().to_string(),
                url: url.to_string(),
                headers: None,
            });
        }

        entries
    }
}

impl Default for PlaylistParser {
    fn default() -> Self {
        Self::new()
    }
}
