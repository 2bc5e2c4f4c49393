//! Channel name normalization
//!
//! Channel names arriving from different playlists spell the same channel
//! in many ways ("CCTV-1 综合", "cctv1", "CCTV1高清"). The normalized form
//! is the grouping key used by the catalog, so normalization must be
//! deterministic and idempotent.

use std::sync::OnceLock;

use regex::Regex;

/// Quality/decoration suffixes stripped from the end of a name,
/// longest first so compound forms win over their substrings
const DECORATION_SUFFIXES: &[&str] = &["超高清", "高清", "超清", "标清", "FHD", "UHD", "HD", "4K", "8K"];

fn cctv_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(CCTV\d+\+?)").unwrap())
}

/// Normalize a raw channel name into its canonical catalog key
///
/// Folds full-width alphanumerics to ASCII, uppercases ASCII letters,
/// removes whitespace and separator punctuation, strips quality
/// decorations, and reduces CCTV channels to their `CCTV<n>` stem.
pub fn format_channel_name(raw: &str) -> String {
    let mut name = String::with_capacity(raw.len());
    for ch in raw.trim().chars() {
        let ch = fold_full_width(ch);
        if ch.is_whitespace() || matches!(ch, '-' | '_' | '·' | '•') {
            continue;
        }
        if ch.is_ascii_lowercase() {
            name.push(ch.to_ascii_uppercase());
        } else {
            name.push(ch);
        }
    }

    let stripped = strip_decorations(&name);
    // A name that was nothing but decoration keeps its pre-strip form
    let name = if stripped.is_empty() { name.as_str() } else { stripped };

    if let Some(caps) = cctv_pattern().captures(name) {
        return caps[1].to_string();
    }
    name.to_string()
}

fn fold_full_width(ch: char) -> char {
    match ch {
        '０'..='９' | 'Ａ'..='Ｚ' | 'ａ'..='ｚ' => {
            // Full-width forms sit at a fixed offset from ASCII
            char::from_u32(ch as u32 - 0xFEE0).unwrap_or(ch)
        }
        '－' => '-',
        _ => ch,
    }
}

fn strip_decorations(name: &str) -> &str {
    let mut current = name;
    loop {
        let mut changed = false;
        for suffix in DECORATION_SUFFIXES {
            if let Some(rest) = current.strip_suffix(suffix) {
                current = rest;
                changed = true;
            }
        }
        if !changed {
            return current;
        }
    }
}
