//! Completeness classifier.
//!
//! A switch body is complete when it already has a catch-all clause or a
//! case label for the sentinel variant. Either signal is enough, so a file
//! fixed by hand with one style is never patched again with the other.

use crate::config::PatchConfig;
use crate::locate::scan::{find_words, mask_non_code, skip_whitespace, word_at};
use crate::locate::SwitchRegion;

/// Which acceptance signal marked a body as complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletenessSignal {
    /// A `default:` clause is present.
    CatchAll,
    /// A `case Enum.sentinel` clause is present.
    SentinelCase,
}

/// Report the first acceptance signal found in `body`, if any.
///
/// Only code is inspected; strings and comments are masked out first.
pub fn completeness_signal(body: &str, config: &PatchConfig) -> Option<CompletenessSignal> {
    let masked = mask_non_code(body);
    if has_catch_all(&masked, config.catch_all.as_bytes()) {
        return Some(CompletenessSignal::CatchAll);
    }
    if has_sentinel_case(&masked, config) {
        return Some(CompletenessSignal::SentinelCase);
    }
    None
}

/// True when `body` handles the sentinel by either signal.
pub fn is_complete(body: &str, config: &PatchConfig) -> bool {
    completeness_signal(body, config).is_some()
}

/// Fill `is_complete` on every region from its body in `text`.
pub fn classify_regions(text: &str, regions: &mut [SwitchRegion], config: &PatchConfig) {
    for region in regions.iter_mut() {
        let signal = completeness_signal(region.body(text), config);
        log::debug!(
            "Switch at bytes {}..{}: {:?}",
            region.start,
            region.end,
            signal
        );
        region.is_complete = signal.is_some();
    }
}

// `default` followed by optional whitespace and `:`.
fn has_catch_all(masked: &[u8], keyword: &[u8]) -> bool {
    find_words(masked, keyword).any(|at| {
        let after = skip_whitespace(masked, at + keyword.len());
        masked.get(after) == Some(&b':')
    })
}

// `case` followed by `Enum.sentinel` as whole words, whitespace allowed around the dot.
fn has_sentinel_case(masked: &[u8], config: &PatchConfig) -> bool {
    let enum_name = config.enum_name.as_bytes();
    let sentinel = config.sentinel.as_bytes();
    find_words(masked, b"case").any(|at| {
        let name_at = skip_whitespace(masked, at + b"case".len());
        if name_at >= masked.len() || !word_at(masked, name_at, enum_name) {
            return false;
        }
        let dot_at = skip_whitespace(masked, name_at + enum_name.len());
        if masked.get(dot_at) != Some(&b'.') {
            return false;
        }
        let variant_at = skip_whitespace(masked, dot_at + 1);
        variant_at < masked.len() && word_at(masked, variant_at, sentinel)
    })
}
