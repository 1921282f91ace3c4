//! Switch region locator.
//!
//! Finds every `switch (...) { ... }` construct whose discriminant ends in
//! one of the configured identifiers. Boundaries come from a bracket-depth
//! scan over the masked text, not from pattern matching, so nested blocks
//! and braces inside strings or comments never shift the closing delimiter.
//!
//! A switch nested inside a matched switch's body is not reported on its
//! own; scanning resumes after the outer construct.

pub(crate) mod scan;

use scan::{
    find_words, is_ident_byte, mask_non_code, matching_close, skip_whitespace, word_at,
};
use serde::Serialize;

/// Byte span of one switch construct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitchRegion {
    /// Offset of the `switch` keyword (inclusive).
    pub start: usize,
    /// Offset just past the closing `}` (exclusive).
    pub end: usize,
    /// Offset just past the opening `{`.
    pub body_start: usize,
    /// Logical end of the body: just past its last non-whitespace byte.
    pub body_end: usize,
    /// Literal indentation (spaces and tabs) of the first case label, when
    /// it starts its own line.
    pub clause_indent: Option<String>,
    /// Set by the classifier.
    pub is_complete: bool,
}

impl SwitchRegion {
    /// The body text between the braces.
    pub fn body<'a>(&self, text: &'a str) -> &'a str {
        &text[self.body_start..self.closing_brace()]
    }

    /// Offset of the closing `}`.
    pub fn closing_brace(&self) -> usize {
        self.end - 1
    }
}

/// Locate every switch construct keyed on one of `discriminants`.
///
/// Returns an empty list when nothing matches.
pub fn find_switch_regions<S: AsRef<str>>(text: &str, discriminants: &[S]) -> Vec<SwitchRegion> {
    let masked = mask_non_code(text);
    let mut regions = Vec::new();
    let mut resume_at = 0;

    for keyword_at in find_words(&masked, b"switch") {
        if keyword_at < resume_at {
            continue;
        }

        let Some((header_open, header_close)) = header_span(&masked, keyword_at) else {
            continue;
        };
        if !header_matches(&masked[header_open + 1..header_close], discriminants) {
            continue;
        }

        let brace_open = skip_whitespace(&masked, header_close + 1);
        if masked.get(brace_open) != Some(&b'{') {
            continue;
        }
        let Some(brace_close) = matching_close(&masked, brace_open, b'{', b'}') else {
            log::warn!(
                "Unterminated switch at byte {}: no closing brace before end of text",
                keyword_at
            );
            break;
        };

        let body_start = brace_open + 1;
        let body_end = body_start + text[body_start..brace_close].trim_end().len();
        let region = SwitchRegion {
            start: keyword_at,
            end: brace_close + 1,
            body_start,
            body_end,
            clause_indent: first_case_indent(text, &masked, body_start, brace_close),
            is_complete: false,
        };
        log::debug!(
            "Matched switch at bytes {}..{} (body ends at {})",
            region.start,
            region.end,
            region.body_end
        );
        resume_at = region.end;
        regions.push(region);
    }

    regions
}

/// Parenthesis offsets of the header following a `switch` keyword.
fn header_span(masked: &[u8], keyword_at: usize) -> Option<(usize, usize)> {
    let open = skip_whitespace(masked, keyword_at + b"switch".len());
    if masked.get(open) != Some(&b'(') {
        return None;
    }
    let close = matching_close(masked, open, b'(', b')')?;
    Some((open, close))
}

/// True when the header expression's trailing identifier is a discriminant.
///
/// `widget.currentLevel` and `currentLevel!` both end in `currentLevel`.
fn header_matches<S: AsRef<str>>(header: &[u8], discriminants: &[S]) -> bool {
    let trimmed = header.trim_ascii_end();
    let trimmed = match trimmed.strip_suffix(b"!") {
        Some(rest) => rest.trim_ascii_end(),
        None => trimmed,
    };
    let ident_start = trimmed
        .iter()
        .rposition(|&b| !is_ident_byte(b))
        .map_or(0, |p| p + 1);
    let ident = &trimmed[ident_start..];
    discriminants
        .iter()
        .any(|name| !ident.is_empty() && ident == name.as_ref().as_bytes())
}

fn first_case_indent(
    text: &str,
    masked: &[u8],
    body_start: usize,
    body_close: usize,
) -> Option<String> {
    let case_at = (body_start..body_close).find(|&at| word_at(masked, at, b"case"))?;
    let line_start = text[..case_at].rfind('\n').map_or(0, |p| p + 1);
    let prefix = &text[line_start..case_at];
    if prefix.chars().all(|c| c == ' ' || c == '\t') {
        Some(prefix.to_string())
    } else {
        None
    }
}
