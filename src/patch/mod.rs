//! Clause insertion engine.
//!
//! This module turns incomplete switch regions into text insertions and
//! applies them with:
//! - A hard guard against patching regions that are already complete
//! - Span validation (bounds and UTF-8 boundaries)
//! - Back-to-front application so every offset refers to the original text
//!
//! Bytes outside the insertion points are never touched.

mod backup;

use crate::clause::PatchClause;
use crate::config::PatchConfig;
use crate::error::{Result, SwitchfixError};
use crate::locate::SwitchRegion;
use ropey::Rope;
use serde::Serialize;
use std::path::PathBuf;

pub use backup::{restore_from_manifest, BackupManifest, BackupWriter, BACKUP_DIR_NAME};

/// A clause to insert at a region's logical body end.
#[derive(Debug, Clone)]
pub struct Insertion {
    /// The region being patched.
    pub region: SwitchRegion,
    /// Rendered clause text.
    pub content: String,
}

impl Insertion {
    /// Insertion point in the original text.
    pub fn offset(&self) -> usize {
        self.region.body_end
    }
}

/// Where and how much a single insertion changes a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsertionReport {
    /// 1-based line of the insertion point in the original text.
    pub line: usize,
    /// Lines added by the clause.
    pub lines_added: usize,
    /// Bytes added by the clause.
    pub bytes_added: usize,
}

/// Render a clause for every incomplete region of `text`.
///
/// Complete regions are skipped; the classifier must have run first.
/// Clauses take the line ending of `text`'s first line.
pub fn plan_insertions(
    text: &str,
    regions: &[SwitchRegion],
    config: &PatchConfig,
) -> Vec<Insertion> {
    let clause = PatchClause::from_config(config).with_line_ending_of(text);
    let default_indent = " ".repeat(config.default_indent);
    regions
        .iter()
        .filter(|region| !region.is_complete)
        .map(|region| Insertion {
            region: region.clone(),
            content: clause.render(region.clause_indent.as_deref().unwrap_or(&default_indent)),
        })
        .collect()
}

/// Insert every clause into `original`, returning the new text.
///
/// Fails with `RegionAlreadyComplete` if any insertion targets a complete
/// region, `InvalidSpan` if an offset is out of bounds or splits a
/// character, and `OverlappingInsertions` if two share an offset. On
/// failure nothing is applied.
pub fn apply_clauses(original: &str, insertions: &[Insertion]) -> Result<String> {
    validate_insertions(original, insertions)?;

    let mut ordered: Vec<&Insertion> = insertions.iter().collect();
    ordered.sort_by_key(|insertion| std::cmp::Reverse(insertion.offset()));

    let mut rope = Rope::from_str(original);
    for insertion in ordered {
        let char_idx = rope.byte_to_char(insertion.offset());
        rope.insert(char_idx, &insertion.content);
    }

    Ok(rope.to_string())
}

/// Describe each insertion against the original text, in offset order.
pub fn describe_insertions(original: &str, insertions: &[Insertion]) -> Vec<InsertionReport> {
    let rope = Rope::from_str(original);
    let mut reports: Vec<(usize, InsertionReport)> = insertions
        .iter()
        .filter(|insertion| insertion.offset() <= original.len())
        .map(|insertion| {
            (
                insertion.offset(),
                InsertionReport {
                    line: rope.byte_to_line(insertion.offset()) + 1,
                    lines_added: insertion.content.matches('\n').count(),
                    bytes_added: insertion.content.len(),
                },
            )
        })
        .collect();
    reports.sort_by_key(|(offset, _)| *offset);
    reports.into_iter().map(|(_, report)| report).collect()
}

fn validate_insertions(original: &str, insertions: &[Insertion]) -> Result<()> {
    let mut offsets = Vec::with_capacity(insertions.len());
    for insertion in insertions {
        let region = &insertion.region;
        if region.is_complete {
            return Err(SwitchfixError::RegionAlreadyComplete {
                start: region.start,
                end: region.end,
            });
        }

        let offset = insertion.offset();
        if offset > original.len() || !original.is_char_boundary(offset) {
            return Err(SwitchfixError::InvalidSpan {
                file: PathBuf::from("<unknown>"),
                start: offset,
                end: offset,
            });
        }
        offsets.push(offset);
    }

    offsets.sort_unstable();
    if let Some(pair) = offsets.windows(2).find(|pair| pair[0] == pair[1]) {
        return Err(SwitchfixError::OverlappingInsertions { offset: pair[0] });
    }

    Ok(())
}
