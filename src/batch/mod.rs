//! Batch orchestration over the configured target files.
//!
//! Each file is loaded, located, classified, patched and written back
//! before the next one starts. Completeness is always re-derived from the
//! file on disk, so an interrupted run can simply be started again.

use crate::classify::classify_regions;
use crate::config::PatchConfig;
use crate::document::SourceDocument;
use crate::error::{Result, SwitchfixError};
use crate::locate::{find_switch_regions, SwitchRegion};
use crate::patch::{
    apply_clauses, describe_insertions, plan_insertions, BackupWriter, InsertionReport,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Per-file result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchOutcome {
    /// At least one clause was inserted (or would be, in a dry run).
    Updated,
    /// Every matched switch was already complete, or none matched.
    Unchanged,
    /// The path does not exist.
    NotFound,
    /// Reading or writing the file failed; the rest of the batch continued.
    Failed,
}

/// What happened to one target file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// Target path as listed in the configuration.
    pub target: PathBuf,
    /// Resolved path of the target.
    pub path: PathBuf,
    /// Outcome classification.
    pub outcome: BatchOutcome,
    /// Number of matching switch constructs found.
    pub regions_found: usize,
    /// Clauses inserted, in file order.
    pub insertions: Vec<InsertionReport>,
    /// SHA-256 before patching, when the file was read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_hash: Option<String>,
    /// SHA-256 after patching, when the file changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_hash: Option<String>,
    /// Error message for `Failed` outcomes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    fn new(target: &Path, path: &Path, outcome: BatchOutcome) -> Self {
        FileReport {
            target: target.to_path_buf(),
            path: path.to_path_buf(),
            outcome,
            regions_found: 0,
            insertions: Vec::new(),
            before_hash: None,
            after_hash: None,
            error: None,
        }
    }

    fn failed(target: &Path, path: &Path, err: &SwitchfixError) -> Self {
        FileReport {
            error: Some(err.to_string()),
            ..FileReport::new(target, path, BatchOutcome::Failed)
        }
    }
}

/// Outcome counts for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchCounts {
    /// Files updated.
    pub updated: usize,
    /// Files left unchanged.
    pub unchanged: usize,
    /// Files skipped because they do not exist.
    pub not_found: usize,
    /// Files that failed.
    pub failed: usize,
}

/// Aggregate result of a run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Per-file reports in target order.
    pub files: Vec<FileReport>,
    /// True when nothing was written.
    pub dry_run: bool,
    /// Manifest of the backup taken during this run, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_manifest: Option<PathBuf>,
}

impl BatchReport {
    /// Count files per outcome.
    pub fn counts(&self) -> BatchCounts {
        let mut counts = BatchCounts::default();
        for file in &self.files {
            match file.outcome {
                BatchOutcome::Updated => counts.updated += 1,
                BatchOutcome::Unchanged => counts.unchanged += 1,
                BatchOutcome::NotFound => counts.not_found += 1,
                BatchOutcome::Failed => counts.failed += 1,
            }
        }
        counts
    }

    /// True when any file failed.
    pub fn has_failures(&self) -> bool {
        self.files.iter().any(|f| f.outcome == BatchOutcome::Failed)
    }
}

/// Run-time switches for `run_batch`.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Directory relative targets are resolved against.
    pub root: PathBuf,
    /// Compute outcomes without writing anything.
    pub dry_run: bool,
    /// Abort the whole run on the first read or write failure.
    pub fail_fast: bool,
    /// Copy originals aside before rewriting them.
    pub create_backup: bool,
    /// Operation ID for the backup directory (UUID v4 when `None`).
    pub operation_id: Option<String>,
}

impl BatchOptions {
    /// Defaults: write in place, isolate failures, no backup.
    pub fn new(root: &Path) -> Self {
        BatchOptions {
            root: root.to_path_buf(),
            dry_run: false,
            fail_fast: false,
            create_backup: false,
            operation_id: None,
        }
    }
}

/// Result of running the pipeline over one text.
#[derive(Debug, Clone)]
pub struct TextPatch {
    /// Patched text (equal to the input when nothing was incomplete).
    pub text: String,
    /// Regions found, with completeness as classified before patching.
    pub regions: Vec<SwitchRegion>,
    /// Clauses inserted, in file order.
    pub insertions: Vec<InsertionReport>,
}

impl TextPatch {
    /// True when at least one clause was inserted.
    pub fn changed(&self) -> bool {
        !self.insertions.is_empty()
    }
}

/// Locate, classify and patch one text in memory.
pub fn patch_text(text: &str, config: &PatchConfig) -> Result<TextPatch> {
    let mut regions = find_switch_regions(text, &config.discriminants);
    if regions.len() > 1 {
        log::warn!(
            "Found {} switch regions on {:?}; patching each independently",
            regions.len(),
            config.discriminants
        );
    }
    classify_regions(text, &mut regions, config);

    let insertions = plan_insertions(text, &regions, config);
    if insertions.is_empty() {
        return Ok(TextPatch {
            text: text.to_string(),
            regions,
            insertions: Vec::new(),
        });
    }

    let patched = apply_clauses(text, &insertions)?;
    Ok(TextPatch {
        text: patched,
        insertions: describe_insertions(text, &insertions),
        regions,
    })
}

/// Process every configured target in order.
///
/// `on_file` is called as soon as each file's report is final, so callers
/// can print progress in target order. Missing files are skipped. Read and
/// write failures are recorded per file unless `options.fail_fast` is set,
/// in which case the first one aborts the run.
pub fn run_batch<F>(
    config: &PatchConfig,
    options: &BatchOptions,
    mut on_file: F,
) -> Result<BatchReport>
where
    F: FnMut(&FileReport),
{
    let mut backup: Option<BackupWriter> = None;
    let mut files = Vec::with_capacity(config.targets.len());

    for (target, path) in config.targets.iter().zip(config.resolve_targets(&options.root)) {
        let report = match process_file(target, &path, config, options, &mut backup) {
            Ok(report) => report,
            Err(err) if options.fail_fast => {
                log::error!("Aborting run at {}: {}", path.display(), err);
                if let Some(writer) = backup.take() {
                    finalize_backup(writer);
                }
                return Err(err);
            }
            Err(err) => {
                log::error!("Failed to process {}: {}", path.display(), err);
                FileReport::failed(target, &path, &err)
            }
        };
        on_file(&report);
        files.push(report);
    }

    let backup_manifest = backup.and_then(finalize_backup);
    let report = BatchReport {
        files,
        dry_run: options.dry_run,
        backup_manifest,
    };
    let counts = report.counts();
    log::info!(
        "Batch complete: {} updated, {} unchanged, {} not found, {} failed",
        counts.updated,
        counts.unchanged,
        counts.not_found,
        counts.failed
    );
    Ok(report)
}

fn process_file(
    target: &Path,
    path: &Path,
    config: &PatchConfig,
    options: &BatchOptions,
    backup: &mut Option<BackupWriter>,
) -> Result<FileReport> {
    let mut doc = match SourceDocument::load(path) {
        Ok(doc) => doc,
        Err(SwitchfixError::FileNotFound(_)) => {
            log::info!("Skipping {} (not found)", path.display());
            return Ok(FileReport::new(target, path, BatchOutcome::NotFound));
        }
        Err(err) => return Err(err.with_path(path)),
    };

    let patch = patch_text(doc.text(), config).map_err(|err| err.with_path(path))?;
    if patch.regions.is_empty() {
        log::debug!("No switch on {:?} in {}", config.discriminants, path.display());
    }

    let mut report = FileReport::new(target, path, BatchOutcome::Unchanged);
    report.regions_found = patch.regions.len();
    report.before_hash = Some(doc.loaded_hash());

    let insertions = patch.insertions.clone();
    doc.set_text(patch.text);
    if !doc.is_dirty() {
        log::info!("No changes for {}", path.display());
        return Ok(report);
    }

    report.outcome = BatchOutcome::Updated;
    report.insertions = insertions;
    report.after_hash = Some(doc.current_hash());
    if options.dry_run {
        log::info!("Would update {}", path.display());
        return Ok(report);
    }

    if options.create_backup {
        if backup.is_none() {
            *backup = Some(BackupWriter::new(&options.root, options.operation_id.clone())?);
        }
        if let Some(writer) = backup.as_mut() {
            writer.backup_contents(path, doc.loaded_text().as_bytes())?;
        }
    }

    doc.write_back()?;
    log::info!("Updated {}", path.display());
    Ok(report)
}

/// Located regions for one target, without patching.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// Target path as listed in the configuration.
    pub target: PathBuf,
    /// Resolved path of the target.
    pub path: PathBuf,
    /// False when the file does not exist.
    pub exists: bool,
    /// Regions with completeness classified.
    pub regions: Vec<ScannedRegion>,
}

/// A located region with its 1-based line span.
#[derive(Debug, Clone, Serialize)]
pub struct ScannedRegion {
    /// First line of the `switch` keyword.
    pub line_start: usize,
    /// Line of the closing brace.
    pub line_end: usize,
    /// The region itself.
    #[serde(flatten)]
    pub region: SwitchRegion,
}

/// Locate and classify regions in every target without writing anything.
pub fn scan_targets(config: &PatchConfig, root: &Path) -> Result<Vec<ScanReport>> {
    let mut reports = Vec::with_capacity(config.targets.len());
    for (target, path) in config.targets.iter().zip(config.resolve_targets(root)) {
        let doc = match SourceDocument::load(&path) {
            Ok(doc) => doc,
            Err(SwitchfixError::FileNotFound(_)) => {
                reports.push(ScanReport {
                    target: target.clone(),
                    path,
                    exists: false,
                    regions: Vec::new(),
                });
                continue;
            }
            Err(err) => return Err(err.with_path(&path)),
        };

        let text = doc.text();
        let mut regions = find_switch_regions(text, &config.discriminants);
        classify_regions(text, &mut regions, config);
        let regions = regions
            .into_iter()
            .map(|region| ScannedRegion {
                line_start: line_of(text, region.start),
                line_end: line_of(text, region.closing_brace()),
                region,
            })
            .collect();
        reports.push(ScanReport {
            target: target.clone(),
            path,
            exists: true,
            regions,
        });
    }
    Ok(reports)
}

fn line_of(text: &str, offset: usize) -> usize {
    text.as_bytes()[..offset].iter().filter(|&&b| b == b'\n').count() + 1
}

fn finalize_backup(writer: BackupWriter) -> Option<PathBuf> {
    if writer.is_empty() {
        return None;
    }
    match writer.finalize() {
        Ok(manifest) => Some(manifest),
        Err(err) => {
            log::error!("Failed to write backup manifest: {}", err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO_A: &str = "switch (level) { case A: return X; case B: return Y; }";

    fn level_config() -> PatchConfig {
        PatchConfig {
            discriminants: vec!["level".to_string()],
            ..PatchConfig::default()
        }
    }

    #[test]
    fn test_scenario_a_inserts_before_closing_brace() {
        let patch = patch_text(SCENARIO_A, &level_config()).expect("patch failed");

        assert!(patch.changed());
        assert_eq!(patch.regions.len(), 1);
        assert!(patch.text.starts_with("switch (level) { case A: return X; case B: return Y;\n"));
        assert!(patch.text.ends_with("Text('Finale level coming soon!')); }"));
        assert!(patch.text.contains("      case ScaffoldLevel.finale:\n"));
    }

    #[test]
    fn test_scenario_b_catch_all_is_unchanged() {
        let text = "switch (level) { case A: return X; default: return Z; }";
        let patch = patch_text(text, &level_config()).expect("patch failed");
        assert!(!patch.changed());
        assert_eq!(patch.text, text);
        assert!(patch.regions[0].is_complete);
    }

    #[test]
    fn test_scenario_c_second_pass_is_noop() {
        let config = level_config();
        let first = patch_text(SCENARIO_A, &config).expect("first pass failed");
        let second = patch_text(&first.text, &config).expect("second pass failed");
        assert!(!second.changed());
        assert_eq!(second.text, first.text);
    }

    #[test]
    fn test_crlf_file_gets_crlf_clause() {
        let text = "switch (level) {\r\n  case A:\r\n    return X;\r\n}\r\n";
        let patch = patch_text(text, &level_config()).expect("patch failed");

        assert!(patch.changed());
        assert_eq!(
            patch.text.matches('\n').count(),
            patch.text.matches("\r\n").count()
        );
        assert!(patch.text.contains("return X;\r\n  case ScaffoldLevel.finale:\r\n    // "));
        assert!(patch.text.ends_with("coming soon!'));\r\n}\r\n"));
    }

    #[test]
    fn test_tab_indented_switch_gets_tab_indented_clause() {
        let text = "\t\tswitch (level) {\n\t\t\tcase A:\n\t\t\t\treturn X;\n\t\t}\n";
        let patch = patch_text(text, &level_config()).expect("patch failed");

        assert!(patch
            .text
            .contains("return X;\n\t\t\tcase ScaffoldLevel.finale:\n\t\t\t\t// Finale"));
        assert!(patch.text.contains("\n\t\t\t\treturn const Center("));
        assert!(patch.text.ends_with("coming soon!'));\n\t\t}\n"));
    }

    #[test]
    fn test_no_match_returns_input() {
        let text = "void main() { print('hello'); }";
        let patch = patch_text(text, &PatchConfig::default()).expect("patch failed");
        assert!(patch.regions.is_empty());
        assert_eq!(patch.text, text);
    }

    #[test]
    fn test_counts_by_outcome() {
        let report = BatchReport {
            files: vec![
                FileReport::new(Path::new("a"), Path::new("/w/a"), BatchOutcome::Updated),
                FileReport::new(Path::new("b"), Path::new("/w/b"), BatchOutcome::NotFound),
                FileReport::new(Path::new("c"), Path::new("/w/c"), BatchOutcome::NotFound),
            ],
            dry_run: false,
            backup_manifest: None,
        };
        assert_eq!(
            report.counts(),
            BatchCounts {
                updated: 1,
                unchanged: 0,
                not_found: 2,
                failed: 0,
            }
        );
        assert!(!report.has_failures());
    }
}
