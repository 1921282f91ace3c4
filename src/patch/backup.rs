//! Backup and undo support for patch runs.
//!
//! Before a target file is rewritten its original bytes can be copied to
//! `.switchfix-backup/<operation_id>/`, with a manifest tracking each
//! file's location and hash. `switchfix undo` restores from that manifest.

use crate::document::{compute_hash, write_atomic};
use crate::error::{Result, SwitchfixError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory under the run root holding backups.
pub const BACKUP_DIR_NAME: &str = ".switchfix-backup";

const MANIFEST_FILE: &str = "manifest.json";

/// Metadata about a backed-up file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupEntry {
    /// Original path of the file (relative to the run root).
    pub original_path: PathBuf,
    /// SHA-256 hash of the original file content.
    pub hash: String,
    /// Byte count of the original file.
    pub size: u64,
}

/// Manifest describing one backup operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupManifest {
    /// Unique identifier for this operation.
    pub operation_id: String,
    /// Timestamp when the backup was created (RFC 3339).
    pub timestamp: String,
    /// Files that were backed up.
    pub files: Vec<BackupEntry>,
    /// Absolute path to the backup directory.
    #[serde(skip)]
    pub backup_dir: PathBuf,
}

impl BackupManifest {
    /// Create an empty manifest stamped with the current time.
    pub fn new(operation_id: String, backup_dir: PathBuf) -> Self {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        BackupManifest {
            operation_id,
            timestamp,
            files: Vec::new(),
            backup_dir,
        }
    }

    /// Record a backed-up file.
    pub fn add_file(&mut self, original_path: PathBuf, hash: String, size: u64) {
        self.files.push(BackupEntry {
            original_path,
            hash,
            size,
        });
    }

    /// Write `manifest.json` into the backup directory.
    pub fn save(&self) -> Result<()> {
        let manifest_path = self.backup_dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(self).map_err(|e| SwitchfixError::Backup {
            message: format!("Failed to serialize manifest: {}", e),
        })?;
        fs::write(&manifest_path, json).map_err(|e| SwitchfixError::Io {
            path: manifest_path,
            source: e,
        })
    }

    /// Load a manifest; its directory becomes the backup directory.
    pub fn load(manifest_path: &Path) -> Result<Self> {
        let json = fs::read_to_string(manifest_path).map_err(|e| SwitchfixError::Io {
            path: manifest_path.to_path_buf(),
            source: e,
        })?;

        let mut manifest: BackupManifest =
            serde_json::from_str(&json).map_err(|e| SwitchfixError::Backup {
                message: format!("Failed to parse manifest: {}", e),
            })?;

        manifest.backup_dir = manifest_path
            .parent()
            .ok_or_else(|| SwitchfixError::Backup {
                message: "Manifest has no parent directory".to_string(),
            })?
            .to_path_buf();

        Ok(manifest)
    }
}

/// Copies original file contents aside before they are rewritten.
pub struct BackupWriter {
    manifest: BackupManifest,
    root: PathBuf,
}

impl BackupWriter {
    /// Create the backup directory for a new operation.
    ///
    /// A UUID v4 is used when `operation_id` is `None`.
    pub fn new(root: &Path, operation_id: Option<String>) -> Result<Self> {
        let op_id = operation_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let backup_dir = root.join(BACKUP_DIR_NAME).join(&op_id);

        fs::create_dir_all(&backup_dir).map_err(|e| SwitchfixError::Io {
            path: backup_dir.clone(),
            source: e,
        })?;

        Ok(BackupWriter {
            manifest: BackupManifest::new(op_id, backup_dir),
            root: root.to_path_buf(),
        })
    }

    /// Operation ID for this backup.
    pub fn operation_id(&self) -> &str {
        &self.manifest.operation_id
    }

    /// Path the manifest is written to by `finalize`.
    pub fn manifest_path(&self) -> PathBuf {
        self.manifest.backup_dir.join(MANIFEST_FILE)
    }

    /// Store `content` as the original bytes of `file_path`.
    ///
    /// The directory layout below the run root is preserved, so files with
    /// the same name in different directories do not collide.
    pub fn backup_contents(&mut self, file_path: &Path, content: &[u8]) -> Result<()> {
        let relative = file_path
            .strip_prefix(&self.root)
            .map_err(|_| SwitchfixError::Backup {
                message: format!(
                    "File '{}' is not under root '{}'",
                    file_path.display(),
                    self.root.display()
                ),
            })?
            .to_path_buf();

        let backup_path = self.manifest.backup_dir.join(&relative);
        if let Some(parent) = backup_path.parent() {
            fs::create_dir_all(parent).map_err(|e| SwitchfixError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        fs::write(&backup_path, content).map_err(|e| SwitchfixError::Io {
            path: backup_path.clone(),
            source: e,
        })?;

        log::debug!("Backed up {} to {}", file_path.display(), backup_path.display());
        self.manifest
            .add_file(relative, compute_hash(content), content.len() as u64);
        Ok(())
    }

    /// Number of files backed up so far.
    pub fn len(&self) -> usize {
        self.manifest.files.len()
    }

    /// True when nothing has been backed up.
    pub fn is_empty(&self) -> bool {
        self.manifest.files.is_empty()
    }

    /// Write the manifest and return its path.
    pub fn finalize(self) -> Result<PathBuf> {
        self.manifest.save()?;
        Ok(self.manifest_path())
    }
}

/// Restore every file listed in a manifest. Returns the number restored.
///
/// Each backup is checked against its recorded hash before anything is
/// written, so a tampered backup restores nothing.
pub fn restore_from_manifest(manifest_path: &Path, root: &Path) -> Result<usize> {
    let manifest = BackupManifest::load(manifest_path)?;

    let mut verified = Vec::with_capacity(manifest.files.len());
    for entry in &manifest.files {
        let backup_path = manifest.backup_dir.join(&entry.original_path);
        if !backup_path.exists() {
            return Err(SwitchfixError::Backup {
                message: format!("Backup file missing: {}", backup_path.display()),
            });
        }

        let content = fs::read(&backup_path).map_err(|e| SwitchfixError::Io {
            path: backup_path.clone(),
            source: e,
        })?;

        let actual_hash = compute_hash(&content);
        if actual_hash != entry.hash {
            return Err(SwitchfixError::Backup {
                message: format!(
                    "Hash mismatch for {}: expected {}, got {}",
                    entry.original_path.display(),
                    entry.hash,
                    actual_hash
                ),
            });
        }
        verified.push((root.join(&entry.original_path), content));
    }

    for (original_path, content) in &verified {
        if let Some(parent) = original_path.parent() {
            fs::create_dir_all(parent).map_err(|e| SwitchfixError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        write_atomic(original_path, content, "restore").map_err(|source| {
            SwitchfixError::Write {
                path: original_path.clone(),
                source,
            }
        })?;
        log::info!("Restored {}", original_path.display());
    }

    Ok(verified.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_backup_writer_creates_manifest() {
        let workspace = TempDir::new().expect("Failed to create temp dir");
        let root = workspace.path();
        let target = root.join("level.dart");

        let mut writer = BackupWriter::new(root, Some("op-123".to_string()))
            .expect("Failed to create BackupWriter");
        writer
            .backup_contents(&target, b"switch (currentLevel) {}")
            .expect("Failed to back up");
        assert_eq!(writer.len(), 1);

        let manifest_path = writer.finalize().expect("Failed to finalize backup");
        assert!(manifest_path.exists(), "Manifest file should exist");

        let backup_file = root.join(".switchfix-backup/op-123/level.dart");
        let backup_content = fs::read_to_string(&backup_file).expect("Failed to read backup");
        assert_eq!(backup_content, "switch (currentLevel) {}");
    }

    #[test]
    fn test_restore_from_manifest_restores_files() {
        let workspace = TempDir::new().expect("Failed to create temp dir");
        let root = workspace.path();
        let lib = root.join("lib");
        fs::create_dir(&lib).expect("Failed to create lib dir");
        let target = lib.join("a.dart");
        fs::write(&target, "original").expect("Failed to write test file");

        let mut writer =
            BackupWriter::new(root, Some("restore".to_string())).expect("Failed to create writer");
        writer
            .backup_contents(&target, b"original")
            .expect("Failed to back up");
        let manifest_path = writer.finalize().expect("Failed to finalize");

        fs::write(&target, "patched").expect("Failed to modify file");

        let restored = restore_from_manifest(&manifest_path, root).expect("Failed to restore");
        assert_eq!(restored, 1);
        assert_eq!(fs::read_to_string(&target).expect("read"), "original");
    }

    #[test]
    fn test_restore_hash_mismatch_fails() {
        let workspace = TempDir::new().expect("Failed to create temp dir");
        let root = workspace.path();
        let target = root.join("a.dart");
        fs::write(&target, "patched").expect("Failed to write test file");

        let mut writer =
            BackupWriter::new(root, Some("tamper".to_string())).expect("Failed to create writer");
        writer
            .backup_contents(&target, b"original")
            .expect("Failed to back up");
        let manifest_path = writer.finalize().expect("Failed to finalize");

        fs::write(root.join(".switchfix-backup/tamper/a.dart"), b"tampered")
            .expect("Failed to tamper with backup");

        match restore_from_manifest(&manifest_path, root) {
            Err(SwitchfixError::Backup { message }) if message.contains("Hash mismatch") => {}
            other => panic!("Expected hash mismatch error, got: {:?}", other),
        }
        assert_eq!(
            fs::read_to_string(&target).expect("read"),
            "patched",
            "Nothing is restored when verification fails"
        );
    }

    #[test]
    fn test_backup_outside_root_is_rejected() {
        let workspace = TempDir::new().expect("Failed to create temp dir");
        let mut writer = BackupWriter::new(workspace.path(), None).expect("Failed to create writer");
        assert!(!writer.operation_id().is_empty());
        assert!(writer
            .backup_contents(Path::new("/elsewhere/a.dart"), b"x")
            .is_err());
        assert!(writer.is_empty());
    }

    #[test]
    fn test_manifest_save_and_load() {
        let workspace = TempDir::new().expect("Failed to create temp dir");
        let backup_dir = workspace.path().join(".switchfix-backup").join("m");
        fs::create_dir_all(&backup_dir).expect("Failed to create dir");

        let mut manifest = BackupManifest::new("m".to_string(), backup_dir.clone());
        manifest.add_file(PathBuf::from("lib/a.dart"), "abc123".to_string(), 42);
        manifest.save().expect("Failed to save manifest");

        let loaded =
            BackupManifest::load(&backup_dir.join("manifest.json")).expect("Failed to load");
        assert_eq!(loaded.operation_id, "m");
        assert_eq!(loaded.files.len(), 1);
        assert_eq!(loaded.files[0].original_path, PathBuf::from("lib/a.dart"));
        assert_eq!(loaded.files[0].size, 42);
        assert_eq!(loaded.backup_dir, backup_dir);
    }
}
