//! Document store.
//!
//! Loads a target file into memory, tracks whether it changed, and writes
//! it back atomically (write temp + fsync + rename) only when it did.

use crate::error::{Result, SwitchfixError};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// In-memory copy of one target file.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    path: PathBuf,
    loaded: String,
    text: String,
    dirty: bool,
}

impl SourceDocument {
    /// Read a file from disk.
    ///
    /// Returns `FileNotFound` when the path does not exist so callers can
    /// treat it as a skip rather than a failure.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SwitchfixError::FileNotFound(path.to_path_buf())
            } else {
                SwitchfixError::Io {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;
        let text = String::from_utf8(bytes)
            .map_err(|e| SwitchfixError::Utf8(e.utf8_error()))?;
        Ok(Self::from_text(path, text))
    }

    /// Build a document from text already in memory.
    pub fn from_text(path: &Path, text: String) -> Self {
        SourceDocument {
            path: path.to_path_buf(),
            loaded: text.clone(),
            text,
            dirty: false,
        }
    }

    /// Path the document was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text as it was loaded (or last written back).
    pub fn loaded_text(&self) -> &str {
        &self.loaded
    }

    /// Replace the current text.
    pub fn set_text(&mut self, text: String) {
        self.text = text;
        self.dirty = self.text != self.loaded;
    }

    /// True iff the current text differs from what was loaded.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// SHA-256 of the text as loaded.
    pub fn loaded_hash(&self) -> String {
        compute_hash(self.loaded.as_bytes())
    }

    /// SHA-256 of the current text.
    pub fn current_hash(&self) -> String {
        compute_hash(self.text.as_bytes())
    }

    /// Write the document back if it changed. Returns whether a write happened.
    pub fn write_back(&mut self) -> Result<bool> {
        if !self.dirty {
            return Ok(false);
        }
        write_atomic(&self.path, self.text.as_bytes(), "switchfix").map_err(|source| {
            SwitchfixError::Write {
                path: self.path.clone(),
                source,
            }
        })?;
        self.loaded = self.text.clone();
        self.dirty = false;
        Ok(true)
    }
}

/// Compute SHA-256 hash of bytes.
pub(crate) fn compute_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let result = hasher.finalize();
    format!("{:x}", result)
}

pub(crate) fn write_atomic(file_path: &Path, content: &[u8], suffix: &str) -> std::io::Result<()> {
    let temp_path = temp_path_for(file_path, suffix)?;
    let written = (|| {
        let mut temp_file = File::create(&temp_path)?;
        temp_file.write_all(content)?;
        temp_file.sync_all()?;
        std::fs::rename(&temp_path, file_path)
    })();
    if written.is_err() {
        let _ = std::fs::remove_file(&temp_path);
    }
    written
}

fn temp_path_for(file_path: &Path, suffix: &str) -> std::io::Result<PathBuf> {
    let file_dir = file_path.parent().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "file has no parent directory")
    })?;
    let file_name = file_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("tmp");
    Ok(file_dir.join(format!(".{}.{}.tmp", file_name, suffix)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_dirty_tracks_content_not_writes() {
        let mut doc = SourceDocument::from_text(Path::new("a.dart"), "abc".to_string());
        assert!(!doc.is_dirty());

        doc.set_text("abcd".to_string());
        assert!(doc.is_dirty());

        doc.set_text("abc".to_string());
        assert!(!doc.is_dirty(), "Restoring the loaded text clears the flag");
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let workspace = TempDir::new().expect("Failed to create temp dir");
        let missing = workspace.path().join("missing.dart");

        match SourceDocument::load(&missing) {
            Err(SwitchfixError::FileNotFound(path)) => assert_eq!(path, missing),
            other => panic!("Expected FileNotFound, got: {:?}", other),
        }
    }

    #[test]
    fn test_write_back_only_when_dirty() {
        let workspace = TempDir::new().expect("Failed to create temp dir");
        let file = workspace.path().join("level.dart");
        fs::write(&file, "original").expect("Failed to write test file");

        let mut doc = SourceDocument::load(&file).expect("Failed to load");
        assert!(!doc.write_back().expect("write_back failed"));

        let before = doc.loaded_hash();
        doc.set_text("patched".to_string());
        assert_ne!(before, doc.current_hash());
        assert!(doc.write_back().expect("write_back failed"));
        assert!(!doc.is_dirty());

        let content = fs::read_to_string(&file).expect("Failed to read file");
        assert_eq!(content, "patched");
        assert!(
            !workspace.path().join(".level.dart.switchfix.tmp").exists(),
            "Temp file should be renamed away"
        );
    }
}
