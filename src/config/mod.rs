//! Run configuration.
//!
//! The target list and clause template are plain values handed to the
//! batch orchestrator. `PatchConfig::default()` carries the embedded
//! exercise list; a JSON file may override any field.

use crate::error::{Result, SwitchfixError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Exercise files that switch on the scaffold level.
pub const DEFAULT_TARGETS: &[&str] = &[
    "math_app/lib/exercises/decompose_10_exercise.dart",
    "math_app/lib/exercises/count_objects_exercise.dart",
    "math_app/lib/exercises/count_forward_exercise.dart",
    "math_app/lib/exercises/order_cards_exercise.dart",
    "math_app/lib/exercises/what_comes_next_exercise.dart",
    "math_app/lib/exercises/place_numbers_exercise.dart",
];

/// Configuration for one patch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PatchConfig {
    /// Files to process, in order. Relative paths resolve against the run root.
    pub targets: Vec<PathBuf>,
    /// Identifiers a `switch (...)` header must end with to be matched.
    pub discriminants: Vec<String>,
    /// Enumeration type name qualifying the sentinel.
    pub enum_name: String,
    /// The variant that must be handled.
    pub sentinel: String,
    /// Keyword of the catch-all clause.
    pub catch_all: String,
    /// Comment line emitted inside the synthesized clause.
    pub comment: String,
    /// Placeholder statement emitted inside the synthesized clause.
    pub placeholder: String,
    /// Clause indentation used when the switch body has no case labels to copy from.
    pub default_indent: usize,
}

impl Default for PatchConfig {
    fn default() -> Self {
        PatchConfig {
            targets: DEFAULT_TARGETS.iter().map(PathBuf::from).collect(),
            discriminants: vec!["currentLevel".to_string(), "_currentLevel".to_string()],
            enum_name: "ScaffoldLevel".to_string(),
            sentinel: "finale".to_string(),
            catch_all: "default".to_string(),
            comment: "Finale level not yet implemented for this exercise".to_string(),
            placeholder: "return const Center(child: Text('Finale level coming soon!'));"
                .to_string(),
            default_indent: 6,
        }
    }
}

impl PatchConfig {
    /// Default configuration with an explicit target list.
    pub fn with_targets<I, P>(targets: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        PatchConfig {
            targets: targets.into_iter().map(Into::into).collect(),
            ..PatchConfig::default()
        }
    }

    /// Load and validate a configuration from a JSON file.
    ///
    /// Missing fields fall back to their defaults.
    pub fn load(config_path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(config_path).map_err(|e| SwitchfixError::Io {
            path: config_path.to_path_buf(),
            source: e,
        })?;
        let config: PatchConfig =
            serde_json::from_str(&contents).map_err(|err| SwitchfixError::InvalidConfig {
                message: format!("JSON parse error: {}", err),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every field can drive the locator and synthesizer.
    pub fn validate(&self) -> Result<()> {
        if self.targets.is_empty() {
            return Err(invalid("'targets' must list at least one file"));
        }
        if self.discriminants.is_empty() {
            return Err(invalid("'discriminants' must list at least one identifier"));
        }
        for name in &self.discriminants {
            if !is_identifier(name) {
                return Err(invalid(&format!(
                    "discriminant '{}' is not an identifier",
                    name
                )));
            }
        }
        for (field, value) in [
            ("enum_name", &self.enum_name),
            ("sentinel", &self.sentinel),
            ("catch_all", &self.catch_all),
        ] {
            if !is_identifier(value) {
                return Err(invalid(&format!(
                    "'{}' must be an identifier, got '{}'",
                    field, value
                )));
            }
        }
        if self.placeholder.trim().is_empty() {
            return Err(invalid("'placeholder' must not be empty"));
        }
        if self.comment.contains('\n') || self.placeholder.contains('\n') {
            return Err(invalid("'comment' and 'placeholder' must be single lines"));
        }
        Ok(())
    }

    /// Qualified sentinel name as it appears in a case label, e.g. `ScaffoldLevel.finale`.
    pub fn sentinel_label(&self) -> String {
        format!("{}.{}", self.enum_name, self.sentinel)
    }

    /// Resolve the target list against a root directory.
    pub fn resolve_targets(&self, root: &Path) -> Vec<PathBuf> {
        self.targets
            .iter()
            .map(|target| {
                if target.is_absolute() {
                    target.clone()
                } else {
                    root.join(target)
                }
            })
            .collect()
    }
}

fn invalid(message: &str) -> SwitchfixError {
    SwitchfixError::InvalidConfig {
        message: message.to_string(),
    }
}

/// Dart-style identifier: letters, digits, `_` or `$`, not starting with a digit.
pub(crate) fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
