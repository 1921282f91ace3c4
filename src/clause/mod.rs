//! Fallback clause synthesis.

use crate::config::PatchConfig;

/// Template for the clause handling the sentinel variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchClause {
    label: String,
    comment: String,
    placeholder: String,
    line_ending: &'static str,
}

impl PatchClause {
    /// Build the template from configuration, with `\n` line endings.
    pub fn from_config(config: &PatchConfig) -> Self {
        PatchClause {
            label: format!("case {}:", config.sentinel_label()),
            comment: format!("// {}", config.comment),
            placeholder: config.placeholder.clone(),
            line_ending: "\n",
        }
    }

    /// Use the line ending of the first line of `text`.
    pub fn with_line_ending_of(mut self, text: &str) -> Self {
        self.line_ending = line_ending_of(text);
        self
    }

    /// Render the clause with its label at `indent`.
    ///
    /// The text starts with a line break and has no trailing one, so it
    /// slots in right after the last statement of a switch body. The clause
    /// body is indented one level further: a tab when `indent` uses tabs,
    /// two spaces otherwise.
    pub fn render(&self, indent: &str) -> String {
        let step = if indent.contains('\t') { "\t" } else { "  " };
        let nl = self.line_ending;
        format!(
            "{nl}{indent}{}{nl}{indent}{step}{}{nl}{indent}{step}{}",
            self.label, self.comment, self.placeholder
        )
    }
}

fn line_ending_of(text: &str) -> &'static str {
    match text.find('\n') {
        Some(at) if text[..at].ends_with('\r') => "\r\n",
        _ => "\n",
    }
}
