//! User-friendly diagnostic messages.
//!
//! Every fatal pipeline error should carry its root cause plus a concrete
//! suggestion, since a failed build is one-shot and non-retried.

use std::fmt;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A diagnostic message with optional context and suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Error,
            context: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Warning,
            context: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self) -> String {
        let severity_str = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };

        let mut output = format!("{}: {}\n", severity_str, self.message);

        for ctx in &self.context {
            output.push_str(&format!("  -> {}\n", ctx));
        }

        if !self.suggestions.is_empty() {
            output.push_str("help: consider:\n");
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic) {
    eprint!("{}", diagnostic.format());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_formatting() {
        let diag = Diagnostic::error("missing hash override for `tree-sitter-matlab 1.0.7`")
            .with_context("git-sourced dependencies carry no registry checksum")
            .with_suggestion("Add `tree-sitter-matlab-1.0.7` to [overrides] in Drydock.toml");

        let output = diag.format();
        assert!(output.contains("error: missing hash override"));
        assert!(output.contains("no registry checksum"));
        assert!(output.contains("help: consider:"));
        assert!(output.contains("1. Add"));
    }

    #[test]
    fn test_warning_formatting() {
        let diag = Diagnostic::warning("git-pinned trees were not fetched or verified")
            .with_suggestion("Run with --fetch to verify declared hashes");

        let output = diag.format();
        assert!(output.starts_with("warning: "));
        assert!(output.contains("--fetch"));
    }
}
