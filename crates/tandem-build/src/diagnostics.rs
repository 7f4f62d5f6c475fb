//! Compiler diagnostics, captured as data.
//!
//! Diagnostics flow through [`crate::CompilationResult`] values rather than
//! error returns so a failing target cannot abort its siblings. The build
//! graph decides at join time whether they are fatal.

use serde::{Deserialize, Serialize};

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Compilation-stopping problem
    Error,
    /// Suspicious but non-fatal
    Warning,
    /// Informational output worth surfacing
    Note,
}

/// One message from a compiler or bundler invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level
    pub severity: Severity,
    /// Target (or pass) that produced the message, when known
    pub target: Option<String>,
    /// The message text, one line
    pub message: String,
}

impl Diagnostic {
    /// Create a diagnostic.
    pub fn new(severity: Severity, target: Option<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            target,
            message: message.into(),
        }
    }

    /// Shorthand for an error diagnostic attributed to a target.
    pub fn error(target: &str, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, Some(target.to_string()), message)
    }

    /// Classify one line of compiler stderr.
    ///
    /// Cargo and wasm-pack prefix hard failures with `error` (possibly
    /// `error[E0308]`); everything else is kept as a note so nothing the
    /// compiler said is lost.
    pub fn from_stderr_line(target: &str, line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }
        let severity = if trimmed.starts_with("error") {
            Severity::Error
        } else if trimmed.starts_with("warning") {
            Severity::Warning
        } else {
            Severity::Note
        };
        Some(Self::new(severity, Some(target.to_string()), trimmed))
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        };
        match &self.target {
            Some(target) => write!(f, "[{}] {}: {}", target, level, self.message),
            None => write!(f, "{}: {}", level, self.message),
        }
    }
}

/// Parse a whole stderr capture into diagnostics for one target.
pub fn parse_stderr(target: &str, stderr: &str) -> Vec<Diagnostic> {
    stderr
        .lines()
        .filter_map(|line| Diagnostic::from_stderr_line(target, line))
        .collect()
}
