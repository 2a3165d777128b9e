// src/config/diagnostics.rs

//! Advisory diagnostics produced while finalizing.
//!
//! Finalize never fails. Anything worth telling the operator that does not
//! invalidate the configuration (deprecated field names, overridden values)
//! is collected here and handed back to the caller, who decides how to
//! surface it.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    /// A superseded field name was used.
    DeprecatedField,
    /// Both a deprecated field and its replacement were set; the replacement wins.
    ConflictingDeprecatedField,
    /// A configured value was overridden by a rule (e.g. schedule tasks never buffer).
    OverriddenValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Ordered, de-duplicated list of diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning. Identical warnings are only recorded once.
    pub fn warn(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let diag = Diagnostic {
            kind,
            message: message.into(),
        };
        if !self.entries.contains(&diag) {
            self.entries.push(diag);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_kind(&self, kind: DiagnosticKind) -> bool {
        self.entries.iter().any(|d| d.kind == kind)
    }

    pub fn extend(&mut self, other: Diagnostics) {
        for d in other.entries {
            self.warn(d.kind, d.message);
        }
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_warnings_are_recorded_once() {
        let mut diags = Diagnostics::new();
        diags.warn(DiagnosticKind::DeprecatedField, "`source` is deprecated");
        diags.warn(DiagnosticKind::DeprecatedField, "`source` is deprecated");
        diags.warn(DiagnosticKind::OverriddenValue, "buffer period disabled");

        assert_eq!(diags.len(), 2);
        assert!(diags.has_kind(DiagnosticKind::OverriddenValue));
        assert!(!diags.has_kind(DiagnosticKind::ConflictingDeprecatedField));
    }
}
