//! Diagnostics are data, not control flow: every phase that can fail
//! (lexing, parsing, analysis) appends to a [`DiagnosticBag`] instead of
//! bailing out early, so a single run surfaces the maximum set of
//! independent errors.

use std::cmp::Ordering;
use std::fmt;

use crate::reference::Reference;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Warn,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warn => f.write_str("warn"),
            Severity::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub reference: Reference,
    pub rule_key: String,
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        reference: Reference,
        rule_key: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Diagnostic {
            reference,
            rule_key: rule_key.into(),
            severity,
            message: message.into(),
        }
    }

    pub fn error(reference: Reference, rule_key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(reference, rule_key, Severity::Error, message)
    }

    pub fn warn(reference: Reference, rule_key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(reference, rule_key, Severity::Warn, message)
    }

    fn sort_key(&self) -> (String, usize, usize, &str) {
        (
            self.reference.file_path.to_string_lossy().into_owned(),
            self.reference.span.line_start,
            self.reference.span.start,
            self.rule_key.as_str(),
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} [{}]: {}",
            self.reference.file_path.display(),
            self.reference.span.line_start,
            self.reference.span.start,
            self.severity,
            self.rule_key,
            self.message
        )
    }
}

/// An append-only collection of diagnostics accumulated over the course of a
/// phase (lexing a file, parsing a file, analyzing a scope). Never shrinks;
/// the only way to observe its contents is [`DiagnosticBag::sorted`] or
/// [`DiagnosticBag::is_empty`].
#[derive(Debug, Clone, Default)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        DiagnosticBag::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, other: DiagnosticBag) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Returns diagnostics ordered by `(filePath, startLine, startOffset,
    /// ruleKey)`, the contract that makes output reproducible regardless of
    /// the order in which phases ran.
    pub fn sorted(&self) -> Vec<&Diagnostic> {
        let mut out: Vec<&Diagnostic> = self.diagnostics.iter().collect();
        out.sort_by(|a, b| cmp_diagnostics(a, b));
        out
    }

    pub fn into_sorted_vec(mut self) -> Vec<Diagnostic> {
        self.diagnostics.sort_by(|a, b| cmp_diagnostics(a, b));
        self.diagnostics
    }
}

fn cmp_diagnostics(a: &Diagnostic, b: &Diagnostic) -> Ordering {
    a.sort_key().cmp(&b.sort_key())
}

impl IntoIterator for DiagnosticBag {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::Span;
    use std::path::PathBuf;

    fn diag(file: &str, line: usize, offset: usize, key: &str) -> Diagnostic {
        Diagnostic::error(
            Reference::new(PathBuf::from(file), Span::new(offset, offset, line, line)),
            key,
            "message",
        )
    }

    #[test]
    fn sorts_by_file_then_line_then_offset_then_rule_key() {
        let mut bag = DiagnosticBag::new();
        bag.push(diag("b.nex", 1, 0, "zzz"));
        bag.push(diag("a.nex", 5, 0, "aaa"));
        bag.push(diag("a.nex", 1, 10, "bbb"));
        bag.push(diag("a.nex", 1, 2, "aaa"));

        let sorted = bag.sorted();
        let keys: Vec<_> = sorted
            .iter()
            .map(|d| (d.reference.file_path.to_str().unwrap(), d.reference.span.line_start, d.reference.span.start))
            .collect();
        assert_eq!(
            keys,
            vec![("a.nex", 1, 2), ("a.nex", 1, 10), ("a.nex", 5, 0), ("b.nex", 1, 0)]
        );
    }

    #[test]
    fn has_errors_ignores_warnings() {
        let mut bag = DiagnosticBag::new();
        bag.push(Diagnostic::warn(
            Reference::new(PathBuf::from("a.nex"), Span::at(crate::reference::Position::start())),
            "some-warning",
            "message",
        ));
        assert!(!bag.has_errors());
        bag.push(diag("a.nex", 1, 0, "some-error"));
        assert!(bag.has_errors());
    }
}
