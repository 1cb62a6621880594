//! Diagnostics for registration and resolution.
//!
//! Recoverable problems (duplicates, unresolved names, privacy overrides) are
//! collected here instead of aborting the run. Every warning is mirrored to
//! `tracing` as it is recorded, and the collector can render a markdown
//! report (`docdts-report.md`) that documents:
//! - What was registered and merged (summarized in a metrics table)
//! - Warnings, with a breakdown by category

use std::collections::HashMap;
use std::fmt::Write;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational message.
    Info,
    /// Warning - the input was skipped or adjusted.
    Warning,
}

impl Severity {
    fn emoji(&self) -> &'static str {
        match self {
            Severity::Info => "ℹ️",
            Severity::Warning => "⚠️",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
        }
    }
}

/// A single diagnostic entry.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Severity level.
    pub severity: Severity,
    /// The class or member name.
    pub name: String,
    /// Category of the diagnostic.
    pub category: DiagnosticCategory,
    /// Human-readable message.
    pub message: String,
    /// Suggested fix or workaround.
    pub suggestion: Option<String>,
    /// `file:line` of the offending record, when known.
    pub location: Option<String>,
}

/// Categories for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    /// Two classes with the same name in one namespace.
    DuplicateClass,
    /// Two members with the same key in one class.
    DuplicateMember,
    /// An item names a class that was never registered.
    UnknownClass,
    /// `extends` target not found.
    UnresolvedExtends,
    /// `uses` target not found or unusable.
    UnresolvedMixin,
    /// A private member made public by a mixin contract.
    PrivacyOverride,
    /// Deprecated class with a member that is not deprecated.
    Deprecation,
    /// Malformed type annotation.
    TypeSyntax,
    /// Parameter list problems.
    Signature,
    /// Record skipped on purpose.
    Skipped,
}

impl DiagnosticCategory {
    fn label(&self) -> &'static str {
        match self {
            DiagnosticCategory::DuplicateClass => "Duplicate Classes",
            DiagnosticCategory::DuplicateMember => "Duplicate Members",
            DiagnosticCategory::UnknownClass => "Unknown Classes",
            DiagnosticCategory::UnresolvedExtends => "Unresolved Extends",
            DiagnosticCategory::UnresolvedMixin => "Unresolved Mixins",
            DiagnosticCategory::PrivacyOverride => "Privacy Overrides",
            DiagnosticCategory::Deprecation => "Deprecation",
            DiagnosticCategory::TypeSyntax => "Type Syntax",
            DiagnosticCategory::Signature => "Signatures",
            DiagnosticCategory::Skipped => "Skipped Records",
        }
    }
}

/// Collector for diagnostics during one generation run.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    /// Counters for the run.
    stats: ConversionStats,
}

/// Statistics about the run.
#[derive(Debug, Default, Clone)]
pub struct ConversionStats {
    pub classes: usize,
    pub ambient_types: usize,
    pub members: usize,
    pub excluded_records: usize,
    pub namespaces: usize,
    pub inherited_members: usize,
    pub mixin_members: usize,
    pub factories: usize,
}

impl DiagnosticCollector {
    /// Create a new collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Warning => {
                tracing::warn!(name = %diagnostic.name, "{}", diagnostic.message)
            }
            Severity::Info => {
                tracing::debug!(name = %diagnostic.name, "{}", diagnostic.message)
            }
        }
        self.diagnostics.push(diagnostic);
    }

    /// Add an info diagnostic.
    pub fn info(&mut self, name: &str, category: DiagnosticCategory, message: &str) {
        self.add(Diagnostic {
            severity: Severity::Info,
            name: name.to_string(),
            category,
            message: message.to_string(),
            suggestion: None,
            location: None,
        });
    }

    /// Add a warning diagnostic.
    pub fn warning(
        &mut self,
        name: &str,
        category: DiagnosticCategory,
        message: &str,
        suggestion: Option<&str>,
    ) {
        self.warning_at(name, category, message, suggestion, None);
    }

    /// Add a warning diagnostic with a source location.
    pub fn warning_at(
        &mut self,
        name: &str,
        category: DiagnosticCategory,
        message: &str,
        suggestion: Option<&str>,
        location: Option<String>,
    ) {
        self.add(Diagnostic {
            severity: Severity::Warning,
            name: name.to_string(),
            category,
            message: message.to_string(),
            suggestion: suggestion.map(String::from),
            location,
        });
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Diagnostics of one category, in recording order.
    pub fn by_category(&self, category: DiagnosticCategory) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |d| d.category == category)
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }


    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Get the run statistics.
    pub fn stats(&self) -> &ConversionStats {
        &self.stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut ConversionStats {
        &mut self.stats
    }

    /// Generate a markdown report.
    pub fn generate_report(&self, title: &str) -> String {
        let mut report = String::new();

        // Header
        writeln!(report, "# {}", title).unwrap();
        writeln!(report).unwrap();
        writeln!(report, "Generated by docdts").unwrap();
        writeln!(report).unwrap();

        // Summary
        writeln!(report, "## Summary").unwrap();
        writeln!(report).unwrap();
        writeln!(report, "| Metric | Count |").unwrap();
        writeln!(report, "|--------|-------|").unwrap();
        writeln!(report, "| Classes | {} |", self.stats.classes).unwrap();
        writeln!(report, "| Ambient Types | {} |", self.stats.ambient_types).unwrap();
        writeln!(report, "| Members | {} |", self.stats.members).unwrap();
        writeln!(report, "| Namespaces | {} |", self.stats.namespaces).unwrap();
        writeln!(report, "| Excluded Records | {} |", self.stats.excluded_records).unwrap();
        writeln!(report).unwrap();

        // Merge stats
        writeln!(report, "## Member Merging").unwrap();
        writeln!(report).unwrap();
        writeln!(report, "- Inherited members: {}", self.stats.inherited_members).unwrap();
        writeln!(report, "- Mixin members: {}", self.stats.mixin_members).unwrap();
        writeln!(report, "- Synthesized factories: {}", self.stats.factories).unwrap();
        writeln!(report).unwrap();

        let warnings: Vec<_> = self
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .collect();
        if !warnings.is_empty() {
            writeln!(report, "## Warnings").unwrap();
            writeln!(report).unwrap();
            for diag in warnings {
                write!(
                    report,
                    "- {} **{}**: {}",
                    diag.severity.emoji(),
                    diag.name,
                    diag.message
                )
                .unwrap();
                if let Some(ref location) = diag.location {
                    write!(report, " (`{}`)", location).unwrap();
                }
                writeln!(report).unwrap();
                if let Some(ref suggestion) = diag.suggestion {
                    writeln!(report, "  - *Suggestion*: {}", suggestion).unwrap();
                }
            }
            writeln!(report).unwrap();
        }

        // Detailed breakdown by category
        let mut by_category: HashMap<DiagnosticCategory, usize> = HashMap::new();
        for diag in &self.diagnostics {
            *by_category.entry(diag.category).or_default() += 1;
        }
        if !by_category.is_empty() {
            writeln!(report, "## Details by Category").unwrap();
            writeln!(report).unwrap();
            writeln!(report, "| Category | Count |").unwrap();
            writeln!(report, "|----------|-------|").unwrap();
            for category in [
                DiagnosticCategory::DuplicateClass,
                DiagnosticCategory::DuplicateMember,
                DiagnosticCategory::UnknownClass,
                DiagnosticCategory::UnresolvedExtends,
                DiagnosticCategory::UnresolvedMixin,
                DiagnosticCategory::PrivacyOverride,
                DiagnosticCategory::Deprecation,
                DiagnosticCategory::TypeSyntax,
                DiagnosticCategory::Signature,
                DiagnosticCategory::Skipped,
            ] {
                if let Some(count) = by_category.get(&category) {
                    writeln!(report, "| {} | {} |", category.label(), count).unwrap();
                }
            }
            writeln!(report).unwrap();
        }

        report
    }
}
