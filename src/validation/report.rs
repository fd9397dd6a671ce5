//! Validation report types for structured violation reporting.
//!
//! A validation pass collects every violation it finds instead of stopping
//! at the first, so one report shows all problems in a tree at once.

use std::fmt;

use serde::Serialize;

use crate::model::EntityRef;

/// The result of validating a catalog tree.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ValidationReport {
    /// All violations found, in check order.
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Creates a new empty report.
    pub fn new() -> Self {
        Self {
            violations: Vec::new(),
        }
    }

    /// Adds a violation to the report.
    pub fn add(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Returns the number of error-level violations.
    pub fn error_count(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Error)
            .count()
    }

    /// Returns the number of warning-level violations.
    pub fn warning_count(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Warning)
            .count()
    }

    /// Returns true if there are no error-level violations. Warnings do not
    /// block publishing.
    pub fn is_ok(&self) -> bool {
        self.error_count() == 0
    }

    /// Returns true if there are no violations at all.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.violations.is_empty() {
            return writeln!(f, "Validation passed: no violations found");
        }

        writeln!(
            f,
            "Validation completed with {} error(s) and {} warning(s):",
            self.error_count(),
            self.warning_count()
        )?;
        writeln!(f)?;

        for violation in &self.violations {
            writeln!(f, "  {}", violation)?;
        }

        Ok(())
    }
}

/// A single structural violation found in a catalog tree.
#[derive(Clone, Debug, Serialize)]
pub struct Violation {
    /// The severity of the violation.
    pub severity: Severity,

    /// A stable code for the violation kind.
    pub kind: ViolationKind,

    /// The entity the violation was found on.
    pub entity: EntityRef,

    /// A human-readable description.
    pub detail: String,
}

impl Violation {
    /// Creates a new violation.
    pub fn new(
        severity: Severity,
        kind: ViolationKind,
        entity: EntityRef,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            kind,
            entity,
            detail: detail.into(),
        }
    }

    /// Creates a new error-level violation.
    pub fn error(kind: ViolationKind, entity: EntityRef, detail: impl Into<String>) -> Self {
        Self::new(Severity::Error, kind, entity, detail)
    }

    /// Creates a new warning-level violation.
    pub fn warning(kind: ViolationKind, entity: EntityRef, detail: impl Into<String>) -> Self {
        Self::new(Severity::Warning, kind, entity, detail)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN ",
        };
        write!(
            f,
            "[{}] {:?} in {}: {}",
            severity, self.kind, self.entity, self.detail
        )
    }
}

/// The severity of a violation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Severity {
    /// Does not block publishing, but indicates a problem worth fixing.
    Warning,
    /// Blocks publishing unless explicitly overridden.
    Error,
}

/// A stable code identifying the kind of violation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ViolationKind {
    /// Two collections under the catalog share an identifier.
    DuplicateCollectionId,
    /// An item identifier appears more than once under one collection.
    /// Warning-level: traversal already resolves duplicates to the most
    /// recently built item.
    DuplicateIdentifier,
    /// An item's bbox or temporal value falls outside its collection's
    /// declared extent.
    ItemOutsideExtent,
    /// An asset href does not resolve to an existing file.
    UnresolvableAsset,
    /// An asset's media type is not recognized for one of its roles.
    UnrecognizedMediaType,
    /// An asset's contents do not match its recorded checksum.
    ChecksumMismatch,
    /// A link targets an entity that does not exist in the tree.
    InvalidLinkTarget,
    /// A proprietary license with no provider roles declared.
    MissingProviderRoles,
}
