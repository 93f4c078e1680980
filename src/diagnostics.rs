// ABOUTME: Diagnostics accumulator for non-fatal warnings during a deployment run.
// ABOUTME: Collects problems that skip a package or a report but never abort the run.

/// Collects non-fatal warnings during a run.
#[derive(Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn count(&self, kind: WarningKind) -> usize {
        self.warnings.iter().filter(|w| w.kind == kind).count()
    }
}

/// A non-fatal warning collected during a run.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// A package config file could not be turned into a configuration.
    pub fn rejected_package(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::RejectedPackage,
            message: message.into(),
        }
    }

    /// A bundle could not be built for an otherwise valid package.
    pub fn rejected_bundle(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::RejectedBundle,
            message: message.into(),
        }
    }

    pub fn report_write(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::ReportWrite,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Package config invalid; the package was skipped.
    RejectedPackage,
    /// Bundle construction failed; no action ran for the package.
    RejectedBundle,
    /// A report sink failed to write.
    ReportWrite,
}
