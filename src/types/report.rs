use std::fmt;
use std::time::Duration;

use super::form::Failure;

/// Diagnostics returned by
/// [`Engine::validate_form_report()`](super::engine::Engine::validate_form_report).
#[derive(Debug, Clone)]
#[must_use]
pub struct ValidationReport {
    passed: bool,
    skipped: bool,
    checked: Vec<String>,
    failure: Option<Failure>,
    duration: Duration,
}

impl ValidationReport {
    pub(crate) fn new(
        passed: bool,
        skipped: bool,
        checked: Vec<String>,
        failure: Option<Failure>,
        duration: Duration,
    ) -> Self {
        Self {
            passed,
            skipped,
            checked,
            failure,
            duration,
        }
    }

    /// Whether the form may be submitted.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.passed
    }

    /// Validation was bypassed by the submitting element.
    #[must_use]
    pub fn skipped(&self) -> bool {
        self.skipped
    }

    /// Names of the controls validated, in document order, up to and
    /// including the failing one.
    #[must_use]
    pub fn checked(&self) -> &[String] {
        &self.checked
    }

    #[must_use]
    pub fn failure(&self) -> Option<&Failure> {
        self.failure.as_ref()
    }

    /// Wall-clock duration of the pass.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.failure, self.skipped) {
            (_, true) => write!(f, "skipped")?,
            (Some(failure), false) => write!(f, "failed: {failure}")?,
            (None, false) => write!(f, "passed")?,
        }
        write!(f, ", checked: [{}]", self.checked.join(", "))?;
        write!(f, ", duration: {:?}", self.duration)?;
        Ok(())
    }
}
