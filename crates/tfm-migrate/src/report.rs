//! Per-step outcome counters.

use std::fmt;

/// What one migration step did, logged when the step finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    pub step: &'static str,
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl StepReport {
    #[must_use]
    pub fn new(step: &'static str) -> Self {
        Self {
            step,
            ..Self::default()
        }
    }

    /// Emit the summary line for this step.
    pub fn log(&self) {
        if self.failed > 0 {
            tracing::warn!(
                step = self.step,
                created = self.created,
                updated = self.updated,
                deleted = self.deleted,
                skipped = self.skipped,
                failed = self.failed,
                "step finished with failures"
            );
        } else {
            tracing::info!(
                step = self.step,
                created = self.created,
                updated = self.updated,
                deleted = self.deleted,
                skipped = self.skipped,
                "step finished"
            );
        }
    }
}

impl fmt::Display for StepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} created, {} updated, {} deleted, {} skipped, {} failed",
            self.step, self.created, self.updated, self.deleted, self.skipped, self.failed
        )
    }
}
