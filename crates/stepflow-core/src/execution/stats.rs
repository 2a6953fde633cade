//! Per-run statistics.

use std::time::Duration;

use super::step::StepKind;

/// Counters for one step of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepStats {
    /// Kind of the step.
    pub kind: StepKind,
    /// Number of activations.
    pub resets: u64,
    /// Number of chunks produced.
    pub executions: u64,
}

/// What a successful run did.
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// One entry per pipeline step, in pipeline order.
    pub steps: Vec<StepStats>,
    /// Executor loop iterations.
    pub iterations: u64,
    /// Wall time of the run, preparation included.
    pub elapsed: Duration,
}

impl RunStats {
    pub(crate) fn for_kinds(kinds: impl IntoIterator<Item = StepKind>) -> Self {
        Self {
            steps: kinds
                .into_iter()
                .map(|kind| StepStats {
                    kind,
                    resets: 0,
                    executions: 0,
                })
                .collect(),
            iterations: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Returns how often step `index` executed.
    #[must_use]
    pub fn executions(&self, index: usize) -> u64 {
        self.steps.get(index).map_or(0, |s| s.executions)
    }

    /// Returns how often step `index` was activated.
    #[must_use]
    pub fn resets(&self, index: usize) -> u64 {
        self.steps.get(index).map_or(0, |s| s.resets)
    }

    /// Returns the executions summed over all steps.
    #[must_use]
    pub fn total_executions(&self) -> u64 {
        self.steps.iter().map(|s| s.executions).sum()
    }
}
