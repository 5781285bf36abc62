//! Scenario outcomes
//!
//! Every scenario the runner considers produces one [`ScenarioOutcome`],
//! including scenarios excluded before execution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Ran with no failures
    Passed,
    /// Ran and recorded at least one failure
    Failed,
    /// Excluded before execution; credited as a pass at group close
    Excluded,
    /// Hit a permission denial; not counted
    Tolerated,
    /// Raised an unexpected failure; the rest of its group was skipped
    Fatal,
}

impl Outcome {
    /// Check if this is a passing outcome
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Check if this is a failing outcome
    #[must_use]
    pub const fn is_fail(&self) -> bool {
        matches!(self, Self::Failed | Self::Fatal)
    }

    /// Whether the scenario actually executed and counts toward the totals
    #[must_use]
    pub const fn is_executed(&self) -> bool {
        matches!(self, Self::Passed | Self::Failed | Self::Fatal)
    }

    /// Label used in logs and reports
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Passed => "PASSED",
            Self::Failed => "FAILED",
            Self::Excluded => "EXCLUDED",
            Self::Tolerated => "TOLERATED",
            Self::Fatal => "FATAL",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Record of one scenario within a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    /// Scenario name as shown in reports
    pub scenario: String,
    /// Group the scenario belongs to
    pub group: String,
    /// Outcome
    pub outcome: Outcome,
    /// Synthesized by the auto-test generator
    pub generated: bool,
    /// Failure messages, one per failed check
    pub failures: Vec<String>,
    /// Informational notes (tolerated denials, skipped steps)
    pub notes: Vec<String>,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
    /// Completion time
    pub timestamp: DateTime<Utc>,
}

impl ScenarioOutcome {
    /// Create an outcome with no messages
    #[must_use]
    pub fn new(scenario: impl Into<String>, group: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            scenario: scenario.into(),
            group: group.into(),
            outcome,
            generated: false,
            failures: Vec::new(),
            notes: Vec::new(),
            duration_ms: 0,
            timestamp: Utc::now(),
        }
    }

    /// Outcome for a scenario excluded before execution
    #[must_use]
    pub fn excluded(scenario: impl Into<String>, group: impl Into<String>, reason: impl Into<String>) -> Self {
        let mut outcome = Self::new(scenario, group, Outcome::Excluded);
        outcome.notes.push(reason.into());
        outcome
    }

    /// Mark as generated
    #[must_use]
    pub fn generated(mut self, generated: bool) -> Self {
        self.generated = generated;
        self
    }

    /// Attach a duration
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// First failure message, or a note, for one-line summaries
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.failures
            .first()
            .or_else(|| self.notes.first())
            .map(String::as_str)
    }
}
