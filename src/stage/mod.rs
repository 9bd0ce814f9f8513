//! Stages of the tokenization flow and their progress counters.
//!
//! DESIGN
//! ======
//! Each stage advances a percent counter from 0 to 100. The counter is
//! either ticked on a fixed interval (the dashboard's simulated progress) or
//! raised by a real task through a `ProgressReporter`. Both drive the same
//! `StageRunner` state shape so the UI binding does not care which is used.

pub mod runner;

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use runner::{ProgressReporter, RunnerError, RunnerSnapshot, RunnerState, StageRunner, StageTask, TaskError};

pub const MAX_PERCENT: u8 = 100;

/// Longest tick a simulated stage accepts.
pub const MAX_TICK: Duration = Duration::from_secs(60);

// =============================================================================
// STAGE
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Upload,
    Verify,
    Tokenize,
}

impl Stage {
    /// Stages in execution order.
    pub const ALL: [Stage; 3] = [Stage::Upload, Stage::Verify, Stage::Tokenize];

    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Upload => Some(Self::Verify),
            Self::Verify => Some(Self::Tokenize),
            Self::Tokenize => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Verify => "verify",
            Self::Tokenize => "tokenize",
        }
    }

    /// Status line shown under the progress bar.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Upload => "Uploading invoice documents",
            Self::Verify => "Verifying invoice details",
            Self::Tokenize => "Minting invoice token",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// TIMING
// =============================================================================

/// Increment size and tick interval for a simulated stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageTiming {
    pub increment: u8,
    pub tick: Duration,
}

impl StageTiming {
    #[must_use]
    pub const fn new(increment: u8, tick: Duration) -> Self {
        Self { increment, tick }
    }

    #[must_use]
    pub const fn default_for(stage: Stage) -> Self {
        match stage {
            Stage::Upload => Self::new(10, Duration::from_millis(200)),
            Stage::Verify => Self::new(5, Duration::from_millis(300)),
            Stage::Tokenize => Self::new(4, Duration::from_millis(150)),
        }
    }

    /// An increment in `1..=100` and a tick in `(0, MAX_TICK]`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (1..=MAX_PERCENT).contains(&self.increment) && !self.tick.is_zero() && self.tick <= MAX_TICK
    }

    /// Number of ticks from 0 to 100, or `None` for an increment of 0.
    #[must_use]
    pub fn ticks_to_complete(&self) -> Option<u32> {
        if self.increment == 0 {
            return None;
        }
        Some(u32::from(MAX_PERCENT.div_ceil(self.increment)))
    }

    #[must_use]
    pub fn expected_duration(&self) -> Option<Duration> {
        self.ticks_to_complete().map(|ticks| self.tick * ticks)
    }
}

// =============================================================================
// PROGRESS
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageProgress {
    pub stage: Stage,
    pub percent: u8,
}

impl StageProgress {
    #[must_use]
    pub fn new(stage: Stage) -> Self {
        Self { stage, percent: 0 }
    }

    /// Add one increment, clamped to 100. Returns true once the stage is done.
    pub fn advance_by(&mut self, increment: u8) -> bool {
        self.percent = self.percent.saturating_add(increment).min(MAX_PERCENT);
        self.is_done()
    }

    /// Raise the counter to `percent`. Lower values are ignored so the
    /// counter never moves backwards.
    pub fn raise_to(&mut self, percent: u8) {
        self.percent = self.percent.max(percent.min(MAX_PERCENT));
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.percent >= MAX_PERCENT
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
