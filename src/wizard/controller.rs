//! Step navigation over a bounded, 1-based step index.
//!
//! The controller performs no validation. Callers gate the Next control
//! themselves; `advance` and `retreat` are total over `[1, step_count]`.

/// Result of a navigation request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    /// The index moved between two steps.
    Moved { from: usize, to: usize },
    /// Next was pressed on the last step; the caller should submit.
    Submit,
    /// Back was pressed on the first step; the caller should leave the flow.
    Exit,
    /// The current step is incomplete; nothing changed.
    Blocked,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WizardController {
    current: usize,
    step_count: usize,
}

impl WizardController {
    /// A controller positioned on step 1. Step counts below 1 are raised to 1.
    #[must_use]
    pub fn new(step_count: usize) -> Self {
        Self { current: 1, step_count: step_count.max(1) }
    }

    #[must_use]
    pub fn current_step(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.current == 1
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current == self.step_count
    }

    /// Share of steps reached, for the step indicator bar.
    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        u8::try_from(self.current * 100 / self.step_count).unwrap_or(100)
    }

    pub fn advance(&mut self) -> Navigation {
        if self.current < self.step_count {
            let from = self.current;
            self.current += 1;
            Navigation::Moved { from, to: self.current }
        } else {
            Navigation::Submit
        }
    }

    pub fn retreat(&mut self) -> Navigation {
        if self.current > 1 {
            let from = self.current;
            self.current -= 1;
            Navigation::Moved { from, to: self.current }
        } else {
            Navigation::Exit
        }
    }

    pub fn reset(&mut self) {
        self.current = 1;
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
