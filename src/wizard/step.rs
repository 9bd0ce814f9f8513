//! Step definitions: static per-screen metadata plus a completion check.

use std::fmt;
use std::sync::Arc;

use crate::form::FormData;

type CompletionCheck = Arc<dyn Fn(&FormData) -> bool + Send + Sync>;

/// One entry of a wizard's step table.
///
/// A step is complete when every required field path is non-blank and every
/// extra check passes. A step with neither is always complete (review and
/// progress screens).
#[derive(Clone)]
pub struct StepDefinition {
    pub title: String,
    pub description: String,
    required: Vec<String>,
    checks: Vec<CompletionCheck>,
}

impl StepDefinition {
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self { title: title.into(), description: description.into(), required: Vec::new(), checks: Vec::new() }
    }

    /// Require each field path (dotted for nested objects) to be non-blank.
    #[must_use]
    pub fn required_fields(mut self, paths: &[&str]) -> Self {
        self.required.extend(paths.iter().map(|p| (*p).to_owned()));
        self
    }

    /// Add an arbitrary completion check.
    #[must_use]
    pub fn completed_when<F>(mut self, check: F) -> Self
    where
        F: Fn(&FormData) -> bool + Send + Sync + 'static,
    {
        self.checks.push(Arc::new(check));
        self
    }

    #[must_use]
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Required paths that are still blank.
    #[must_use]
    pub fn missing_fields(&self, form: &FormData) -> Vec<&str> {
        self.required
            .iter()
            .filter(|path| form.is_blank(path))
            .map(String::as_str)
            .collect()
    }

    #[must_use]
    pub fn is_complete(&self, form: &FormData) -> bool {
        self.required.iter().all(|path| !form.is_blank(path)) && self.checks.iter().all(|check| check(form))
    }
}

impl fmt::Debug for StepDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDefinition")
            .field("title", &self.title)
            .field("description", &self.description)
            .field("required", &self.required)
            .field("checks", &self.checks.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "step_test.rs"]
mod tests;
