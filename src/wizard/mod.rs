//! Wizard — one reusable multi-step form flow.
//!
//! DESIGN
//! ======
//! A `Wizard` composes a static step table, a `WizardController` for the
//! bounded step index, a `FormData` field store, and an observer that
//! receives the presentation-layer callbacks. Screens configure a wizard
//! instead of re-implementing navigation.
//!
//! VALIDATION
//! ==========
//! `advance` mirrors the bare controller and never checks anything; the
//! caller has already decided the Next control is enabled. `next` derives
//! that gate from the current step's completion check and reports
//! `Navigation::Blocked` instead of moving or submitting.

pub mod controller;
pub mod step;

use tracing::debug;

use crate::form::{FieldValue, FormData};

pub use controller::{Navigation, WizardController};
pub use step::StepDefinition;

/// Callbacks fired by a wizard. Every method defaults to a no-op.
pub trait WizardObserver: Send {
    fn on_step_change(&mut self, _new_index: usize) {}
    fn on_field_change(&mut self, _key: &str, _value: &FieldValue) {}
    fn on_submit(&mut self, _form: &FormData) {}
    fn on_exit(&mut self) {}
}

/// Observer that ignores every callback.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl WizardObserver for NoopObserver {}

pub struct Wizard<O: WizardObserver = NoopObserver> {
    name: String,
    steps: Vec<StepDefinition>,
    controller: WizardController,
    defaults: FormData,
    form: FormData,
    observer: O,
}

impl<O: WizardObserver> Wizard<O> {
    #[must_use]
    pub fn new(name: impl Into<String>, steps: Vec<StepDefinition>, observer: O) -> Self {
        let controller = WizardController::new(steps.len());
        Self { name: name.into(), steps, controller, defaults: FormData::new(), form: FormData::new(), observer }
    }

    /// Seed the form with default values. `reset` restores these.
    #[must_use]
    pub fn with_defaults(mut self, defaults: FormData) -> Self {
        self.form = defaults.clone();
        self.defaults = defaults;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn steps(&self) -> &[StepDefinition] {
        &self.steps
    }

    #[must_use]
    pub fn current_step(&self) -> usize {
        self.controller.current_step()
    }

    #[must_use]
    pub fn step_count(&self) -> usize {
        self.controller.step_count()
    }

    #[must_use]
    pub fn controller(&self) -> &WizardController {
        &self.controller
    }

    /// Definition of the step currently shown, if the table is non-empty.
    #[must_use]
    pub fn current_definition(&self) -> Option<&StepDefinition> {
        self.steps.get(self.controller.current_step() - 1)
    }

    #[must_use]
    pub fn form(&self) -> &FormData {
        &self.form
    }

    #[must_use]
    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Whether the Next control should be enabled.
    #[must_use]
    pub fn can_advance(&self) -> bool {
        self.current_definition()
            .is_none_or(|step| step.is_complete(&self.form))
    }

    /// Shallow-merge a field edit and notify the observer.
    pub fn set_field(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        let key = key.into();
        let value = value.into();
        self.observer.on_field_change(&key, &value);
        self.form.set_field(key, value);
    }

    /// Deep-merge a field edit and notify the observer with the merged value.
    pub fn merge_field_deep(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        let key = key.into();
        self.form.merge_field_deep(key.clone(), value);
        if let Some(merged) = self.form.get(&key) {
            self.observer.on_field_change(&key, merged);
        }
    }

    /// Next control with the completion gate applied.
    pub fn next(&mut self) -> Navigation {
        if !self.can_advance() {
            let missing = self
                .current_definition()
                .map(|step| step.missing_fields(&self.form).join(","))
                .unwrap_or_default();
            debug!(wizard = %self.name, step = self.current_step(), %missing, "next blocked");
            return Navigation::Blocked;
        }
        self.advance()
    }

    /// Next control without a gate: move forward, or submit on the last step.
    pub fn advance(&mut self) -> Navigation {
        let nav = self.controller.advance();
        match nav {
            Navigation::Moved { from, to } => {
                debug!(wizard = %self.name, from, to, "step advanced");
                self.observer.on_step_change(to);
            }
            Navigation::Submit => {
                debug!(wizard = %self.name, fields = self.form.len(), "wizard submitted");
                self.observer.on_submit(&self.form);
            }
            Navigation::Exit | Navigation::Blocked => {}
        }
        nav
    }

    /// Back control: move backward, or exit from the first step.
    pub fn back(&mut self) -> Navigation {
        let nav = self.controller.retreat();
        match nav {
            Navigation::Moved { from, to } => {
                debug!(wizard = %self.name, from, to, "step retreated");
                self.observer.on_step_change(to);
            }
            Navigation::Exit => {
                debug!(wizard = %self.name, "wizard exited");
                self.observer.on_exit();
            }
            Navigation::Submit | Navigation::Blocked => {}
        }
        nav
    }

    /// Return to step 1 with the default form, as on remount.
    pub fn reset(&mut self) {
        let from = self.controller.current_step();
        self.controller.reset();
        self.form = self.defaults.clone();
        if from != self.controller.current_step() {
            debug!(wizard = %self.name, from, "wizard reset");
            self.observer.on_step_change(self.controller.current_step());
        }
    }

    #[must_use]
    pub fn into_form(self) -> FormData {
        self.form
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
