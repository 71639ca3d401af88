//! Multi-step flow with validation gates and branching.
//!
//! Collected data lives in a composed [`FormBehavior`] and is one flat map
//! shared by every step. Moving forward runs the current step's validator;
//! a failure is reported through `can_proceed` and `validation_error`, never
//! as an error to the caller. A step may pick its successor from the data,
//! which is how branching flows skip steps.
//!
//! Completing runs every validator again, in order, against the final data
//! and only calls `on_complete` when all of them pass.

use std::{collections::HashSet, fmt, future::Future};

use futures::{FutureExt, future::BoxFuture};
use serde::Serialize;
use tessera_core::{
    CallbackError, CallbackResult, Pattern, Store, SubscriptionId,
    behaviors::{FormBehavior, FormValues},
};

use crate::error::WizardError;

/// Outcome of a step validator: `Ok(None)` passes, `Ok(Some(message))`
/// fails with a message, `Err` is a broken validator.
pub type ValidationResult = Result<Option<String>, CallbackError>;

type Validator = Box<dyn Fn(FormValues) -> BoxFuture<'static, ValidationResult> + Send + Sync>;
type NextStep = Box<dyn Fn(&FormValues) -> Option<String> + Send + Sync>;
type CompleteFn = Box<dyn FnMut(FormValues) -> BoxFuture<'static, CallbackResult> + Send>;

/// One step definition.
pub struct Step {
    info: StepInfo,
    validate: Option<Validator>,
    next_step: Option<NextStep>,
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("info", &self.info)
            .field("validate", &self.validate.is_some())
            .field("next_step", &self.next_step.is_some())
            .finish()
    }
}

impl Step {
    /// Step without validation that advances sequentially.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            info: StepInfo { id: id.into(), title: title.into(), description: None },
            validate: None,
            next_step: None,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.info.description = Some(description.into());
        self
    }

    /// Gate the step with a synchronous validator returning an error
    /// message on failure.
    #[must_use]
    pub fn validate(
        mut self,
        validate: impl Fn(&FormValues) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.validate = Some(Box::new(move |data| {
            let result: ValidationResult = Ok(validate(&data));
            futures::future::ready(result).boxed()
        }));
        self
    }

    /// Gate the step with an asynchronous validator.
    #[must_use]
    pub fn validate_async<F, Fut>(mut self, validate: F) -> Self
    where
        F: Fn(FormValues) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ValidationResult> + Send + 'static,
    {
        self.validate = Some(Box::new(move |data| validate(data).boxed()));
        self
    }

    /// Choose the following step by id from the data. Returning `None`, or
    /// an id that does not exist, falls back to the next step in order.
    #[must_use]
    pub fn next_step(
        mut self,
        next_step: impl Fn(&FormValues) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.next_step = Some(Box::new(next_step));
        self
    }

    /// Step data.
    pub fn info(&self) -> &StepInfo {
        &self.info
    }
}

/// Step data shown to views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepInfo {
    /// Unique step id.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Optional longer text.
    pub description: Option<String>,
}

/// Snapshot of a [`Wizard`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardState {
    /// Steps in declaration order.
    pub steps: Vec<StepInfo>,
    /// Index of the showing step.
    pub current_step_index: usize,
    /// Indices of steps that passed validation on the way forward, in the
    /// order they were first completed.
    pub completed_steps: Vec<usize>,
    /// Whether the last navigation attempt was allowed.
    pub can_proceed: bool,
    /// Message from the last failed validation.
    pub validation_error: Option<String>,
    /// Data collected across all steps.
    pub data: FormValues,
    /// Whether `on_complete` has run successfully.
    pub is_complete: bool,
}

impl WizardState {
    /// The showing step.
    pub fn current_step(&self) -> Option<&StepInfo> {
        self.steps.get(self.current_step_index)
    }

    /// Whether the first step is showing.
    pub fn is_first_step(&self) -> bool {
        self.current_step_index == 0
    }

    /// Whether the last step is showing.
    pub fn is_last_step(&self) -> bool {
        self.current_step_index + 1 >= self.steps.len()
    }

    /// Fraction of the flow reached, counting the showing step.
    pub fn progress(&self) -> f64 {
        if self.steps.is_empty() {
            return 0.0;
        }
        (self.current_step_index + 1) as f64 / self.steps.len() as f64
    }
}

/// Construction options for [`Wizard`].
pub struct WizardOptions {
    /// Step definitions.
    pub steps: Vec<Step>,
    /// Data the flow starts with.
    pub initial_data: FormValues,
    /// Step to start on.
    pub initial_step_index: usize,
    on_complete: Option<CompleteFn>,
    on_step_change: Option<Box<dyn FnMut(usize, usize) + Send>>,
    on_data_change: Option<Box<dyn FnMut(&FormValues) + Send>>,
}

impl fmt::Debug for WizardOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WizardOptions")
            .field("steps", &self.steps)
            .field("initial_data", &self.initial_data)
            .field("initial_step_index", &self.initial_step_index)
            .finish_non_exhaustive()
    }
}

impl WizardOptions {
    /// Options starting on the first step with no data.
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            initial_data: FormValues::new(),
            initial_step_index: 0,
            on_complete: None,
            on_step_change: None,
            on_data_change: None,
        }
    }

    /// Start with `data`.
    #[must_use]
    pub fn initial_data(mut self, data: FormValues) -> Self {
        self.initial_data = data;
        self
    }

    /// Start on step `index`.
    #[must_use]
    pub fn initial_step_index(mut self, index: usize) -> Self {
        self.initial_step_index = index;
        self
    }

    /// Called with the final data once every step validates.
    #[must_use]
    pub fn with_on_complete<F, Fut>(mut self, mut f: F) -> Self
    where
        F: FnMut(FormValues) -> Fut + Send + 'static,
        Fut: Future<Output = CallbackResult> + Send + 'static,
    {
        self.on_complete = Some(Box::new(move |data| f(data).boxed()));
        self
    }

    /// Called with `(from, to)` after every step change.
    #[must_use]
    pub fn with_on_step_change(mut self, f: impl FnMut(usize, usize) + Send + 'static) -> Self {
        self.on_step_change = Some(Box::new(f));
        self
    }

    /// Called with the merged data after every data change.
    #[must_use]
    pub fn with_on_data_change(mut self, f: impl FnMut(&FormValues) + Send + 'static) -> Self {
        self.on_data_change = Some(Box::new(f));
        self
    }
}

/// Wizard engine.
pub struct Wizard {
    store: Store<WizardState>,
    form: FormBehavior,
    validators: Vec<Option<Validator>>,
    next_steps: Vec<Option<NextStep>>,
    initial_step_index: usize,
    on_complete: Option<CompleteFn>,
    on_step_change: Option<Box<dyn FnMut(usize, usize) + Send>>,
    on_data_change: Option<Box<dyn FnMut(&FormValues) + Send>>,
}

impl fmt::Debug for Wizard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wizard").field("store", &self.store).finish_non_exhaustive()
    }
}

impl Wizard {
    /// Create a wizard from `options`.
    ///
    /// # Errors
    ///
    /// Returns a [`WizardError`] if there are no steps, two steps share an
    /// id, or the initial step index is out of range.
    pub fn new(options: WizardOptions) -> Result<Self, WizardError> {
        let WizardOptions {
            steps,
            initial_data,
            initial_step_index,
            on_complete,
            on_step_change,
            on_data_change,
        } = options;

        if steps.is_empty() {
            return Err(WizardError::NoSteps);
        }
        let mut seen = HashSet::new();
        for step in &steps {
            if !seen.insert(step.info.id.as_str()) {
                return Err(WizardError::DuplicateStepId(step.info.id.clone()));
            }
        }
        if initial_step_index >= steps.len() {
            return Err(WizardError::StepIndexOutOfRange {
                index: initial_step_index,
                len: steps.len(),
            });
        }

        let mut infos = Vec::with_capacity(steps.len());
        let mut validators = Vec::with_capacity(steps.len());
        let mut next_steps = Vec::with_capacity(steps.len());
        for Step { info, validate, next_step } in steps {
            infos.push(info);
            validators.push(validate);
            next_steps.push(next_step);
        }

        let state = WizardState {
            steps: infos,
            current_step_index: initial_step_index,
            completed_steps: Vec::new(),
            can_proceed: true,
            validation_error: None,
            data: initial_data.clone(),
            is_complete: false,
        };
        Ok(Self {
            store: Store::new(state),
            form: FormBehavior::new(initial_data),
            validators,
            next_steps,
            initial_step_index,
            on_complete,
            on_step_change,
            on_data_change,
        })
    }

    /// Current snapshot.
    pub fn state(&self) -> &WizardState {
        self.store.state()
    }

    /// Register a state listener.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&WizardState) + Send + 'static,
    ) -> SubscriptionId {
        self.store.subscribe(listener)
    }

    /// Remove a state listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Validate the current step and advance.
    ///
    /// On success the step is marked completed and the wizard moves to the
    /// step chosen by the step's branch function, or the next one in order.
    /// Returns `false` without moving if validation fails or the current
    /// step is the last.
    pub async fn go_to_next_step(&mut self) -> bool {
        if self.store.is_destroyed() {
            return false;
        }
        let index = self.store.state().current_step_index;
        if let Some(message) = self.run_validator(index).await {
            self.store.update(|s| {
                s.can_proceed = false;
                s.validation_error = Some(message);
            });
            return false;
        }

        let len = self.store.state().steps.len();
        let next = self.resolve_next(index);
        let changed = self.store.update(|s| {
            if !s.completed_steps.contains(&index) {
                s.completed_steps.push(index);
            }
            s.validation_error = None;
            match next {
                Some(next) if next < len => {
                    s.current_step_index = next;
                    s.can_proceed = true;
                },
                _ => s.can_proceed = false,
            }
        });

        match next {
            Some(next) if next < len && changed => {
                tracing::debug!(from = index, to = next, "wizard step advanced");
                self.notify_step_change(index, next);
                true
            },
            _ => false,
        }
    }

    /// Go back one step without validating.
    pub fn go_to_previous_step(&mut self) -> bool {
        let index = self.store.state().current_step_index;
        let target = index.saturating_sub(1);
        self.move_to(index, target)
    }

    /// Jump to step `index` without validating.
    pub fn go_to_step(&mut self, index: usize) -> bool {
        let len = self.store.state().steps.len();
        if index >= len {
            tracing::warn!(index, len, "step index out of range");
            return false;
        }
        let current = self.store.state().current_step_index;
        self.move_to(current, index)
    }

    /// Validate every step against the current data and finish.
    ///
    /// The first failing step becomes current and completion stops there.
    /// `on_complete` runs only when every step passes; if it fails, the
    /// error is logged and the wizard stays incomplete.
    pub async fn complete_wizard(&mut self) -> bool {
        if self.store.is_destroyed() {
            return false;
        }
        let current = self.store.state().current_step_index;
        for index in 0..self.validators.len() {
            if let Some(message) = self.run_validator(index).await {
                tracing::debug!(step = index, "wizard completion blocked");
                self.store.update(|s| {
                    s.current_step_index = index;
                    s.can_proceed = false;
                    s.validation_error = Some(message);
                });
                if index != current {
                    self.notify_step_change(current, index);
                }
                return false;
            }
        }

        let data = self.store.state().data.clone();
        let completed = match self.on_complete.as_mut() {
            Some(on_complete) => match on_complete(data).await {
                Ok(()) => true,
                Err(error) => {
                    tracing::error!(%error, "wizard completion callback failed");
                    false
                },
            },
            None => true,
        };
        self.store.update(|s| {
            s.validation_error = None;
            s.can_proceed = true;
            s.is_complete = completed;
        });
        completed
    }

    /// Shallow-merge `partial` into the collected data.
    pub fn set_step_data(&mut self, partial: FormValues) -> bool {
        self.form.set_values(partial);
        self.sync_data()
    }

    /// Set one data field.
    pub fn set_field(&mut self, field: &str, value: serde_json::Value) -> bool {
        self.form.set_field_value(field, value);
        self.sync_data()
    }

    /// Return to the initial step and clear the validation outcome.
    ///
    /// Collected data and completed steps are kept; only a new wizard
    /// starts from scratch.
    pub fn reset(&mut self) -> bool {
        let initial = self.initial_step_index;
        let from = self.store.state().current_step_index;
        let changed = self.store.update(|s| {
            s.current_step_index = initial;
            s.can_proceed = true;
            s.validation_error = None;
            s.is_complete = false;
        });
        if changed && from != initial {
            self.notify_step_change(from, initial);
        }
        changed
    }

    /// Release listeners and callbacks. Idempotent.
    pub fn destroy(&mut self) {
        self.store.destroy();
        self.form.destroy();
        self.on_complete = None;
        self.on_step_change = None;
        self.on_data_change = None;
    }

    /// Whether [`Wizard::destroy`] has been called.
    pub fn is_destroyed(&self) -> bool {
        self.store.is_destroyed()
    }

    /// Run the validator of step `index` against the current data.
    ///
    /// Returns the failure message, if any. A validator that errors counts
    /// as a failure carrying the error text.
    async fn run_validator(&self, index: usize) -> Option<String> {
        let validator = self.validators.get(index)?.as_ref()?;
        let data = self.store.state().data.clone();
        match validator(data).await {
            Ok(result) => result,
            Err(error) => {
                tracing::error!(step = index, %error, "step validator failed");
                Some(error.to_string())
            },
        }
    }

    fn resolve_next(&self, index: usize) -> Option<usize> {
        let state = self.store.state();
        let branch = self
            .next_steps
            .get(index)
            .and_then(Option::as_ref)
            .and_then(|next_step| next_step(&state.data));
        let target = branch.and_then(|id| {
            let found = state.steps.iter().position(|step| step.id == id);
            if found.is_none() {
                tracing::warn!(id, "branch target not found, advancing in order");
            }
            found
        });
        Some(target.unwrap_or(index + 1))
    }

    fn move_to(&mut self, from: usize, to: usize) -> bool {
        let changed = self.store.update(|s| {
            s.current_step_index = to;
            s.can_proceed = true;
            s.validation_error = None;
        });
        if from != to {
            self.notify_step_change(from, to);
        }
        changed && from != to
    }

    fn sync_data(&mut self) -> bool {
        let data = self.form.values().clone();
        let changed = self.store.update(|s| s.data = data);
        if changed && let Some(on_data_change) = self.on_data_change.as_mut() {
            on_data_change(&self.store.state().data);
        }
        changed
    }

    fn notify_step_change(&mut self, from: usize, to: usize) {
        if let Some(on_step_change) = self.on_step_change.as_mut() {
            on_step_change(from, to);
        }
    }
}

impl Pattern for Wizard {
    type State = WizardState;

    fn state(&self) -> &Self::State {
        Self::state(self)
    }

    fn subscribe(&mut self, listener: Box<dyn FnMut(&Self::State) + Send>) -> SubscriptionId {
        Self::subscribe(self, listener)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        Self::unsubscribe(self, id)
    }

    fn destroy(&mut self) {
        Self::destroy(self);
    }

    fn is_destroyed(&self) -> bool {
        Self::is_destroyed(self)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    use serde_json::{Value, json};

    use super::*;

    fn values(value: Value) -> FormValues {
        match value {
            Value::Object(map) => map,
            _ => FormValues::new(),
        }
    }

    fn require(field: &'static str) -> impl Fn(&FormValues) -> Option<String> + Send + Sync {
        move |data| {
            if data.get(field).is_some_and(|v| !v.is_null()) {
                None
            } else {
                Some(format!("{field} is required"))
            }
        }
    }

    fn signup() -> Vec<Step> {
        vec![
            Step::new("account", "Account").validate(require("email")),
            Step::new("plan", "Plan").next_step(|data| {
                (data.get("plan") == Some(&json!("free"))).then(|| "confirm".to_string())
            }),
            Step::new("billing", "Billing").validate(require("card")),
            Step::new("confirm", "Confirm"),
        ]
    }

    fn wizard() -> Wizard {
        Wizard::new(WizardOptions::new(signup())).unwrap()
    }

    #[test]
    fn construction_errors() {
        assert_eq!(Wizard::new(WizardOptions::new(Vec::new())).unwrap_err(), WizardError::NoSteps);
        let duplicate = vec![Step::new("a", "A"), Step::new("a", "Again")];
        assert_eq!(
            Wizard::new(WizardOptions::new(duplicate)).unwrap_err(),
            WizardError::DuplicateStepId("a".to_string())
        );
        assert_eq!(
            Wizard::new(WizardOptions::new(signup()).initial_step_index(4)).unwrap_err(),
            WizardError::StepIndexOutOfRange { index: 4, len: 4 }
        );
    }

    #[tokio::test]
    async fn failed_validation_blocks_and_reports() {
        let mut wizard = wizard();
        assert!(!wizard.go_to_next_step().await);
        let state = wizard.state();
        assert_eq!(state.current_step_index, 0);
        assert!(!state.can_proceed);
        assert_eq!(state.validation_error.as_deref(), Some("email is required"));
        assert!(state.completed_steps.is_empty());
    }

    #[tokio::test]
    async fn passing_validation_advances_and_completes_step() {
        let mut wizard = wizard();
        wizard.set_field("email", json!("a@b.c"));
        assert!(wizard.go_to_next_step().await);
        assert_eq!(wizard.state().current_step_index, 1);
        assert_eq!(wizard.state().completed_steps, vec![0]);
        assert!(wizard.state().validation_error.is_none());
    }

    #[tokio::test]
    async fn branching_skips_steps() {
        let mut wizard = wizard();
        wizard.set_step_data(values(json!({ "email": "a@b.c", "plan": "free" })));
        wizard.go_to_next_step().await;
        assert!(wizard.go_to_next_step().await);
        assert_eq!(wizard.state().current_step().map(|s| s.id.as_str()), Some("confirm"));
    }

    #[tokio::test]
    async fn unknown_branch_target_falls_back_to_sequence() {
        let steps = vec![
            Step::new("a", "A").next_step(|_| Some("nowhere".to_string())),
            Step::new("b", "B"),
        ];
        let mut wizard = Wizard::new(WizardOptions::new(steps)).unwrap();
        assert!(wizard.go_to_next_step().await);
        assert_eq!(wizard.state().current_step_index, 1);
    }

    #[tokio::test]
    async fn cannot_advance_past_last_step() {
        let mut wizard = Wizard::new(WizardOptions::new(signup()).initial_step_index(3)).unwrap();
        assert!(!wizard.go_to_next_step().await);
        assert!(!wizard.state().can_proceed);
        assert_eq!(wizard.state().completed_steps, vec![3]);
    }

    #[tokio::test]
    async fn backward_moves_skip_validation() {
        let mut wizard = wizard();
        wizard.go_to_next_step().await;
        assert!(!wizard.state().can_proceed);
        assert!(wizard.go_to_step(2));
        assert!(wizard.state().can_proceed);
        assert!(wizard.go_to_previous_step());
        assert_eq!(wizard.state().current_step_index, 1);
        assert!(!wizard.go_to_step(9));
    }

    #[tokio::test]
    async fn completion_stops_at_first_failing_step() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut wizard = Wizard::new(
            WizardOptions::new(signup())
                .initial_data(values(json!({ "email": "a@b.c" })))
                .initial_step_index(3)
                .with_on_complete(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    async { Ok(()) }
                }),
        )
        .unwrap();

        assert!(!wizard.complete_wizard().await);
        assert_eq!(wizard.state().current_step_index, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        wizard.set_field("card", json!("4242"));
        assert!(wizard.complete_wizard().await);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(wizard.state().is_complete);
    }

    #[tokio::test]
    async fn failing_completion_callback_is_contained() {
        let mut wizard = Wizard::new(
            WizardOptions::new(vec![Step::new("only", "Only")])
                .with_on_complete(|_| async { Err(CallbackError::new("server down")) }),
        )
        .unwrap();
        assert!(!wizard.complete_wizard().await);
        assert!(!wizard.state().is_complete);
    }

    #[tokio::test]
    async fn async_validator_errors_count_as_failures() {
        let steps = vec![
            Step::new("remote", "Remote")
                .validate_async(|_| async { Err(CallbackError::new("timeout")) }),
            Step::new("done", "Done"),
        ];
        let mut wizard = Wizard::new(WizardOptions::new(steps)).unwrap();
        assert!(!wizard.go_to_next_step().await);
        assert_eq!(wizard.state().validation_error.as_deref(), Some("callback failed: timeout"));
    }

    #[test]
    fn step_data_merges_shallowly() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut wizard = Wizard::new(
            WizardOptions::new(signup())
                .initial_data(values(json!({ "email": "a@b.c" })))
                .with_on_data_change(move |data| sink.lock().unwrap().push(data.len())),
        )
        .unwrap();
        wizard.set_step_data(values(json!({ "plan": "pro" })));
        assert_eq!(wizard.state().data.get("email"), Some(&json!("a@b.c")));
        assert_eq!(*seen.lock().unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn reset_returns_to_start_and_keeps_progress() {
        let mut wizard = wizard();
        wizard.set_field("email", json!("a@b.c"));
        wizard.go_to_next_step().await;
        assert!(wizard.reset());
        let state = wizard.state();
        assert_eq!(state.current_step_index, 0);
        assert_eq!(state.completed_steps, vec![0]);
        assert_eq!(state.data.get("email"), Some(&json!("a@b.c")));
    }

    #[tokio::test]
    async fn completion_does_not_mark_unvisited_steps() {
        let mut wizard = Wizard::new(
            WizardOptions::new(signup())
                .initial_data(values(json!({ "email": "a@b.c", "card": "4242" }))),
        )
        .unwrap();
        assert!(wizard.complete_wizard().await);
        assert!(wizard.state().is_complete);
        assert!(wizard.state().completed_steps.is_empty());
    }

    #[test]
    fn progress_projections() {
        let mut wizard = wizard();
        assert!(wizard.state().is_first_step());
        wizard.go_to_step(3);
        assert!(wizard.state().is_last_step());
        assert!((wizard.state().progress() - 1.0).abs() < f64::EPSILON);
    }
}
