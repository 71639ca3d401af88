//! Field values with per-field validation.
//!
//! Values are dynamic JSON values keyed by field name. A field validator sees
//! the candidate value and every other current value, so cross-field rules
//! (password confirmation, date ranges) can be expressed.

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    fmt,
};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{Store, SubscriptionId};

/// Flat map of field values.
pub type FormValues = Map<String, Value>;

/// Field validator: returns an error message, or `None` if the value is valid.
pub type FieldValidator = Box<dyn Fn(&Value, &FormValues) -> Option<String> + Send + Sync>;

/// Snapshot of a [`FormBehavior`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    /// Current values.
    pub values: FormValues,
    /// Validation message per field that failed its validator.
    pub errors: BTreeMap<String, String>,
    /// Fields written since creation or the last reset.
    pub touched: BTreeSet<String>,
    /// Whether `values` differs from the initial values.
    pub is_dirty: bool,
}

impl FormState {
    /// Whether no field currently has an error.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Form values and validation behavior.
pub struct FormBehavior {
    store: Store<FormState>,
    initial: FormValues,
    validators: HashMap<String, FieldValidator>,
}

impl fmt::Debug for FormBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormBehavior")
            .field("store", &self.store)
            .field("validators", &self.validators.len())
            .finish_non_exhaustive()
    }
}

impl FormBehavior {
    /// Create a form holding `initial` values.
    pub fn new(initial: FormValues) -> Self {
        let state = FormState {
            values: initial.clone(),
            errors: BTreeMap::new(),
            touched: BTreeSet::new(),
            is_dirty: false,
        };
        Self { store: Store::new(state), initial, validators: HashMap::new() }
    }

    /// Attach a validator to `field`.
    #[must_use]
    pub fn with_validator(
        mut self,
        field: impl Into<String>,
        validator: impl Fn(&Value, &FormValues) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.validators.insert(field.into(), Box::new(validator));
        self
    }

    /// Current snapshot.
    pub fn state(&self) -> &FormState {
        self.store.state()
    }

    /// Current values.
    pub fn values(&self) -> &FormValues {
        &self.store.state().values
    }

    /// Register a state listener.
    pub fn subscribe(&mut self, listener: impl FnMut(&FormState) + Send + 'static) -> SubscriptionId {
        self.store.subscribe(listener)
    }

    /// Remove a state listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Write one field and run its validator.
    pub fn set_field_value(&mut self, field: &str, value: Value) -> bool {
        let error = self.run_validator(field, &value);
        let initial = &self.initial;
        self.store.update(|s| {
            s.values.insert(field.to_string(), value);
            s.touched.insert(field.to_string());
            match error {
                Some(message) => {
                    s.errors.insert(field.to_string(), message);
                },
                None => {
                    s.errors.remove(field);
                },
            }
            s.is_dirty = s.values != *initial;
        })
    }

    /// Shallow-merge `values` into the current values in one update.
    pub fn set_values(&mut self, values: FormValues) -> bool {
        let errors: Vec<(String, Option<String>)> = values
            .iter()
            .map(|(field, value)| (field.clone(), self.run_validator(field, value)))
            .collect();
        let initial = &self.initial;
        self.store.update(|s| {
            for (field, value) in values {
                s.touched.insert(field.clone());
                s.values.insert(field, value);
            }
            for (field, error) in errors {
                match error {
                    Some(message) => {
                        s.errors.insert(field, message);
                    },
                    None => {
                        s.errors.remove(&field);
                    },
                }
            }
            s.is_dirty = s.values != *initial;
        })
    }

    /// Run every validator against the current values.
    ///
    /// Returns `true` if all fields are valid.
    pub fn validate_all(&mut self) -> bool {
        let values = self.store.state().values.clone();
        let mut errors = BTreeMap::new();
        for (field, validator) in &self.validators {
            let value = values.get(field).unwrap_or(&Value::Null);
            if let Some(message) = validator(value, &values) {
                errors.insert(field.clone(), message);
            }
        }
        let valid = errors.is_empty();
        self.store.update(|s| s.errors = errors);
        valid
    }

    /// Restore the initial values and clear errors and touched fields.
    pub fn reset_form(&mut self) -> bool {
        let initial = self.initial.clone();
        self.store.update(|s| {
            s.values = initial;
            s.errors.clear();
            s.touched.clear();
            s.is_dirty = false;
        })
    }

    /// Drop listeners and stop accepting updates.
    pub fn destroy(&mut self) {
        self.store.destroy();
    }

    fn run_validator(&self, field: &str, value: &Value) -> Option<String> {
        let validator = self.validators.get(field)?;
        validator(value, &self.store.state().values)
    }
}
