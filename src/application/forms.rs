//! Field buffers, inline errors and focus for one step's form.
//!
//! Values are kept as the text the applicant typed. Parsing happens only in
//! the field rules, so a half-typed number never reaches the draft store.

use crate::domain::ValidationErrors;
use std::collections::BTreeMap;
use std::fmt::Debug;

/// A field of a step form.
///
/// `ALL` fixes the on-screen order, which is also the order used to pick the
/// first failing field after a submit.
pub trait FormField: Copy + Ord + Debug + 'static {
    const ALL: &'static [Self];

    /// camelCase key matching the schema's field names.
    fn key(self) -> &'static str;

    fn label(self) -> &'static str;

    fn placeholder(self) -> &'static str {
        ""
    }

    fn required(self) -> bool {
        true
    }

    /// Returns the inline message for `raw`, or `None` when it is acceptable.
    fn validate(self, raw: &str) -> Option<String>;

    /// Choice fields are changed by cycling rather than typing.
    fn is_choice(self) -> bool {
        false
    }

    /// Numeric fields drop a lone placeholder `0` on the first digit typed.
    fn is_numeric(self) -> bool {
        false
    }

    /// The option after (or before) `current` for a choice field.
    fn cycle(self, current: &str, _forward: bool) -> String {
        current.to_string()
    }

    /// How a raw value is shown on screen.
    fn display(self, raw: &str) -> String {
        raw.to_string()
    }
}

#[derive(Debug, Clone)]
pub struct FormState<F: FormField> {
    values: BTreeMap<F, String>,
    errors: BTreeMap<F, String>,
    focus: F,
}

impl<F: FormField> FormState<F> {
    pub fn new(values: impl IntoIterator<Item = (F, String)>) -> Self {
        Self {
            values: values.into_iter().collect(),
            errors: BTreeMap::new(),
            focus: F::ALL[0],
        }
    }

    pub fn value(&self, field: F) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    /// Stores a value without touching that field's error.
    pub fn set_value(&mut self, field: F, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    /// An edit by the applicant: stores the value and clears any error on the
    /// field, whether or not the new value is valid.
    pub fn edit(&mut self, field: F, value: impl Into<String>) {
        self.set_value(field, value);
        self.errors.remove(&field);
    }

    /// Field-level check run when a field loses focus.
    pub fn blur(&mut self, field: F) {
        if let Some(message) = field.validate(self.value(field)) {
            self.errors.insert(field, message);
        }
    }

    pub fn error(&self, field: F) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn has_error(&self, field: F) -> bool {
        self.errors.contains_key(&field)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    pub fn focus(&self) -> F {
        self.focus
    }

    pub fn focus_field(&mut self, field: F) {
        if field != self.focus {
            self.blur(self.focus);
            self.focus = field;
        }
    }

    pub fn focus_next(&mut self) {
        let index = self.focus_index();
        self.focus_field(F::ALL[(index + 1) % F::ALL.len()]);
    }

    pub fn focus_previous(&mut self) {
        let index = self.focus_index();
        self.focus_field(F::ALL[(index + F::ALL.len() - 1) % F::ALL.len()]);
    }

    fn focus_index(&self) -> usize {
        F::ALL.iter().position(|f| *f == self.focus).unwrap_or(0)
    }

    /// Submit-time check of every field.
    ///
    /// On failure the error map is replaced by all failing fields and focus
    /// moves to `priority` if it failed, otherwise to the first failure.
    pub fn validate_all(&mut self, priority: Option<F>) -> bool {
        let failures: BTreeMap<F, String> = F::ALL
            .iter()
            .filter_map(|&field| field.validate(self.value(field)).map(|m| (field, m)))
            .collect();

        if failures.is_empty() {
            self.errors.clear();
            return true;
        }

        let target = priority
            .filter(|p| failures.contains_key(p))
            .or_else(|| failures.keys().next().copied());
        if let Some(target) = target {
            self.focus = target;
        }
        self.errors = failures;
        false
    }

    /// Shows schema failures inline, keyed by each field's camelCase key.
    pub fn apply_schema_errors(&mut self, errors: &ValidationErrors) {
        for &field in F::ALL {
            if let Some(message) = errors.get(field.key()) {
                self.errors.insert(field, message.to_string());
            }
        }
        if let Some(first) = F::ALL.iter().copied().find(|f| self.errors.contains_key(f)) {
            self.focus = first;
        }
    }

    /// Appends a typed character to the focused text field. Returns the
    /// edited field.
    pub fn type_char(&mut self, ch: char) -> Option<F> {
        let field = self.focus;
        if field.is_choice() || ch.is_control() {
            return None;
        }
        let mut value = self.value(field).to_string();
        if field.is_numeric() && value == "0" && ch.is_ascii_digit() {
            value.clear();
        }
        value.push(ch);
        self.edit(field, value);
        Some(field)
    }

    pub fn backspace(&mut self) -> Option<F> {
        let field = self.focus;
        if field.is_choice() {
            return None;
        }
        let mut value = self.value(field).to_string();
        value.pop()?;
        self.edit(field, value);
        Some(field)
    }

    pub fn cycle_choice(&mut self, forward: bool) -> Option<F> {
        let field = self.focus;
        if !field.is_choice() {
            return None;
        }
        let next = field.cycle(self.value(field), forward);
        self.edit(field, next);
        Some(field)
    }
}

/// Picks the option after/before `current` from `keys`, wrapping around.
/// An unknown `current` selects the first option.
pub fn cycle_keys(keys: &[&str], current: &str, forward: bool) -> String {
    let Some(index) = keys.iter().position(|k| *k == current) else {
        return keys.first().map(|k| k.to_string()).unwrap_or_default();
    };
    let next = if forward {
        (index + 1) % keys.len()
    } else {
        (index + keys.len() - 1) % keys.len()
    };
    keys[next].to_string()
}
