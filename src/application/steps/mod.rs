//! The four step views of the wizard.
//!
//! Each form step owns a [`FormState`] seeded from the draft store when the
//! step is entered. Nothing typed reaches the store until the step's submit
//! passes both the field rules and the step schema.

pub mod employment;
pub mod loan;
pub mod personal;
pub mod review;

pub use employment::{EmploymentField, EmploymentInfoStep};
pub use loan::{LoanDetailsStep, LoanField};
pub use personal::{PersonalField, PersonalInfoStep};
pub use review::{ReviewPhase, ReviewStep, SubmissionTiming};

use crate::application::forms::{FormField, FormState};
use crate::application::store::DraftStore;
use crate::domain::{FormStep, WizardState};

/// Behaviour shared by the three data-entry steps.
pub trait StepForm {
    type Field: FormField;

    fn form(&self) -> &FormState<Self::Field>;

    fn form_mut(&mut self) -> &mut FormState<Self::Field>;

    /// Called after the applicant changes `field`.
    fn after_edit(&mut self, _field: Self::Field) {}

    fn type_char(&mut self, ch: char) {
        if let Some(field) = self.form_mut().type_char(ch) {
            self.after_edit(field);
        }
    }

    fn backspace(&mut self) {
        if let Some(field) = self.form_mut().backspace() {
            self.after_edit(field);
        }
    }

    fn cycle_choice(&mut self, forward: bool) {
        if let Some(field) = self.form_mut().cycle_choice(forward) {
            self.after_edit(field);
        }
    }

    /// Validates the step and, on success, records it in `store` and
    /// advances. Returns whether the step advanced.
    fn submit(&mut self, store: &mut DraftStore) -> bool;
}

/// The view for the store's current step.
#[derive(Debug, Clone)]
pub enum StepView {
    PersonalInfo(PersonalInfoStep),
    EmploymentInfo(EmploymentInfoStep),
    LoanDetails(LoanDetailsStep),
    ReviewSubmit(ReviewStep),
}

/// Expands `$body` once per form step, binding the step to `$step`.
macro_rules! on_form {
    ($view:expr, $step:ident => $body:expr, review => $review:expr) => {
        match $view {
            StepView::PersonalInfo($step) => $body,
            StepView::EmploymentInfo($step) => $body,
            StepView::LoanDetails($step) => $body,
            StepView::ReviewSubmit(_) => $review,
        }
    };
}

impl StepView {
    pub fn for_step(step: FormStep, state: &WizardState, timing: SubmissionTiming) -> Self {
        match step {
            FormStep::PersonalInfo => {
                StepView::PersonalInfo(PersonalInfoStep::from_draft(&state.personal_info))
            }
            FormStep::EmploymentInfo => {
                StepView::EmploymentInfo(EmploymentInfoStep::from_draft(&state.employment_info))
            }
            FormStep::LoanDetails => {
                StepView::LoanDetails(LoanDetailsStep::from_draft(&state.loan_details))
            }
            FormStep::ReviewSubmit => StepView::ReviewSubmit(ReviewStep::new(timing)),
        }
    }

    pub fn step(&self) -> FormStep {
        match self {
            StepView::PersonalInfo(_) => FormStep::PersonalInfo,
            StepView::EmploymentInfo(_) => FormStep::EmploymentInfo,
            StepView::LoanDetails(_) => FormStep::LoanDetails,
            StepView::ReviewSubmit(_) => FormStep::ReviewSubmit,
        }
    }

    pub fn type_char(&mut self, ch: char) {
        on_form!(self, step => step.type_char(ch), review => ());
    }

    pub fn backspace(&mut self) {
        on_form!(self, step => step.backspace(), review => ());
    }

    pub fn cycle_choice(&mut self, forward: bool) {
        on_form!(self, step => step.cycle_choice(forward), review => ());
    }

    pub fn focus_next(&mut self) {
        on_form!(self, step => step.form_mut().focus_next(), review => ());
    }

    pub fn focus_previous(&mut self) {
        on_form!(self, step => step.form_mut().focus_previous(), review => ());
    }

    /// Runs the submit of a form step. The review step submits through
    /// [`ReviewStep::submit`] instead, so here it never advances.
    pub fn submit_form(&mut self, store: &mut DraftStore) -> bool {
        on_form!(self, step => step.submit(store), review => false)
    }
}
