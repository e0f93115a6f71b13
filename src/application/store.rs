//! The draft store: the single owner of in-progress wizard state.
//!
//! Every mutation is applied to the in-memory [`WizardState`] first and then
//! mirrored to a [`SnapshotStore`]. A failed write never rolls back the
//! mutation; the error is logged and held until the shell collects it with
//! [`DraftStore::take_persist_error`].

use crate::domain::{
    EmploymentInfoDraft, FormStep, LoanDetailsDraft, PersonalInfoDraft, StorageError, Theme,
    WizardState,
};
use std::cell::RefCell;
use std::fmt::Debug;
use std::rc::Rc;
use tracing::{debug, error, warn};

/// Durable home for wizard snapshots.
pub trait SnapshotStore: Debug {
    /// Reads the last snapshot, or `None` if nothing was ever saved.
    fn load(&self) -> Result<Option<WizardState>, StorageError>;
    fn save(&self, state: &WizardState) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

/// Durable home for the light/dark preference.
pub trait ThemeStore: Debug {
    fn load_theme(&self) -> Result<Option<Theme>, StorageError>;
    fn save_theme(&self, theme: Theme) -> Result<(), StorageError>;
}

/// Keeps snapshots in memory. Clones share the same slot, so a test can hand
/// one clone to a [`DraftStore`] and inspect what was written through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshot: Rc<RefCell<Option<WizardState>>>,
    theme: Rc<RefCell<Option<Theme>>>,
    saves: Rc<RefCell<usize>>,
}

impl MemoryStore {
    pub fn with_snapshot(state: WizardState) -> Self {
        let store = Self::default();
        *store.snapshot.borrow_mut() = Some(state);
        store
    }

    pub fn snapshot(&self) -> Option<WizardState> {
        self.snapshot.borrow().clone()
    }

    pub fn save_count(&self) -> usize {
        *self.saves.borrow()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<WizardState>, StorageError> {
        Ok(self.snapshot())
    }

    fn save(&self, state: &WizardState) -> Result<(), StorageError> {
        *self.snapshot.borrow_mut() = Some(state.clone());
        *self.saves.borrow_mut() += 1;
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.snapshot.borrow_mut() = None;
        Ok(())
    }
}

impl ThemeStore for MemoryStore {
    fn load_theme(&self) -> Result<Option<Theme>, StorageError> {
        Ok(*self.theme.borrow())
    }

    fn save_theme(&self, theme: Theme) -> Result<(), StorageError> {
        *self.theme.borrow_mut() = Some(theme);
        Ok(())
    }
}

#[derive(Debug)]
pub struct DraftStore {
    state: WizardState,
    backend: Box<dyn SnapshotStore>,
    persist_error: Option<String>,
}

impl DraftStore {
    /// Rehydrates from `backend`. An unreadable snapshot is logged and
    /// replaced by the empty state.
    pub fn open(backend: Box<dyn SnapshotStore>) -> Self {
        let state = match backend.load() {
            Ok(Some(state)) => {
                debug!(step = state.current_step.number(), "rehydrated draft");
                state
            }
            Ok(None) => WizardState::default(),
            Err(err) => {
                warn!(error = %err, "discarding unreadable draft snapshot");
                WizardState::default()
            }
        };

        Self {
            state,
            backend,
            persist_error: None,
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn current_step(&self) -> FormStep {
        self.state.current_step
    }

    pub fn is_form_started(&self) -> bool {
        self.state.is_form_started
    }

    pub fn is_step_completed(&self, step: FormStep) -> bool {
        self.state.completed_steps.contains(&step)
    }

    pub fn set_personal_info(&mut self, partial: PersonalInfoDraft) {
        self.state.personal_info.merge(partial);
        self.persist();
    }

    pub fn set_employment_info(&mut self, partial: EmploymentInfoDraft) {
        self.state.employment_info.merge(partial);
        self.persist();
    }

    pub fn set_loan_details(&mut self, partial: LoanDetailsDraft) {
        self.state.loan_details.merge(partial);
        self.persist();
    }

    /// Overwrites the whole loan record, so an emptied down payment is
    /// dropped rather than merged over.
    pub fn replace_loan_details(&mut self, details: LoanDetailsDraft) {
        self.state.loan_details = details;
        self.persist();
    }

    pub fn set_current_step(&mut self, step: FormStep) {
        self.state.current_step = step;
        self.persist();
    }

    pub fn mark_step_completed(&mut self, step: FormStep) {
        if self.state.completed_steps.insert(step) {
            self.persist();
        }
    }

    pub fn next_step(&mut self) {
        self.state.current_step = self.state.current_step.next();
        self.persist();
    }

    pub fn previous_step(&mut self) {
        self.state.current_step = self.state.current_step.previous();
        self.persist();
    }

    pub fn start_form(&mut self) {
        self.state.is_form_started = true;
        self.state.current_step = FormStep::PersonalInfo;
        self.persist();
    }

    pub fn reset_form(&mut self) {
        self.state = WizardState::default();
        self.persist();
    }

    /// Returns the most recent persistence failure, if any, and forgets it.
    pub fn take_persist_error(&mut self) -> Option<String> {
        self.persist_error.take()
    }

    fn persist(&mut self) {
        if let Err(err) = self.backend.save(&self.state) {
            error!(error = %err, "failed to persist draft");
            self.persist_error = Some(format!("Could not save your progress: {}", err));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LoanPurpose;

    #[derive(Debug)]
    struct BrokenStore;

    impl SnapshotStore for BrokenStore {
        fn load(&self) -> Result<Option<WizardState>, StorageError> {
            Err(StorageError::Io {
                path: "draft.json".into(),
                source: std::io::Error::other("disk on fire"),
            })
        }

        fn save(&self, _state: &WizardState) -> Result<(), StorageError> {
            self.load().map(|_| ())
        }

        fn clear(&self) -> Result<(), StorageError> {
            Ok(())
        }
    }

    fn open_store() -> (DraftStore, MemoryStore) {
        let backend = MemoryStore::default();
        (DraftStore::open(Box::new(backend.clone())), backend)
    }

    #[test]
    fn test_open_empty() {
        let (store, backend) = open_store();
        assert_eq!(store.state(), &WizardState::default());
        assert_eq!(backend.save_count(), 0);
    }

    #[test]
    fn test_open_rehydrates_snapshot() {
        let mut saved = WizardState::default();
        saved.is_form_started = true;
        saved.current_step = FormStep::LoanDetails;
        saved.personal_info.city = Some("New York".to_string());

        let store = DraftStore::open(Box::new(MemoryStore::with_snapshot(saved.clone())));
        assert_eq!(store.state(), &saved);
    }

    #[test]
    fn test_unreadable_snapshot_starts_empty() {
        let mut store = DraftStore::open(Box::new(BrokenStore));
        assert_eq!(store.state(), &WizardState::default());

        store.start_form();
        assert!(store.is_form_started());
        assert!(store.take_persist_error().unwrap().contains("disk on fire"));
        assert!(store.take_persist_error().is_none());
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let (mut store, backend) = open_store();
        store.start_form();
        store.set_personal_info(PersonalInfoDraft {
            first_name: Some("John".to_string()),
            ..Default::default()
        });
        store.next_step();
        assert_eq!(backend.save_count(), 3);
        assert_eq!(backend.snapshot().as_ref(), Some(store.state()));
    }

    #[test]
    fn test_next_step_never_exceeds_review() {
        let (mut store, _) = open_store();
        for _ in 0..10 {
            store.next_step();
        }
        assert_eq!(store.current_step(), FormStep::ReviewSubmit);
    }

    #[test]
    fn test_previous_step_never_goes_below_first() {
        let (mut store, _) = open_store();
        store.set_current_step(FormStep::EmploymentInfo);
        for _ in 0..10 {
            store.previous_step();
        }
        assert_eq!(store.current_step(), FormStep::PersonalInfo);
    }

    #[test]
    fn test_mark_step_completed_is_idempotent() {
        let (mut store, backend) = open_store();
        store.mark_step_completed(FormStep::EmploymentInfo);
        let after_first = store.state().clone();
        let saves = backend.save_count();

        store.mark_step_completed(FormStep::EmploymentInfo);
        assert_eq!(store.state(), &after_first);
        assert_eq!(store.state().completed_steps.len(), 1);
        assert_eq!(backend.save_count(), saves);
    }

    #[test]
    fn test_start_form_returns_to_first_step() {
        let (mut store, _) = open_store();
        store.set_current_step(FormStep::LoanDetails);
        store.start_form();
        assert!(store.is_form_started());
        assert_eq!(store.current_step(), FormStep::PersonalInfo);
    }

    #[test]
    fn test_shallow_merge() {
        let (mut store, _) = open_store();
        store.set_loan_details(LoanDetailsDraft {
            loan_amount: Some(5000.0),
            down_payment: Some(500.0),
            ..Default::default()
        });
        store.set_loan_details(LoanDetailsDraft {
            loan_purpose: Some(LoanPurpose::Education),
            ..Default::default()
        });
        let loan = &store.state().loan_details;
        assert_eq!(loan.loan_amount, Some(5000.0));
        assert_eq!(loan.down_payment, Some(500.0));
        assert_eq!(loan.loan_purpose, Some(LoanPurpose::Education));
    }

    #[test]
    fn test_replace_loan_details_drops_down_payment() {
        let (mut store, _) = open_store();
        store.set_loan_details(LoanDetailsDraft {
            loan_amount: Some(5000.0),
            down_payment: Some(500.0),
            ..Default::default()
        });
        store.replace_loan_details(LoanDetailsDraft {
            loan_amount: Some(6000.0),
            ..Default::default()
        });
        assert_eq!(store.state().loan_details.down_payment, None);
        assert_eq!(store.state().loan_details.loan_amount, Some(6000.0));
    }

    #[test]
    fn test_reset_form_restores_initial_state() {
        let (mut store, backend) = open_store();
        store.start_form();
        store.set_personal_info(PersonalInfoDraft {
            email: Some("john.doe@example.com".to_string()),
            ..Default::default()
        });
        store.set_employment_info(EmploymentInfoDraft {
            annual_salary: Some(1.0),
            ..Default::default()
        });
        store.mark_step_completed(FormStep::PersonalInfo);
        store.next_step();
        store.next_step();

        store.reset_form();
        assert_eq!(store.state(), &WizardState::default());
        assert_eq!(backend.snapshot(), Some(WizardState::default()));
    }
}
