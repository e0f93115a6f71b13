use super::StepForm;
use crate::application::forms::{FormField, FormState};
use crate::application::store::DraftStore;
use crate::domain::schema::{self, validate_personal_info};
use crate::domain::{FormStep, PersonalInfoDraft};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PersonalField {
    FirstName,
    LastName,
    Email,
    Phone,
    Address,
    City,
    State,
    ZipCode,
}

impl FormField for PersonalField {
    const ALL: &'static [Self] = &[
        PersonalField::FirstName,
        PersonalField::LastName,
        PersonalField::Email,
        PersonalField::Phone,
        PersonalField::Address,
        PersonalField::City,
        PersonalField::State,
        PersonalField::ZipCode,
    ];

    fn key(self) -> &'static str {
        match self {
            PersonalField::FirstName => "firstName",
            PersonalField::LastName => "lastName",
            PersonalField::Email => "email",
            PersonalField::Phone => "phone",
            PersonalField::Address => "address",
            PersonalField::City => "city",
            PersonalField::State => "state",
            PersonalField::ZipCode => "zipCode",
        }
    }

    fn label(self) -> &'static str {
        match self {
            PersonalField::FirstName => "First Name",
            PersonalField::LastName => "Last Name",
            PersonalField::Email => "Email Address",
            PersonalField::Phone => "Phone Number",
            PersonalField::Address => "Street Address",
            PersonalField::City => "City",
            PersonalField::State => "State",
            PersonalField::ZipCode => "ZIP Code",
        }
    }

    fn placeholder(self) -> &'static str {
        match self {
            PersonalField::FirstName => "Enter your first name",
            PersonalField::LastName => "Enter your last name",
            PersonalField::Email => "Enter your email address",
            PersonalField::Phone => "(555) 123-4567",
            PersonalField::Address => "123 Main Street",
            PersonalField::City => "New York",
            PersonalField::State => "NY",
            PersonalField::ZipCode => "10001",
        }
    }

    fn validate(self, raw: &str) -> Option<String> {
        schema::personal_field(self.key(), Some(raw)).err()
    }
}

/// Step 1: who the applicant is and where they live.
#[derive(Debug, Clone)]
pub struct PersonalInfoStep {
    form: FormState<PersonalField>,
}

impl PersonalInfoStep {
    pub fn from_draft(draft: &PersonalInfoDraft) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        Self {
            form: FormState::new([
                (PersonalField::FirstName, text(&draft.first_name)),
                (PersonalField::LastName, text(&draft.last_name)),
                (PersonalField::Email, text(&draft.email)),
                (PersonalField::Phone, text(&draft.phone)),
                (PersonalField::Address, text(&draft.address)),
                (PersonalField::City, text(&draft.city)),
                (PersonalField::State, text(&draft.state)),
                (PersonalField::ZipCode, text(&draft.zip_code)),
            ]),
        }
    }

    fn to_draft(&self) -> PersonalInfoDraft {
        let value = |field| Some(self.form.value(field).to_string());
        PersonalInfoDraft {
            first_name: value(PersonalField::FirstName),
            last_name: value(PersonalField::LastName),
            email: value(PersonalField::Email),
            phone: value(PersonalField::Phone),
            address: value(PersonalField::Address),
            city: value(PersonalField::City),
            state: value(PersonalField::State),
            zip_code: value(PersonalField::ZipCode),
        }
    }
}

impl StepForm for PersonalInfoStep {
    type Field = PersonalField;

    fn form(&self) -> &FormState<PersonalField> {
        &self.form
    }

    fn form_mut(&mut self) -> &mut FormState<PersonalField> {
        &mut self.form
    }

    fn submit(&mut self, store: &mut DraftStore) -> bool {
        // A bad email is the most common mistake, so it gets focus first.
        if !self.form.validate_all(Some(PersonalField::Email)) {
            debug!(focus = ?self.form.focus(), "personal info blocked by field errors");
            return false;
        }

        match validate_personal_info(&self.to_draft()) {
            Ok(info) => {
                store.set_personal_info(info.into());
                store.mark_step_completed(FormStep::PersonalInfo);
                store.next_step();
                self.form.clear_errors();
                info!("personal info step completed");
                true
            }
            Err(errors) => {
                self.form.apply_schema_errors(&errors);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::store::MemoryStore;

    fn john_doe() -> PersonalInfoDraft {
        PersonalInfoDraft {
            first_name: Some("John".to_string()),
            last_name: Some("Doe".to_string()),
            email: Some("john.doe@example.com".to_string()),
            phone: Some("1234567890".to_string()),
            address: Some("123 Main St".to_string()),
            city: Some("New York".to_string()),
            state: Some("NY".to_string()),
            zip_code: Some("10001".to_string()),
        }
    }

    fn started_store() -> DraftStore {
        let mut store = DraftStore::open(Box::new(MemoryStore::default()));
        store.start_form();
        store
    }

    #[test]
    fn test_valid_draft_completes_step_one() {
        let mut store = started_store();
        store.set_personal_info(john_doe());

        let mut step = PersonalInfoStep::from_draft(&store.state().personal_info);
        assert!(step.submit(&mut store));
        assert!(!step.form().has_errors());
        assert!(store.is_step_completed(FormStep::PersonalInfo));
        assert_eq!(store.current_step(), FormStep::EmploymentInfo);
        assert_eq!(store.state().personal_info, john_doe());
    }

    #[test]
    fn test_invalid_email_on_blur_and_cleared_on_type() {
        let mut step = PersonalInfoStep::from_draft(&PersonalInfoDraft::default());
        step.form_mut().focus_field(PersonalField::Email);
        for ch in "invalid-email".chars() {
            step.type_char(ch);
        }
        step.form_mut().focus_next();

        assert_eq!(
            step.form().error(PersonalField::Email),
            Some("Please enter a valid email address")
        );
        assert!(step.form().has_error(PersonalField::Email));

        step.form_mut().focus_field(PersonalField::Email);
        step.type_char('x');
        assert!(!step.form().has_error(PersonalField::Email));
    }

    #[test]
    fn test_empty_email_on_blur_is_required() {
        let mut step = PersonalInfoStep::from_draft(&PersonalInfoDraft::default());
        step.form_mut().focus_field(PersonalField::Email);
        step.form_mut().focus_next();
        assert_eq!(step.form().error(PersonalField::Email), Some("Email is required"));
    }

    #[test]
    fn test_missing_field_blocks_advance() {
        let mut store = started_store();
        let draft = PersonalInfoDraft {
            city: None,
            ..john_doe()
        };
        let mut step = PersonalInfoStep::from_draft(&draft);

        assert!(!step.submit(&mut store));
        assert_eq!(step.form().error(PersonalField::City), Some("City is required"));
        assert!(PersonalField::ALL
            .iter()
            .filter(|f| **f != PersonalField::City)
            .all(|f| !step.form().has_error(*f)));
        assert_eq!(step.form().focus(), PersonalField::City);
        assert_eq!(store.current_step(), FormStep::PersonalInfo);
        assert!(store.state().completed_steps.is_empty());
        assert_eq!(store.state().personal_info, PersonalInfoDraft::default());
    }

    #[test]
    fn test_email_failure_takes_focus_priority() {
        let mut store = started_store();
        let draft = PersonalInfoDraft {
            first_name: None,
            email: Some("nope".to_string()),
            ..john_doe()
        };
        let mut step = PersonalInfoStep::from_draft(&draft);

        assert!(!step.submit(&mut store));
        assert!(step.form().has_error(PersonalField::FirstName));
        assert_eq!(step.form().focus(), PersonalField::Email);
    }
}
