use super::StepForm;
use crate::application::forms::{cycle_keys, FormField, FormState};
use crate::application::store::DraftStore;
use crate::domain::schema::{self, validate_employment_info};
use crate::domain::{
    annual_from_monthly, monthly_from_annual, round_cents, EmploymentInfoDraft, EmploymentType,
    FormStep,
};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EmploymentField {
    Employer,
    Position,
    EmploymentType,
    YearsEmployed,
    AnnualSalary,
    MonthlyIncome,
}

impl EmploymentField {
    /// Name used in numeric messages, e.g. "Annual salary cannot be negative".
    fn message_name(self) -> &'static str {
        match self {
            EmploymentField::YearsEmployed => "Years employed",
            EmploymentField::AnnualSalary => "Annual salary",
            EmploymentField::MonthlyIncome => "Monthly income",
            _ => self.label(),
        }
    }

    fn parse(self, raw: &str) -> schema::RuleResult<Option<f64>> {
        schema::parse_number(self.message_name(), raw)
    }
}

impl FormField for EmploymentField {
    const ALL: &'static [Self] = &[
        EmploymentField::Employer,
        EmploymentField::Position,
        EmploymentField::EmploymentType,
        EmploymentField::YearsEmployed,
        EmploymentField::AnnualSalary,
        EmploymentField::MonthlyIncome,
    ];

    fn key(self) -> &'static str {
        match self {
            EmploymentField::Employer => "employer",
            EmploymentField::Position => "position",
            EmploymentField::EmploymentType => "employmentType",
            EmploymentField::YearsEmployed => "yearsEmployed",
            EmploymentField::AnnualSalary => "annualSalary",
            EmploymentField::MonthlyIncome => "monthlyIncome",
        }
    }

    fn label(self) -> &'static str {
        match self {
            EmploymentField::Employer => "Employer",
            EmploymentField::Position => "Position/Title",
            EmploymentField::EmploymentType => "Employment Type",
            EmploymentField::YearsEmployed => "Years Employed",
            EmploymentField::AnnualSalary => "Annual Salary",
            EmploymentField::MonthlyIncome => "Monthly Income",
        }
    }

    fn placeholder(self) -> &'static str {
        match self {
            EmploymentField::Employer => "ABC Company Inc.",
            EmploymentField::Position => "Software Engineer",
            _ => "0",
        }
    }

    fn validate(self, raw: &str) -> Option<String> {
        match self {
            EmploymentField::Employer | EmploymentField::Position => {
                schema::required_text(self.key(), Some(raw)).err()
            }
            EmploymentField::EmploymentType => {
                schema::employment_type(EmploymentType::from_key(raw)).err()
            }
            EmploymentField::YearsEmployed
            | EmploymentField::AnnualSalary
            | EmploymentField::MonthlyIncome => self
                .parse(raw)
                .and_then(|value| schema::non_negative(self.message_name(), value))
                .err(),
        }
    }

    fn is_choice(self) -> bool {
        self == EmploymentField::EmploymentType
    }

    fn is_numeric(self) -> bool {
        matches!(
            self,
            EmploymentField::YearsEmployed
                | EmploymentField::AnnualSalary
                | EmploymentField::MonthlyIncome
        )
    }

    fn cycle(self, current: &str, forward: bool) -> String {
        let keys = EmploymentType::ALL.map(EmploymentType::key);
        cycle_keys(&keys, current, forward)
    }

    fn display(self, raw: &str) -> String {
        match self {
            EmploymentField::EmploymentType => EmploymentType::from_key(raw)
                .map(|t| t.label().to_string())
                .unwrap_or_else(|| raw.to_string()),
            _ => raw.to_string(),
        }
    }
}

/// Step 2: employer and income. Annual and monthly income stay in step:
/// whichever one was edited last drives the other.
#[derive(Debug, Clone)]
pub struct EmploymentInfoStep {
    form: FormState<EmploymentField>,
}

impl EmploymentInfoStep {
    pub fn from_draft(draft: &EmploymentInfoDraft) -> Self {
        let number = |value: Option<f64>| value.unwrap_or(0.0).to_string();
        Self {
            form: FormState::new([
                (EmploymentField::Employer, draft.employer.clone().unwrap_or_default()),
                (EmploymentField::Position, draft.position.clone().unwrap_or_default()),
                (
                    EmploymentField::EmploymentType,
                    draft.employment_type.unwrap_or_default().key().to_string(),
                ),
                (EmploymentField::YearsEmployed, number(draft.years_employed)),
                (EmploymentField::AnnualSalary, number(draft.annual_salary)),
                (EmploymentField::MonthlyIncome, number(draft.monthly_income)),
            ]),
        }
    }

    fn amount(&self, field: EmploymentField) -> Option<f64> {
        field.parse(self.form.value(field)).ok().flatten()
    }

    fn to_draft(&self) -> EmploymentInfoDraft {
        EmploymentInfoDraft {
            employer: Some(self.form.value(EmploymentField::Employer).to_string()),
            position: Some(self.form.value(EmploymentField::Position).to_string()),
            employment_type: EmploymentType::from_key(self.form.value(EmploymentField::EmploymentType)),
            years_employed: self.amount(EmploymentField::YearsEmployed),
            annual_salary: self.amount(EmploymentField::AnnualSalary),
            monthly_income: self.amount(EmploymentField::MonthlyIncome),
        }
    }

    /// Rewrites the income field that was not just edited. Text that does
    /// not parse counts as zero.
    fn sync_income(&mut self, edited: EmploymentField) {
        let typed = self.amount(edited).unwrap_or(0.0);
        let (target, derived) = match edited {
            EmploymentField::AnnualSalary => (EmploymentField::MonthlyIncome, monthly_from_annual(typed)),
            EmploymentField::MonthlyIncome => (EmploymentField::AnnualSalary, annual_from_monthly(typed)),
            _ => return,
        };
        self.form.edit(target, round_cents(derived).to_string());
    }
}

impl StepForm for EmploymentInfoStep {
    type Field = EmploymentField;

    fn form(&self) -> &FormState<EmploymentField> {
        &self.form
    }

    fn form_mut(&mut self) -> &mut FormState<EmploymentField> {
        &mut self.form
    }

    fn after_edit(&mut self, field: EmploymentField) {
        self.sync_income(field);
    }

    fn submit(&mut self, store: &mut DraftStore) -> bool {
        if !self.form.validate_all(None) {
            return false;
        }

        match validate_employment_info(&self.to_draft()) {
            Ok(info) => {
                store.set_employment_info(info.into());
                store.mark_step_completed(FormStep::EmploymentInfo);
                store.next_step();
                self.form.clear_errors();
                info!("employment step completed");
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

    fn type_into(step: &mut EmploymentInfoStep, field: EmploymentField, text: &str) {
        step.form_mut().focus_field(field);
        while !step.form().value(field).is_empty() {
            step.backspace();
        }
        for ch in text.chars() {
            step.type_char(ch);
        }
    }

    #[test]
    fn test_defaults_for_empty_draft() {
        let step = EmploymentInfoStep::from_draft(&EmploymentInfoDraft::default());
        assert_eq!(step.form().value(EmploymentField::EmploymentType), "full-time");
        assert_eq!(step.form().value(EmploymentField::YearsEmployed), "0");
        assert_eq!(step.form().value(EmploymentField::AnnualSalary), "0");
        assert_eq!(step.form().value(EmploymentField::MonthlyIncome), "0");
        assert_eq!(EmploymentField::EmploymentType.display("full-time"), "Full-time");
    }

    #[test]
    fn test_editing_annual_derives_monthly() {
        let mut step = EmploymentInfoStep::from_draft(&EmploymentInfoDraft::default());
        type_into(&mut step, EmploymentField::AnnualSalary, "50000");
        assert_eq!(step.form().value(EmploymentField::MonthlyIncome), "4167");
    }

    #[test]
    fn test_editing_monthly_derives_annual() {
        let mut step = EmploymentInfoStep::from_draft(&EmploymentInfoDraft::default());
        type_into(&mut step, EmploymentField::AnnualSalary, "50000");
        type_into(&mut step, EmploymentField::MonthlyIncome, "4167");
        assert_eq!(step.form().value(EmploymentField::AnnualSalary), "50004");
    }

    #[test]
    fn test_unparseable_income_derives_zero() {
        let mut step = EmploymentInfoStep::from_draft(&EmploymentInfoDraft::default());
        type_into(&mut step, EmploymentField::AnnualSalary, "abc");
        assert_eq!(step.form().value(EmploymentField::MonthlyIncome), "0");
    }

    #[test]
    fn test_typing_replaces_placeholder_zero() {
        let mut step = EmploymentInfoStep::from_draft(&EmploymentInfoDraft::default());
        step.form_mut().focus_field(EmploymentField::AnnualSalary);
        for ch in "60000".chars() {
            step.type_char(ch);
        }
        assert_eq!(step.form().value(EmploymentField::AnnualSalary), "60000");
        assert_eq!(step.form().value(EmploymentField::MonthlyIncome), "5000");

        step.form_mut().focus_field(EmploymentField::YearsEmployed);
        step.type_char('.');
        step.type_char('5');
        assert_eq!(step.form().value(EmploymentField::YearsEmployed), "0.5");
    }

    #[test]
    fn test_derived_annual_is_rounded_to_cents() {
        let mut step = EmploymentInfoStep::from_draft(&EmploymentInfoDraft::default());
        type_into(&mut step, EmploymentField::MonthlyIncome, "4166.67");
        assert_eq!(step.form().value(EmploymentField::AnnualSalary), "50000.04");

        type_into(&mut step, EmploymentField::MonthlyIncome, "0.1");
        assert_eq!(step.form().value(EmploymentField::AnnualSalary), "1.2");
    }

    #[test]
    fn test_employment_type_cycles() {
        let mut step = EmploymentInfoStep::from_draft(&EmploymentInfoDraft::default());
        step.form_mut().focus_field(EmploymentField::EmploymentType);
        step.cycle_choice(true);
        assert_eq!(step.form().value(EmploymentField::EmploymentType), "part-time");
        step.cycle_choice(false);
        step.cycle_choice(false);
        assert_eq!(step.form().value(EmploymentField::EmploymentType), "self-employed");
    }

    #[test]
    fn test_submit_requires_employer_and_position() {
        let mut store = DraftStore::open(Box::new(MemoryStore::default()));
        store.start_form();
        store.set_current_step(FormStep::EmploymentInfo);

        let mut step = EmploymentInfoStep::from_draft(&EmploymentInfoDraft::default());
        assert!(!step.submit(&mut store));
        assert_eq!(step.form().error(EmploymentField::Employer), Some("Employer is required"));
        assert_eq!(step.form().error(EmploymentField::Position), Some("Position is required"));
        assert_eq!(step.form().focus(), EmploymentField::Employer);
        assert_eq!(store.current_step(), FormStep::EmploymentInfo);
    }

    #[test]
    fn test_negative_years_rejected() {
        assert_eq!(
            EmploymentField::YearsEmployed.validate("-2"),
            Some("Years employed cannot be negative".to_string())
        );
        assert_eq!(
            EmploymentField::AnnualSalary.validate(""),
            Some("Annual salary is required".to_string())
        );
    }

    #[test]
    fn test_valid_submit_stores_synced_income() {
        let mut store = DraftStore::open(Box::new(MemoryStore::default()));
        store.start_form();
        store.set_current_step(FormStep::EmploymentInfo);

        let mut step = EmploymentInfoStep::from_draft(&EmploymentInfoDraft::default());
        type_into(&mut step, EmploymentField::Employer, "ABC Company Inc.");
        type_into(&mut step, EmploymentField::Position, "Engineer");
        type_into(&mut step, EmploymentField::YearsEmployed, "4");
        type_into(&mut step, EmploymentField::AnnualSalary, "$96,000");

        assert!(step.submit(&mut store));
        let saved = &store.state().employment_info;
        assert_eq!(saved.annual_salary, Some(96000.0));
        assert_eq!(saved.monthly_income, Some(8000.0));
        assert_eq!(saved.employment_type, Some(EmploymentType::FullTime));
        assert_eq!(store.current_step(), FormStep::LoanDetails);
        assert!(store.is_step_completed(FormStep::EmploymentInfo));
    }
}
