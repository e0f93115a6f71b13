use super::StepForm;
use crate::application::forms::{cycle_keys, FormField, FormState};
use crate::application::store::DraftStore;
use crate::domain::schema::{self, validate_loan_details};
use crate::domain::{
    estimate_monthly_payment, loan_term_label, FormStep, LoanDetailsDraft, LoanPurpose,
    DEFAULT_LOAN_TERM, LOAN_TERMS,
};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoanField {
    LoanAmount,
    LoanPurpose,
    LoanTerm,
    DownPayment,
}

impl FormField for LoanField {
    const ALL: &'static [Self] = &[
        LoanField::LoanAmount,
        LoanField::LoanPurpose,
        LoanField::LoanTerm,
        LoanField::DownPayment,
    ];

    fn key(self) -> &'static str {
        match self {
            LoanField::LoanAmount => "loanAmount",
            LoanField::LoanPurpose => "loanPurpose",
            LoanField::LoanTerm => "loanTerm",
            LoanField::DownPayment => "downPayment",
        }
    }

    fn label(self) -> &'static str {
        match self {
            LoanField::LoanAmount => "Loan Amount",
            LoanField::LoanPurpose => "Loan Purpose",
            LoanField::LoanTerm => "Loan Term",
            LoanField::DownPayment => "Down Payment",
        }
    }

    fn placeholder(self) -> &'static str {
        match self {
            LoanField::LoanAmount => "50000",
            LoanField::DownPayment => "Optional",
            _ => "",
        }
    }

    fn required(self) -> bool {
        self != LoanField::DownPayment
    }

    fn validate(self, raw: &str) -> Option<String> {
        match self {
            LoanField::LoanAmount => schema::parse_number("Loan amount", raw)
                .and_then(schema::loan_amount)
                .err(),
            LoanField::LoanPurpose => schema::loan_purpose(LoanPurpose::from_key(raw)).err(),
            LoanField::LoanTerm => schema::loan_term(raw.trim().parse().ok()).err(),
            LoanField::DownPayment => schema::parse_number("Down payment", raw)
                .and_then(schema::down_payment)
                .err(),
        }
    }

    fn is_choice(self) -> bool {
        matches!(self, LoanField::LoanPurpose | LoanField::LoanTerm)
    }

    fn cycle(self, current: &str, forward: bool) -> String {
        match self {
            LoanField::LoanPurpose => {
                let keys = LoanPurpose::ALL.map(LoanPurpose::key);
                cycle_keys(&keys, current, forward)
            }
            LoanField::LoanTerm => {
                let terms = LOAN_TERMS.map(|t| t.to_string());
                let keys: Vec<&str> = terms.iter().map(String::as_str).collect();
                cycle_keys(&keys, current, forward)
            }
            _ => current.to_string(),
        }
    }

    fn display(self, raw: &str) -> String {
        match self {
            LoanField::LoanPurpose => LoanPurpose::from_key(raw)
                .map(|p| p.label().to_string())
                .unwrap_or_else(|| raw.to_string()),
            LoanField::LoanTerm => raw
                .parse()
                .map(loan_term_label)
                .unwrap_or_else(|_| raw.to_string()),
            _ => raw.to_string(),
        }
    }
}

/// Step 3: how much, what for, and for how long.
#[derive(Debug, Clone)]
pub struct LoanDetailsStep {
    form: FormState<LoanField>,
}

impl LoanDetailsStep {
    pub fn from_draft(draft: &LoanDetailsDraft) -> Self {
        let amount = |value: Option<f64>| value.map(|v| v.to_string()).unwrap_or_default();
        Self {
            form: FormState::new([
                (LoanField::LoanAmount, amount(draft.loan_amount)),
                (
                    LoanField::LoanPurpose,
                    draft.loan_purpose.unwrap_or_default().key().to_string(),
                ),
                (
                    LoanField::LoanTerm,
                    draft.loan_term.unwrap_or(DEFAULT_LOAN_TERM).to_string(),
                ),
                (LoanField::DownPayment, amount(draft.down_payment)),
            ]),
        }
    }

    fn number(&self, field: LoanField) -> Option<f64> {
        schema::parse_number(field.label(), self.form.value(field))
            .ok()
            .flatten()
    }

    fn term(&self) -> Option<u32> {
        self.form.value(LoanField::LoanTerm).trim().parse().ok()
    }

    /// Estimated monthly payment for what is currently typed, or `None` until
    /// both an amount and a term are present.
    pub fn monthly_payment(&self) -> Option<f64> {
        let amount = self.number(LoanField::LoanAmount).filter(|a| *a > 0.0)?;
        let term = self.term().filter(|t| *t > 0)?;
        Some(estimate_monthly_payment(
            amount,
            self.number(LoanField::DownPayment),
            term,
        ))
    }

    fn to_draft(&self) -> LoanDetailsDraft {
        LoanDetailsDraft {
            loan_amount: self.number(LoanField::LoanAmount),
            loan_purpose: LoanPurpose::from_key(self.form.value(LoanField::LoanPurpose)),
            loan_term: self.term(),
            down_payment: self.number(LoanField::DownPayment),
        }
    }
}

impl StepForm for LoanDetailsStep {
    type Field = LoanField;

    fn form(&self) -> &FormState<LoanField> {
        &self.form
    }

    fn form_mut(&mut self) -> &mut FormState<LoanField> {
        &mut self.form
    }

    fn submit(&mut self, store: &mut DraftStore) -> bool {
        if !self.form.validate_all(None) {
            return false;
        }

        match validate_loan_details(&self.to_draft()) {
            Ok(details) => {
                store.replace_loan_details(details.into());
                store.mark_step_completed(FormStep::LoanDetails);
                store.next_step();
                self.form.clear_errors();
                info!("loan details step completed");
                true
            }
            Err(errors) => {
                self.form.apply_schema_errors(&errors);
                false
            }
        }
    }
}
