use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

/// The four stages of the wizard, in the order they are visited.
///
/// Persisted as the step number (1-4). Any other number rehydrates as
/// [`FormStep::PersonalInfo`], except in `completedSteps` where it is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum FormStep {
    #[default]
    PersonalInfo,
    EmploymentInfo,
    LoanDetails,
    ReviewSubmit,
}

impl FormStep {
    pub const ALL: [FormStep; 4] = [
        FormStep::PersonalInfo,
        FormStep::EmploymentInfo,
        FormStep::LoanDetails,
        FormStep::ReviewSubmit,
    ];

    pub const TOTAL: u8 = 4;

    pub fn number(self) -> u8 {
        match self {
            FormStep::PersonalInfo => 1,
            FormStep::EmploymentInfo => 2,
            FormStep::LoanDetails => 3,
            FormStep::ReviewSubmit => 4,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(FormStep::PersonalInfo),
            2 => Some(FormStep::EmploymentInfo),
            3 => Some(FormStep::LoanDetails),
            4 => Some(FormStep::ReviewSubmit),
            _ => None,
        }
    }

    /// The following step, saturating at the review step.
    pub fn next(self) -> Self {
        Self::from_number(self.number() + 1).unwrap_or(FormStep::ReviewSubmit)
    }

    /// The preceding step, saturating at the first step.
    pub fn previous(self) -> Self {
        Self::from_number(self.number().saturating_sub(1)).unwrap_or(FormStep::PersonalInfo)
    }

    pub fn title(self) -> &'static str {
        match self {
            FormStep::PersonalInfo => "Personal Information",
            FormStep::EmploymentInfo => "Employment & Income",
            FormStep::LoanDetails => "Loan Details",
            FormStep::ReviewSubmit => "Review & Submit",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            FormStep::PersonalInfo => "Basic details",
            FormStep::EmploymentInfo => "Work information",
            FormStep::LoanDetails => "Loan requirements",
            FormStep::ReviewSubmit => "Final review",
        }
    }
}

impl From<u8> for FormStep {
    fn from(number: u8) -> Self {
        Self::from_number(number).unwrap_or_default()
    }
}

impl From<FormStep> for u8 {
    fn from(step: FormStep) -> Self {
        step.number()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmploymentType {
    #[default]
    FullTime,
    PartTime,
    Contract,
    SelfEmployed,
}

impl EmploymentType {
    pub const ALL: [EmploymentType; 4] = [
        EmploymentType::FullTime,
        EmploymentType::PartTime,
        EmploymentType::Contract,
        EmploymentType::SelfEmployed,
    ];

    pub fn key(self) -> &'static str {
        match self {
            EmploymentType::FullTime => "full-time",
            EmploymentType::PartTime => "part-time",
            EmploymentType::Contract => "contract",
            EmploymentType::SelfEmployed => "self-employed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EmploymentType::FullTime => "Full-time",
            EmploymentType::PartTime => "Part-time",
            EmploymentType::Contract => "Contract",
            EmploymentType::SelfEmployed => "Self-employed",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.key() == key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoanPurpose {
    HomePurchase,
    HomeRefinance,
    DebtConsolidation,
    Business,
    Education,
    #[default]
    Personal,
    Other,
}

impl LoanPurpose {
    pub const ALL: [LoanPurpose; 7] = [
        LoanPurpose::HomePurchase,
        LoanPurpose::HomeRefinance,
        LoanPurpose::DebtConsolidation,
        LoanPurpose::Business,
        LoanPurpose::Education,
        LoanPurpose::Personal,
        LoanPurpose::Other,
    ];

    pub fn key(self) -> &'static str {
        match self {
            LoanPurpose::HomePurchase => "home-purchase",
            LoanPurpose::HomeRefinance => "home-refinance",
            LoanPurpose::DebtConsolidation => "debt-consolidation",
            LoanPurpose::Business => "business",
            LoanPurpose::Education => "education",
            LoanPurpose::Personal => "personal",
            LoanPurpose::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LoanPurpose::HomePurchase => "Home Purchase",
            LoanPurpose::HomeRefinance => "Home Refinance",
            LoanPurpose::DebtConsolidation => "Debt Consolidation",
            LoanPurpose::Business => "Business",
            LoanPurpose::Education => "Education",
            LoanPurpose::Personal => "Personal",
            LoanPurpose::Other => "Other",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }
}

/// Loan terms offered to the applicant, in months.
pub const LOAN_TERMS: [u32; 10] = [12, 24, 36, 48, 60, 84, 120, 180, 240, 360];

pub const DEFAULT_LOAN_TERM: u32 = 36;

/// Human label for a term, e.g. `36 months (3 years)`.
pub fn loan_term_label(months: u32) -> String {
    let years = months / 12;
    if months % 12 != 0 || years == 0 {
        return format!("{} months", months);
    }
    let unit = if years == 1 { "year" } else { "years" };
    format!("{} months ({} {})", months, years, unit)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmploymentInfo {
    pub employer: String,
    pub position: String,
    pub employment_type: EmploymentType,
    pub years_employed: f64,
    pub annual_salary: f64,
    pub monthly_income: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanDetails {
    pub loan_amount: f64,
    pub loan_purpose: LoanPurpose,
    pub loan_term: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub down_payment: Option<f64>,
}

/// A complete application as checked at final submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub personal_info: PersonalInfo,
    pub employment_info: EmploymentInfo,
    pub loan_details: LoanDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonalInfoDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
}

impl PersonalInfoDraft {
    /// Overwrites every field that is present in `other`.
    pub fn merge(&mut self, other: PersonalInfoDraft) {
        merge_field(&mut self.first_name, other.first_name);
        merge_field(&mut self.last_name, other.last_name);
        merge_field(&mut self.email, other.email);
        merge_field(&mut self.phone, other.phone);
        merge_field(&mut self.address, other.address);
        merge_field(&mut self.city, other.city);
        merge_field(&mut self.state, other.state);
        merge_field(&mut self.zip_code, other.zip_code);
    }
}

impl From<PersonalInfo> for PersonalInfoDraft {
    fn from(info: PersonalInfo) -> Self {
        Self {
            first_name: Some(info.first_name),
            last_name: Some(info.last_name),
            email: Some(info.email),
            phone: Some(info.phone),
            address: Some(info.address),
            city: Some(info.city),
            state: Some(info.state),
            zip_code: Some(info.zip_code),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmploymentInfoDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employment_type: Option<EmploymentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years_employed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual_salary: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_income: Option<f64>,
}

impl EmploymentInfoDraft {
    pub fn merge(&mut self, other: EmploymentInfoDraft) {
        merge_field(&mut self.employer, other.employer);
        merge_field(&mut self.position, other.position);
        merge_field(&mut self.employment_type, other.employment_type);
        merge_field(&mut self.years_employed, other.years_employed);
        merge_field(&mut self.annual_salary, other.annual_salary);
        merge_field(&mut self.monthly_income, other.monthly_income);
    }
}

impl From<EmploymentInfo> for EmploymentInfoDraft {
    fn from(info: EmploymentInfo) -> Self {
        Self {
            employer: Some(info.employer),
            position: Some(info.position),
            employment_type: Some(info.employment_type),
            years_employed: Some(info.years_employed),
            annual_salary: Some(info.annual_salary),
            monthly_income: Some(info.monthly_income),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoanDetailsDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_purpose: Option<LoanPurpose>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_term: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub down_payment: Option<f64>,
}

impl LoanDetailsDraft {
    pub fn merge(&mut self, other: LoanDetailsDraft) {
        merge_field(&mut self.loan_amount, other.loan_amount);
        merge_field(&mut self.loan_purpose, other.loan_purpose);
        merge_field(&mut self.loan_term, other.loan_term);
        merge_field(&mut self.down_payment, other.down_payment);
    }
}

impl From<LoanDetails> for LoanDetailsDraft {
    fn from(details: LoanDetails) -> Self {
        Self {
            loan_amount: Some(details.loan_amount),
            loan_purpose: Some(details.loan_purpose),
            loan_term: Some(details.loan_term),
            down_payment: details.down_payment,
        }
    }
}

fn merge_field<T>(target: &mut Option<T>, incoming: Option<T>) {
    if incoming.is_some() {
        *target = incoming;
    }
}

/// Everything the wizard remembers between sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WizardState {
    pub personal_info: PersonalInfoDraft,
    pub employment_info: EmploymentInfoDraft,
    pub loan_details: LoanDetailsDraft,
    pub current_step: FormStep,
    #[serde(deserialize_with = "known_steps")]
    pub completed_steps: BTreeSet<FormStep>,
    pub is_form_started: bool,
}

/// Keeps only step numbers that exist. An unknown number was never
/// validated, so it must not count as completed.
fn known_steps<'de, D>(deserializer: D) -> Result<BTreeSet<FormStep>, D::Error>
where
    D: Deserializer<'de>,
{
    let numbers = Vec::<i64>::deserialize(deserializer)?;
    Ok(numbers
        .into_iter()
        .filter_map(|n| u8::try_from(n).ok().and_then(FormStep::from_number))
        .collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}
