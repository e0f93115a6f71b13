//! Step schemas and the field rules they are built from.
//!
//! Each rule checks one field and returns either the accepted value or the
//! message shown next to the field. The step forms call the same rules when a
//! field loses focus, so inline feedback and submit-time checks always agree.

use super::errors::{SchemaResult, ValidationErrors};
use super::models::{
    Application, EmploymentInfo, EmploymentInfoDraft, EmploymentType, LoanDetails,
    LoanDetailsDraft, LoanPurpose, PersonalInfo, PersonalInfoDraft, LOAN_TERMS,
};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

static ZIP_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}(-\d{4})?$").expect("zip pattern compiles"));

pub const MIN_LOAN_AMOUNT: f64 = 1000.0;
pub const MIN_LOAN_TERM: u32 = 12;
pub const MAX_LOAN_TERM: u32 = 360;
pub const MIN_PHONE_DIGITS: usize = 10;

pub type RuleResult<T> = Result<T, String>;

/// Turns a camelCase key into the label used in messages: `zipCode` -> `Zip Code`.
pub fn field_label(key: &str) -> String {
    let mut label = String::with_capacity(key.len() + 4);
    for (i, ch) in key.chars().enumerate() {
        if i == 0 {
            label.extend(ch.to_uppercase());
        } else if ch.is_ascii_uppercase() {
            label.push(' ');
            label.push(ch);
        } else {
            label.push(ch);
        }
    }
    label
}

pub fn required_text(field: &str, value: Option<&str>) -> RuleResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.to_string()),
        _ => Err(format!("{} is required", field_label(field))),
    }
}

pub fn email(value: Option<&str>) -> RuleResult<String> {
    let value = required_text("email", value)?;
    if EMAIL_PATTERN.is_match(&value) {
        Ok(value)
    } else {
        Err("Please enter a valid email address".to_string())
    }
}

/// Accepts any formatting as long as at least ten digits remain.
pub fn phone(value: Option<&str>) -> RuleResult<String> {
    let value = required_text("phone", value)?;
    let digits = value.chars().filter(char::is_ascii_digit).count();
    if digits >= MIN_PHONE_DIGITS {
        Ok(value)
    } else {
        Err("Phone number must be at least 10 digits".to_string())
    }
}

pub fn zip_code(value: Option<&str>) -> RuleResult<String> {
    let value = required_text("zipCode", value)?;
    if ZIP_PATTERN.is_match(&value) {
        Ok(value)
    } else {
        Err("Please enter a valid ZIP code (e.g., 12345 or 12345-6789)".to_string())
    }
}

/// Dispatches to the rule for a personal-info field by its camelCase key.
pub fn personal_field(field: &str, value: Option<&str>) -> RuleResult<String> {
    match field {
        "email" => email(value),
        "phone" => phone(value),
        "zipCode" => zip_code(value),
        _ => required_text(field, value),
    }
}

/// Parses user-typed money or counts. `$` and `,` are ignored; blank is `None`.
pub fn parse_number(name: &str, raw: &str) -> RuleResult<Option<f64>> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Ok(None);
    }
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(format!("{} must be a number", name)),
    }
}

pub fn non_negative(name: &str, value: Option<f64>) -> RuleResult<f64> {
    match value {
        None => Err(format!("{} is required", name)),
        Some(v) if !v.is_finite() => Err(format!("{} must be a number", name)),
        Some(v) if v < 0.0 => Err(format!("{} cannot be negative", name)),
        Some(v) => Ok(v),
    }
}

pub fn employment_type(value: Option<EmploymentType>) -> RuleResult<EmploymentType> {
    value.ok_or_else(|| "Employment type is required".to_string())
}

pub fn loan_amount(value: Option<f64>) -> RuleResult<f64> {
    match value {
        None => Err("Loan amount is required".to_string()),
        Some(v) if !v.is_finite() => Err("Loan amount must be a number".to_string()),
        Some(v) if v < MIN_LOAN_AMOUNT => Err("Loan amount must be at least $1,000".to_string()),
        Some(v) => Ok(v),
    }
}

pub fn loan_purpose(value: Option<LoanPurpose>) -> RuleResult<LoanPurpose> {
    value.ok_or_else(|| "Loan purpose is required".to_string())
}

pub fn loan_term(value: Option<u32>) -> RuleResult<u32> {
    match value {
        None | Some(0) => Err("Loan term is required".to_string()),
        Some(v) if v < MIN_LOAN_TERM => Err("Loan term must be at least 12 months".to_string()),
        Some(v) if v > MAX_LOAN_TERM => Err("Loan term cannot exceed 360 months".to_string()),
        Some(v) if !LOAN_TERMS.contains(&v) => {
            Err("Please choose one of the offered loan terms".to_string())
        }
        Some(v) => Ok(v),
    }
}

/// A zero or missing down payment means "no down payment".
pub fn down_payment(value: Option<f64>) -> RuleResult<Option<f64>> {
    match value {
        None => Ok(None),
        Some(v) if v == 0.0 => Ok(None),
        Some(v) if v.is_finite() && v > 0.0 => Ok(Some(v)),
        Some(_) => Err(
            "Down payment must be greater than $0 (leave empty if no down payment)".to_string(),
        ),
    }
}

fn check<T>(errors: &mut ValidationErrors, field: &str, result: RuleResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(message) => {
            errors.push(field, message);
            None
        }
    }
}

pub fn validate_personal_info(draft: &PersonalInfoDraft) -> SchemaResult<PersonalInfo> {
    let mut errors = ValidationErrors::new();
    let mut text = |field: &str, value: &Option<String>| {
        check(&mut errors, field, personal_field(field, value.as_deref())).unwrap_or_default()
    };

    let first_name = text("firstName", &draft.first_name);
    let last_name = text("lastName", &draft.last_name);
    let email = text("email", &draft.email);
    let phone = text("phone", &draft.phone);
    let address = text("address", &draft.address);
    let city = text("city", &draft.city);
    let state = text("state", &draft.state);
    let zip_code = text("zipCode", &draft.zip_code);

    errors.into_result(|| PersonalInfo {
        first_name,
        last_name,
        email,
        phone,
        address,
        city,
        state,
        zip_code,
    })
}

pub fn validate_employment_info(draft: &EmploymentInfoDraft) -> SchemaResult<EmploymentInfo> {
    let mut errors = ValidationErrors::new();

    let employer = check(&mut errors, "employer", required_text("employer", draft.employer.as_deref()));
    let position = check(&mut errors, "position", required_text("position", draft.position.as_deref()));
    let kind = check(&mut errors, "employmentType", employment_type(draft.employment_type));
    let years = check(&mut errors, "yearsEmployed", non_negative("Years employed", draft.years_employed));
    let annual = check(&mut errors, "annualSalary", non_negative("Annual salary", draft.annual_salary));
    let monthly = check(&mut errors, "monthlyIncome", non_negative("Monthly income", draft.monthly_income));

    errors.into_result(|| EmploymentInfo {
        employer: employer.unwrap_or_default(),
        position: position.unwrap_or_default(),
        employment_type: kind.unwrap_or_default(),
        years_employed: years.unwrap_or_default(),
        annual_salary: annual.unwrap_or_default(),
        monthly_income: monthly.unwrap_or_default(),
    })
}

pub fn validate_loan_details(draft: &LoanDetailsDraft) -> SchemaResult<LoanDetails> {
    let mut errors = ValidationErrors::new();

    let amount = check(&mut errors, "loanAmount", loan_amount(draft.loan_amount));
    let purpose = check(&mut errors, "loanPurpose", loan_purpose(draft.loan_purpose));
    let term = check(&mut errors, "loanTerm", loan_term(draft.loan_term));
    let down = check(&mut errors, "downPayment", down_payment(draft.down_payment));

    errors.into_result(|| LoanDetails {
        loan_amount: amount.unwrap_or_default(),
        loan_purpose: purpose.unwrap_or_default(),
        loan_term: term.unwrap_or_default(),
        down_payment: down.flatten(),
    })
}

/// Final check before submission: all three steps must pass together.
pub fn validate_application(
    personal: &PersonalInfoDraft,
    employment: &EmploymentInfoDraft,
    loan: &LoanDetailsDraft,
    submitted_at: Option<DateTime<Utc>>,
) -> SchemaResult<Application> {
    let mut errors = ValidationErrors::new();
    let personal_info = validate_personal_info(personal)
        .map_err(|e| errors.extend_scoped("personalInfo", e))
        .ok();
    let employment_info = validate_employment_info(employment)
        .map_err(|e| errors.extend_scoped("employmentInfo", e))
        .ok();
    let loan_details = validate_loan_details(loan)
        .map_err(|e| errors.extend_scoped("loanDetails", e))
        .ok();

    match (personal_info, employment_info, loan_details) {
        (Some(personal_info), Some(employment_info), Some(loan_details)) if errors.is_empty() => {
            Ok(Application {
                personal_info,
                employment_info,
                loan_details,
                submitted_at,
            })
        }
        _ => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn employment() -> EmploymentInfoDraft {
        EmploymentInfoDraft {
            employer: Some("ABC Company Inc.".to_string()),
            position: Some("Software Engineer".to_string()),
            employment_type: Some(EmploymentType::FullTime),
            years_employed: Some(3.5),
            annual_salary: Some(96000.0),
            monthly_income: Some(8000.0),
        }
    }

    fn loan() -> LoanDetailsDraft {
        LoanDetailsDraft {
            loan_amount: Some(50000.0),
            loan_purpose: Some(LoanPurpose::HomePurchase),
            loan_term: Some(36),
            down_payment: Some(10000.0),
        }
    }

    #[test]
    fn test_field_labels() {
        assert_eq!(field_label("firstName"), "First Name");
        assert_eq!(field_label("zipCode"), "Zip Code");
        assert_eq!(field_label("city"), "City");
    }

    #[test]
    fn test_valid_personal_info_is_returned_unchanged() {
        let draft = PersonalInfoDraft {
            phone: Some("(555) 123-4567".to_string()),
            zip_code: Some("10001-1234".to_string()),
            first_name: Some("  Jane ".to_string()),
            ..john_doe()
        };
        let info = validate_personal_info(&draft).unwrap();
        assert_eq!(info.first_name, "  Jane ");
        assert_eq!(info.phone, "(555) 123-4567");
        assert_eq!(info.zip_code, "10001-1234");
        assert_eq!(PersonalInfoDraft::from(info), draft);
    }

    #[test]
    fn test_missing_field_reports_exactly_that_field() {
        for field in ["firstName", "lastName", "email", "phone", "address", "city", "state", "zipCode"] {
            let mut draft = john_doe();
            let slot = match field {
                "firstName" => &mut draft.first_name,
                "lastName" => &mut draft.last_name,
                "email" => &mut draft.email,
                "phone" => &mut draft.phone,
                "address" => &mut draft.address,
                "city" => &mut draft.city,
                "state" => &mut draft.state,
                _ => &mut draft.zip_code,
            };
            *slot = None;

            let errors = validate_personal_info(&draft).unwrap_err();
            assert_eq!(errors.len(), 1, "field {}", field);
            assert_eq!(errors.get(field), Some(format!("{} is required", field_label(field)).as_str()));
        }
    }

    #[test]
    fn test_whitespace_only_is_missing() {
        let draft = PersonalInfoDraft {
            city: Some("   ".to_string()),
            ..john_doe()
        };
        let errors = validate_personal_info(&draft).unwrap_err();
        assert_eq!(errors.get("city"), Some("City is required"));
    }

    #[test]
    fn test_email_phone_zip_rules() {
        assert_eq!(email(Some("invalid-email")), Err("Please enter a valid email address".to_string()));
        assert_eq!(email(Some("a b@c.d")), Err("Please enter a valid email address".to_string()));
        assert!(email(Some("x@y.io")).is_ok());
        assert_eq!(email(Some("")), Err("Email is required".to_string()));

        assert!(phone(Some("555-123-4567")).is_ok());
        assert_eq!(phone(Some("555-1234")), Err("Phone number must be at least 10 digits".to_string()));

        assert!(zip_code(Some("12345")).is_ok());
        assert!(zip_code(Some("12345-6789")).is_ok());
        assert!(zip_code(Some("1234")).is_err());
        assert!(zip_code(Some("12345-67")).is_err());
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("Annual salary", "$96,000"), Ok(Some(96000.0)));
        assert_eq!(parse_number("Annual salary", "  "), Ok(None));
        assert_eq!(parse_number("Annual salary", "lots"), Err("Annual salary must be a number".to_string()));
        assert!(parse_number("Annual salary", "inf").is_err());
    }

    #[test]
    fn test_employment_schema() {
        assert!(validate_employment_info(&employment()).is_ok());

        let draft = EmploymentInfoDraft {
            employer: Some(String::new()),
            years_employed: Some(-1.0),
            monthly_income: None,
            ..employment()
        };
        let errors = validate_employment_info(&draft).unwrap_err();
        assert_eq!(errors.get("employer"), Some("Employer is required"));
        assert_eq!(errors.get("yearsEmployed"), Some("Years employed cannot be negative"));
        assert_eq!(errors.get("monthlyIncome"), Some("Monthly income is required"));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_zero_income_is_allowed() {
        let draft = EmploymentInfoDraft {
            annual_salary: Some(0.0),
            monthly_income: Some(0.0),
            years_employed: Some(0.0),
            ..employment()
        };
        assert!(validate_employment_info(&draft).is_ok());
    }

    #[test]
    fn test_loan_schema_bounds() {
        let details = validate_loan_details(&loan()).unwrap();
        assert_eq!(details.down_payment, Some(10000.0));

        assert_eq!(loan_amount(Some(999.0)), Err("Loan amount must be at least $1,000".to_string()));
        assert_eq!(loan_amount(None), Err("Loan amount is required".to_string()));
        assert_eq!(loan_amount(Some(-5000.0)), Err("Loan amount must be at least $1,000".to_string()));
        assert_eq!(loan_amount(Some(0.0)), Err("Loan amount must be at least $1,000".to_string()));
        assert_eq!(loan_term(Some(6)), Err("Loan term must be at least 12 months".to_string()));
        assert_eq!(loan_term(Some(480)), Err("Loan term cannot exceed 360 months".to_string()));
        assert_eq!(loan_term(Some(30)), Err("Please choose one of the offered loan terms".to_string()));
        assert_eq!(loan_term(Some(360)), Ok(360));
    }

    #[test]
    fn test_down_payment_is_optional_but_positive() {
        assert_eq!(down_payment(None), Ok(None));
        assert_eq!(down_payment(Some(0.0)), Ok(None));
        assert!(down_payment(Some(-5.0)).is_err());

        let details = validate_loan_details(&LoanDetailsDraft {
            down_payment: None,
            ..loan()
        })
        .unwrap();
        assert_eq!(details.down_payment, None);
    }

    #[test]
    fn test_application_schema_scopes_errors() {
        let when = Utc::now();
        let application = validate_application(&john_doe(), &employment(), &loan(), Some(when)).unwrap();
        assert_eq!(application.submitted_at, Some(when));
        assert_eq!(application.personal_info.first_name, "John");

        let errors = validate_application(
            &john_doe(),
            &EmploymentInfoDraft::default(),
            &LoanDetailsDraft { loan_amount: Some(10.0), ..loan() },
            None,
        )
        .unwrap_err();
        assert_eq!(errors.get("employmentInfo.employer"), Some("Employer is required"));
        assert_eq!(
            errors.get("loanDetails.loanAmount"),
            Some("Loan amount must be at least $1,000")
        );
        assert!(errors.iter().all(|e| !e.field.starts_with("personalInfo")));
    }
}
