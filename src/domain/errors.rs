use std::path::PathBuf;
use thiserror::Error;

/// A single offending field and the message shown next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every field that failed a schema check, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{} field(s) failed validation", .errors.len())]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error for `field`. Only the first message per field is kept.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        if self.get(&field).is_none() {
            self.errors.push(FieldError {
                field,
                message: message.into(),
            });
        }
    }

    /// Folds another error set in, prefixing its field names with `scope.`.
    pub fn extend_scoped(&mut self, scope: &str, other: ValidationErrors) {
        for error in other.errors {
            self.push(format!("{}.{}", scope, error.field), error.message);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// `Ok(value)` when nothing failed, otherwise these errors.
    pub fn into_result<T>(self, value: impl FnOnce() -> T) -> SchemaResult<T> {
        if self.is_empty() { Ok(value()) } else { Err(self) }
    }
}

pub type SchemaResult<T> = Result<T, ValidationErrors>;

/// Failures surfaced as a blocking alert on the review step.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmissionError {
    #[error("Please agree to the terms and conditions before submitting.")]
    TermsNotAccepted,
    #[error("There was an error submitting your application. Please review all forms and try again.")]
    Invalid(ValidationErrors),
    #[error("The application was not accepted. Please try again in a moment.")]
    Rejected,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unreadable snapshot in {}: {source}", .path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_message_per_field_wins() {
        let mut errors = ValidationErrors::new();
        errors.push("email", "Email is required");
        errors.push("email", "Please enter a valid email address");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("email"), Some("Email is required"));
    }

    #[test]
    fn test_scoped_extension() {
        let mut inner = ValidationErrors::new();
        inner.push("loanAmount", "Loan amount is required");
        let mut outer = ValidationErrors::new();
        outer.extend_scoped("loanDetails", inner);
        assert_eq!(outer.get("loanDetails.loanAmount"), Some("Loan amount is required"));
        assert_eq!(outer.to_string(), "1 field(s) failed validation");
    }

    #[test]
    fn test_into_result() {
        assert_eq!(ValidationErrors::new().into_result(|| 5), Ok(5));
        let mut errors = ValidationErrors::new();
        errors.push("city", "City is required");
        assert!(errors.into_result(|| ()).is_err());
    }
}
