//! Client-side form validation.
//!
//! A form with any field error never reaches the network. Messages are the
//! ones shown under each input; only the first error per field is kept.

use std::borrow::Cow;
use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::types::{LoginRequest, RegisterRequest};

pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

// digits, spaces, +, -, parentheses; 8-20 chars
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9+\-() ]{8,20}$").expect("valid regex"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

/// Per-field error messages, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{} invalid field(s)", .0.len())]
pub struct FormErrors(BTreeMap<String, String>);

impl FormErrors {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    fn insert(&mut self, field: &str, message: &str) {
        self.0.entry(field.to_string()).or_insert_with(|| message.to_string());
    }

    fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut form = FormErrors::default();
        for (field, field_errors) in errors.field_errors() {
            if let Some(first) = field_errors.first() {
                let message = first
                    .message
                    .as_ref()
                    .map_or_else(|| first.code.to_string(), |m| m.to_string());
                form.insert(&field.to_string(), &message);
            }
        }
        form
    }
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(invalid("required", "Name is required."));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(invalid("required", "Email is required."));
    }
    if !is_valid_email(email) {
        return Err(invalid("email", "Enter a valid email address."));
    }
    Ok(())
}

fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Err(invalid("required", "Phone is required."));
    }
    if !is_valid_phone(phone) {
        return Err(invalid("phone", "Enter a valid phone number."));
    }
    Ok(())
}

fn validate_password_present(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(invalid("required", "Password is required."));
    }
    Ok(())
}

fn validate_new_password(password: &str) -> Result<(), ValidationError> {
    validate_password_present(password)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(invalid("length", "Password must be at least 8 characters."));
    }
    Ok(())
}

fn check(result: Result<(), ValidationErrors>) -> FormErrors {
    result.err().map(FormErrors::from).unwrap_or_default()
}

/// The sign-in form.
#[derive(Debug, Clone, Default, Validate)]
pub struct LoginForm {
    #[validate(custom(function = "validate_email"))]
    pub email: String,
    #[validate(custom(function = "validate_password_present"))]
    pub password: String,
}

impl LoginForm {
    pub fn check(&self) -> Result<(), FormErrors> {
        check(self.validate()).into_result()
    }

    pub fn to_request(&self) -> LoginRequest {
        LoginRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        }
    }
}

/// The create-account form.
#[derive(Debug, Clone, Default, Validate)]
pub struct RegistrationForm {
    #[validate(custom(function = "validate_name"))]
    pub name: String,
    #[validate(custom(function = "validate_email"))]
    pub email: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    #[validate(custom(function = "validate_new_password"))]
    pub password: String,
    pub confirm_password: String,
    pub role_id: Option<i64>,
}

impl RegistrationForm {
    pub fn check(&self) -> Result<(), FormErrors> {
        let mut errors = check(self.validate());
        if self.confirm_password.is_empty() {
            errors.insert("confirm_password", "Confirm your password.");
        } else if self.confirm_password != self.password {
            errors.insert("confirm_password", "Passwords do not match.");
        }
        if self.role_id.is_none() {
            errors.insert("role_id", "Select a role.");
        }
        errors.into_result()
    }

    /// The request body with surrounding whitespace trimmed. `None` until a
    /// role is selected.
    pub fn to_request(&self) -> Option<RegisterRequest> {
        Some(RegisterRequest {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            phone: self.phone.trim().to_string(),
            role_id: self.role_id?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> RegistrationForm {
        RegistrationForm {
            name: "Ada Lovelace".to_string(),
            email: "ada@school.edu".to_string(),
            phone: "+1 (555) 010-0100".to_string(),
            password: "analytical".to_string(),
            confirm_password: "analytical".to_string(),
            role_id: Some(1),
        }
    }

    #[test]
    fn email_pattern() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last+tag@sub.school.edu"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("@b.com"));
        assert!(!is_valid_email("a@@b.com"));
    }

    #[test]
    fn phone_pattern() {
        assert!(is_valid_phone("12345678"));
        assert!(is_valid_phone("+1 (555) 123-4567"));
        assert!(!is_valid_phone("1234567"));
        assert!(!is_valid_phone("123456789012345678901"));
        assert!(!is_valid_phone("555-CALL-NOW"));
    }

    #[test]
    fn login_form_accepts_valid_input() {
        let form = LoginForm {
            email: "  a@b.com ".to_string(),
            password: "secret123".to_string(),
        };
        assert!(form.check().is_ok());
        assert_eq!(form.to_request().email, "a@b.com");
    }

    #[test]
    fn login_form_rejects_bad_email() {
        let form = LoginForm {
            email: "not-an-email".to_string(),
            password: "secret123".to_string(),
        };
        let errors = form.check().unwrap_err();
        assert_eq!(errors.get("email"), Some("Enter a valid email address."));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn login_form_requires_both_fields() {
        let errors = LoginForm::default().check().unwrap_err();
        assert_eq!(errors.get("email"), Some("Email is required."));
        assert_eq!(errors.get("password"), Some("Password is required."));
    }

    #[test]
    fn whitespace_email_counts_as_missing() {
        let form = LoginForm {
            email: "   ".to_string(),
            password: "x".to_string(),
        };
        assert_eq!(
            form.check().unwrap_err().get("email"),
            Some("Email is required.")
        );
    }

    #[test]
    fn registration_form_accepts_valid_input() {
        assert!(registration().check().is_ok());
    }

    #[test]
    fn registration_reports_every_field() {
        let errors = RegistrationForm::default().check().unwrap_err();
        let fields: Vec<_> = errors.fields().collect();
        assert_eq!(
            fields,
            ["confirm_password", "email", "name", "password", "phone", "role_id"]
        );
        assert_eq!(errors.get("confirm_password"), Some("Confirm your password."));
    }

    #[test]
    fn short_password_is_rejected() {
        let mut form = registration();
        form.password = "short".to_string();
        form.confirm_password = "short".to_string();
        assert_eq!(
            form.check().unwrap_err().get("password"),
            Some("Password must be at least 8 characters.")
        );
    }

    #[test]
    fn password_length_counts_characters() {
        let mut form = registration();
        form.password = "ééééééé".to_string();
        form.confirm_password = form.password.clone();
        assert!(form.check().is_err());
    }

    #[test]
    fn mismatched_confirmation_is_rejected() {
        let mut form = registration();
        form.confirm_password = "analytica1".to_string();
        let errors = form.check().unwrap_err();
        assert_eq!(errors.get("confirm_password"), Some("Passwords do not match."));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn invalid_phone_is_rejected() {
        let mut form = registration();
        form.phone = "12ab".to_string();
        assert_eq!(
            form.check().unwrap_err().get("phone"),
            Some("Enter a valid phone number.")
        );
    }

    #[test]
    fn registration_request_is_trimmed() {
        let mut form = registration();
        form.name = "  Ada Lovelace ".to_string();
        form.phone = " 12345678 ".to_string();
        let request = form.to_request().unwrap();
        assert_eq!(request.name, "Ada Lovelace");
        assert_eq!(request.phone, "12345678");
        assert_eq!(request.role_id, 1);
    }
}
