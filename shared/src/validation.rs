use crate::error::WorkshopError;
use crate::types::{RegisterRequest, UpdateProfileRequest};
use regex::Regex;
use std::sync::LazyLock;

#[allow(clippy::expect_used)] // good regex, it doesn't panic
static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex should not panic"));
#[allow(clippy::expect_used)] // good regex, it doesn't panic
static PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+88)?01[3-9]\d{8}$").expect("static regex should not panic"));
#[allow(clippy::expect_used)] // good regex, it doesn't panic
static STUDENT_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2,}-\d{4,}$").expect("static regex should not panic"));

pub const MIN_PASSWORD_LEN: usize = 8;

pub fn validate_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Bangladeshi mobile numbers, optionally prefixed with +88.
pub fn validate_phone(phone: &str) -> bool {
    PHONE_REGEX.is_match(phone)
}

pub fn validate_student_id(student_id: &str) -> bool {
    STUDENT_ID_REGEX.is_match(student_id)
}

pub fn validate_password(password: &str, confirm_password: &str) -> Result<(), WorkshopError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(WorkshopError::Validation(
            "Password must be at least 8 characters long".to_string(),
        ));
    }
    if password != confirm_password {
        return Err(WorkshopError::Validation("Passwords do not match".to_string()));
    }
    Ok(())
}

/// Full sign-up form check, in the order the form asks for the fields.
pub fn validate_registration(req: &RegisterRequest) -> Result<(), WorkshopError> {
    if req.name.trim().is_empty() || req.email.trim().is_empty() || req.student_id.trim().is_empty()
    {
        return Err(WorkshopError::Validation("Please fill in all required fields".to_string()));
    }
    if !validate_email(&req.email) {
        return Err(WorkshopError::Validation("Please enter a valid email address".to_string()));
    }
    if !validate_student_id(&req.student_id) {
        return Err(WorkshopError::Validation(
            "Student ID must be in format: XX-XXXX (Your Student ID)".to_string(),
        ));
    }
    if req.phone.trim().is_empty()
        || req.institution.trim().is_empty()
        || req.password.is_empty()
        || req.confirm_password.is_empty()
    {
        return Err(WorkshopError::Validation("Please fill in all required fields".to_string()));
    }
    if !validate_phone(&req.phone) {
        return Err(WorkshopError::Validation("Please enter a valid phone number".to_string()));
    }
    validate_password(&req.password, &req.confirm_password)
}

pub fn validate_profile_update(req: &UpdateProfileRequest) -> Result<(), WorkshopError> {
    if req.is_empty() {
        return Err(WorkshopError::Validation("Nothing to update".to_string()));
    }
    if let Some(name) = &req.name {
        if name.trim().is_empty() {
            return Err(WorkshopError::Validation("Name cannot be empty".to_string()));
        }
    }
    if let Some(phone) = &req.phone {
        if !validate_phone(phone) {
            return Err(WorkshopError::Validation("Please enter a valid phone number".to_string()));
        }
    }
    if let Some(student_id) = &req.student_id {
        if !validate_student_id(student_id) {
            return Err(WorkshopError::Validation(
                "Student ID must be in format: XX-XXXX (Your Student ID)".to_string(),
            ));
        }
    }
    Ok(())
}

/// Drop blank entries, keeping the rest as given and in order.
pub fn clean_expertise(expertise: &[String]) -> Vec<String> {
    expertise
        .iter()
        .filter(|skill| !skill.trim().is_empty())
        .cloned()
        .collect()
}

/// Blank optional strings are stored as absent.
pub fn non_blank(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).cloned()
}

pub fn format_file_size(bytes: usize) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> RegisterRequest {
        RegisterRequest {
            name: "Nusrat Jahan".to_string(),
            email: "nusrat@example.com".to_string(),
            student_id: "CS-2405".to_string(),
            phone: "01712345678".to_string(),
            institution: "NCC".to_string(),
            password: "hunter2hunter2".to_string(),
            confirm_password: "hunter2hunter2".to_string(),
        }
    }

    #[test]
    fn test_phone_validation() {
        assert!(validate_phone("01712345678"));
        assert!(validate_phone("+8801712345678"));
        assert!(!validate_phone("12345"));
        assert!(!validate_phone("01212345678"));
    }

    #[test]
    fn test_student_id_validation() {
        assert!(validate_student_id("CS-2405"));
        assert!(validate_student_id("EEE-240512"));
        assert!(!validate_student_id("cs2405"));
        assert!(!validate_student_id("CS-24"));
    }

    #[test]
    fn test_email_validation() {
        assert!(validate_email("a@b.co"));
        assert!(!validate_email("a@b"));
        assert!(!validate_email("a b@c.com"));
    }

    #[test]
    fn test_registration_form() {
        assert!(validate_registration(&form()).is_ok());

        let mut short = form();
        short.password = "short".to_string();
        short.confirm_password = "short".to_string();
        assert!(matches!(validate_registration(&short), Err(WorkshopError::Validation(m)) if m.contains("8 characters")));

        let mut mismatch = form();
        mismatch.confirm_password = "something-else".to_string();
        assert!(matches!(validate_registration(&mismatch), Err(WorkshopError::Validation(m)) if m == "Passwords do not match"));

        let mut bad_id = form();
        bad_id.student_id = "cs2405".to_string();
        assert!(validate_registration(&bad_id).is_err());
    }

    #[test]
    fn test_clean_expertise() {
        let raw = vec!["".to_string(), "a".to_string(), "".to_string()];
        assert_eq!(clean_expertise(&raw), vec!["a".to_string()]);

        let raw = vec!["OSINT".to_string(), "  ".to_string(), "Forensics".to_string()];
        assert_eq!(clean_expertise(&raw), vec!["OSINT".to_string(), "Forensics".to_string()]);
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5 MB");
        assert_eq!(format_file_size(1536), "1.5 KB");
    }
}
