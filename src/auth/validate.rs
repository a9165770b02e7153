use crate::models::form::GradeLevel;

/// Validate an email: must contain '@' and '.', max 254 chars.
pub fn validate_email(email: &str) -> Option<String> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Some("Email is required".to_string());
    }
    if trimmed.len() > 254 {
        return Some("Email must be at most 254 characters".to_string());
    }
    if !trimmed.contains('@') || !trimmed.contains('.') {
        return Some("Email must be a valid address (contain '@' and '.')".to_string());
    }
    None
}

/// Validate a password: min 8 chars.
pub fn validate_password(password: &str) -> Option<String> {
    if password.is_empty() {
        return Some("Password is required".to_string());
    }
    if password.len() < 8 {
        return Some("Password must be at least 8 characters".to_string());
    }
    None
}

pub fn validate_password_confirmation(password: &str, confirm: &str) -> Option<String> {
    if password != confirm {
        return Some("Passwords do not match".to_string());
    }
    None
}

/// Validate a required text field with a max length.
pub fn validate_required(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(format!("{field_name} is required"));
    }
    if trimmed.len() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}

/// Validate an optional form class like "5-2" or "6A-1" (empty is OK).
/// The part before '-' must name a form; a bare "6" stream is accepted too.
pub fn validate_form_class(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.len() > 10 {
        return Some("Form class must be at most 10 characters".to_string());
    }
    let Some((prefix, stream)) = trimmed.split_once('-') else {
        return Some("Form class must look like 5-2 or 6A-1".to_string());
    };
    let known = GradeLevel::from_form_class(trimmed).is_some() || prefix.trim() == "6";
    if !known || stream.trim().is_empty() {
        return Some("Form class must look like 5-2 or 6A-1".to_string());
    }
    None
}
