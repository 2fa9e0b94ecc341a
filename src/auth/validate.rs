/// Validate an email: must contain '@' and a '.' after it, max 254 chars.
pub fn validate_email(email: &str) -> Option<String> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Some("Email is required".to_string());
    }
    if trimmed.len() > 254 {
        return Some("Email must be at most 254 characters".to_string());
    }
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') && !domain.ends_with('.') => None,
        _ => Some("Email must be a valid address".to_string()),
    }
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

/// Validate an optional text field with a max length (empty is OK).
pub fn validate_optional(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.len() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}

/// Digits, spaces and `+-()` only; empty is OK.
pub fn validate_phone(phone: &str) -> Option<String> {
    let trimmed = phone.trim();
    if trimmed.len() > 32 {
        return Some("Phone must be at most 32 characters".to_string());
    }
    if !trimmed.chars().all(|c| c.is_ascii_digit() || " +-()".contains(c)) {
        return Some("Phone may only contain digits, spaces and + - ( )".to_string());
    }
    None
}

/// Split a comma-separated tag field ("First aid, Cooking") into trimmed, de-duplicated entries.
pub fn parse_tags(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            tags.push(tag.to_string());
        }
    }
    tags
}
